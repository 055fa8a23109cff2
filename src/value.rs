//! Multi-asset quantity ledger used to reconcile deposits, withdrawals and fills.
//!
//! [`AssetValue`] maps an asset unit (e.g. `"lovelace"` or a policy id + name)
//! to a signed integer quantity. Units whose quantity reaches exactly zero are
//! removed, so an entry present in the ledger is never zero.
//!
//! ```
//! use deltadefi_sdk::value::AssetValue;
//!
//! let mut value = AssetValue::new();
//! value.add("ADA", "100")?.subtract("ADA", "40")?;
//! assert_eq!(value.get("ADA"), 60);
//! # Ok::<(), deltadefi_sdk::value::ValueError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid quantity {quantity:?} for unit {unit}")]
    Parse { unit: String, quantity: String },
    #[error("not enough {unit} to subtract")]
    Underflow { unit: String },
    #[error("quantity overflow for unit {unit}")]
    Overflow { unit: String },
}

pub type Result<T> = std::result::Result<T, ValueError>;

/// A single asset amount as exchanged with the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub unit: String,
    pub quantity: String,
}

impl Asset {
    pub fn new(unit: impl Into<String>, quantity: impl ToString) -> Self {
        Self {
            unit: unit.into(),
            quantity: quantity.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssetValue")]
pub struct AssetValue {
    value: BTreeMap<String, i64>,
}

/// Wire form of [`AssetValue`]; entries are re-checked on the way in.
#[derive(Deserialize)]
struct RawAssetValue {
    #[serde(default)]
    value: BTreeMap<String, i64>,
}

impl TryFrom<RawAssetValue> for AssetValue {
    type Error = ValueError;

    fn try_from(raw: RawAssetValue) -> Result<Self> {
        let mut value = AssetValue::new();
        for (unit, quantity) in &raw.value {
            value.add_quantity(unit, *quantity)?;
        }
        Ok(value)
    }
}

fn parse_quantity(unit: &str, quantity: &str) -> Result<i64> {
    quantity.trim().parse::<i64>().map_err(|_| ValueError::Parse {
        unit: unit.to_string(),
        quantity: quantity.to_string(),
    })
}

impl AssetValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from a list of assets, failing on the first bad quantity.
    pub fn from_assets(assets: &[Asset]) -> Result<Self> {
        let mut value = Self::new();
        value.add_all(assets)?;
        Ok(value)
    }

    /// Add `quantity` of `unit`. The quantity is parsed as a signed integer.
    pub fn add(&mut self, unit: &str, quantity: &str) -> Result<&mut Self> {
        let quantity = parse_quantity(unit, quantity)?;
        self.add_quantity(unit, quantity)
    }

    pub fn add_quantity(&mut self, unit: &str, quantity: i64) -> Result<&mut Self> {
        let current = self.get(unit);
        let next = current
            .checked_add(quantity)
            .ok_or_else(|| ValueError::Overflow {
                unit: unit.to_string(),
            })?;
        self.store(unit, next)?;
        Ok(self)
    }

    pub fn add_asset(&mut self, asset: &Asset) -> Result<&mut Self> {
        self.add(&asset.unit, &asset.quantity)
    }

    /// Add every asset in order. Either all of them are applied or none is.
    pub fn add_all(&mut self, assets: &[Asset]) -> Result<&mut Self> {
        let mut staged = self.clone();
        for asset in assets {
            staged.add_asset(asset)?;
        }
        *self = staged;
        Ok(self)
    }

    /// Subtract `quantity` of `unit`. Subtracting from an absent unit, or more
    /// than is held, is an underflow.
    pub fn subtract(&mut self, unit: &str, quantity: &str) -> Result<&mut Self> {
        let quantity = parse_quantity(unit, quantity)?;
        self.subtract_quantity(unit, quantity)
    }

    pub fn subtract_quantity(&mut self, unit: &str, quantity: i64) -> Result<&mut Self> {
        let current = *self.value.get(unit).ok_or_else(|| ValueError::Underflow {
            unit: unit.to_string(),
        })?;
        let next = current
            .checked_sub(quantity)
            .ok_or_else(|| ValueError::Overflow {
                unit: unit.to_string(),
            })?;
        self.store(unit, next)?;
        Ok(self)
    }

    pub fn subtract_asset(&mut self, asset: &Asset) -> Result<&mut Self> {
        self.subtract(&asset.unit, &asset.quantity)
    }

    /// Subtract every asset in order. Either all of them are applied or none is.
    pub fn subtract_all(&mut self, assets: &[Asset]) -> Result<&mut Self> {
        let mut staged = self.clone();
        for asset in assets {
            staged.subtract_asset(asset)?;
        }
        *self = staged;
        Ok(self)
    }

    /// Quantity held for `unit`, 0 when absent.
    pub fn get(&self, unit: &str) -> i64 {
        self.value.get(unit).copied().unwrap_or(0)
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.value.contains_key(unit)
    }

    /// `self[unit] >= other[unit]`. False when either side lacks the unit;
    /// absence is not read as zero here, unlike [`AssetValue::get`].
    pub fn greater_or_equal(&self, unit: &str, other: &AssetValue) -> bool {
        match (self.value.get(unit), other.value.get(unit)) {
            (Some(lhs), Some(rhs)) => lhs >= rhs,
            _ => false,
        }
    }

    /// `self[unit] <= other[unit]`. False when either side lacks the unit.
    pub fn less_or_equal(&self, unit: &str, other: &AssetValue) -> bool {
        match (self.value.get(unit), other.value.get(unit)) {
            (Some(lhs), Some(rhs)) => lhs <= rhs,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Sum every ledger in `others` into this one, unit by unit.
    pub fn merge<'a, I>(&mut self, others: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'a AssetValue>,
    {
        let mut staged = self.clone();
        for other in others {
            for (unit, quantity) in &other.value {
                staged.add_quantity(unit, *quantity)?;
            }
        }
        *self = staged;
        Ok(self)
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, i64)> {
        self.value.iter().map(|(unit, qty)| (unit.as_str(), *qty))
    }

    pub fn to_assets(&self) -> Vec<Asset> {
        self.units()
            .map(|(unit, quantity)| Asset::new(unit, quantity))
            .collect()
    }

    fn store(&mut self, unit: &str, quantity: i64) -> Result<()> {
        match quantity {
            q if q < 0 => Err(ValueError::Underflow {
                unit: unit.to_string(),
            }),
            0 => {
                self.value.remove(unit);
                Ok(())
            }
            q => {
                self.value.insert(unit.to_string(), q);
                Ok(())
            }
        }
    }
}

impl fmt::Display for AssetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .units()
            .map(|(unit, quantity)| format!("{}: {}", unit, quantity))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl TryFrom<&[Asset]> for AssetValue {
    type Error = ValueError;

    fn try_from(assets: &[Asset]) -> Result<Self> {
        Self::from_assets(assets)
    }
}
