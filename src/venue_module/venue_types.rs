//! Request and response records for the venue endpoints used by the pipeline.

use serde::{Deserialize, Serialize};

use crate::value::Asset;

#[derive(Copy, Eq, Hash, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Copy, Eq, Hash, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Copy, Eq, Hash, PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Building,
    Processing,
    Open,
    Closed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

pub const ADAUSDM: &str = "ADAUSDM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slippage_basis_point: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_slippage: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub post_only: bool,
}

impl PlaceOrderRequest {
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: f64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            max_slippage_basis_point: None,
            limit_slippage: None,
            post_only: false,
        }
    }

    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            max_slippage_basis_point: None,
            limit_slippage: None,
            post_only: false,
        }
    }

    pub fn with_post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    /// Cap market-order slippage, in basis points.
    pub fn with_max_slippage_bps(mut self, bps: u32) -> Self {
        self.max_slippage_basis_point = Some(bps);
        self.limit_slippage = Some(true);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlaceOrderResponse {
    pub order_id: String,
    pub tx_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPlaceOrderRequest {
    pub order_id: String,
    pub signed_tx: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFill {
    pub id: String,
    pub order_id: String,
    pub execution_price: f64,
    pub filled_amount: String,
    pub fee_unit: String,
    pub fee_amount: String,
    pub role: String,
    #[serde(default)]
    pub counter_party_order_id: String,
    pub create_time: i64,
}

/// Order state returned by the venue after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderJson {
    pub order_id: String,
    pub status: OrderStatus,
    pub symbol: String,
    pub orig_qty: String,
    #[serde(default)]
    pub executed_qty: String,
    pub side: OrderSide,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub fee_charged: String,
    #[serde(default)]
    pub fee_unit: String,
    #[serde(default)]
    pub executed_price: f64,
    #[serde(default)]
    pub slippage: String,
    #[serde(rename = "create_time", default)]
    pub created_time: u64,
    #[serde(default)]
    pub update_time: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<OrderFill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitPlaceOrderResponse {
    pub order: OrderJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecordResponse {
    pub order_json: OrderJson,
}

/// Build response carrying a single unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHexResponse {
    pub tx_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTxRequest {
    pub signed_tx: String,
}

/// Submit response carrying a transaction hash. The cancel endpoint spells it
/// `txhash`, the account endpoints `tx_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHashResponse {
    #[serde(alias = "txhash")]
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCancelAllOrdersResponse {
    pub tx_hexes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCancelAllOrdersRequest {
    pub signed_txs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCancelAllOrdersResponse {
    #[serde(default)]
    pub cancelled_order_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOperationKeyResponse {
    pub encrypted_operation_key: String,
    pub operation_key_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildWithdrawalRequest {
    pub withdrawal_amount: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTransferalRequest {
    pub transferal_amount: Vec<Asset>,
    pub to_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: f64,
    pub locked: f64,
}

/// Error body returned by the venue on non-2xx replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}
