//! Venue module for signed trading operations on DeltaDeFi.
//!
//! Every state-changing call follows the same three steps: the venue builds an
//! unsigned transaction, the operation key signs it locally, and the signed
//! payload is submitted back. Failures carry the step they happened in.
//!
//! ## Module Organization
//!
//! - [`order_wallet`]: High-level pipeline (`place_order`, `cancel_order`, `cancel_all_orders`, `withdraw`, `transfer`)
//! - [`venue_api`]: The [`VenueApi`] seam and its reqwest implementation
//! - [`venue_types`]: Request/response records
//! - [`error`]: Transport and pipeline errors with phase tags
//!
//! ## Usage
//!
//! ```no_run
//! use deltadefi_sdk::config::ApiConfig;
//! use deltadefi_sdk::security::SecurePassword;
//! use deltadefi_sdk::venue_module::order_wallet::OrderWallet;
//! use deltadefi_sdk::venue_module::venue_types::{ADAUSDM, OrderSide, PlaceOrderRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut wallet = OrderWallet::new(&ApiConfig::from_env())?;
//! wallet.load_operation_key(&SecurePassword::get_passcode()?).await?;
//!
//! let order = wallet
//!     .place_order(&PlaceOrderRequest::limit(ADAUSDM, OrderSide::Buy, 100.0, 0.75))
//!     .await?;
//! println!("order {} is {:?}", order.order_id, order.status);
//!
//! let cancelled = wallet.cancel_all_orders().await?;
//! println!("cancelled {} orders", cancelled.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure handling
//!
//! A [`OrderWalletError::Submit`] means signed data may have reached the venue.
//! Check the order with [`VenueHttpClient::get_order_record`] before retrying.

pub mod error;
pub mod order_wallet;
pub mod venue_api;
pub mod venue_types;

#[cfg(test)]
pub(crate) mod fake_venue;

pub use error::{Operation, OrderWalletError, Phase, VenueApiError};
pub use order_wallet::OrderWallet;
pub use venue_api::{VenueApi, VenueHttpClient};
