//! Client library for the DeltaDeFi trading venue.
//!
//! - [`security`]: passcode handling and operation key decryption
//! - [`wallet`]: local transaction signing
//! - [`venue_module`]: build, sign and submit pipeline against the venue API
//! - [`value`]: multi-asset quantity ledger

pub mod config;
pub mod error;
pub mod security;
pub mod value;
pub mod venue_module;
pub mod wallet;

pub use error::{Result, SdkError};

#[cfg(test)]
mod test;
