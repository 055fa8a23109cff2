use thiserror::Error;

use crate::security::VaultError;
use crate::value::ValueError;
use crate::venue_module::{OrderWalletError, VenueApiError};
use crate::wallet::SigningError;

/// Top-level error for callers that drive several modules at once.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Venue(#[from] VenueApiError),
    #[error(transparent)]
    Pipeline(#[from] OrderWalletError),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SdkError {
    /// True when a submit may have reached the venue and the outcome is unknown.
    pub fn remote_state_uncertain(&self) -> bool {
        matches!(self, SdkError::Pipeline(e) if e.remote_state_uncertain())
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
