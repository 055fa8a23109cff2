use std::fmt;

use thiserror::Error;

use crate::security::VaultError;
use crate::value::ValueError;
use crate::wallet::SigningError;

#[derive(Debug, Error)]
pub enum VenueApiError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("venue returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected venue response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Pipeline step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Sign,
    Submit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Build => "build",
            Phase::Sign => "sign",
            Phase::Submit => "submit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlaceOrder,
    CancelOrder,
    CancelAllOrders,
    Withdrawal,
    Transferal,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::PlaceOrder => "place order",
            Operation::CancelOrder => "cancel order",
            Operation::CancelAllOrders => "cancel all orders",
            Operation::Withdrawal => "withdrawal",
            Operation::Transferal => "transferal",
        })
    }
}

#[derive(Debug, Error)]
pub enum OrderWalletError {
    #[error("operation key not loaded; call load_operation_key first")]
    NotLoaded,
    #[error("failed to fetch encrypted operation key: {0}")]
    KeyFetch(#[source] VenueApiError),
    #[error(transparent)]
    Vault(#[from] VaultError),
    #[error("operation key rejected by signer: {0}")]
    SignerKey(#[source] SigningError),
    #[error("{op} build failed, nothing was sent: {source}")]
    Build {
        op: Operation,
        #[source]
        source: VenueApiError,
    },
    #[error("{op} signing failed{}, nothing was sent: {source}", payload_suffix(.index))]
    Signing {
        op: Operation,
        index: Option<usize>,
        #[source]
        source: SigningError,
    },
    #[error("{op} submit failed, remote state is uncertain; query order status before retrying: {source}")]
    Submit {
        op: Operation,
        #[source]
        source: VenueApiError,
    },
    #[error("{0} amount is empty, nothing was sent")]
    EmptyAmount(Operation),
    #[error(transparent)]
    Value(#[from] ValueError),
}

fn payload_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at payload {}", i)).unwrap_or_default()
}

impl OrderWalletError {
    /// Pipeline phase for build/sign/submit failures, `None` otherwise.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            OrderWalletError::Build { .. } => Some(Phase::Build),
            OrderWalletError::Signing { .. } => Some(Phase::Sign),
            OrderWalletError::Submit { .. } => Some(Phase::Submit),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            OrderWalletError::Build { op, .. }
            | OrderWalletError::Signing { op, .. }
            | OrderWalletError::Submit { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// True when signed payloads may have reached the venue.
    pub fn remote_state_uncertain(&self) -> bool {
        matches!(self, OrderWalletError::Submit { .. })
    }
}

pub type Result<T> = std::result::Result<T, OrderWalletError>;
