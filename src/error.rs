//! Error handling for the Solar Scout collector.

use crate::delivery::client::DeliveryError;
use crate::sampling::sensor::AcquisitionError;

/// A specialized `Result` type for Solar Scout operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// The main error type for collector operations.
///
/// Only `Credentials` errors are fatal, and only at startup; everything else
/// is contained within the cycle that produced it.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials file missing or malformed
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Sample acquisition failed for this cycle
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// Point delivery failed
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Local display operation failed
    #[error("display error: {0}")]
    Display(String),
}

impl CollectorError {
    /// Create a new credentials error
    pub fn credentials_error(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create a new display error
    pub fn display_error(msg: impl Into<String>) -> Self {
        Self::Display(msg.into())
    }
}
