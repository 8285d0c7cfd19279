//! Architecture error types.

use rvlift_il::LiftError;
use thiserror::Error;

/// Error type for constructing an architecture.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchError {
    /// The lift table failed verification.
    #[error("lift table verification failed: {0}")]
    Lift(#[from] LiftError),

    /// Unknown variant or register name.
    #[error(transparent)]
    Model(#[from] rvlift_core::Error),
}
