//! Error types for rvlift-core.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Name does not match any register.
    #[error("unknown register name: {0}")]
    UnknownRegister(String),

    /// Text does not match any mnemonic.
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    /// Text does not name a supported variant.
    #[error("unknown architecture variant: {0}")]
    UnknownVariant(String),
}
