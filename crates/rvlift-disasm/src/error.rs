//! Disassembly error types.

use thiserror::Error;

/// Error type for instruction decoding.
///
/// Every variant means "no instruction at this address"; callers query
/// addresses speculatively and treat these as routine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Instruction was truncated (not enough bytes).
    #[error("truncated instruction at {address:#x}: need {needed} bytes, have {available}")]
    Truncated {
        address: u64,
        needed: usize,
        available: usize,
    },

    /// Unknown or unallocated opcode.
    #[error("unknown opcode at {address:#x}: {word:#010x}")]
    UnknownOpcode { address: u64, word: u32 },

    /// Known opcode with reserved field values.
    #[error("invalid encoding at {address:#x}: {reason}")]
    InvalidEncoding { address: u64, reason: String },
}

impl DecodeError {
    /// Creates a new Truncated error.
    pub fn truncated(address: u64, needed: usize, available: usize) -> Self {
        Self::Truncated {
            address,
            needed,
            available,
        }
    }

    /// Creates a new UnknownOpcode error.
    pub fn unknown_opcode(address: u64, word: u32) -> Self {
        Self::UnknownOpcode { address, word }
    }

    /// Creates a new InvalidEncoding error.
    pub fn invalid_encoding(address: u64, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            address,
            reason: reason.into(),
        }
    }

    /// Returns the address the error refers to.
    pub fn address(&self) -> u64 {
        match self {
            Self::Truncated { address, .. }
            | Self::UnknownOpcode { address, .. }
            | Self::InvalidEncoding { address, .. } => *address,
        }
    }
}
