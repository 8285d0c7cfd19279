//! Lifter error types.

use rvlift_core::{Mnemonic, Transfer};
use thiserror::Error;

/// Error type for lifting.
///
/// The first two variants are raised by [`crate::Lifter::new`] when the
/// dispatch table is inconsistent and mean the lifter is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiftError {
    /// A rule needs 64-bit registers but the lifter targets RV32.
    #[error("`{mnemonic}` cannot be lifted for {variant}")]
    UnsupportedOnVariant {
        mnemonic: Mnemonic,
        variant: &'static str,
    },

    /// A rule's control transfer disagrees with the mnemonic's class.
    #[error("`{mnemonic}` lifts as {rule:?} but is classified as {class:?}")]
    TransferMismatch {
        mnemonic: Mnemonic,
        rule: Transfer,
        class: Transfer,
    },

    /// The instruction's operands do not have the layout its rule expects.
    #[error("malformed operands for `{mnemonic}` at {address:#x}")]
    MalformedOperands { mnemonic: Mnemonic, address: u64 },
}
