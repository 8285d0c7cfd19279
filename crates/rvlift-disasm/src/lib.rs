//! # rvlift-disasm
//!
//! RISC-V instruction decoding for rvlift.
//!
//! This crate turns raw instruction words into canonical
//! [`rvlift_core::Instruction`] values, classifies their control-transfer
//! behaviour and renders them as display tokens.

pub mod error;
pub mod traits;

#[cfg(feature = "riscv")]
pub mod riscv;

pub use error::DecodeError;
pub use traits::{DecodedInstruction, Disassembler};

#[cfg(feature = "riscv")]
pub use riscv::{classify, render, render_with, RenderOptions, RiscVDisassembler};
