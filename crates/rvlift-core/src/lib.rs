//! # rvlift-core
//!
//! Core abstractions for the rvlift RISC-V backend. This crate defines the
//! value types shared by the decoder, the lifter and the architecture
//! facade: variants, registers, operands, mnemonics, instructions, branch
//! facts and display tokens.

pub mod arch;
pub mod error;
pub mod instruction;
pub mod mnemonic;
pub mod operand;
pub mod register;
pub mod token;

pub use arch::{Endianness, Variant};
pub use error::Error;
pub use instruction::{AtomicOrdering, BranchFact, BranchKind, Instruction, MNEMONIC_COLUMN};
pub use mnemonic::{Mnemonic, Transfer};
pub use operand::{FenceSet, Immediate, MemoryRef, Operand};
pub use register::{register_table, Register, RegisterInfo, REGISTER_NAMES};
pub use token::{tokens_to_string, Token, TokenKind};
