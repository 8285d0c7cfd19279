//! # rvlift
//!
//! RISC-V (RV32/RV64) architecture backend for binary-analysis hosts.
//!
//! [`RiscVArchitecture`] answers the three per-address queries a host
//! makes: instruction length and branch facts, display tokens, and
//! low-level IL. Decode failures are routine and come back as `None`.
//!
//! ```
//! use rvlift::{ArchConfig, LowLevelIl, RiscVArchitecture};
//!
//! let arch = RiscVArchitecture::new(ArchConfig::rv32()).unwrap();
//! let ret = 0x0000_8067u32.to_le_bytes();
//!
//! let info = arch.instruction_info(&ret, 0x1000).unwrap();
//! assert_eq!(info.length, 4);
//!
//! let mut il = LowLevelIl::new();
//! assert_eq!(arch.instruction_il(&ret, 0x1000, &mut il), Some(4));
//! assert_eq!(il.to_text(), "return(ra)");
//! ```

pub mod arch;
pub mod config;
pub mod error;

pub use arch::{InstructionInfo, RiscVArchitecture};
pub use config::ArchConfig;
pub use error::ArchError;

pub use rvlift_core::{
    tokens_to_string, BranchFact, BranchKind, Endianness, Instruction, Mnemonic, Register,
    RegisterInfo, Token, TokenKind, Variant,
};
pub use rvlift_disasm::RenderOptions;
pub use rvlift_il::{BinOp, Cond, Expr, IlBuilder, IlOp, IlReg, Label, LowLevelIl, UnOp};
