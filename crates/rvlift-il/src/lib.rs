//! # rvlift-il
//!
//! Low-level intermediate language and the RISC-V lifter that produces it.
//!
//! The [`il`] module defines the expression/statement model and the
//! [`IlBuilder`] seam through which a host receives lifted operations. The
//! [`lifter`] module maps every canonical mnemonic onto a lowering rule.

pub mod error;
pub mod il;
pub mod lifter;

pub use error::LiftError;
pub use il::{BinOp, Cond, Expr, IlBuilder, IlOp, IlReg, Label, LowLevelIl, UnOp};
pub use lifter::{Lifter, Rule};
