//! RISC-V instruction decoder.
//!
//! Supports the RV32I/RV64I base integer instruction sets with extensions:
//! - M extension: Multiply/Divide
//! - A extension: Atomics (LR/SC, AMO operations)
//! - Zicsr: Control and status register access
//! - Zifencei: Instruction-fetch fence
//!
//! Only the standard 32-bit encodings are covered; compressed 16-bit
//! instructions are reported as unknown opcodes.

mod classify;
mod decoder;
mod render;

pub use classify::classify;
pub use decoder::RiscVDisassembler;
pub use render::{render, render_with, RenderOptions};
