//! RISC-V register model.
//!
//! Registers are identified by their architectural number (x0-x31, with
//! the program counter as id 32) and carry their width in bytes. Names are
//! always the ABI names (`zero`, `ra`, `sp`, ...), which are also what the
//! host uses as register keys.

use crate::{Error, Variant};

/// A RISC-V integer register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Register {
    /// Architectural register number (0-31, or [`riscv::PC`]).
    pub id: u16,
    /// Size of the register in bytes.
    pub size: u8,
}

impl Register {
    /// Creates a new register.
    pub fn new(id: u16, size: u8) -> Self {
        Self { id, size }
    }

    /// Creates general-purpose register `id` sized for `variant`.
    pub fn gpr(id: u16, variant: Variant) -> Self {
        Self::new(id, variant.register_size() as u8)
    }

    /// Creates the program counter sized for `variant`.
    pub fn pc(variant: Variant) -> Self {
        Self::gpr(riscv::PC, variant)
    }

    /// Resolves an ABI name (`fp`, and `x0`-`x31` are also accepted).
    pub fn from_name(name: &str, variant: Variant) -> Result<Self, Error> {
        if let Some(id) = REGISTER_NAMES.iter().position(|&n| n == name) {
            return Ok(Self::gpr(id as u16, variant));
        }
        if name == "fp" {
            return Ok(Self::gpr(riscv::S0, variant));
        }
        if let Some(num) = name.strip_prefix('x') {
            if let Ok(id) = num.parse::<u16>() {
                if id < 32 {
                    return Ok(Self::gpr(id, variant));
                }
            }
        }
        Err(Error::UnknownRegister(name.to_string()))
    }

    /// Returns the ABI name of this register.
    pub fn name(&self) -> &'static str {
        REGISTER_NAMES
            .get(self.id as usize)
            .copied()
            .unwrap_or("unknown")
    }

    /// Returns true for the hard-wired zero register.
    pub fn is_zero(&self) -> bool {
        self.id == riscv::ZERO
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// RISC-V register numbers.
pub mod riscv {
    pub const ZERO: u16 = 0;
    pub const RA: u16 = 1;
    pub const SP: u16 = 2;
    pub const S0: u16 = 8;
    pub const A0: u16 = 10;
    pub const A7: u16 = 17;
    pub const PC: u16 = 32;
}

/// ABI names indexed by register number.
pub const REGISTER_NAMES: [&str; 33] = [
    "zero", // x0 - hard-wired zero
    "ra",   // x1 - return address
    "sp",   // x2 - stack pointer
    "gp",   // x3 - global pointer
    "tp",   // x4 - thread pointer
    "t0", "t1", "t2", // x5-x7
    "s0", // x8 - frame pointer
    "s1", //
    "a0", "a1", // x10-x11 - arguments / return values
    "a2", "a3", "a4", "a5", "a6", "a7", //
    "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", //
    "t3", "t4", "t5", "t6", //
    "pc",
];

/// Host-facing description of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegisterInfo {
    /// ABI name.
    pub name: &'static str,
    /// Width in bytes.
    pub size: usize,
}

const fn table(size: usize) -> [RegisterInfo; 33] {
    let mut out = [RegisterInfo { name: "", size }; 33];
    let mut i = 0;
    while i < out.len() {
        out[i].name = REGISTER_NAMES[i];
        i += 1;
    }
    out
}

static RV32_REGISTERS: [RegisterInfo; 33] = table(4);
static RV64_REGISTERS: [RegisterInfo; 33] = table(8);

/// Returns the fixed register table for `variant`, in register-number order.
pub fn register_table(variant: Variant) -> &'static [RegisterInfo] {
    match variant {
        Variant::Rv32 => &RV32_REGISTERS,
        Variant::Rv64 => &RV64_REGISTERS,
    }
}
