//! Instruction operand types.

use crate::Register;

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// Register operand.
    Register(Register),
    /// Immediate value.
    Immediate(Immediate),
    /// Memory reference (`disp(base)`).
    Memory(MemoryRef),
    /// PC-relative address (used in branches, jumps and `auipc`).
    PcRelative {
        /// Offset from the instruction address.
        offset: i64,
        /// Resolved target address.
        target: u64,
    },
    /// Predecessor or successor set of a `fence`.
    FenceSet(FenceSet),
}

impl Operand {
    /// Creates a register operand.
    pub fn reg(reg: Register) -> Self {
        Self::Register(reg)
    }

    /// Creates a signed immediate operand from a `bits`-wide field.
    pub fn imm(value: i64, bits: u8) -> Self {
        Self::Immediate(Immediate {
            value,
            bits,
            signed: true,
        })
    }

    /// Creates an unsigned immediate operand from a `bits`-wide field.
    pub fn imm_unsigned(value: u64, bits: u8) -> Self {
        Self::Immediate(Immediate {
            value: value as i64,
            bits,
            signed: false,
        })
    }

    /// Creates a PC-relative operand.
    pub fn pc_rel(offset: i64, target: u64) -> Self {
        Self::PcRelative { offset, target }
    }

    /// Creates a memory operand.
    pub fn mem(base: Register, displacement: i64, size: u8) -> Self {
        Self::Memory(MemoryRef::base_disp(base, displacement, size))
    }

    /// Creates a fence ordering-set operand from the low four bits of `bits`.
    pub fn fence_set(bits: u32) -> Self {
        Self::FenceSet(FenceSet::from_bits(bits))
    }

    /// Returns the register if this is a register operand.
    pub fn as_register(&self) -> Option<Register> {
        match self {
            Self::Register(reg) => Some(*reg),
            _ => None,
        }
    }

    /// Returns the immediate if this is an immediate operand.
    pub fn as_immediate(&self) -> Option<Immediate> {
        match self {
            Self::Immediate(imm) => Some(*imm),
            _ => None,
        }
    }

    /// Returns the memory reference if this is a memory operand.
    pub fn as_memory(&self) -> Option<MemoryRef> {
        match self {
            Self::Memory(mem) => Some(*mem),
            _ => None,
        }
    }

    /// Returns the ordering set if this is a fence operand.
    pub fn as_fence_set(&self) -> Option<FenceSet> {
        match self {
            Self::FenceSet(set) => Some(*set),
            _ => None,
        }
    }
}

/// Immediate value operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Immediate {
    /// The value, sign-extended when `signed`.
    pub value: i64,
    /// Width of the encoding field in bits.
    pub bits: u8,
    /// Whether the field is sign-extended.
    pub signed: bool,
}

impl Immediate {
    /// Returns the value as an unsigned u64.
    pub fn as_u64(&self) -> u64 {
        self.value as u64
    }

    /// Returns the value as a signed i64.
    pub fn as_i64(&self) -> i64 {
        self.value
    }

    /// Returns true if the value reads better in hex (CSR numbers, `lui` fields).
    pub fn prefers_hex(&self) -> bool {
        !self.signed && self.bits >= 12
    }
}

/// Memory reference operand: `base + displacement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryRef {
    /// Base register.
    pub base: Register,
    /// Signed displacement.
    pub displacement: i64,
    /// Access size in bytes.
    pub size: u8,
}

impl MemoryRef {
    /// Creates a memory reference with base and displacement.
    pub fn base_disp(base: Register, displacement: i64, size: u8) -> Self {
        Self {
            base,
            displacement,
            size,
        }
    }
}

/// Ordering set of a `fence`: device input (`i`), device output (`o`),
/// memory reads (`r`) and memory writes (`w`), from the high bit down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FenceSet(u8);

impl FenceSet {
    /// Memory reads and writes.
    pub const RW: FenceSet = FenceSet(0b0011);
    /// Everything.
    pub const IORW: FenceSet = FenceSet(0b1111);

    /// Builds a set from the low four bits of `bits`.
    pub fn from_bits(bits: u32) -> Self {
        Self((bits & 0xF) as u8)
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for FenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return f.write_str("0");
        }
        for (bit, name) in [(0b1000, "i"), (0b0100, "o"), (0b0010, "r"), (0b0001, "w")] {
            if self.0 & bit != 0 {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

/// Default operand text (decimal signed immediates).
impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "{}", reg.name()),
            Self::Immediate(imm) => {
                if imm.prefers_hex() {
                    write!(f, "{:#x}", imm.as_u64())
                } else {
                    write!(f, "{}", imm.value)
                }
            }
            Self::Memory(mem) => write!(f, "{}({})", mem.displacement, mem.base.name()),
            Self::PcRelative { target, .. } => write!(f, "{:#x}", target),
            Self::FenceSet(set) => write!(f, "{}", set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;

    #[test]
    fn test_display() {
        let sp = Register::gpr(2, Variant::Rv32);
        assert_eq!(Operand::reg(sp).to_string(), "sp");
        assert_eq!(Operand::imm(-16, 12).to_string(), "-16");
        assert_eq!(Operand::imm_unsigned(0x300, 12).to_string(), "0x300");
        assert_eq!(Operand::imm_unsigned(8, 5).to_string(), "8");
        assert_eq!(Operand::mem(sp, -8, 4).to_string(), "-8(sp)");
        assert_eq!(Operand::pc_rel(0x20, 0x1020).to_string(), "0x1020");
    }

    #[test]
    fn test_accessors() {
        let a0 = Register::gpr(10, Variant::Rv64);
        assert_eq!(Operand::reg(a0).as_register(), Some(a0));
        assert_eq!(Operand::imm(5, 12).as_immediate().map(|i| i.as_i64()), Some(5));
        assert_eq!(Operand::mem(a0, 8, 8).as_memory().map(|m| m.displacement), Some(8));
        assert!(Operand::imm(5, 12).as_register().is_none());
        assert_eq!(Operand::fence_set(0x13).as_fence_set(), Some(FenceSet::RW));
    }

    #[test]
    fn test_fence_set_display() {
        assert_eq!(FenceSet::IORW.to_string(), "iorw");
        assert_eq!(FenceSet::RW.to_string(), "rw");
        assert_eq!(FenceSet::from_bits(0b1001).to_string(), "iw");
        assert_eq!(FenceSet::from_bits(0).to_string(), "0");
        assert_eq!(Operand::fence_set(0b0100).to_string(), "o");
    }
}
