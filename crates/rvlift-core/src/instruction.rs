//! Decoded instruction representation.

use crate::{Mnemonic, Operand, Register};

/// A decoded RISC-V instruction.
///
/// Built fresh by every decode call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    /// Virtual address of this instruction.
    pub address: u64,
    /// Raw encoding word.
    pub raw: u32,
    /// Size in bytes.
    pub size: usize,
    /// Canonical mnemonic.
    pub mnemonic: Mnemonic,
    /// Signed immediate relevant to control transfer or arithmetic; 0 when unused.
    pub imm: i64,
    /// Operands (destination first, then sources).
    pub operands: Vec<Operand>,
    /// Acquire/release bits of atomic instructions.
    pub ordering: AtomicOrdering,
}

impl Instruction {
    /// Creates a new instruction with no operands.
    pub fn new(address: u64, raw: u32, size: usize, mnemonic: Mnemonic) -> Self {
        Self {
            address,
            raw,
            size,
            mnemonic,
            imm: 0,
            operands: Vec::new(),
            ordering: AtomicOrdering::None,
        }
    }

    /// Sets the immediate.
    pub fn with_imm(mut self, imm: i64) -> Self {
        self.imm = imm;
        self
    }

    /// Sets operands.
    pub fn with_operands(mut self, ops: Vec<Operand>) -> Self {
        self.operands = ops;
        self
    }

    /// Sets the atomic ordering.
    pub fn with_ordering(mut self, ordering: AtomicOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Returns the end address (address + size).
    pub fn end_address(&self) -> u64 {
        self.address.wrapping_add(self.size as u64)
    }

    /// Returns operand `index`, if present.
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    /// Returns operand `index` if it is a register.
    pub fn reg(&self, index: usize) -> Option<Register> {
        self.operand(index).and_then(Operand::as_register)
    }
}

/// Column at which operands start in the textual form.
pub const MNEMONIC_COLUMN: usize = 8;

/// Default textual form: operands at [`MNEMONIC_COLUMN`], signed immediates
/// in decimal. Matches the token renderer with its default options; use the
/// renderer for any other layout.
impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mnemonic = format!("{}{}", self.mnemonic, self.ordering.suffix());
        if self.operands.is_empty() {
            return f.write_str(&mnemonic);
        }
        write!(f, "{:<width$} ", mnemonic, width = MNEMONIC_COLUMN - 1)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// Memory-ordering bits of A-extension instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtomicOrdering {
    #[default]
    None,
    Acquire,
    Release,
    AcquireRelease,
}

impl AtomicOrdering {
    /// Builds the ordering from the aq and rl bits.
    pub fn from_bits(aq: bool, rl: bool) -> Self {
        match (aq, rl) {
            (false, false) => Self::None,
            (true, false) => Self::Acquire,
            (false, true) => Self::Release,
            (true, true) => Self::AcquireRelease,
        }
    }

    /// Returns the mnemonic suffix (`""`, `".aq"`, `".rl"`, `".aqrl"`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Acquire => ".aq",
            Self::Release => ".rl",
            Self::AcquireRelease => ".aqrl",
        }
    }
}

/// Kind of a single control-transfer fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BranchKind {
    /// Return from function.
    FunctionReturn,
    /// Taken side of a conditional branch.
    TrueBranch,
    /// Fall-through side of a conditional branch.
    FalseBranch,
    /// Direct call to a known address.
    CallDestination,
    /// Direct jump to a known address.
    UnconditionalBranch,
    /// Register-indirect transfer; target only known at runtime.
    UnresolvedBranch,
}

/// One control-transfer possibility reported for an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BranchFact {
    pub kind: BranchKind,
    pub target: Option<u64>,
}

impl BranchFact {
    /// Creates a fact with a resolved target.
    pub fn to(kind: BranchKind, target: u64) -> Self {
        Self {
            kind,
            target: Some(target),
        }
    }

    /// Creates a fact without a target.
    pub fn untargeted(kind: BranchKind) -> Self {
        Self { kind, target: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variant;

    #[test]
    fn test_builder() {
        let a0 = Register::gpr(10, Variant::Rv32);
        let inst = Instruction::new(0x1000, 0x0000_0513, 4, Mnemonic::Li)
            .with_imm(0)
            .with_operands(vec![Operand::reg(a0), Operand::imm(0, 12)]);
        assert_eq!(inst.end_address(), 0x1004);
        assert_eq!(inst.reg(0), Some(a0));
        assert_eq!(inst.reg(1), None);
    }

    #[test]
    fn test_display() {
        let a0 = Register::gpr(10, Variant::Rv32);
        let sp = Register::gpr(2, Variant::Rv32);
        let inst = Instruction::new(0x1000, 0, 4, Mnemonic::Lw)
            .with_operands(vec![Operand::reg(a0), Operand::mem(sp, 12, 4)]);
        assert_eq!(inst.to_string(), "lw      a0, 12(sp)");
        assert_eq!(Instruction::new(0x1000, 0x73, 4, Mnemonic::Ecall).to_string(), "ecall");

        let amo = Instruction::new(0, 0, 4, Mnemonic::LrW)
            .with_ordering(AtomicOrdering::Acquire)
            .with_operands(vec![Operand::reg(a0), Operand::mem(sp, 0, 4)]);
        assert_eq!(amo.to_string(), "lr.w.aq a0, 0(sp)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let inst = Instruction::new(0x2000, 0x0000_8067, 4, Mnemonic::Ret);
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(serde_json::from_str::<Instruction>(&json).unwrap(), inst);
        let fact = BranchFact::to(BranchKind::TrueBranch, 0x1ff0);
        let json = serde_json::to_string(&fact).unwrap();
        assert_eq!(serde_json::from_str::<BranchFact>(&json).unwrap(), fact);
    }

    #[test]
    fn test_ordering_suffix() {
        assert_eq!(AtomicOrdering::from_bits(true, true).suffix(), ".aqrl");
        assert_eq!(AtomicOrdering::from_bits(false, true).suffix(), ".rl");
        assert_eq!(AtomicOrdering::default().suffix(), "");
    }
}
