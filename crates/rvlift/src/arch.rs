//! The RISC-V architecture facade.

use rvlift_core::register::riscv::{RA, SP};
use rvlift_core::{
    register_table, BranchFact, Endianness, Instruction, Register, RegisterInfo, Token, Variant,
};
use rvlift_disasm::{classify, render_with, RiscVDisassembler};
use rvlift_il::{IlBuilder, Lifter};
use tracing::{debug, trace};

use crate::{ArchConfig, ArchError};

/// Length and control-transfer facts for one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionInfo {
    /// Instruction length in bytes.
    pub length: usize,
    /// Control-transfer facts, in the order the host should record them.
    pub branches: Vec<BranchFact>,
}

/// A RISC-V 32- or 64-bit architecture.
///
/// Immutable after construction; every query decodes from scratch.
#[derive(Debug, Clone)]
pub struct RiscVArchitecture {
    config: ArchConfig,
    disasm: RiscVDisassembler,
    lifter: Lifter,
    registers: &'static [RegisterInfo],
}

impl RiscVArchitecture {
    /// Creates the architecture, verifying the lift table for the variant.
    pub fn new(config: ArchConfig) -> Result<Self, ArchError> {
        let variant = config.variant;
        let lifter = Lifter::new(variant)?;
        debug!(arch = variant.name(), "riscv architecture ready");

        Ok(Self {
            config,
            disasm: RiscVDisassembler::new(variant),
            lifter,
            registers: register_table(variant),
        })
    }

    /// Creates an RV32 architecture with default options.
    pub fn rv32() -> Result<Self, ArchError> {
        Self::new(ArchConfig::rv32())
    }

    /// Creates an RV64 architecture with default options.
    pub fn rv64() -> Result<Self, ArchError> {
        Self::new(ArchConfig::rv64())
    }

    pub fn config(&self) -> &ArchConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    /// Returns the name the host registers this architecture under.
    pub fn name(&self) -> &'static str {
        self.variant().name()
    }

    pub fn address_size(&self) -> usize {
        self.variant().address_size()
    }

    pub fn default_int_size(&self) -> usize {
        self.variant().default_int_size()
    }

    pub fn max_instr_length(&self) -> usize {
        self.variant().max_instruction_length()
    }

    pub fn endianness(&self) -> Endianness {
        self.variant().endianness()
    }

    /// Returns the register table (ABI names, register-number order).
    pub fn registers(&self) -> &'static [RegisterInfo] {
        self.registers
    }

    /// Looks up a register by name.
    pub fn register(&self, name: &str) -> Result<Register, ArchError> {
        Ok(Register::from_name(name, self.variant())?)
    }

    /// Returns the stack pointer register name.
    pub fn stack_pointer(&self) -> &'static str {
        Register::gpr(SP, self.variant()).name()
    }

    /// Returns the link register name.
    pub fn link_register(&self) -> &'static str {
        Register::gpr(RA, self.variant()).name()
    }

    fn decode(&self, data: &[u8], addr: u64) -> Option<Instruction> {
        match self.disasm.decode(data, addr) {
            Ok(inst) => Some(inst),
            Err(err) => {
                trace!(arch = self.name(), address = addr, %err, "no instruction");
                None
            }
        }
    }

    /// Returns the length and branch facts of the instruction at `addr`.
    pub fn instruction_info(&self, data: &[u8], addr: u64) -> Option<InstructionInfo> {
        let inst = self.decode(data, addr)?;
        Some(InstructionInfo {
            length: inst.size,
            branches: classify(&inst, addr, self.variant()),
        })
    }

    /// Returns the display tokens and length of the instruction at `addr`.
    pub fn instruction_text(&self, data: &[u8], addr: u64) -> Option<(Vec<Token>, usize)> {
        let inst = self.decode(data, addr)?;
        Some((render_with(&inst, &self.config.render), inst.size))
    }

    /// Lifts the instruction at `addr` into `il` and returns its length.
    pub fn instruction_il<B: IlBuilder + ?Sized>(
        &self,
        data: &[u8],
        addr: u64,
        il: &mut B,
    ) -> Option<usize> {
        let inst = self.decode(data, addr)?;
        match self.lifter.lift(il, &inst) {
            Ok(()) => Some(inst.size),
            Err(err) => {
                debug!(arch = self.name(), address = addr, %err, "lift failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvlift_il::LowLevelIl;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_thread_safety() {
        assert_send_sync::<RiscVArchitecture>();
    }

    #[test]
    fn test_properties() {
        let rv32 = RiscVArchitecture::rv32().unwrap();
        assert_eq!(rv32.name(), "riscv");
        assert_eq!(rv32.address_size(), 4);
        assert_eq!(rv32.default_int_size(), 4);
        assert_eq!(rv32.max_instr_length(), 4);
        assert_eq!(rv32.endianness(), Endianness::Little);
        assert_eq!(rv32.stack_pointer(), "sp");
        assert_eq!(rv32.link_register(), "ra");

        let rv64 = RiscVArchitecture::rv64().unwrap();
        assert_eq!(rv64.name(), "riscv64");
        assert_eq!(rv64.address_size(), 8);
        assert_eq!(rv64.registers().len(), 33);
        assert!(rv64.registers().iter().all(|r| r.size == 8));
    }

    #[test]
    fn test_register_lookup() {
        let arch = RiscVArchitecture::rv64().unwrap();
        assert_eq!(arch.register("a0").unwrap().size, 8);
        assert_eq!(arch.register("pc").unwrap().name(), "pc");
        assert!(matches!(arch.register("r0"), Err(ArchError::Model(_))));
    }

    #[test]
    fn test_undecodable_is_none() {
        let arch = RiscVArchitecture::rv32().unwrap();
        let mut il = LowLevelIl::new();
        let word = 0xFFFF_FFFFu32.to_le_bytes();
        assert!(arch.instruction_info(&word, 0).is_none());
        assert!(arch.instruction_text(&word, 0).is_none());
        assert!(arch.instruction_il(&word, 0, &mut il).is_none());
        assert!(il.is_empty());
    }
}
