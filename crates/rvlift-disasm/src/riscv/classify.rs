//! Control-transfer classification.

use rvlift_core::{BranchFact, BranchKind, Instruction, Transfer, Variant};

/// Returns the control-transfer facts for `inst` decoded at `address`.
///
/// Instructions that simply fall through produce no facts.
pub fn classify(inst: &Instruction, address: u64, variant: Variant) -> Vec<BranchFact> {
    let target = || variant.relative_target(address, inst.imm);

    match inst.mnemonic.transfer() {
        Transfer::None => Vec::new(),
        Transfer::Return => vec![BranchFact::untargeted(BranchKind::FunctionReturn)],
        Transfer::Conditional => vec![
            BranchFact::to(BranchKind::TrueBranch, target()),
            BranchFact::to(
                BranchKind::FalseBranch,
                variant.relative_target(address, inst.size as i64),
            ),
        ],
        Transfer::DirectCall => vec![BranchFact::to(BranchKind::CallDestination, target())],
        Transfer::DirectJump => vec![BranchFact::to(BranchKind::UnconditionalBranch, target())],
        Transfer::Indirect => vec![BranchFact::untargeted(BranchKind::UnresolvedBranch)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiscVDisassembler;

    fn facts(variant: Variant, insn: u32, address: u64) -> Vec<BranchFact> {
        let inst = RiscVDisassembler::new(variant)
            .decode(&insn.to_le_bytes(), address)
            .unwrap();
        classify(&inst, address, variant)
    }

    #[test]
    fn test_jump() {
        // j +0x20
        assert_eq!(
            facts(Variant::Rv32, 0x0200_006F, 0x1000),
            vec![BranchFact::to(BranchKind::UnconditionalBranch, 0x1020)]
        );
    }

    #[test]
    fn test_call() {
        // jal ra, +0x20
        assert_eq!(
            facts(Variant::Rv64, 0x0200_00EF, 0x1000),
            vec![BranchFact::to(BranchKind::CallDestination, 0x1020)]
        );
    }

    #[test]
    fn test_conditional() {
        // beq a0, a1, -0x10
        assert_eq!(
            facts(Variant::Rv32, 0xFEB5_08E3, 0x2000),
            vec![
                BranchFact::to(BranchKind::TrueBranch, 0x1FF0),
                BranchFact::to(BranchKind::FalseBranch, 0x2004),
            ]
        );
    }

    #[test]
    fn test_return_and_indirect() {
        assert_eq!(
            facts(Variant::Rv32, 0x0000_8067, 0x1000),
            vec![BranchFact::untargeted(BranchKind::FunctionReturn)]
        );
        // jalr ra, 0(a5)
        assert_eq!(
            facts(Variant::Rv32, 0x0007_80E7, 0x1000),
            vec![BranchFact::untargeted(BranchKind::UnresolvedBranch)]
        );
        // mret
        assert_eq!(
            facts(Variant::Rv64, 0x3020_0073, 0x1000),
            vec![BranchFact::untargeted(BranchKind::UnresolvedBranch)]
        );
    }

    #[test]
    fn test_fall_through() {
        assert!(facts(Variant::Rv32, 0x0000_0013, 0x1000).is_empty());
        assert!(facts(Variant::Rv32, 0x0000_0073, 0x1000).is_empty());
    }

    #[test]
    fn test_target_wraps_on_rv32() {
        // j -0x20 at 0x10 wraps below zero
        let j_back = 0xFE1F_F06F;
        assert_eq!(
            facts(Variant::Rv32, j_back, 0x10),
            vec![BranchFact::to(BranchKind::UnconditionalBranch, 0xFFFF_FFF0)]
        );
        assert_eq!(
            facts(Variant::Rv64, j_back, 0x10),
            vec![BranchFact::to(BranchKind::UnconditionalBranch, 0xFFFF_FFFF_FFFF_FFF0)]
        );
    }
}
