//! End-to-end tests for the architecture facade.
//!
//! Each test feeds raw instruction bytes through the three host queries
//! and checks what a host would observe.

use std::collections::HashMap;

use proptest::prelude::*;
use rvlift::{
    tokens_to_string, ArchConfig, BinOp, BranchFact, BranchKind, Cond, Expr, IlOp, IlReg,
    LowLevelIl, RiscVArchitecture, TokenKind,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rv32() -> RiscVArchitecture {
    init_tracing();
    RiscVArchitecture::rv32().unwrap()
}

fn rv64() -> RiscVArchitecture {
    init_tracing();
    RiscVArchitecture::rv64().unwrap()
}

fn text(arch: &RiscVArchitecture, word: u32, addr: u64) -> String {
    let (tokens, _) = arch.instruction_text(&word.to_le_bytes(), addr).unwrap();
    tokens_to_string(&tokens)
}

fn lift(arch: &RiscVArchitecture, word: u32, addr: u64) -> LowLevelIl {
    let mut il = LowLevelIl::new();
    assert_eq!(arch.instruction_il(&word.to_le_bytes(), addr, &mut il), Some(4));
    il
}

// =============================================================================
// Host scenarios
// =============================================================================

#[test]
fn test_unconditional_jump() {
    let arch = rv32();
    let bytes = 0x0200_006Fu32.to_le_bytes();

    let info = arch.instruction_info(&bytes, 0x1000).unwrap();
    assert_eq!(info.length, 4);
    assert_eq!(
        info.branches,
        vec![BranchFact::to(BranchKind::UnconditionalBranch, 0x1020)]
    );

    let (tokens, length) = arch.instruction_text(&bytes, 0x1000).unwrap();
    assert_eq!(length, 4);
    assert_eq!(tokens_to_string(&tokens), "j       0x1020");
    let target = tokens.last().unwrap();
    assert_eq!(target.kind, TokenKind::PossibleAddress);
    assert_eq!(target.value, Some(0x1020));

    assert_eq!(lift(&arch, 0x0200_006F, 0x1000).to_text(), "jump(0x1020)");
}

#[test]
fn test_conditional_branch() {
    let arch = rv32();
    let info = arch
        .instruction_info(&0xFEB5_08E3u32.to_le_bytes(), 0x2000)
        .unwrap();
    assert_eq!(
        info.branches,
        vec![
            BranchFact::to(BranchKind::TrueBranch, 0x1FF0),
            BranchFact::to(BranchKind::FalseBranch, 0x2004),
        ]
    );
    assert_eq!(text(&arch, 0xFEB5_08E3, 0x2000), "beq     a0, a1, 0x1ff0");
}

#[test]
fn test_conditional_branch_uses_host_labels() {
    let arch = rv32();
    let mut il = LowLevelIl::new();
    let taken = il.add_label_for_address(0x1FF0);
    let fall = il.add_label_for_address(0x2004);

    assert_eq!(
        arch.instruction_il(&0xFEB5_08E3u32.to_le_bytes(), 0x2000, &mut il),
        Some(4)
    );
    assert_eq!(
        il.ops(),
        &[IlOp::If {
            cond: Expr::compare(
                Cond::Eq,
                Expr::reg(IlReg::Gpr(arch.register("a0").unwrap()), 4),
                Expr::reg(IlReg::Gpr(arch.register("a1").unwrap()), 4),
                4,
            ),
            t: taken,
            f: fall,
        }]
    );
}

#[test]
fn test_conditional_branch_synthesizes_labels() {
    let arch = rv32();
    insta::assert_snapshot!(lift(&arch, 0xFEB5_08E3, 0x2000).to_text(), @r"
    if (a0 == a1) then label_0 else label_1
    label_0:
    jump(0x1ff0)
    label_1:
    ");
}

#[test]
fn test_return() {
    for arch in [rv32(), rv64()] {
        let bytes = 0x0000_8067u32.to_le_bytes();
        let info = arch.instruction_info(&bytes, 0x4000).unwrap();
        assert_eq!(info.branches, vec![BranchFact::untargeted(BranchKind::FunctionReturn)]);
        assert_eq!(text(&arch, 0x0000_8067, 0x4000), "ret");
        assert_eq!(lift(&arch, 0x0000_8067, 0x4000).to_text(), "return(ra)");
    }
}

#[test]
fn test_fence_ordering_sets() {
    let arch = rv64();
    assert_eq!(text(&arch, 0x0FF0_000F, 0), "fence   iorw, iorw");
    assert_eq!(text(&arch, 0x0330_000F, 0), "fence   rw, rw");
    assert_eq!(text(&arch, 0x8330_000F, 0), "fence.tso");
    assert_eq!(lift(&arch, 0x0330_000F, 0).to_text(), "fence(0x3, 0x3)");
    assert_eq!(lift(&arch, 0x8330_000F, 0).to_text(), "fence.tso()");
    assert!(arch
        .instruction_info(&0x0FF0_000Fu32.to_le_bytes(), 0)
        .unwrap()
        .branches
        .is_empty());
}

#[test]
fn test_short_buffer() {
    let arch = rv64();
    let mut il = LowLevelIl::new();
    let bytes = [0x13, 0x05];
    assert!(arch.instruction_info(&bytes, 0x1000).is_none());
    assert!(arch.instruction_text(&bytes, 0x1000).is_none());
    assert!(arch.instruction_il(&bytes, 0x1000, &mut il).is_none());
    assert!(il.is_empty());
}

// =============================================================================
// Word arithmetic on RV64
// =============================================================================

/// Evaluates the integer subset of the IL the word ops produce.
fn eval(expr: &Expr, regs: &HashMap<&str, u64>) -> u64 {
    let mask = |value: u64, size: u8| {
        if size >= 8 {
            value
        } else {
            value & ((1u64 << (size * 8)) - 1)
        }
    };
    match expr {
        Expr::Reg { reg: IlReg::Gpr(reg), size } => mask(regs[reg.name()], *size),
        Expr::Const { value, size } => mask(*value, *size),
        Expr::LowPart { operand, size } => mask(eval(operand, regs), *size),
        Expr::Binary { op: BinOp::Add, lhs, rhs, size } => {
            mask(eval(lhs, regs).wrapping_add(eval(rhs, regs)), *size)
        }
        Expr::SignExtend { operand, size } => {
            let bits = operand.size() as u32 * 8;
            let value = eval(operand, regs);
            let shift = 64 - bits;
            mask((((value << shift) as i64) >> shift) as u64, *size)
        }
        other => panic!("unexpected expression {}", other),
    }
}

#[test]
fn test_addw_sign_extends() {
    let arch = rv64();
    let il = lift(&arch, 0x00B5_053B, 0x1000);
    assert_eq!(il.to_text(), "a0 = sx.q((low.d(a0) + low.d(a1)))");

    let IlOp::SetReg { reg, value } = &il.ops()[0] else {
        panic!("expected a register write, got {}", il.ops()[0]);
    };
    assert_eq!(*reg, IlReg::Gpr(arch.register("a0").unwrap()));
    let Expr::SignExtend { operand, size: 8 } = value else {
        panic!("expected a sign extension, got {}", value);
    };
    assert_eq!(operand.size(), 4);

    let regs = HashMap::from([("a0", 0x7FFF_FFFF), ("a1", 1)]);
    assert_eq!(eval(value, &regs), 0xFFFF_FFFF_8000_0000);
    let regs = HashMap::from([("a0", 0xDEAD_BEEF_0000_0001), ("a1", 2)]);
    assert_eq!(eval(value, &regs), 3);
}

#[test]
fn test_addw_rejected_on_rv32() {
    let arch = rv32();
    let bytes = 0x00B5_053Bu32.to_le_bytes();
    assert!(arch.instruction_info(&bytes, 0x1000).is_none());
    assert!(arch.instruction_text(&bytes, 0x1000).is_none());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_hex_immediates() {
    let arch = RiscVArchitecture::new(ArchConfig::rv64().with_hex_immediates(true)).unwrap();
    // addi sp, sp, -16
    assert_eq!(text(&arch, 0xFF01_0113, 0), "addi    sp, sp, -0x10");
    // sd ra, 8(sp)
    assert_eq!(text(&arch, 0x0011_3423, 0), "sd      ra, 0x8(sp)");
}

#[test]
fn test_parsed_config() {
    let arch = RiscVArchitecture::new(ArchConfig::parse("riscv64").unwrap()).unwrap();
    assert_eq!(arch.name(), "riscv64");
    assert_eq!(arch.address_size(), 8);
}

#[test]
fn test_function_listing() {
    let arch = rv64();
    let code: &[u32] = &[
        0xFF01_0113, // addi sp, sp, -16
        0x0011_3423, // sd ra, 8(sp)
        0x0000_0097, // auipc ra, 0
        0x0000_80E7, // jalr ra
        0x0081_3083, // ld ra, 8(sp)
        0x0101_0113, // addi sp, sp, 16
        0x0000_8067, // ret
    ];
    let bytes: Vec<u8> = code.iter().flat_map(|w| w.to_le_bytes()).collect();

    let mut listing = Vec::new();
    let mut il = LowLevelIl::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let addr = 0x1_0000 + offset as u64;
        let (tokens, length) = arch.instruction_text(&bytes[offset..], addr).unwrap();
        listing.push(format!("{:#x}  {}", addr, tokens_to_string(&tokens)));
        assert_eq!(arch.instruction_il(&bytes[offset..], addr, &mut il), Some(length));
        offset += length;
    }

    insta::assert_snapshot!(listing.join("\n"), @r"
    0x10000  addi    sp, sp, -16
    0x10004  sd      ra, 8(sp)
    0x10008  auipc   ra, 0x10008
    0x1000c  jalr    ra, 0(ra)
    0x10010  ld      ra, 8(sp)
    0x10014  addi    sp, sp, 16
    0x10018  ret
    ");
    insta::assert_snapshot!(il.to_text(), @r"
    sp = (sp + 0xfffffffffffffff0)
    [(sp + 0x8)].q = ra
    ra = 0x10008
    call((ra & 0xfffffffffffffffe))
    ra = [(sp + 0x8)].q
    sp = (sp + 0x10)
    return(ra)
    ");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    /// All three queries agree on the instruction length, or all decline.
    #[test]
    fn queries_agree_on_length(word in any::<u32>(), addr in any::<u32>(), wide in any::<bool>()) {
        let arch = if wide { rv64() } else { rv32() };
        let bytes = word.to_le_bytes();
        let addr = addr as u64;
        let mut il = LowLevelIl::new();

        let info = arch.instruction_info(&bytes, addr).map(|i| i.length);
        let text = arch.instruction_text(&bytes, addr).map(|(_, len)| len);
        let lifted = arch.instruction_il(&bytes, addr, &mut il);

        prop_assert_eq!(info, text);
        prop_assert_eq!(info, lifted);
        prop_assert_eq!(info.is_some(), !il.is_empty());
        if let Some(length) = info {
            prop_assert_eq!(length, 4);
        }
    }
}
