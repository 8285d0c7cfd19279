//! Instruction lifting (decoded instruction → IL).
//!
//! Every canonical [`Mnemonic`] maps to exactly one [`Rule`] through an
//! exhaustive match. [`Lifter::new`] checks the resulting table against the
//! decoder vocabulary for the target variant before any lifting happens.

use std::collections::HashMap;

use rvlift_core::register::riscv::RA;
use rvlift_core::{Instruction, MemoryRef, Mnemonic, Operand, Register, Transfer, Variant};
use tracing::debug;

use crate::il::{BinOp, Cond, Expr, IlBuilder, IlOp, IlReg, UnOp};
use crate::LiftError;

/// Where the second operand of an ALU or comparison rule comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Src {
    /// `rd, rs1, rs2`
    Reg,
    /// `rd, rs1, imm`
    Imm,
}

/// Operand layout of comparison rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// Two explicit sources.
    Two(Src),
    /// One source compared against zero on the right (`beqz rs`).
    ZeroRhs,
    /// One source compared against zero on the left (`bgtz rs` = `0 < rs`).
    ZeroLhs,
}

/// CSR access kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrOp {
    ReadWrite,
    ReadSet,
    ReadClear,
}

/// Lowering rule for one mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Lui,
    Auipc,
    /// `jal` with a link register.
    Call,
    /// `j`
    Jump,
    /// `jalr` / `jr`
    IndirectJump,
    Return,
    Branch { cond: Cond, form: Form },
    Load { size: u8, signed: bool },
    Store { size: u8 },
    /// Arithmetic and logic; `word` ops compute on the low 32 bits.
    Alu { op: BinOp, src: Src, word: bool },
    SetCond { cond: Cond, form: Form },
    Move { src: Src },
    Unary { op: UnOp, word: bool },
    SignExtendWord,
    LoadReserved { size: u8 },
    StoreConditional { size: u8 },
    /// Read-modify-write; `None` is a plain swap.
    Amo { op: Option<BinOp>, size: u8 },
    Csr { op: CsrOp, imm: bool },
    /// `fence pred, succ`; the ordering sets become intrinsic inputs.
    Fence,
    /// Operation with no IL semantics beyond its name (`fence.i`, `wfi`).
    Intrinsic(&'static str),
    /// Privileged return through an implementation-defined register.
    TrapReturn(&'static str),
    Syscall,
    Breakpoint,
    Nop,
}

impl Rule {
    /// Returns the lowering rule for `mnemonic`.
    pub fn for_mnemonic(mnemonic: Mnemonic) -> Rule {
        use Mnemonic::*;

        let alu = |op, src| Rule::Alu { op, src, word: false };
        let alu_w = |op, src| Rule::Alu { op, src, word: true };
        let branch = |cond, form| Rule::Branch { cond, form };
        let set = |cond, form| Rule::SetCond { cond, form };
        let csr = |op, imm| Rule::Csr { op, imm };
        let amo = |op, size| Rule::Amo { op, size };

        match mnemonic {
            Lui => Rule::Lui,
            Auipc => Rule::Auipc,
            Jal => Rule::Call,
            J => Rule::Jump,
            Jalr | Jr => Rule::IndirectJump,
            Ret => Rule::Return,

            Beq => branch(Cond::Eq, Form::Two(Src::Reg)),
            Bne => branch(Cond::Ne, Form::Two(Src::Reg)),
            Blt => branch(Cond::SignedLt, Form::Two(Src::Reg)),
            Bge => branch(Cond::SignedGe, Form::Two(Src::Reg)),
            Bltu => branch(Cond::UnsignedLt, Form::Two(Src::Reg)),
            Bgeu => branch(Cond::UnsignedGe, Form::Two(Src::Reg)),
            Beqz => branch(Cond::Eq, Form::ZeroRhs),
            Bnez => branch(Cond::Ne, Form::ZeroRhs),
            Bltz => branch(Cond::SignedLt, Form::ZeroRhs),
            Bgez => branch(Cond::SignedGe, Form::ZeroRhs),
            Blez => branch(Cond::SignedGe, Form::ZeroLhs),
            Bgtz => branch(Cond::SignedLt, Form::ZeroLhs),

            Lb => Rule::Load { size: 1, signed: true },
            Lh => Rule::Load { size: 2, signed: true },
            Lw => Rule::Load { size: 4, signed: true },
            Ld => Rule::Load { size: 8, signed: true },
            Lbu => Rule::Load { size: 1, signed: false },
            Lhu => Rule::Load { size: 2, signed: false },
            Lwu => Rule::Load { size: 4, signed: false },
            Sb => Rule::Store { size: 1 },
            Sh => Rule::Store { size: 2 },
            Sw => Rule::Store { size: 4 },
            Sd => Rule::Store { size: 8 },

            Addi => alu(BinOp::Add, Src::Imm),
            Slti => set(Cond::SignedLt, Form::Two(Src::Imm)),
            Sltiu => set(Cond::UnsignedLt, Form::Two(Src::Imm)),
            Xori => alu(BinOp::Xor, Src::Imm),
            Ori => alu(BinOp::Or, Src::Imm),
            Andi => alu(BinOp::And, Src::Imm),
            Slli => alu(BinOp::Shl, Src::Imm),
            Srli => alu(BinOp::LogicalShr, Src::Imm),
            Srai => alu(BinOp::ArithShr, Src::Imm),
            Add => alu(BinOp::Add, Src::Reg),
            Sub => alu(BinOp::Sub, Src::Reg),
            Sll => alu(BinOp::Shl, Src::Reg),
            Slt => set(Cond::SignedLt, Form::Two(Src::Reg)),
            Sltu => set(Cond::UnsignedLt, Form::Two(Src::Reg)),
            Xor => alu(BinOp::Xor, Src::Reg),
            Srl => alu(BinOp::LogicalShr, Src::Reg),
            Sra => alu(BinOp::ArithShr, Src::Reg),
            Or => alu(BinOp::Or, Src::Reg),
            And => alu(BinOp::And, Src::Reg),

            Fence => Rule::Fence,
            FenceTso => Rule::Intrinsic("fence.tso"),
            FenceI => Rule::Intrinsic("fence.i"),
            Wfi => Rule::Intrinsic("wfi"),
            Ecall => Rule::Syscall,
            Ebreak => Rule::Breakpoint,
            Mret => Rule::TrapReturn("mret"),
            Sret => Rule::TrapReturn("sret"),

            Addiw => alu_w(BinOp::Add, Src::Imm),
            Slliw => alu_w(BinOp::Shl, Src::Imm),
            Srliw => alu_w(BinOp::LogicalShr, Src::Imm),
            Sraiw => alu_w(BinOp::ArithShr, Src::Imm),
            Addw => alu_w(BinOp::Add, Src::Reg),
            Subw => alu_w(BinOp::Sub, Src::Reg),
            Sllw => alu_w(BinOp::Shl, Src::Reg),
            Srlw => alu_w(BinOp::LogicalShr, Src::Reg),
            Sraw => alu_w(BinOp::ArithShr, Src::Reg),

            Csrrw | Csrw => csr(CsrOp::ReadWrite, false),
            Csrrs | Csrr | Csrs => csr(CsrOp::ReadSet, false),
            Csrrc | Csrc => csr(CsrOp::ReadClear, false),
            Csrrwi | Csrwi => csr(CsrOp::ReadWrite, true),
            Csrrsi | Csrsi => csr(CsrOp::ReadSet, true),
            Csrrci | Csrci => csr(CsrOp::ReadClear, true),

            Mul => alu(BinOp::Mul, Src::Reg),
            Mulh => alu(BinOp::MulHighSigned, Src::Reg),
            Mulhsu => alu(BinOp::MulHighSignedUnsigned, Src::Reg),
            Mulhu => alu(BinOp::MulHighUnsigned, Src::Reg),
            Div => alu(BinOp::DivSigned, Src::Reg),
            Divu => alu(BinOp::DivUnsigned, Src::Reg),
            Rem => alu(BinOp::ModSigned, Src::Reg),
            Remu => alu(BinOp::ModUnsigned, Src::Reg),
            Mulw => alu_w(BinOp::Mul, Src::Reg),
            Divw => alu_w(BinOp::DivSigned, Src::Reg),
            Divuw => alu_w(BinOp::DivUnsigned, Src::Reg),
            Remw => alu_w(BinOp::ModSigned, Src::Reg),
            Remuw => alu_w(BinOp::ModUnsigned, Src::Reg),

            LrW => Rule::LoadReserved { size: 4 },
            LrD => Rule::LoadReserved { size: 8 },
            ScW => Rule::StoreConditional { size: 4 },
            ScD => Rule::StoreConditional { size: 8 },
            AmoswapW => amo(None, 4),
            AmoaddW => amo(Some(BinOp::Add), 4),
            AmoxorW => amo(Some(BinOp::Xor), 4),
            AmoandW => amo(Some(BinOp::And), 4),
            AmoorW => amo(Some(BinOp::Or), 4),
            AmominW => amo(Some(BinOp::MinSigned), 4),
            AmomaxW => amo(Some(BinOp::MaxSigned), 4),
            AmominuW => amo(Some(BinOp::MinUnsigned), 4),
            AmomaxuW => amo(Some(BinOp::MaxUnsigned), 4),
            AmoswapD => amo(None, 8),
            AmoaddD => amo(Some(BinOp::Add), 8),
            AmoxorD => amo(Some(BinOp::Xor), 8),
            AmoandD => amo(Some(BinOp::And), 8),
            AmoorD => amo(Some(BinOp::Or), 8),
            AmominD => amo(Some(BinOp::MinSigned), 8),
            AmomaxD => amo(Some(BinOp::MaxSigned), 8),
            AmominuD => amo(Some(BinOp::MinUnsigned), 8),
            AmomaxuD => amo(Some(BinOp::MaxUnsigned), 8),

            Nop => Rule::Nop,
            Li => Rule::Move { src: Src::Imm },
            Mv => Rule::Move { src: Src::Reg },
            Not => Rule::Unary { op: UnOp::Not, word: false },
            Neg => Rule::Unary { op: UnOp::Neg, word: false },
            Negw => Rule::Unary { op: UnOp::Neg, word: true },
            SextW => Rule::SignExtendWord,
            Seqz => set(Cond::Eq, Form::ZeroRhs),
            Snez => set(Cond::Ne, Form::ZeroRhs),
            Sltz => set(Cond::SignedLt, Form::ZeroRhs),
            Sgtz => set(Cond::SignedLt, Form::ZeroLhs),
        }
    }

    /// Returns the control-transfer class this rule implements.
    pub fn transfer(&self) -> Transfer {
        match self {
            Rule::Call => Transfer::DirectCall,
            Rule::Jump => Transfer::DirectJump,
            Rule::IndirectJump | Rule::TrapReturn(_) => Transfer::Indirect,
            Rule::Return => Transfer::Return,
            Rule::Branch { .. } => Transfer::Conditional,
            _ => Transfer::None,
        }
    }

    /// Returns true if the rule needs 64-bit registers.
    pub fn requires_rv64(&self) -> bool {
        match *self {
            Rule::Alu { word, .. } | Rule::Unary { word, .. } => word,
            Rule::SignExtendWord => true,
            Rule::Load { size, signed } => size == 8 || (size == 4 && !signed),
            Rule::Store { size }
            | Rule::LoadReserved { size }
            | Rule::StoreConditional { size }
            | Rule::Amo { size, .. } => size == 8,
            _ => false,
        }
    }
}

/// RISC-V lifter for one variant.
#[derive(Debug, Clone)]
pub struct Lifter {
    variant: Variant,
    rules: HashMap<Mnemonic, Rule>,
}

impl Lifter {
    /// Builds and verifies the dispatch table for `variant`.
    pub fn new(variant: Variant) -> Result<Self, LiftError> {
        let mut rules = HashMap::new();
        for mnemonic in Mnemonic::vocabulary(variant) {
            let rule = Rule::for_mnemonic(mnemonic);
            if rule.requires_rv64() && !variant.is_64bit() {
                return Err(LiftError::UnsupportedOnVariant {
                    mnemonic,
                    variant: variant.name(),
                });
            }
            if rule.transfer() != mnemonic.transfer() {
                return Err(LiftError::TransferMismatch {
                    mnemonic,
                    rule: rule.transfer(),
                    class: mnemonic.transfer(),
                });
            }
            rules.insert(mnemonic, rule);
        }

        debug!(variant = variant.name(), rules = rules.len(), "lift table verified");
        Ok(Self { variant, rules })
    }

    /// Returns the target variant.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the rule used for `mnemonic`, if the variant supports it.
    pub fn rule(&self, mnemonic: Mnemonic) -> Option<Rule> {
        self.rules.get(&mnemonic).copied()
    }

    /// Lifts `inst` into `il`.
    ///
    /// Appends at least one operation on success. On error nothing has been
    /// appended.
    pub fn lift<B: IlBuilder + ?Sized>(&self, il: &mut B, inst: &Instruction) -> Result<(), LiftError> {
        let rule = self.rule(inst.mnemonic).ok_or(LiftError::UnsupportedOnVariant {
            mnemonic: inst.mnemonic,
            variant: self.variant.name(),
        })?;
        let ops = Lowering::new(self.variant, inst).lower(rule, il)?;
        for op in ops {
            il.append(op);
        }
        Ok(())
    }
}

/// Where a branch side goes once the `If` has been emitted.
enum Side {
    Known(crate::Label),
    Synthesized(crate::Label, u64),
}

/// Per-instruction lowering state.
struct Lowering<'a> {
    variant: Variant,
    inst: &'a Instruction,
    /// Register size in bytes.
    size: u8,
    ops: Vec<IlOp>,
}

impl<'a> Lowering<'a> {
    fn new(variant: Variant, inst: &'a Instruction) -> Self {
        Self {
            variant,
            inst,
            size: variant.register_size() as u8,
            ops: Vec::with_capacity(4),
        }
    }

    fn malformed(&self) -> LiftError {
        LiftError::MalformedOperands {
            mnemonic: self.inst.mnemonic,
            address: self.inst.address,
        }
    }

    fn operand(&self, index: usize) -> Result<Operand, LiftError> {
        self.inst.operand(index).copied().ok_or_else(|| self.malformed())
    }

    fn reg_at(&self, index: usize) -> Result<Register, LiftError> {
        self.operand(index)?.as_register().ok_or_else(|| self.malformed())
    }

    fn mem_at(&self, index: usize) -> Result<MemoryRef, LiftError> {
        self.operand(index)?.as_memory().ok_or_else(|| self.malformed())
    }

    fn imm_at(&self, index: usize) -> Result<i64, LiftError> {
        match self.operand(index)? {
            Operand::Immediate(imm) => Ok(imm.as_i64()),
            _ => Err(self.malformed()),
        }
    }

    fn fence_set_at(&self, index: usize) -> Result<Expr, LiftError> {
        let set = self.operand(index)?.as_fence_set().ok_or_else(|| self.malformed())?;
        Ok(Expr::constant(set.bits() as u64, 1))
    }

    fn constant(&self, value: i64) -> Expr {
        Expr::constant(value as u64, self.size)
    }

    /// Reads a register; `zero` reads as constant 0.
    fn read(&self, reg: Register) -> Expr {
        if reg.is_zero() {
            self.constant(0)
        } else {
            Expr::reg(IlReg::Gpr(reg), self.size)
        }
    }

    /// Writes a register; writes to `zero` are dropped.
    fn write(&mut self, reg: Register, value: Expr) {
        let op = if !reg.is_zero() {
            IlOp::SetReg {
                reg: IlReg::Gpr(reg),
                value,
            }
        } else if value.has_side_effects() {
            IlOp::Eval(value)
        } else {
            IlOp::Nop
        };
        self.ops.push(op);
    }

    fn address(&self, mem: MemoryRef) -> Expr {
        let base = self.read(mem.base);
        if mem.displacement == 0 {
            base
        } else {
            Expr::binary(BinOp::Add, base, self.constant(mem.displacement), self.size)
        }
    }

    /// Narrows a register-sized value to `size` bytes.
    fn narrow(&self, value: Expr, size: u8) -> Expr {
        if size >= self.size {
            value
        } else {
            Expr::low_part(value, size)
        }
    }

    /// Widens a `size`-byte value to the register size.
    fn widen(&self, value: Expr, signed: bool) -> Expr {
        if value.size() >= self.size {
            value
        } else if signed {
            Expr::sign_extend(value, self.size)
        } else {
            Expr::zero_extend(value, self.size)
        }
    }

    fn target(&self) -> u64 {
        self.variant.relative_target(self.inst.address, self.inst.imm)
    }

    fn next_address(&self) -> u64 {
        self.variant.relative_target(self.inst.address, self.inst.size as i64)
    }

    fn lower<B: IlBuilder + ?Sized>(mut self, rule: Rule, il: &mut B) -> Result<Vec<IlOp>, LiftError> {
        match rule {
            Rule::Lui => {
                let rd = self.reg_at(0)?;
                let value = self.constant(self.inst.imm);
                self.write(rd, value);
            }
            Rule::Auipc => {
                let rd = self.reg_at(0)?;
                let value = Expr::const_ptr(self.target(), self.size);
                self.write(rd, value);
            }
            Rule::Call => {
                let rd = self.reg_at(0)?;
                if rd.id != RA {
                    let link = Expr::const_ptr(self.next_address(), self.size);
                    self.write(rd, link);
                }
                self.ops.push(IlOp::Call(Expr::const_ptr(self.target(), self.size)));
            }
            Rule::Jump => self.ops.push(IlOp::Jump(Expr::const_ptr(self.target(), self.size))),
            Rule::IndirectJump => self.lower_indirect()?,
            Rule::Return => self.ops.push(IlOp::Return(self.read(Register::gpr(RA, self.variant)))),
            Rule::Branch { cond, form } => self.lower_branch(cond, form, il)?,
            Rule::Load { size, signed } => {
                let rd = self.reg_at(0)?;
                let addr = self.address(self.mem_at(1)?);
                let value = self.widen(Expr::load(addr, size), signed);
                self.write(rd, value);
            }
            Rule::Store { size } => {
                let value = self.narrow(self.read(self.reg_at(0)?), size);
                let addr = self.address(self.mem_at(1)?);
                self.ops.push(IlOp::Store { addr, value });
            }
            Rule::Alu { op, src, word } => self.lower_alu(op, src, word)?,
            Rule::SetCond { cond, form } => {
                let rd = self.reg_at(0)?;
                let (lhs, rhs) = self.comparands(form, 1)?;
                let value = Expr::bool_to_int(Expr::compare(cond, lhs, rhs, self.size), self.size);
                self.write(rd, value);
            }
            Rule::Move { src } => {
                let rd = self.reg_at(0)?;
                let value = match src {
                    Src::Reg => self.read(self.reg_at(1)?),
                    Src::Imm => self.constant(self.imm_at(1)?),
                };
                self.write(rd, value);
            }
            Rule::Unary { op, word } => {
                let rd = self.reg_at(0)?;
                let rs = self.read(self.reg_at(1)?);
                let value = if word {
                    Expr::sign_extend(Expr::unary(op, Expr::low_part(rs, 4), 4), self.size)
                } else {
                    Expr::unary(op, rs, self.size)
                };
                self.write(rd, value);
            }
            Rule::SignExtendWord => {
                let rd = self.reg_at(0)?;
                let rs = self.read(self.reg_at(1)?);
                self.write(rd, Expr::sign_extend(Expr::low_part(rs, 4), self.size));
            }
            Rule::LoadReserved { size } => {
                let rd = self.reg_at(0)?;
                let addr = self.address(self.mem_at(1)?);
                let value = self.widen(Expr::load(addr, size), true);
                self.write(rd, value);
            }
            Rule::StoreConditional { size } => {
                let rd = self.reg_at(0)?;
                let value = self.narrow(self.read(self.reg_at(1)?), size);
                let addr = self.address(self.mem_at(2)?);
                self.ops.push(IlOp::Store { addr, value });
                // Reservations are not modelled; the store always succeeds.
                let success = self.constant(0);
                self.write(rd, success);
            }
            Rule::Amo { op, size } => self.lower_amo(op, size)?,
            Rule::Csr { op, imm } => self.lower_csr(op, imm)?,
            Rule::Fence => {
                let inputs = vec![self.fence_set_at(0)?, self.fence_set_at(1)?];
                self.ops.push(IlOp::Intrinsic {
                    name: "fence",
                    outputs: Vec::new(),
                    inputs,
                });
            }
            Rule::Intrinsic(name) => self.ops.push(IlOp::Intrinsic {
                name,
                outputs: Vec::new(),
                inputs: Vec::new(),
            }),
            Rule::TrapReturn(name) => {
                let epc = IlReg::Temp(0);
                self.ops.push(IlOp::Intrinsic {
                    name,
                    outputs: vec![epc],
                    inputs: Vec::new(),
                });
                self.ops.push(IlOp::Jump(Expr::reg(epc, self.size)));
            }
            Rule::Syscall => self.ops.push(IlOp::Syscall),
            Rule::Breakpoint => self.ops.push(IlOp::Breakpoint),
            Rule::Nop => self.ops.push(IlOp::Nop),
        }
        Ok(self.ops)
    }

    /// Returns the two comparison inputs of a `form` starting at operand `first`.
    fn comparands(&self, form: Form, first: usize) -> Result<(Expr, Expr), LiftError> {
        Ok(match form {
            Form::Two(Src::Reg) => (self.read(self.reg_at(first)?), self.read(self.reg_at(first + 1)?)),
            Form::Two(Src::Imm) => (self.read(self.reg_at(first)?), self.constant(self.imm_at(first + 1)?)),
            Form::ZeroRhs => (self.read(self.reg_at(first)?), self.constant(0)),
            Form::ZeroLhs => (self.constant(0), self.read(self.reg_at(first)?)),
        })
    }

    fn lower_branch<B: IlBuilder + ?Sized>(
        &mut self,
        cond: Cond,
        form: Form,
        il: &mut B,
    ) -> Result<(), LiftError> {
        let (lhs, rhs) = self.comparands(form, 0)?;
        let taken = self.target();
        let fall_through = self.next_address();

        let mut side = |address: u64| {
            let known = il.label_for_address(address);
            match known {
                Some(label) => Side::Known(label),
                None => Side::Synthesized(il.new_label(), address),
            }
        };
        let t = side(taken);
        let f = side(fall_through);
        let label = |side: &Side| match side {
            Side::Known(label) | Side::Synthesized(label, _) => *label,
        };

        self.ops.push(IlOp::If {
            cond: Expr::compare(cond, lhs, rhs, self.size),
            t: label(&t),
            f: label(&f),
        });
        if let Side::Synthesized(label, address) = t {
            self.ops.push(IlOp::MarkLabel(label));
            self.ops.push(IlOp::Jump(Expr::const_ptr(address, self.size)));
        }
        if let Side::Synthesized(label, _) = f {
            // Falls through into the next instruction's IL.
            self.ops.push(IlOp::MarkLabel(label));
        }
        Ok(())
    }

    fn lower_indirect(&mut self) -> Result<(), LiftError> {
        let (rd, mem) = match self.inst.mnemonic {
            Mnemonic::Jr => (None, self.mem_at(0)?),
            _ => (Some(self.reg_at(0)?), self.mem_at(1)?),
        };
        let target = Expr::binary(
            BinOp::And,
            self.address(mem),
            self.constant(!1),
            self.size,
        );

        match rd {
            None => self.ops.push(IlOp::Jump(target)),
            Some(rd) if rd.is_zero() => self.ops.push(IlOp::Jump(target)),
            Some(rd) if rd.id == RA => self.ops.push(IlOp::Call(target)),
            Some(rd) => {
                // The link write may clobber the base register.
                let dest = IlReg::Temp(0);
                self.ops.push(IlOp::SetReg {
                    reg: dest,
                    value: target,
                });
                let link = Expr::const_ptr(self.next_address(), self.size);
                self.write(rd, link);
                self.ops.push(IlOp::Call(Expr::reg(dest, self.size)));
            }
        }
        Ok(())
    }

    fn lower_alu(&mut self, op: BinOp, src: Src, word: bool) -> Result<(), LiftError> {
        let rd = self.reg_at(0)?;
        let lhs = self.read(self.reg_at(1)?);
        let rhs = match src {
            Src::Reg => self.read(self.reg_at(2)?),
            Src::Imm => self.constant(self.imm_at(2)?),
        };
        let is_shift = matches!(op, BinOp::Shl | BinOp::LogicalShr | BinOp::ArithShr);

        let value = if word {
            let lhs = Expr::low_part(lhs, 4);
            let mut rhs = Expr::low_part(rhs, 4);
            if is_shift && src == Src::Reg {
                rhs = Expr::binary(BinOp::And, rhs, Expr::constant(0x1F, 4), 4);
            }
            Expr::sign_extend(Expr::binary(op, lhs, rhs, 4), self.size)
        } else {
            let rhs = if is_shift && src == Src::Reg {
                let mask = self.variant.xlen() as i64 - 1;
                Expr::binary(BinOp::And, rhs, self.constant(mask), self.size)
            } else {
                rhs
            };
            Expr::binary(op, lhs, rhs, self.size)
        };
        self.write(rd, value);
        Ok(())
    }

    fn lower_amo(&mut self, op: Option<BinOp>, size: u8) -> Result<(), LiftError> {
        let rd = self.reg_at(0)?;
        let rs2 = self.narrow(self.read(self.reg_at(1)?), size);
        let mem = self.mem_at(2)?;
        let old = IlReg::Temp(0);

        self.ops.push(IlOp::SetReg {
            reg: old,
            value: Expr::load(self.address(mem), size),
        });
        let new = match op {
            Some(op) => Expr::binary(op, Expr::reg(old, size), rs2, size),
            None => rs2,
        };
        self.ops.push(IlOp::Store {
            addr: self.address(mem),
            value: new,
        });
        let result = self.widen(Expr::reg(old, size), true);
        self.write(rd, result);
        Ok(())
    }

    fn lower_csr(&mut self, op: CsrOp, imm: bool) -> Result<(), LiftError> {
        // Full forms are `rd, csr, src`; the pseudo forms drop `rd` or `src`.
        let (rd, csr_index) = match self.operand(0)? {
            Operand::Register(rd) => (Some(rd), 1),
            _ => (None, 0),
        };
        let csr = self.imm_at(csr_index)?;
        let src = match self.inst.operand(csr_index + 1) {
            Some(Operand::Register(rs)) => self.read(*rs),
            Some(Operand::Immediate(uimm)) => self.constant(uimm.as_i64()),
            Some(_) => return Err(self.malformed()),
            None => self.constant(0),
        };

        let name = match (op, imm) {
            (CsrOp::ReadWrite, false) => "csrrw",
            (CsrOp::ReadSet, false) => "csrrs",
            (CsrOp::ReadClear, false) => "csrrc",
            (CsrOp::ReadWrite, true) => "csrrwi",
            (CsrOp::ReadSet, true) => "csrrsi",
            (CsrOp::ReadClear, true) => "csrrci",
        };
        let outputs = rd
            .filter(|rd| !rd.is_zero())
            .map(IlReg::Gpr)
            .into_iter()
            .collect();

        self.ops.push(IlOp::Intrinsic {
            name,
            outputs,
            inputs: vec![Expr::constant(csr as u64, 2), src],
        });
        Ok(())
    }
}
