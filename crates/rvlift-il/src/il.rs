//! Low-level IL model.
//!
//! Expressions form a tree where every node carries its operand size in
//! bytes. Statements ([`IlOp`]) are appended in order to an [`IlBuilder`].

use std::collections::HashMap;
use std::fmt;

use rvlift_core::Register;

/// A register the IL can read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IlReg {
    /// Architectural general-purpose register.
    Gpr(Register),
    /// Instruction-local temporary.
    Temp(u32),
}

impl fmt::Display for IlReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpr(reg) => f.write_str(reg.name()),
            Self::Temp(n) => write!(f, "temp{}", n),
        }
    }
}

/// A branch label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label_{}", self.0)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Shl,
    LogicalShr,
    ArithShr,
    Mul,
    MulHighSigned,
    MulHighUnsigned,
    MulHighSignedUnsigned,
    DivSigned,
    DivUnsigned,
    ModSigned,
    ModUnsigned,
    MinSigned,
    MaxSigned,
    MinUnsigned,
    MaxUnsigned,
}

impl BinOp {
    /// Infix symbol, for operators that have one.
    fn symbol(self) -> Option<&'static str> {
        Some(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::LogicalShr => "u>>",
            Self::ArithShr => "s>>",
            Self::Mul => "*",
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::MulHighSigned => "mulhs",
            Self::MulHighUnsigned => "mulhu",
            Self::MulHighSignedUnsigned => "mulhsu",
            Self::DivSigned => "divs",
            Self::DivUnsigned => "divu",
            Self::ModSigned => "mods",
            Self::ModUnsigned => "modu",
            Self::MinSigned => "mins",
            Self::MaxSigned => "maxs",
            Self::MinUnsigned => "minu",
            Self::MaxUnsigned => "maxu",
            other => other.symbol().unwrap_or("?"),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnOp {
    Neg,
    Not,
}

/// Comparison conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cond {
    Eq,
    Ne,
    SignedLt,
    SignedGe,
    UnsignedLt,
    UnsignedGe,
}

impl Cond {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::SignedLt => "s<",
            Self::SignedGe => "s>=",
            Self::UnsignedLt => "u<",
            Self::UnsignedGe => "u>=",
        }
    }
}

/// An IL expression.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Reg { reg: IlReg, size: u8 },
    Const { value: u64, size: u8 },
    ConstPtr { value: u64, size: u8 },
    Load { addr: Box<Expr>, size: u8 },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, size: u8 },
    Unary { op: UnOp, operand: Box<Expr>, size: u8 },
    SignExtend { operand: Box<Expr>, size: u8 },
    ZeroExtend { operand: Box<Expr>, size: u8 },
    LowPart { operand: Box<Expr>, size: u8 },
    /// Comparison of two `size`-byte operands; evaluates to a boolean.
    Compare { cond: Cond, lhs: Box<Expr>, rhs: Box<Expr>, size: u8 },
    BoolToInt { cond: Box<Expr>, size: u8 },
}

/// Truncates `value` to `size` bytes.
pub(crate) fn truncate(value: u64, size: u8) -> u64 {
    if size >= 8 {
        value
    } else {
        value & ((1u64 << (size as u32 * 8)) - 1)
    }
}

impl Expr {
    pub fn reg(reg: IlReg, size: u8) -> Self {
        Self::Reg { reg, size }
    }

    /// Creates a constant, truncated to `size` bytes.
    pub fn constant(value: u64, size: u8) -> Self {
        Self::Const {
            value: truncate(value, size),
            size,
        }
    }

    pub fn const_ptr(value: u64, size: u8) -> Self {
        Self::ConstPtr {
            value: truncate(value, size),
            size,
        }
    }

    pub fn load(addr: Expr, size: u8) -> Self {
        Self::Load {
            addr: Box::new(addr),
            size,
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, size: u8) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            size,
        }
    }

    pub fn unary(op: UnOp, operand: Expr, size: u8) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
            size,
        }
    }

    pub fn sign_extend(operand: Expr, size: u8) -> Self {
        Self::SignExtend {
            operand: Box::new(operand),
            size,
        }
    }

    pub fn zero_extend(operand: Expr, size: u8) -> Self {
        Self::ZeroExtend {
            operand: Box::new(operand),
            size,
        }
    }

    /// Takes the low `size` bytes of `operand`; constants are folded.
    pub fn low_part(operand: Expr, size: u8) -> Self {
        match operand {
            Self::Const { value, .. } => Self::constant(value, size),
            operand => Self::LowPart {
                operand: Box::new(operand),
                size,
            },
        }
    }

    pub fn compare(cond: Cond, lhs: Expr, rhs: Expr, size: u8) -> Self {
        Self::Compare {
            cond,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            size,
        }
    }

    pub fn bool_to_int(cond: Expr, size: u8) -> Self {
        Self::BoolToInt {
            cond: Box::new(cond),
            size,
        }
    }

    /// Returns the operand size in bytes.
    pub fn size(&self) -> u8 {
        match self {
            Self::Reg { size, .. }
            | Self::Const { size, .. }
            | Self::ConstPtr { size, .. }
            | Self::Load { size, .. }
            | Self::Binary { size, .. }
            | Self::Unary { size, .. }
            | Self::SignExtend { size, .. }
            | Self::ZeroExtend { size, .. }
            | Self::LowPart { size, .. }
            | Self::Compare { size, .. }
            | Self::BoolToInt { size, .. } => *size,
        }
    }

    /// Returns true if evaluating the expression touches memory.
    pub fn has_side_effects(&self) -> bool {
        match self {
            Self::Load { .. } => true,
            Self::Reg { .. } | Self::Const { .. } | Self::ConstPtr { .. } => false,
            Self::Binary { lhs, rhs, .. } | Self::Compare { lhs, rhs, .. } => {
                lhs.has_side_effects() || rhs.has_side_effects()
            }
            Self::Unary { operand, .. }
            | Self::SignExtend { operand, .. }
            | Self::ZeroExtend { operand, .. }
            | Self::LowPart { operand, .. } => operand.has_side_effects(),
            Self::BoolToInt { cond, .. } => cond.has_side_effects(),
        }
    }
}

fn size_suffix(size: u8) -> &'static str {
    match size {
        1 => "b",
        2 => "w",
        4 => "d",
        8 => "q",
        _ => "?",
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg { reg, .. } => write!(f, "{}", reg),
            Self::Const { value, .. } | Self::ConstPtr { value, .. } => write!(f, "{:#x}", value),
            Self::Load { addr, size } => write!(f, "[{}].{}", addr, size_suffix(*size)),
            Self::Binary { op, lhs, rhs, .. } => match op.symbol() {
                Some(sym) => write!(f, "({} {} {})", lhs, sym, rhs),
                None => write!(f, "{}({}, {})", op.name(), lhs, rhs),
            },
            Self::Unary { op: UnOp::Neg, operand, .. } => write!(f, "-{}", operand),
            Self::Unary { op: UnOp::Not, operand, .. } => write!(f, "~{}", operand),
            Self::SignExtend { operand, size } => write!(f, "sx.{}({})", size_suffix(*size), operand),
            Self::ZeroExtend { operand, size } => write!(f, "zx.{}({})", size_suffix(*size), operand),
            Self::LowPart { operand, size } => write!(f, "low.{}({})", size_suffix(*size), operand),
            Self::Compare { cond, lhs, rhs, .. } => write!(f, "({} {} {})", lhs, cond.symbol(), rhs),
            Self::BoolToInt { cond, size } => write!(f, "bool.{}{}", size_suffix(*size), cond),
        }
    }
}

/// An IL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IlOp {
    SetReg { reg: IlReg, value: Expr },
    Store { addr: Expr, value: Expr },
    Jump(Expr),
    Call(Expr),
    Return(Expr),
    If { cond: Expr, t: Label, f: Label },
    MarkLabel(Label),
    Syscall,
    Breakpoint,
    Intrinsic {
        name: &'static str,
        outputs: Vec<IlReg>,
        inputs: Vec<Expr>,
    },
    Nop,
    /// Evaluates an expression for its side effects only.
    Eval(Expr),
}

impl fmt::Display for IlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetReg { reg, value } => write!(f, "{} = {}", reg, value),
            Self::Store { addr, value } => {
                write!(f, "[{}].{} = {}", addr, size_suffix(value.size()), value)
            }
            Self::Jump(target) => write!(f, "jump({})", target),
            Self::Call(target) => write!(f, "call({})", target),
            Self::Return(target) => write!(f, "return({})", target),
            Self::If { cond, t, f: el } => write!(f, "if {} then {} else {}", cond, t, el),
            Self::MarkLabel(label) => write!(f, "{}:", label),
            Self::Syscall => f.write_str("syscall"),
            Self::Breakpoint => f.write_str("breakpoint"),
            Self::Intrinsic {
                name,
                outputs,
                inputs,
            } => {
                if !outputs.is_empty() {
                    let outs: Vec<_> = outputs.iter().map(ToString::to_string).collect();
                    write!(f, "{} = ", outs.join(", "))?;
                }
                let ins: Vec<_> = inputs.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", name, ins.join(", "))
            }
            Self::Nop => f.write_str("nop"),
            Self::Eval(expr) => write!(f, "{}", expr),
        }
    }
}

/// Sink for lifted IL.
///
/// Implemented by the host; [`LowLevelIl`] is a recording implementation.
pub trait IlBuilder {
    /// Appends a statement.
    fn append(&mut self, op: IlOp);

    /// Allocates a fresh label.
    fn new_label(&mut self) -> Label;

    /// Returns the host's label for an address it already knows, if any.
    fn label_for_address(&self, address: u64) -> Option<Label>;
}

/// An IL function body that records what is appended to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowLevelIl {
    ops: Vec<IlOp>,
    next_label: u32,
    address_labels: HashMap<u64, Label>,
}

impl LowLevelIl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `address` as a known block start and returns its label.
    pub fn add_label_for_address(&mut self, address: u64) -> Label {
        if let Some(label) = self.address_labels.get(&address) {
            return *label;
        }
        let label = self.new_label();
        self.address_labels.insert(address, label);
        label
    }

    pub fn ops(&self) -> &[IlOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops recorded statements but keeps known address labels.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Renders every statement on its own line.
    pub fn to_text(&self) -> String {
        self.ops
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl IlBuilder for LowLevelIl {
    fn append(&mut self, op: IlOp) {
        self.ops.push(op);
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    fn label_for_address(&self, address: u64) -> Option<Label> {
        self.address_labels.get(&address).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvlift_core::Variant;

    fn a0() -> IlReg {
        IlReg::Gpr(Register::gpr(10, Variant::Rv64))
    }

    #[test]
    fn test_constant_truncates() {
        assert_eq!(Expr::constant(u64::MAX, 4), Expr::Const { value: 0xFFFF_FFFF, size: 4 });
        assert_eq!(Expr::constant(u64::MAX, 8).size(), 8);
        assert_eq!(
            Expr::low_part(Expr::constant(0x1_0000_0002, 8), 4),
            Expr::constant(2, 4)
        );
    }

    #[test]
    fn test_display() {
        let sum = Expr::binary(BinOp::Add, Expr::reg(a0(), 8), Expr::constant(8, 8), 8);
        assert_eq!(sum.to_string(), "(a0 + 0x8)");
        let op = IlOp::SetReg {
            reg: a0(),
            value: Expr::sign_extend(Expr::load(sum, 4), 8),
        };
        assert_eq!(op.to_string(), "a0 = sx.q([(a0 + 0x8)].d)");
        let intrinsic = IlOp::Intrinsic {
            name: "mret",
            outputs: vec![IlReg::Temp(0)],
            inputs: vec![],
        };
        assert_eq!(intrinsic.to_string(), "temp0 = mret()");
        let div = Expr::binary(BinOp::DivSigned, Expr::reg(a0(), 8), Expr::reg(a0(), 8), 8);
        assert_eq!(div.to_string(), "divs(a0, a0)");
    }

    #[test]
    fn test_side_effects() {
        let load = Expr::load(Expr::reg(a0(), 8), 8);
        assert!(load.has_side_effects());
        assert!(Expr::sign_extend(load, 8).has_side_effects());
        assert!(!Expr::reg(a0(), 8).has_side_effects());
    }

    #[test]
    fn test_labels() {
        let mut il = LowLevelIl::new();
        let known = il.add_label_for_address(0x1000);
        assert_eq!(il.add_label_for_address(0x1000), known);
        assert_eq!(il.label_for_address(0x1000), Some(known));
        assert_eq!(il.label_for_address(0x2000), None);
        assert_ne!(il.new_label(), known);
        il.append(IlOp::Nop);
        assert_eq!(il.len(), 1);
        il.clear();
        assert!(il.is_empty());
        assert_eq!(il.label_for_address(0x1000), Some(known));
    }
}
