//! The closed set of canonical mnemonics the decoder can produce.
//!
//! Pseudo-mnemonics (`j`, `ret`, `beqz`, `li`, ...) are first-class
//! members: the decoder canonicalizes raw encodings onto them, and every
//! downstream consumer (classifier, renderer, lifter) dispatches on this
//! enum with an exhaustive `match`.

use std::str::FromStr;

use crate::{Error, Variant};

macro_rules! define_mnemonics {
    ($($(#[$attr:meta])* $name:ident => $text:literal,)+) => {
        /// Canonical instruction mnemonic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum Mnemonic {
            $($(#[$attr])* $name,)+
        }

        impl Mnemonic {
            /// Every mnemonic, in declaration order.
            pub const ALL: &'static [Mnemonic] = &[$(Mnemonic::$name,)+];

            /// Returns the canonical assembler text.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Mnemonic::$name => $text,)+
                }
            }
        }

        impl FromStr for Mnemonic {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Mnemonic::$name),)+
                    _ => Err(Error::UnknownMnemonic(s.to_string())),
                }
            }
        }
    };
}

define_mnemonics! {
    // RV32I
    Lui => "lui",
    Auipc => "auipc",
    Jal => "jal",
    Jalr => "jalr",
    Beq => "beq",
    Bne => "bne",
    Blt => "blt",
    Bge => "bge",
    Bltu => "bltu",
    Bgeu => "bgeu",
    Lb => "lb",
    Lh => "lh",
    Lw => "lw",
    Lbu => "lbu",
    Lhu => "lhu",
    Sb => "sb",
    Sh => "sh",
    Sw => "sw",
    Addi => "addi",
    Slti => "slti",
    Sltiu => "sltiu",
    Xori => "xori",
    Ori => "ori",
    Andi => "andi",
    Slli => "slli",
    Srli => "srli",
    Srai => "srai",
    Add => "add",
    Sub => "sub",
    Sll => "sll",
    Slt => "slt",
    Sltu => "sltu",
    Xor => "xor",
    Srl => "srl",
    Sra => "sra",
    Or => "or",
    And => "and",
    Fence => "fence",
    FenceI => "fence.i",
    FenceTso => "fence.tso",
    Ecall => "ecall",
    Ebreak => "ebreak",
    Mret => "mret",
    Sret => "sret",
    Wfi => "wfi",

    // RV64I
    Ld => "ld",
    Lwu => "lwu",
    Sd => "sd",
    Addiw => "addiw",
    Slliw => "slliw",
    Srliw => "srliw",
    Sraiw => "sraiw",
    Addw => "addw",
    Subw => "subw",
    Sllw => "sllw",
    Srlw => "srlw",
    Sraw => "sraw",

    // Zicsr
    Csrrw => "csrrw",
    Csrrs => "csrrs",
    Csrrc => "csrrc",
    Csrrwi => "csrrwi",
    Csrrsi => "csrrsi",
    Csrrci => "csrrci",

    // M extension
    Mul => "mul",
    Mulh => "mulh",
    Mulhsu => "mulhsu",
    Mulhu => "mulhu",
    Div => "div",
    Divu => "divu",
    Rem => "rem",
    Remu => "remu",
    Mulw => "mulw",
    Divw => "divw",
    Divuw => "divuw",
    Remw => "remw",
    Remuw => "remuw",

    // A extension
    LrW => "lr.w",
    ScW => "sc.w",
    AmoswapW => "amoswap.w",
    AmoaddW => "amoadd.w",
    AmoxorW => "amoxor.w",
    AmoandW => "amoand.w",
    AmoorW => "amoor.w",
    AmominW => "amomin.w",
    AmomaxW => "amomax.w",
    AmominuW => "amominu.w",
    AmomaxuW => "amomaxu.w",
    LrD => "lr.d",
    ScD => "sc.d",
    AmoswapD => "amoswap.d",
    AmoaddD => "amoadd.d",
    AmoxorD => "amoxor.d",
    AmoandD => "amoand.d",
    AmoorD => "amoor.d",
    AmominD => "amomin.d",
    AmomaxD => "amomax.d",
    AmominuD => "amominu.d",
    AmomaxuD => "amomaxu.d",

    // Pseudo-instructions
    /// `jal zero, off`
    J => "j",
    /// `jalr zero, off(rs1)`
    Jr => "jr",
    /// `jalr zero, 0(ra)`
    Ret => "ret",
    Beqz => "beqz",
    Bnez => "bnez",
    Bltz => "bltz",
    Bgez => "bgez",
    Blez => "blez",
    Bgtz => "bgtz",
    /// `addi zero, zero, 0`
    Nop => "nop",
    /// `addi rd, zero, imm`
    Li => "li",
    /// `addi rd, rs1, 0`
    Mv => "mv",
    /// `xori rd, rs1, -1`
    Not => "not",
    /// `sltiu rd, rs1, 1`
    Seqz => "seqz",
    /// `sub rd, zero, rs2`
    Neg => "neg",
    /// `sltu rd, zero, rs2`
    Snez => "snez",
    /// `slt rd, rs1, zero`
    Sltz => "sltz",
    /// `slt rd, zero, rs2`
    Sgtz => "sgtz",
    /// `addiw rd, rs1, 0`
    SextW => "sext.w",
    /// `subw rd, zero, rs2`
    Negw => "negw",
    Csrr => "csrr",
    Csrw => "csrw",
    Csrs => "csrs",
    Csrc => "csrc",
    Csrwi => "csrwi",
    Csrsi => "csrsi",
    Csrci => "csrci",
}

/// Control-transfer class of a mnemonic.
///
/// The classes are disjoint; [`Mnemonic::transfer`] places every mnemonic
/// in exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transfer {
    /// Falls through to the next instruction.
    None,
    /// Conditional PC-relative branch.
    Conditional,
    /// PC-relative call.
    DirectCall,
    /// PC-relative jump.
    DirectJump,
    /// Register-indirect call or jump; target unknown statically.
    Indirect,
    /// Function return.
    Return,
}

impl Mnemonic {
    /// Returns the control-transfer class.
    pub fn transfer(self) -> Transfer {
        use Mnemonic::*;
        match self {
            Ret => Transfer::Return,
            Beq | Bne | Blt | Bge | Bltu | Bgeu | Beqz | Bnez | Bltz | Bgez | Blez | Bgtz => {
                Transfer::Conditional
            }
            Jal => Transfer::DirectCall,
            J => Transfer::DirectJump,
            Jalr | Jr | Mret | Sret => Transfer::Indirect,
            Lui | Auipc | Lb | Lh | Lw | Lbu | Lhu | Sb | Sh | Sw | Addi | Slti | Sltiu | Xori
            | Ori | Andi | Slli | Srli | Srai | Add | Sub | Sll | Slt | Sltu | Xor | Srl | Sra
            | Or | And | Fence | FenceI | FenceTso | Ecall | Ebreak | Wfi | Ld | Lwu | Sd | Addiw
            | Slliw | Srliw | Sraiw | Addw | Subw | Sllw | Srlw | Sraw | Csrrw | Csrrs
            | Csrrc | Csrrwi | Csrrsi | Csrrci | Mul | Mulh | Mulhsu | Mulhu | Div | Divu
            | Rem | Remu | Mulw | Divw | Divuw | Remw | Remuw | LrW | ScW | AmoswapW
            | AmoaddW | AmoxorW | AmoandW | AmoorW | AmominW | AmomaxW | AmominuW | AmomaxuW
            | LrD | ScD | AmoswapD | AmoaddD | AmoxorD | AmoandD | AmoorD | AmominD | AmomaxD
            | AmominuD | AmomaxuD | Nop | Li | Mv | Not | Seqz | Neg | Snez | Sltz | Sgtz
            | SextW | Negw | Csrr | Csrw | Csrs | Csrc | Csrwi | Csrsi | Csrci => Transfer::None,
        }
    }

    /// Returns true for mnemonics only the RV64 decoder produces.
    pub fn is_rv64_only(self) -> bool {
        use Mnemonic::*;
        matches!(
            self,
            Ld | Lwu
                | Sd
                | Addiw
                | Slliw
                | Srliw
                | Sraiw
                | Addw
                | Subw
                | Sllw
                | Srlw
                | Sraw
                | Mulw
                | Divw
                | Divuw
                | Remw
                | Remuw
                | LrD
                | ScD
                | AmoswapD
                | AmoaddD
                | AmoxorD
                | AmoandD
                | AmoorD
                | AmominD
                | AmomaxD
                | AmominuD
                | AmomaxuD
                | SextW
                | Negw
        )
    }

    /// Returns every mnemonic the decoder for `variant` can produce.
    pub fn vocabulary(variant: Variant) -> impl Iterator<Item = Mnemonic> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |m| variant.is_64bit() || !m.is_rv64_only())
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
