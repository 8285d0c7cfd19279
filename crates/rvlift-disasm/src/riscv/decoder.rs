//! RISC-V instruction decoder implementation.
//!
//! Decodes the fixed 32-bit encodings of RV32I/RV64I together with the
//! M, A, Zicsr and Zifencei extensions and the privileged `mret`, `sret`
//! and `wfi` instructions. Common idioms are canonicalized onto their
//! pseudo-mnemonics while decoding (see [`Mnemonic`]).

use crate::{DecodeError, DecodedInstruction, Disassembler};
use rvlift_core::{AtomicOrdering, FenceSet, Instruction, Mnemonic, Operand, Register, Variant};

// Standard 32-bit opcodes (bits 6:0)
const OP_LUI: u32 = 0b0110111; // 0x37
const OP_AUIPC: u32 = 0b0010111; // 0x17
const OP_JAL: u32 = 0b1101111; // 0x6F
const OP_JALR: u32 = 0b1100111; // 0x67
const OP_BRANCH: u32 = 0b1100011; // 0x63
const OP_LOAD: u32 = 0b0000011; // 0x03
const OP_STORE: u32 = 0b0100011; // 0x23
const OP_IMM: u32 = 0b0010011; // 0x13
const OP_REG: u32 = 0b0110011; // 0x33
const OP_IMM32: u32 = 0b0011011; // 0x1B (RV64 only)
const OP_REG32: u32 = 0b0111011; // 0x3B (RV64 only)
const OP_SYSTEM: u32 = 0b1110011; // 0x73
const OP_MISC_MEM: u32 = 0b0001111; // 0x0F
const OP_AMO: u32 = 0b0101111; // 0x2F

const FUNCT7_BASE: u32 = 0b0000000;
const FUNCT7_ALT: u32 = 0b0100000;
const FUNCT7_MULDIV: u32 = 0b0000001;

/// `fm` field of `fence.tso`.
const FM_TSO: u32 = 0b1000;

/// Every covered instruction is one 32-bit word.
const INSN_SIZE: usize = 4;

/// RISC-V disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiscVDisassembler {
    variant: Variant,
}

impl RiscVDisassembler {
    /// Creates a disassembler for `variant`.
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// Creates a new RISC-V disassembler for RV32.
    pub fn rv32() -> Self {
        Self::new(Variant::Rv32)
    }

    /// Creates a new RISC-V disassembler for RV64.
    pub fn rv64() -> Self {
        Self::new(Variant::Rv64)
    }

    /// Creates a general-purpose register.
    fn gpr(&self, id: u16) -> Register {
        Register::gpr(id, self.variant)
    }

    fn target(&self, address: u64, offset: i64) -> u64 {
        self.variant.relative_target(address, offset)
    }

    /// Decode a single instruction.
    pub fn decode(&self, bytes: &[u8], address: u64) -> Result<Instruction, DecodeError> {
        if bytes.len() < INSN_SIZE {
            return Err(DecodeError::truncated(address, INSN_SIZE, bytes.len()));
        }

        let insn = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        // Compressed (bits 1:0 != 11) and longer encodings are not covered.
        if insn & 0x3 != 0x3 || insn & 0x1F == 0x1F {
            return Err(DecodeError::unknown_opcode(address, insn));
        }

        match insn & 0x7F {
            OP_LUI => Ok(self.decode_lui(insn, address)),
            OP_AUIPC => Ok(self.decode_auipc(insn, address)),
            OP_JAL => Ok(self.decode_jal(insn, address)),
            OP_JALR => self.decode_jalr(insn, address),
            OP_BRANCH => self.decode_branch(insn, address),
            OP_LOAD => self.decode_load(insn, address),
            OP_STORE => self.decode_store(insn, address),
            OP_IMM => self.decode_op_imm(insn, address),
            OP_REG => self.decode_op_reg(insn, address),
            OP_IMM32 if self.variant.is_64bit() => self.decode_op_imm32(insn, address),
            OP_REG32 if self.variant.is_64bit() => self.decode_op_reg32(insn, address),
            OP_SYSTEM => self.decode_system(insn, address),
            OP_MISC_MEM => self.decode_misc_mem(insn, address),
            OP_AMO => self.decode_amo(insn, address),
            _ => Err(DecodeError::unknown_opcode(address, insn)),
        }
    }

    /// Extract rd field (bits 11:7)
    fn rd(insn: u32) -> u16 {
        ((insn >> 7) & 0x1F) as u16
    }

    /// Extract rs1 field (bits 19:15)
    fn rs1(insn: u32) -> u16 {
        ((insn >> 15) & 0x1F) as u16
    }

    /// Extract rs2 field (bits 24:20)
    fn rs2(insn: u32) -> u16 {
        ((insn >> 20) & 0x1F) as u16
    }

    /// Extract funct3 field (bits 14:12)
    fn funct3(insn: u32) -> u32 {
        (insn >> 12) & 0x7
    }

    /// Extract funct7 field (bits 31:25)
    fn funct7(insn: u32) -> u32 {
        (insn >> 25) & 0x7F
    }

    /// Extract I-type immediate (sign-extended)
    pub(crate) fn imm_i(insn: u32) -> i64 {
        ((insn as i32) >> 20) as i64
    }

    /// Extract S-type immediate (sign-extended)
    pub(crate) fn imm_s(insn: u32) -> i64 {
        let imm11_5 = (insn >> 25) & 0x7F;
        let imm4_0 = (insn >> 7) & 0x1F;
        let imm = (imm11_5 << 5) | imm4_0;
        // Sign-extend from 12 bits
        (((imm as i32) << 20) >> 20) as i64
    }

    /// Extract B-type immediate (sign-extended)
    pub(crate) fn imm_b(insn: u32) -> i64 {
        let imm12 = (insn >> 31) & 1;
        let imm10_5 = (insn >> 25) & 0x3F;
        let imm4_1 = (insn >> 8) & 0xF;
        let imm11 = (insn >> 7) & 1;
        let imm = (imm12 << 12) | (imm11 << 11) | (imm10_5 << 5) | (imm4_1 << 1);
        // Sign-extend from 13 bits
        (((imm as i32) << 19) >> 19) as i64
    }

    /// Extract U-type immediate (already shifted, sign-extended)
    pub(crate) fn imm_u(insn: u32) -> i64 {
        (insn & 0xFFFF_F000) as i32 as i64
    }

    /// Extract J-type immediate (sign-extended)
    pub(crate) fn imm_j(insn: u32) -> i64 {
        let imm20 = (insn >> 31) & 1;
        let imm10_1 = (insn >> 21) & 0x3FF;
        let imm11 = (insn >> 20) & 1;
        let imm19_12 = (insn >> 12) & 0xFF;
        let imm = (imm20 << 20) | (imm19_12 << 12) | (imm11 << 11) | (imm10_1 << 1);
        // Sign-extend from 21 bits
        (((imm as i32) << 11) >> 11) as i64
    }

    /// Decode LUI instruction.
    fn decode_lui(&self, insn: u32, address: u64) -> Instruction {
        let rd = Self::rd(insn);

        Instruction::new(address, insn, INSN_SIZE, Mnemonic::Lui)
            .with_imm(Self::imm_u(insn))
            .with_operands(vec![
                Operand::reg(self.gpr(rd)),
                Operand::imm_unsigned((insn >> 12) as u64, 20),
            ])
    }

    /// Decode AUIPC instruction.
    fn decode_auipc(&self, insn: u32, address: u64) -> Instruction {
        let rd = Self::rd(insn);
        let imm = Self::imm_u(insn);
        let target = self.target(address, imm);

        Instruction::new(address, insn, INSN_SIZE, Mnemonic::Auipc)
            .with_imm(imm)
            .with_operands(vec![Operand::reg(self.gpr(rd)), Operand::pc_rel(imm, target)])
    }

    /// Decode JAL instruction.
    fn decode_jal(&self, insn: u32, address: u64) -> Instruction {
        let rd = Self::rd(insn);
        let imm = Self::imm_j(insn);
        let target = self.target(address, imm);

        // JAL with rd=x0 is just a jump (J pseudo-instruction)
        let (mnemonic, operands) = if rd == 0 {
            (Mnemonic::J, vec![Operand::pc_rel(imm, target)])
        } else {
            (
                Mnemonic::Jal,
                vec![Operand::reg(self.gpr(rd)), Operand::pc_rel(imm, target)],
            )
        };

        Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(operands)
    }

    /// Decode JALR instruction.
    fn decode_jalr(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        if Self::funct3(insn) != 0 {
            return Err(DecodeError::invalid_encoding(address, "jalr with nonzero funct3"));
        }

        let rd = Self::rd(insn);
        let rs1 = Self::rs1(insn);
        let imm = Self::imm_i(insn);
        let target = Operand::mem(self.gpr(rs1), imm, self.variant.address_size() as u8);

        // JALR with rd=x0 and rs1=x1 and imm=0 is RET
        let (mnemonic, operands) = if rd == 0 && rs1 == 1 && imm == 0 {
            (Mnemonic::Ret, vec![])
        } else if rd == 0 {
            (Mnemonic::Jr, vec![target])
        } else {
            (Mnemonic::Jalr, vec![Operand::reg(self.gpr(rd)), target])
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(operands))
    }

    /// Decode branch instructions.
    fn decode_branch(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rs1 = Self::rs1(insn);
        let rs2 = Self::rs2(insn);
        let imm = Self::imm_b(insn);
        let target = Operand::pc_rel(imm, self.target(address, imm));

        let mnemonic = match Self::funct3(insn) {
            0b000 => Mnemonic::Beq,
            0b001 => Mnemonic::Bne,
            0b100 => Mnemonic::Blt,
            0b101 => Mnemonic::Bge,
            0b110 => Mnemonic::Bltu,
            0b111 => Mnemonic::Bgeu,
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        // Comparisons against zero collapse to the single-register forms.
        let (mnemonic, operands) = match (mnemonic, rs1, rs2) {
            (Mnemonic::Beq, _, 0) => (Mnemonic::Beqz, vec![Operand::reg(self.gpr(rs1)), target]),
            (Mnemonic::Bne, _, 0) => (Mnemonic::Bnez, vec![Operand::reg(self.gpr(rs1)), target]),
            (Mnemonic::Blt, _, 0) => (Mnemonic::Bltz, vec![Operand::reg(self.gpr(rs1)), target]),
            (Mnemonic::Bge, _, 0) => (Mnemonic::Bgez, vec![Operand::reg(self.gpr(rs1)), target]),
            (Mnemonic::Beq, 0, _) => (Mnemonic::Beqz, vec![Operand::reg(self.gpr(rs2)), target]),
            (Mnemonic::Bne, 0, _) => (Mnemonic::Bnez, vec![Operand::reg(self.gpr(rs2)), target]),
            // 0 < rs2
            (Mnemonic::Blt, 0, _) => (Mnemonic::Bgtz, vec![Operand::reg(self.gpr(rs2)), target]),
            // 0 >= rs2
            (Mnemonic::Bge, 0, _) => (Mnemonic::Blez, vec![Operand::reg(self.gpr(rs2)), target]),
            _ => (
                mnemonic,
                vec![
                    Operand::reg(self.gpr(rs1)),
                    Operand::reg(self.gpr(rs2)),
                    target,
                ],
            ),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(operands))
    }

    /// Decode load instructions.
    fn decode_load(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = Self::rd(insn);
        let rs1 = Self::rs1(insn);
        let imm = Self::imm_i(insn);
        let is_64bit = self.variant.is_64bit();

        let (mnemonic, size) = match Self::funct3(insn) {
            0b000 => (Mnemonic::Lb, 1),
            0b001 => (Mnemonic::Lh, 2),
            0b010 => (Mnemonic::Lw, 4),
            0b011 if is_64bit => (Mnemonic::Ld, 8),
            0b100 => (Mnemonic::Lbu, 1),
            0b101 => (Mnemonic::Lhu, 2),
            0b110 if is_64bit => (Mnemonic::Lwu, 4),
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(vec![
                Operand::reg(self.gpr(rd)),
                Operand::mem(self.gpr(rs1), imm, size),
            ]))
    }

    /// Decode store instructions.
    fn decode_store(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rs1 = Self::rs1(insn);
        let rs2 = Self::rs2(insn);
        let imm = Self::imm_s(insn);

        let (mnemonic, size) = match Self::funct3(insn) {
            0b000 => (Mnemonic::Sb, 1),
            0b001 => (Mnemonic::Sh, 2),
            0b010 => (Mnemonic::Sw, 4),
            0b011 if self.variant.is_64bit() => (Mnemonic::Sd, 8),
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(vec![
                Operand::reg(self.gpr(rs2)),
                Operand::mem(self.gpr(rs1), imm, size),
            ]))
    }

    /// Decode the shift amount of an immediate shift, rejecting reserved bits.
    ///
    /// Returns the amount and whether the arithmetic-shift bit (30) is set.
    fn shamt(&self, insn: u32, address: u64, word_op: bool) -> Result<(u32, bool), DecodeError> {
        let wide = self.variant.is_64bit() && !word_op;
        let (shamt, upper) = if wide {
            ((insn >> 20) & 0x3F, insn >> 26)
        } else {
            ((insn >> 20) & 0x1F, insn >> 25)
        };
        let alt_pattern = if wide { FUNCT7_ALT >> 1 } else { FUNCT7_ALT };
        if upper == 0 {
            Ok((shamt, false))
        } else if upper == alt_pattern {
            Ok((shamt, true))
        } else {
            Err(DecodeError::invalid_encoding(address, "reserved shift encoding"))
        }
    }

    /// Decode OP-IMM instructions (ADDI, SLTI, etc.)
    fn decode_op_imm(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = self.gpr(Self::rd(insn));
        let rs1 = self.gpr(Self::rs1(insn));
        let imm = Self::imm_i(insn);
        let funct3 = Self::funct3(insn);

        let reg_reg_imm = |m: Mnemonic| {
            (
                m,
                imm,
                vec![Operand::reg(rd), Operand::reg(rs1), Operand::imm(imm, 12)],
            )
        };

        let (mnemonic, imm, operands) = match funct3 {
            0b000 => {
                if rd.is_zero() && rs1.is_zero() && imm == 0 {
                    (Mnemonic::Nop, 0, vec![])
                } else if rs1.is_zero() {
                    (Mnemonic::Li, imm, vec![Operand::reg(rd), Operand::imm(imm, 12)])
                } else if imm == 0 {
                    (Mnemonic::Mv, 0, vec![Operand::reg(rd), Operand::reg(rs1)])
                } else {
                    reg_reg_imm(Mnemonic::Addi)
                }
            }
            0b010 => reg_reg_imm(Mnemonic::Slti),
            0b011 => {
                if imm == 1 {
                    (Mnemonic::Seqz, imm, vec![Operand::reg(rd), Operand::reg(rs1)])
                } else {
                    reg_reg_imm(Mnemonic::Sltiu)
                }
            }
            0b100 => {
                if imm == -1 {
                    (Mnemonic::Not, imm, vec![Operand::reg(rd), Operand::reg(rs1)])
                } else {
                    reg_reg_imm(Mnemonic::Xori)
                }
            }
            0b110 => reg_reg_imm(Mnemonic::Ori),
            0b111 => reg_reg_imm(Mnemonic::Andi),
            0b001 | 0b101 => {
                let (shamt, alt) = self.shamt(insn, address, false)?;
                let mnemonic = match (funct3, alt) {
                    (0b001, false) => Mnemonic::Slli,
                    (0b101, false) => Mnemonic::Srli,
                    (0b101, true) => Mnemonic::Srai,
                    _ => return Err(DecodeError::invalid_encoding(address, "reserved shift encoding")),
                };
                let bits = if self.variant.is_64bit() { 6 } else { 5 };
                (
                    mnemonic,
                    shamt as i64,
                    vec![
                        Operand::reg(rd),
                        Operand::reg(rs1),
                        Operand::imm_unsigned(shamt as u64, bits),
                    ],
                )
            }
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(operands))
    }

    /// Decode OP instructions (ADD, SUB, etc.)
    fn decode_op_reg(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = self.gpr(Self::rd(insn));
        let rs1 = self.gpr(Self::rs1(insn));
        let rs2 = self.gpr(Self::rs2(insn));
        let funct3 = Self::funct3(insn);
        let funct7 = Self::funct7(insn);

        if funct7 == FUNCT7_MULDIV {
            return self.decode_m_extension(insn, address, false);
        }

        let mnemonic = match (funct3, funct7) {
            (0b000, FUNCT7_BASE) => Mnemonic::Add,
            (0b000, FUNCT7_ALT) if rs1.is_zero() => Mnemonic::Neg,
            (0b000, FUNCT7_ALT) => Mnemonic::Sub,
            (0b001, FUNCT7_BASE) => Mnemonic::Sll,
            (0b010, FUNCT7_BASE) if rs2.is_zero() => Mnemonic::Sltz,
            (0b010, FUNCT7_BASE) if rs1.is_zero() => Mnemonic::Sgtz,
            (0b010, FUNCT7_BASE) => Mnemonic::Slt,
            (0b011, FUNCT7_BASE) if rs1.is_zero() => Mnemonic::Snez,
            (0b011, FUNCT7_BASE) => Mnemonic::Sltu,
            (0b100, FUNCT7_BASE) => Mnemonic::Xor,
            (0b101, FUNCT7_BASE) => Mnemonic::Srl,
            (0b101, FUNCT7_ALT) => Mnemonic::Sra,
            (0b110, FUNCT7_BASE) => Mnemonic::Or,
            (0b111, FUNCT7_BASE) => Mnemonic::And,
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        let operands = match mnemonic {
            Mnemonic::Neg | Mnemonic::Sgtz | Mnemonic::Snez => {
                vec![Operand::reg(rd), Operand::reg(rs2)]
            }
            Mnemonic::Sltz => vec![Operand::reg(rd), Operand::reg(rs1)],
            _ => vec![Operand::reg(rd), Operand::reg(rs1), Operand::reg(rs2)],
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic).with_operands(operands))
    }

    /// Decode OP-IMM-32 instructions (RV64 only: ADDIW, SLLIW, etc.)
    fn decode_op_imm32(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = self.gpr(Self::rd(insn));
        let rs1 = self.gpr(Self::rs1(insn));
        let imm = Self::imm_i(insn);
        let funct3 = Self::funct3(insn);

        let (mnemonic, imm, operands) = match funct3 {
            0b000 if imm == 0 => (Mnemonic::SextW, 0, vec![Operand::reg(rd), Operand::reg(rs1)]),
            0b000 => (
                Mnemonic::Addiw,
                imm,
                vec![Operand::reg(rd), Operand::reg(rs1), Operand::imm(imm, 12)],
            ),
            0b001 | 0b101 => {
                let (shamt, alt) = self.shamt(insn, address, true)?;
                let mnemonic = match (funct3, alt) {
                    (0b001, false) => Mnemonic::Slliw,
                    (0b101, false) => Mnemonic::Srliw,
                    (0b101, true) => Mnemonic::Sraiw,
                    _ => return Err(DecodeError::invalid_encoding(address, "reserved shift encoding")),
                };
                (
                    mnemonic,
                    shamt as i64,
                    vec![
                        Operand::reg(rd),
                        Operand::reg(rs1),
                        Operand::imm_unsigned(shamt as u64, 5),
                    ],
                )
            }
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(imm)
            .with_operands(operands))
    }

    /// Decode OP-32 instructions (RV64 only: ADDW, SUBW, etc.)
    fn decode_op_reg32(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = self.gpr(Self::rd(insn));
        let rs1 = self.gpr(Self::rs1(insn));
        let rs2 = self.gpr(Self::rs2(insn));
        let funct3 = Self::funct3(insn);
        let funct7 = Self::funct7(insn);

        if funct7 == FUNCT7_MULDIV {
            return self.decode_m_extension(insn, address, true);
        }

        let mnemonic = match (funct3, funct7) {
            (0b000, FUNCT7_BASE) => Mnemonic::Addw,
            (0b000, FUNCT7_ALT) if rs1.is_zero() => Mnemonic::Negw,
            (0b000, FUNCT7_ALT) => Mnemonic::Subw,
            (0b001, FUNCT7_BASE) => Mnemonic::Sllw,
            (0b101, FUNCT7_BASE) => Mnemonic::Srlw,
            (0b101, FUNCT7_ALT) => Mnemonic::Sraw,
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        let operands = if mnemonic == Mnemonic::Negw {
            vec![Operand::reg(rd), Operand::reg(rs2)]
        } else {
            vec![Operand::reg(rd), Operand::reg(rs1), Operand::reg(rs2)]
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic).with_operands(operands))
    }

    /// Decode M extension instructions (MUL, DIV, etc.)
    fn decode_m_extension(
        &self,
        insn: u32,
        address: u64,
        word_op: bool,
    ) -> Result<Instruction, DecodeError> {
        let rd = Self::rd(insn);
        let rs1 = Self::rs1(insn);
        let rs2 = Self::rs2(insn);

        let mnemonic = match (Self::funct3(insn), word_op) {
            (0b000, false) => Mnemonic::Mul,
            (0b001, false) => Mnemonic::Mulh,
            (0b010, false) => Mnemonic::Mulhsu,
            (0b011, false) => Mnemonic::Mulhu,
            (0b100, false) => Mnemonic::Div,
            (0b101, false) => Mnemonic::Divu,
            (0b110, false) => Mnemonic::Rem,
            (0b111, false) => Mnemonic::Remu,
            (0b000, true) => Mnemonic::Mulw,
            (0b100, true) => Mnemonic::Divw,
            (0b101, true) => Mnemonic::Divuw,
            (0b110, true) => Mnemonic::Remw,
            (0b111, true) => Mnemonic::Remuw,
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic).with_operands(vec![
            Operand::reg(self.gpr(rd)),
            Operand::reg(self.gpr(rs1)),
            Operand::reg(self.gpr(rs2)),
        ]))
    }

    /// Decode system instructions (ECALL, EBREAK, xRET, WFI, CSR)
    fn decode_system(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        let rd = Self::rd(insn);
        let rs1 = Self::rs1(insn);
        let funct3 = Self::funct3(insn);
        let csr = (insn >> 20) & 0xFFF;

        if funct3 == 0 {
            if rd != 0 || rs1 != 0 {
                return Err(DecodeError::unknown_opcode(address, insn));
            }
            let mnemonic = match csr {
                0x000 => Mnemonic::Ecall,
                0x001 => Mnemonic::Ebreak,
                0x102 => Mnemonic::Sret,
                0x302 => Mnemonic::Mret,
                0x105 => Mnemonic::Wfi,
                _ => return Err(DecodeError::unknown_opcode(address, insn)),
            };
            return Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic));
        }

        let csr_op = Operand::imm_unsigned(csr as u64, 12);
        let rd_op = Operand::reg(self.gpr(rd));
        let rs1_op = Operand::reg(self.gpr(rs1));
        let uimm_op = Operand::imm_unsigned(rs1 as u64, 5);

        let (mnemonic, operands) = match funct3 {
            0b001 if rd == 0 => (Mnemonic::Csrw, vec![csr_op, rs1_op]),
            0b001 => (Mnemonic::Csrrw, vec![rd_op, csr_op, rs1_op]),
            0b010 if rs1 == 0 => (Mnemonic::Csrr, vec![rd_op, csr_op]),
            0b010 if rd == 0 => (Mnemonic::Csrs, vec![csr_op, rs1_op]),
            0b010 => (Mnemonic::Csrrs, vec![rd_op, csr_op, rs1_op]),
            0b011 if rd == 0 => (Mnemonic::Csrc, vec![csr_op, rs1_op]),
            0b011 => (Mnemonic::Csrrc, vec![rd_op, csr_op, rs1_op]),
            0b101 if rd == 0 => (Mnemonic::Csrwi, vec![csr_op, uimm_op]),
            0b101 => (Mnemonic::Csrrwi, vec![rd_op, csr_op, uimm_op]),
            0b110 if rd == 0 => (Mnemonic::Csrsi, vec![csr_op, uimm_op]),
            0b110 => (Mnemonic::Csrrsi, vec![rd_op, csr_op, uimm_op]),
            0b111 if rd == 0 => (Mnemonic::Csrci, vec![csr_op, uimm_op]),
            0b111 => (Mnemonic::Csrrci, vec![rd_op, csr_op, uimm_op]),
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_imm(csr as i64)
            .with_operands(operands))
    }

    /// Decode FENCE / FENCE.TSO / FENCE.I.
    ///
    /// Unknown `fm` values decode as a plain fence.
    fn decode_misc_mem(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        match Self::funct3(insn) {
            0b000 => {
                let fm = insn >> 28;
                let pred = FenceSet::from_bits(insn >> 24);
                let succ = FenceSet::from_bits(insn >> 20);
                if fm == FM_TSO && pred == FenceSet::RW && succ == FenceSet::RW {
                    return Ok(Instruction::new(address, insn, INSN_SIZE, Mnemonic::FenceTso));
                }
                Ok(Instruction::new(address, insn, INSN_SIZE, Mnemonic::Fence)
                    .with_operands(vec![Operand::FenceSet(pred), Operand::FenceSet(succ)]))
            }
            0b001 => Ok(Instruction::new(address, insn, INSN_SIZE, Mnemonic::FenceI)),
            _ => Err(DecodeError::unknown_opcode(address, insn)),
        }
    }

    /// Decode atomic memory operations (A extension).
    fn decode_amo(&self, insn: u32, address: u64) -> Result<Instruction, DecodeError> {
        use Mnemonic::*;

        let rd = Self::rd(insn);
        let rs1 = Self::rs1(insn);
        let rs2 = Self::rs2(insn);
        let funct5 = (insn >> 27) & 0x1F;
        let aq = (insn >> 26) & 1 != 0;
        let rl = (insn >> 25) & 1 != 0;

        let (double, size) = match Self::funct3(insn) {
            0b010 => (false, 4),
            0b011 if self.variant.is_64bit() => (true, 8),
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };

        let (word, dword) = match funct5 {
            0b00010 => (LrW, LrD),
            0b00011 => (ScW, ScD),
            0b00001 => (AmoswapW, AmoswapD),
            0b00000 => (AmoaddW, AmoaddD),
            0b00100 => (AmoxorW, AmoxorD),
            0b01100 => (AmoandW, AmoandD),
            0b01000 => (AmoorW, AmoorD),
            0b10000 => (AmominW, AmominD),
            0b10100 => (AmomaxW, AmomaxD),
            0b11000 => (AmominuW, AmominuD),
            0b11100 => (AmomaxuW, AmomaxuD),
            _ => return Err(DecodeError::unknown_opcode(address, insn)),
        };
        let mnemonic = if double { dword } else { word };

        let mem = Operand::mem(self.gpr(rs1), 0, size);
        let operands = if matches!(mnemonic, LrW | LrD) {
            if rs2 != 0 {
                return Err(DecodeError::invalid_encoding(address, "lr with nonzero rs2"));
            }
            vec![Operand::reg(self.gpr(rd)), mem]
        } else {
            vec![Operand::reg(self.gpr(rd)), Operand::reg(self.gpr(rs2)), mem]
        };

        Ok(Instruction::new(address, insn, INSN_SIZE, mnemonic)
            .with_operands(operands)
            .with_ordering(AtomicOrdering::from_bits(aq, rl)))
    }
}

impl Default for RiscVDisassembler {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl Disassembler for RiscVDisassembler {
    fn decode_instruction(&self, bytes: &[u8], address: u64) -> Result<DecodedInstruction, DecodeError> {
        let instruction = self.decode(bytes, address)?;
        Ok(DecodedInstruction {
            size: instruction.size,
            instruction,
        })
    }

    fn min_instruction_size(&self) -> usize {
        INSN_SIZE
    }

    fn max_instruction_size(&self) -> usize {
        INSN_SIZE
    }

    fn is_fixed_width(&self) -> bool {
        true
    }

    fn variant(&self) -> Variant {
        self.variant
    }
}
