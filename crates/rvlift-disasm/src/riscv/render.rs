//! Display-token rendering.

use rvlift_core::{Immediate, Instruction, Operand, Token, TokenKind, MNEMONIC_COLUMN};

/// Presentation options for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOptions {
    /// Render signed immediates and displacements in hex instead of decimal.
    pub hex_immediates: bool,
    /// Column at which the first operand starts.
    pub mnemonic_column: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            hex_immediates: false,
            mnemonic_column: MNEMONIC_COLUMN,
        }
    }
}

/// Renders `inst` with the default options.
///
/// The concatenated text equals `inst.to_string()`.
pub fn render(inst: &Instruction) -> Vec<Token> {
    render_with(inst, &RenderOptions::default())
}

/// Renders `inst` as a token sequence.
pub fn render_with(inst: &Instruction, options: &RenderOptions) -> Vec<Token> {
    let mnemonic = format!("{}{}", inst.mnemonic, inst.ordering.suffix());
    let pad = options.mnemonic_column.saturating_sub(mnemonic.len()).max(1);

    let mut tokens = Vec::with_capacity(2 + inst.operands.len() * 4);
    tokens.push(Token::new(TokenKind::Instruction, mnemonic));
    if inst.operands.is_empty() {
        return tokens;
    }
    tokens.push(Token::new(TokenKind::Padding, " ".repeat(pad)));

    for (i, op) in inst.operands.iter().enumerate() {
        if i > 0 {
            tokens.push(Token::new(TokenKind::OperandSeparator, ", "));
        }
        push_operand(&mut tokens, op, options);
    }

    tokens
}

fn push_operand(tokens: &mut Vec<Token>, op: &Operand, options: &RenderOptions) {
    match op {
        Operand::Register(reg) => tokens.push(Token::new(TokenKind::Register, reg.name())),
        Operand::Immediate(imm) => tokens.push(immediate_token(imm, options)),
        Operand::PcRelative { target, .. } => tokens.push(Token::with_value(
            TokenKind::PossibleAddress,
            format!("{:#x}", target),
            *target,
        )),
        Operand::Memory(mem) => {
            tokens.push(signed_token(mem.displacement, options));
            tokens.push(Token::new(TokenKind::BeginMemoryOperand, "("));
            tokens.push(Token::new(TokenKind::Register, mem.base.name()));
            tokens.push(Token::new(TokenKind::EndMemoryOperand, ")"));
        }
        Operand::FenceSet(set) => tokens.push(Token::new(TokenKind::Text, set.to_string())),
    }
}

fn immediate_token(imm: &Immediate, options: &RenderOptions) -> Token {
    if imm.prefers_hex() {
        Token::with_value(TokenKind::Integer, format!("{:#x}", imm.as_u64()), imm.as_u64())
    } else {
        signed_token(imm.value, options)
    }
}

fn signed_token(value: i64, options: &RenderOptions) -> Token {
    let text = match (options.hex_immediates, value < 0) {
        (false, _) => value.to_string(),
        (true, false) => format!("{:#x}", value),
        (true, true) => format!("-{:#x}", value.unsigned_abs()),
    };
    Token::with_value(TokenKind::Integer, text, value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiscVDisassembler;
    use rvlift_core::{tokens_to_string, Variant};

    fn text(variant: Variant, insn: u32, address: u64) -> String {
        let inst = RiscVDisassembler::new(variant)
            .decode(&insn.to_le_bytes(), address)
            .unwrap();
        tokens_to_string(&render(&inst))
    }

    #[test]
    fn test_render_jump() {
        assert_eq!(text(Variant::Rv32, 0x0200_006F, 0x1000), "j       0x1020");
    }

    #[test]
    fn test_render_no_operands() {
        assert_eq!(text(Variant::Rv32, 0x0000_8067, 0), "ret");
        assert_eq!(text(Variant::Rv32, 0x0000_0013, 0), "nop");
    }

    #[test]
    fn test_render_tokens() {
        // sw ra, 12(sp)
        let inst = RiscVDisassembler::rv32()
            .decode(&0x0011_2623u32.to_le_bytes(), 0)
            .unwrap();
        let kinds: Vec<_> = render(&inst).iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Instruction,
                TokenKind::Padding,
                TokenKind::Register,
                TokenKind::OperandSeparator,
                TokenKind::Integer,
                TokenKind::BeginMemoryOperand,
                TokenKind::Register,
                TokenKind::EndMemoryOperand,
            ]
        );
        assert_eq!(tokens_to_string(&render(&inst)), "sw      ra, 12(sp)");
    }

    #[test]
    fn test_render_negative_and_hex() {
        // addi sp, sp, -16
        let inst = RiscVDisassembler::rv32()
            .decode(&0xFF01_0113u32.to_le_bytes(), 0)
            .unwrap();
        assert_eq!(tokens_to_string(&render(&inst)), "addi    sp, sp, -16");

        let options = RenderOptions {
            hex_immediates: true,
            mnemonic_column: 0,
        };
        assert_eq!(tokens_to_string(&render_with(&inst, &options)), "addi sp, sp, -0x10");
    }

    #[test]
    fn test_render_csr() {
        // csrr a0, mstatus
        assert_eq!(text(Variant::Rv64, 0x3000_2573, 0), "csrr    a0, 0x300");
    }

    #[test]
    fn test_render_fence() {
        assert_eq!(text(Variant::Rv32, 0x0FF0_000F, 0), "fence   iorw, iorw");
        assert_eq!(text(Variant::Rv64, 0x0330_000F, 0), "fence   rw, rw");
        assert_eq!(text(Variant::Rv64, 0x8330_000F, 0), "fence.tso");

        let inst = RiscVDisassembler::rv32()
            .decode(&0x0330_000Fu32.to_le_bytes(), 0)
            .unwrap();
        let sets: Vec<_> = render(&inst)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Text)
            .map(|t| t.text)
            .collect();
        assert_eq!(sets, vec!["rw", "rw"]);
    }

    #[test]
    fn test_render_matches_display() {
        for insn in [
            0x0200_006Fu32,
            0xFF01_0113,
            0x0011_2623,
            0x0000_8067,
            0x3000_2573,
            0x0FF0_000F,
            0x8330_000F,
        ] {
            let inst = RiscVDisassembler::rv64()
                .decode(&insn.to_le_bytes(), 0x4000)
                .unwrap();
            assert_eq!(tokens_to_string(&render(&inst)), inst.to_string());
        }
    }

    #[test]
    fn test_address_token_value() {
        let inst = RiscVDisassembler::rv32()
            .decode(&0x0200_006Fu32.to_le_bytes(), 0x1000)
            .unwrap();
        let tokens = render(&inst);
        let addr = tokens
            .iter()
            .find(|t| t.kind == TokenKind::PossibleAddress)
            .unwrap();
        assert_eq!(addr.value, Some(0x1020));
    }
}
