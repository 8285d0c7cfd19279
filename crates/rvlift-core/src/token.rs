//! Display tokens for textual disassembly.

/// Kind of a display token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// The mnemonic.
    Instruction,
    /// Whitespace between the mnemonic and its operands.
    Padding,
    /// Separator between operands.
    OperandSeparator,
    /// Register name.
    Register,
    /// Integer literal.
    Integer,
    /// Literal that is (probably) an address.
    PossibleAddress,
    /// Opening of a memory operand.
    BeginMemoryOperand,
    /// Closing of a memory operand.
    EndMemoryOperand,
    /// Plain text.
    Text,
}

/// A single display token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Numeric value for integer and address tokens.
    pub value: Option<u64>,
}

impl Token {
    /// Creates a token without a value.
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
        }
    }

    /// Creates a token carrying a numeric value.
    pub fn with_value(kind: TokenKind, text: impl Into<String>, value: u64) -> Self {
        Self {
            kind,
            text: text.into(),
            value: Some(value),
        }
    }
}

/// Concatenates token text.
pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_to_string() {
        let tokens = vec![
            Token::new(TokenKind::Instruction, "j"),
            Token::new(TokenKind::Padding, " "),
            Token::with_value(TokenKind::PossibleAddress, "0x1020", 0x1020),
        ];
        assert_eq!(tokens_to_string(&tokens), "j 0x1020");
        assert_eq!(tokens[2].value, Some(0x1020));
    }
}
