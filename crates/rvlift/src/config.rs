//! Architecture configuration.
//!
//! The variant selects decoding and lifting behaviour; the render options
//! only change how instructions are displayed.

use rvlift_core::{Error, Variant};
use rvlift_disasm::RenderOptions;

use crate::ArchError;

/// Configuration for a [`crate::RiscVArchitecture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchConfig {
    /// Register and address width.
    pub variant: Variant,
    /// Display options.
    pub render: RenderOptions,
}

impl ArchConfig {
    /// Creates a configuration for `variant` with default display options.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            render: RenderOptions::default(),
        }
    }

    /// Creates a configuration for RV32.
    pub fn rv32() -> Self {
        Self::new(Variant::Rv32)
    }

    /// Creates a configuration for RV64.
    pub fn rv64() -> Self {
        Self::new(Variant::Rv64)
    }

    /// Parses a configuration from an architecture name (`riscv`, `riscv64`, `rv32`, ...).
    pub fn parse(name: &str) -> Result<Self, ArchError> {
        Variant::parse(name)
            .map(Self::new)
            .ok_or_else(|| Error::UnknownVariant(name.to_string()).into())
    }

    /// Renders signed immediates in hex.
    pub fn with_hex_immediates(mut self, hex: bool) -> Self {
        self.render.hex_immediates = hex;
        self
    }

    /// Sets the column at which operands start.
    pub fn with_mnemonic_column(mut self, column: usize) -> Self {
        self.render.mnemonic_column = column;
        self
    }
}
