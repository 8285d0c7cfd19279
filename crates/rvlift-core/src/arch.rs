//! Architecture variant identification and properties.

/// The two supported RISC-V configurations.
///
/// Both variants share register names and decode/lift logic; they differ
/// only in register width and address size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variant {
    /// RV32: 4-byte registers and addresses.
    #[default]
    Rv32,
    /// RV64: 8-byte registers and addresses.
    Rv64,
}

impl Variant {
    /// Longest encoding the decoder consumes, in bytes.
    pub const MAX_INSTRUCTION_LENGTH: usize = 4;

    /// Parses a variant from an architecture name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "riscv" | "riscv32" | "rv32" | "rv32i" => Some(Self::Rv32),
            "riscv64" | "rv64" | "rv64i" => Some(Self::Rv64),
            _ => None,
        }
    }

    /// Returns the architecture name registered with the host.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rv32 => "riscv",
            Self::Rv64 => "riscv64",
        }
    }

    /// Returns the address size in bytes.
    pub fn address_size(&self) -> usize {
        match self {
            Self::Rv32 => 4,
            Self::Rv64 => 8,
        }
    }

    /// Returns the general-purpose register size in bytes.
    pub fn register_size(&self) -> usize {
        self.address_size()
    }

    /// Returns the default integer size in bytes.
    pub fn default_int_size(&self) -> usize {
        self.address_size()
    }

    /// Returns the maximum instruction length in bytes.
    pub fn max_instruction_length(&self) -> usize {
        Self::MAX_INSTRUCTION_LENGTH
    }

    /// Returns the byte order (always little-endian).
    pub fn endianness(&self) -> Endianness {
        Endianness::Little
    }

    /// Returns whether this is the 64-bit variant.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Rv64)
    }

    /// Returns the register width in bits.
    pub fn xlen(&self) -> u32 {
        self.register_size() as u32 * 8
    }

    /// Truncates a value to the variant width.
    pub fn mask(&self, value: u64) -> u64 {
        match self {
            Self::Rv32 => value & 0xFFFF_FFFF,
            Self::Rv64 => value,
        }
    }

    /// Resolves a PC-relative offset against `address`, wrapping at the
    /// variant width.
    pub fn relative_target(&self, address: u64, offset: i64) -> u64 {
        self.mask(address.wrapping_add(offset as u64))
    }
}

/// Byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    Little,
}
