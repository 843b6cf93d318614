use crate::error::{CoverlessError, Result};
use serde::{Deserialize, Serialize};

/// Side length of a carrier tile in pixels
pub const BLOCK_SIZE: usize = 8;

/// Layer 1: one average per 2x2 sub-block of the tile
pub const LAYER1_COUNT: usize = 16;
/// Layer 2: one average per quadrant of the 4x4 Layer 1 grid
pub const LAYER2_COUNT: usize = 4;
/// Layer 3: the mean of the Layer 2 values
pub const LAYER3_COUNT: usize = 1;

/// Averages produced per tile (16 + 4 + 1)
pub const AVERAGES_PER_UNIT: usize = LAYER1_COUNT + LAYER2_COUNT + LAYER3_COUNT;

/// Length of the per-tile permutation key
pub const Q_LENGTH: usize = 7;
/// Number of groups the permutation key is applied to (21 / 7)
pub const Q_ROUNDS: usize = AVERAGES_PER_UNIT / Q_LENGTH;

pub const CHECKSUM_BITS: usize = 8;
pub const TYPE_MARKER_BITS: usize = 1;

/// Fixed width of the image secret header:
/// original W(16) + original H(16) + color class(2) + stored W(16) + stored H(16)
pub const IMAGE_HEADER_BITS: usize = 66;

/// Z-code image length field
pub const ZCODE_LENGTH_BITS: usize = 32;
/// Z-code image index(16) + size tag(16)
pub const ZCODE_TAG_BITS: usize = 32;

/// Bits read from each (reordered) average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BitMode {
    /// Mode A: most-significant bit only, 21 bits per tile
    #[default]
    Msb,
    /// Mode B: all eight bits, MSB first, 168 bits per tile
    Full,
}

impl BitMode {
    pub fn bits_per_average(self) -> usize {
        match self {
            Self::Msb => 1,
            Self::Full => 8,
        }
    }

    /// Cover bits contributed by a single tile
    pub fn bits_per_unit(self) -> usize {
        AVERAGES_PER_UNIT * self.bits_per_average()
    }
}

impl std::str::FromStr for BitMode {
    type Err = CoverlessError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "msb" | "a" | "compact" => Ok(Self::Msb),
            "full" | "b" => Ok(Self::Full),
            _ => Err(CoverlessError::UnsupportedOption(format!("bit mode: {}", s))),
        }
    }
}

/// Authenticator placed in front of the type marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Checksum {
    #[default]
    Sha256,
    None,
}

impl Checksum {
    pub fn bits(self) -> usize {
        match self {
            Self::Sha256 => CHECKSUM_BITS,
            Self::None => 0,
        }
    }
}

impl std::str::FromStr for Checksum {
    type Err = CoverlessError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha256" | "on" => Ok(Self::Sha256),
            "none" | "off" => Ok(Self::None),
            _ => Err(CoverlessError::UnsupportedOption(format!("checksum: {}", s))),
        }
    }
}

/// What the payload carries; encoded as the type marker bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    Text,
    Image,
}

impl SecretKind {
    pub fn marker(self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Image => 1,
        }
    }

    pub fn from_marker(bit: u8) -> Self {
        if bit & 1 == 0 {
            Self::Text
        } else {
            Self::Image
        }
    }
}

impl std::str::FromStr for SecretKind {
    type Err = CoverlessError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(CoverlessError::UnsupportedOption(format!("secret kind: {}", s))),
        }
    }
}

/// Framing variant shared by embed and extract.
/// Both sides must use the same configuration or the round trip breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StegoConfig {
    pub bit_mode: BitMode,
    pub checksum: Checksum,
}

impl StegoConfig {
    pub fn new(bit_mode: BitMode, checksum: Checksum) -> Self {
        Self { bit_mode, checksum }
    }

    /// Bits in front of the content: checksum (if enabled) + type marker
    pub fn prefix_bits(&self) -> usize {
        self.checksum.bits() + TYPE_MARKER_BITS
    }
}
