//! Per-tile and per-bit stages shared by embedding and extraction.
//!
//! ```text
//! Tile → Averages → Q reorder → Cover bits ─┐
//!                                           ├─ Mapping → Z-code
//! Content → Shuffle → [Checksum|Marker|..] ─┘
//! ```

pub mod average;
pub mod checksum;
pub mod cover;
pub mod mapping;
pub mod permute;
pub mod shuffle;

pub use average::*;
pub use checksum::*;
pub use cover::*;
pub use mapping::*;
pub use permute::*;
pub use shuffle::*;
