//! Coverless - carrier-preserving image steganography
//!
//! The carrier image is never modified. Every 8x8 tile of its grayscale
//! raster yields 21 hierarchical averages; a per-tile permutation derived
//! from the key and the tile itself reorders them, and their bits form a
//! cover stream. The secret payload is XNOR-mapped against that stream and
//! the result (the Z-code) is what gets transmitted. The receiver holds the
//! same carrier and key, recomputes the cover stream and inverts the mapping.
//!
//! ## Pipeline
//!
//! ```text
//! Carrier → Tiles → Averages → Q reorder → Cover bits ─┐
//!                                                      ├─ XNOR → Z-code → PNG
//! Secret → Content bits → Shuffle → [Checksum|Marker] ─┘
//! ```
//!
//! - **Averages**: 16 2x2 means, 4 quadrant means, 1 global mean per tile
//! - **Q reorder**: SHA3-derived order over groups of 7 (KEYED)
//! - **Cover bits**: MSB of each average (21/tile) or all 8 bits (168/tile)
//! - **Shuffle**: key-seeded permutation of the content bits only (KEYED)
//! - **Checksum**: first byte of SHA-256 over key and carrier feature
//!
//! ## Example
//!
//! ```no_run
//! use coverless::{embed, detect_and_extract, Raster, Secret, StegoConfig};
//!
//! let carrier = Raster::from_image(&image::open("carrier.png")?);
//! let config = StegoConfig::default();
//!
//! let embedding = embed(&carrier, &Secret::Text("Hello".into()), Some("alice"), &config)?;
//! let extraction = detect_and_extract(&carrier, &embedding.zcode, Some("alice"), &config)?;
//! assert_eq!(extraction.secret.as_text(), Some("Hello"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bits;
pub mod capacity;
pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod pipeline;
pub mod raster;
pub mod secret_image;
pub mod stego;
pub mod zcode;

pub use capacity::{capacity, recommended_size, remaining_capacity, CapacityPlan};
pub use config::{BitMode, Checksum, SecretKind, StegoConfig};
pub use error::{CoverlessError, Result};
pub use payload::Secret;
pub use raster::Raster;
pub use stego::{detect_and_extract, embed, extract, Embedding, Extraction};
pub use zcode::{decode_zcode, encode_zcode};
