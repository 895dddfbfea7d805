//! Blue noise dither mask generation via the void-and-cluster method.
//!
//! This crate produces square toroidal "blue noise" rank masks: at
//! every threshold level the set of activated pixels is maximally
//! spread out spatially, so dithering error shows up as high-frequency
//! noise instead of low-frequency banding. Masks are built with the
//! classic void-and-cluster algorithm: seed and relax a random binary
//! pattern, then assign every pixel a rank across three deterministic
//! phases by repeatedly locating the tightest cluster or largest void
//! under a Gaussian influence field.
//!
//! The expensive part, locating extrema, runs against an incrementally
//! maintained energy field: flipping a pixel updates only the Gaussian
//! support window around it instead of rescanning the whole grid. A
//! row-parallel brute-force search (behind the default `rayon` feature)
//! is kept as an alternative strategy and as a cross-check.
//!
//! # Example
//!
//! ```
//! use bluemask::generate_mask;
//! use rand::{SeedableRng, rngs::SmallRng};
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let mask = generate_mask(16, &mut rng)?;
//!
//! // Ranks form a permutation of 0..256; bytes quantize them to 0..=255.
//! let bytes = mask.to_bytes();
//! assert_eq!(bytes.len(), 256);
//! # Ok::<(), bluemask::MaskError>(())
//! ```
//!
//! Reproducibility is explicit: the RNG handle is consumed only by the
//! initial random seeding, so the same seed and strategy always produce
//! the same mask.

mod energy;
mod grid;
mod pipeline;
mod search;

pub use energy::{EnergyField, SIGMA, SUPPORT_RADIUS};
pub use grid::{BinaryPattern, Cell};
pub use pipeline::{
    RankMask, RelaxationObserver, generate_mask, generate_mask_with,
};
pub use search::{ExtremumKind, Polarity, SearchStrategy};

/// Errors reported by mask generation.
///
/// The taxonomy is narrow: this is a closed numeric algorithm over a
/// fixed-size grid with no I/O on the critical path. Internal invariant
/// violations (a non-permutation rank map, pattern/field drift) are
/// bugs and are asserted rather than returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    /// The requested grid width cannot produce a mask. Width 0 is
    /// empty and width 1 has no rank range to quantize.
    #[error("grid width must be at least 2, got {0}")]
    InvalidGridSize(usize),
}
