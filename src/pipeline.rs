//! The three-phase void-and-cluster rank assignment pipeline.
//!
//! Control flow: a random binary pattern is seeded and relaxed to a
//! void/cluster equilibrium. Phase 1 drains that pattern to all-zero
//! while recording ranks in descending removal order. Phase 2 restarts
//! from a fresh copy of the *same* initial pattern and fills voids
//! until half the grid is active. Phase 3 continues from phase 2's end
//! state with the polarity reversed and fills the remainder. The
//! completed rank map is a permutation of `0..N²-1`; rank-to-byte
//! quantization happens on the finished [`RankMask`].

use rand::Rng;

use crate::{
    MaskError,
    energy::EnergyField,
    grid::{BinaryPattern, Cell},
    search::{ExtremumKind, Polarity, SearchStrategy},
};

/// Divisor of the seeded active-pixel count: `width² / 16` pixels start
/// active before relaxation.
const SEED_DIVISOR: usize = 16;

const UNASSIGNED: u32 = u32::MAX;

/// Debug sink invoked after each relaxation step of the initial pattern
/// generator.
///
/// Receives the current pattern together with the coordinates chosen in
/// this step (cluster removed, void filled). Intended for
/// visualization; the pipeline behaves identically whether or not an
/// observer is attached.
pub trait RelaxationObserver {
    /// Called once per relaxation step, after both flips were applied.
    fn relaxation_step(
        &mut self,
        pattern: &BinaryPattern,
        removed_cluster: Cell,
        filled_void: Cell,
    );
}

impl<F> RelaxationObserver for F
where
    F: FnMut(&BinaryPattern, Cell, Cell),
{
    fn relaxation_step(
        &mut self,
        pattern: &BinaryPattern,
        removed_cluster: Cell,
        filled_void: Cell,
    ) {
        self(pattern, removed_cluster, filled_void)
    }
}

/// A completed blue noise rank mask.
///
/// Holds one rank per pixel, forming a permutation of `0..width²-1`.
/// A pixel's rank is its position in the insertion order produced by
/// the three phases and doubles as its dither threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMask {
    width: usize,
    ranks: Vec<u32>,
}

impl RankMask {
    /// Grid width (and height).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// All ranks in row-major order.
    pub fn ranks(&self) -> &[u32] {
        &self.ranks
    }

    /// Rank of a single pixel.
    #[inline]
    pub fn rank(&self, x: usize, y: usize) -> u32 {
        self.ranks[y * self.width + x]
    }

    /// Quantizes the mask to bytes: `round(255 · rank / (N² - 1))`.
    ///
    /// Order-preserving; no ties are possible since the ranks form a
    /// permutation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let last = (self.ranks.len() - 1) as f64;
        self.ranks
            .iter()
            .map(|&rank| (255.0 * rank as f64 / last).round() as u8)
            .collect()
    }

    /// Normalizes the mask to floats in `[0, 1]`: `rank / (N² - 1)`.
    pub fn to_float(&self) -> Vec<f32> {
        let last = (self.ranks.len() - 1) as f32;
        self.ranks.iter().map(|&rank| rank as f32 / last).collect()
    }
}

/// Incrementally filled rank map. Asserts single assignment per pixel
/// and verifies the permutation on completion; a violation of either
/// indicates pattern/field desynchronization, not a runtime condition.
struct RankBuilder {
    width: usize,
    ranks: Vec<u32>,
}

impl RankBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            ranks: vec![UNASSIGNED; width * width],
        }
    }

    fn assign(&mut self, (x, y): Cell, rank: u32) {
        let slot = &mut self.ranks[y * self.width + x];
        assert_eq!(
            *slot, UNASSIGNED,
            "rank reassigned at ({x}, {y}): {} then {rank}",
            *slot
        );
        *slot = rank;
    }

    fn finish(self) -> RankMask {
        let len = self.ranks.len();
        let mut seen = vec![false; len];
        for (index, &rank) in self.ranks.iter().enumerate() {
            assert_ne!(rank, UNASSIGNED, "pixel {index} never ranked");
            let rank = rank as usize;
            assert!(rank < len, "rank {rank} out of range at pixel {index}");
            assert!(!seen[rank], "duplicate rank {rank} at pixel {index}");
            seen[rank] = true;
        }
        RankMask {
            width: self.width,
            ranks: self.ranks,
        }
    }
}

/// Dispatches one extremum search according to the chosen strategy.
fn search(
    field: &EnergyField,
    pattern: &BinaryPattern,
    strategy: SearchStrategy,
    kind: ExtremumKind,
    match_value: bool,
) -> Option<Cell> {
    match strategy {
        SearchStrategy::IncrementalLut => {
            field.find_extremum(pattern, kind, match_value)
        }
        #[cfg(feature = "rayon")]
        SearchStrategy::ParallelBruteForce => crate::search::brute_force_extremum(
            pattern,
            field.tracked_value(),
            kind,
            match_value,
        ),
    }
}

/// Seeds `⌊width²/16⌋` active pixels at uniformly random positions.
///
/// Duplicate draws are allowed and may under-seed; the relaxation loop
/// corrects the distribution either way. At least one pixel is forced
/// active so relaxation always has a cluster candidate.
fn seed_initial_pattern<R: Rng + ?Sized>(
    width: usize,
    rng: &mut R,
) -> BinaryPattern {
    let mut pattern = BinaryPattern::new(width);
    let ones = (width * width / SEED_DIVISOR).max(1);
    for _ in 0..ones {
        let index = rng.random_range(0..width * width);
        pattern.set_index(index, true);
    }
    pattern
}

/// Relaxes a seeded pattern to a void/cluster equilibrium.
///
/// Each step removes the tightest cluster among active pixels and
/// fills the largest void among inactive pixels. The loop stops when
/// both picks land on the same pixel: the pixel that just left is the
/// best place to rejoin, so the pattern is a fixed point of the step.
fn relax_initial_pattern(
    pattern: &mut BinaryPattern,
    strategy: SearchStrategy,
    mut observer: Option<&mut dyn RelaxationObserver>,
) {
    let mut field = EnergyField::new(pattern, Polarity::Standard);
    let mut iterations = 0_u64;
    loop {
        iterations += 1;

        let cluster = search(&field, pattern, strategy, ExtremumKind::Cluster, true)
            .expect("relaxation pattern holds at least one active pixel");
        pattern.set(cluster.0, cluster.1, false);
        field.remove_contribution(cluster.0, cluster.1);

        let void = search(&field, pattern, strategy, ExtremumKind::Void, false)
            .expect("relaxation pattern holds at least one inactive pixel");
        pattern.set(void.0, void.1, true);
        field.add_contribution(void.0, void.1);

        if let Some(observer) = observer.as_deref_mut() {
            observer.relaxation_step(pattern, cluster, void);
        }

        if cluster == void {
            break;
        }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(width = pattern.width(), iterations, "initial pattern relaxed");
    #[cfg(not(feature = "tracing"))]
    let _ = iterations;
}

/// Phase 1: drain the initial pattern to all-zero, ranking pixels in
/// descending removal order. The most clustered pixels leave first and
/// receive the lowest ranks.
fn drain_clusters(
    initial: &BinaryPattern,
    ranks: &mut RankBuilder,
    strategy: SearchStrategy,
) {
    let mut pattern = initial.clone();
    let mut field = EnergyField::new(&pattern, Polarity::Standard);
    let mut remaining = pattern.count_active();
    while remaining > 0 {
        let cell = search(&field, &pattern, strategy, ExtremumKind::Cluster, true)
            .expect("active pixel count says a cluster candidate exists");
        pattern.set(cell.0, cell.1, false);
        field.remove_contribution(cell.0, cell.1);
        remaining -= 1;
        ranks.assign(cell, remaining as u32);
    }
    debug_assert_eq!(pattern.count_active(), 0);
    #[cfg(feature = "tracing")]
    tracing::debug!(width = initial.width(), "phase 1 drained all clusters");
}

/// Phase 2: from a fresh copy of the initial pattern, fill the largest
/// void among inactive pixels until exactly `⌊N²/2⌋` pixels are active.
/// Returns the half-filled pattern for phase 3 to continue from.
fn fill_to_midpoint(
    initial: &BinaryPattern,
    ranks: &mut RankBuilder,
    strategy: SearchStrategy,
) -> BinaryPattern {
    let mut pattern = initial.clone();
    let mut field = EnergyField::new(&pattern, Polarity::Standard);
    let mut ones = pattern.count_active();
    let half = pattern.len() / 2;
    while ones < half {
        let cell = search(&field, &pattern, strategy, ExtremumKind::Void, false)
            .expect("less than half the grid is active, so a void exists");
        ranks.assign(cell, ones as u32);
        pattern.set(cell.0, cell.1, true);
        field.add_contribution(cell.0, cell.1);
        ones += 1;
    }
    debug_assert_eq!(pattern.count_active(), half);
    #[cfg(feature = "tracing")]
    tracing::debug!(width = initial.width(), active = half, "phase 2 reached midpoint");
    pattern
}

/// Phase 3: fill the remaining voids, continuing from the half-filled
/// pattern with the minority/majority roles swapped. The field now
/// tracks inactive pixels and "largest void" is the tightest grouping
/// of the remaining zeros. Terminates when the search reports no
/// candidate.
fn fill_remainder(
    mut pattern: BinaryPattern,
    ranks: &mut RankBuilder,
    strategy: SearchStrategy,
) {
    let mut field = EnergyField::new(&pattern, Polarity::Reversed);
    let mut rank = pattern.count_active();
    while let Some(cell) =
        search(&field, &pattern, strategy, ExtremumKind::Cluster, false)
    {
        ranks.assign(cell, rank as u32);
        pattern.set(cell.0, cell.1, true);
        field.remove_contribution(cell.0, cell.1);
        rank += 1;
    }
    debug_assert_eq!(rank, pattern.len());
    #[cfg(feature = "tracing")]
    tracing::debug!(width = pattern.width(), "phase 3 filled remainder");
}

/// Generates a blue noise rank mask with the default (incremental LUT)
/// search strategy and no observer.
///
/// The RNG is consumed only by the initial random seeding; everything
/// after that is deterministic, so the same seed always yields the same
/// mask.
pub fn generate_mask<R: Rng + ?Sized>(
    width: usize,
    rng: &mut R,
) -> Result<RankMask, MaskError> {
    generate_mask_with(width, rng, SearchStrategy::default(), None)
}

/// Generates a blue noise rank mask with an explicit search strategy
/// and an optional relaxation observer.
pub fn generate_mask_with<R: Rng + ?Sized>(
    width: usize,
    rng: &mut R,
    strategy: SearchStrategy,
    observer: Option<&mut dyn RelaxationObserver>,
) -> Result<RankMask, MaskError> {
    if width < 2 {
        return Err(MaskError::InvalidGridSize(width));
    }

    let mut initial = seed_initial_pattern(width, rng);
    relax_initial_pattern(&mut initial, strategy, observer);

    let mut ranks = RankBuilder::new(width);
    drain_clusters(&initial, &mut ranks, strategy);
    let half_filled = fill_to_midpoint(&initial, &mut ranks, strategy);
    fill_remainder(half_filled, &mut ranks, strategy);
    Ok(ranks.finish())
}
