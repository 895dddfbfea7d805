//! The incrementally maintained Gaussian energy field.
//!
//! Every pixel of one tracked polarity contributes
//! `exp(-d² / (2σ²))` to each pixel within the support window around
//! it, where `d²` is the squared toroidal offset. The field value at a
//! pixel then measures how tightly clustered the tracked pixels are in
//! its neighborhood: the maximum over a class of pixels is the tightest
//! cluster, the minimum the largest void.
//!
//! Flipping a single pixel only touches the window around it, so the
//! field is kept consistent with `add_contribution` /
//! `remove_contribution` in O(window²) per flip instead of rebuilding
//! all N² pixels from scratch.

use crate::{
    grid::{BinaryPattern, Cell, window_range, wrap},
    search::{ExtremumKind, Polarity},
};

/// Standard deviation of the Gaussian influence kernel.
pub const SIGMA: f64 = 1.5;

/// Support radius of the kernel, `ceil(3σ)` pixels per axis.
///
/// Contributions beyond 3σ are defined to be zero. This is a deliberate
/// accuracy/speed trade-off inherited from the classic formulation, not
/// merely a numerical approximation.
pub const SUPPORT_RADIUS: usize = 5;

/// Precomputed kernel weights over the (possibly clamped) support
/// window for one grid width.
#[derive(Debug, Clone)]
pub(crate) struct Kernel {
    offsets: Vec<(isize, isize, f64)>,
}

impl Kernel {
    pub(crate) fn new(width: usize) -> Self {
        let (start, end) = window_range(width, SUPPORT_RADIUS);
        let mut offsets =
            Vec::with_capacity(((end - start + 1) * (end - start + 1)) as usize);
        for dy in start..=end {
            for dx in start..=end {
                let d2 = (dx * dx + dy * dy) as f64;
                offsets.push((dx, dy, (-d2 / (2.0 * SIGMA * SIGMA)).exp()));
            }
        }
        Self { offsets }
    }

    pub(crate) fn offsets(&self) -> &[(isize, isize, f64)] {
        &self.offsets
    }
}

/// Accumulated Gaussian influence of all pixels of one tracked
/// polarity.
///
/// The field must be rebuilt with [`EnergyField::new`] whenever the
/// tracked polarity switches; between rebuilds it is kept consistent by
/// calling [`add_contribution`](EnergyField::add_contribution) or
/// [`remove_contribution`](EnergyField::remove_contribution) exactly
/// once per pixel flip, immediately after updating the pattern.
#[derive(Debug, Clone)]
pub struct EnergyField {
    width: usize,
    tracked: bool,
    values: Vec<f64>,
    kernel: Kernel,
}

impl EnergyField {
    /// Builds the field from scratch by adding every pixel whose value
    /// matches the tracked polarity. O(N² · window²).
    pub fn new(pattern: &BinaryPattern, polarity: Polarity) -> Self {
        let width = pattern.width();
        let tracked = polarity.tracked_value();
        let mut field = Self {
            width,
            tracked,
            values: vec![0.0; width * width],
            kernel: Kernel::new(width),
        };
        for y in 0..width {
            for x in 0..width {
                if pattern.get(x, y) == tracked {
                    field.add_contribution(x, y);
                }
            }
        }
        field
    }

    /// The pattern value whose pixels contribute energy.
    #[inline]
    pub fn tracked_value(&self) -> bool {
        self.tracked
    }

    /// Field value at a pixel.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Adds the contribution of a pixel that just flipped to the
    /// tracked polarity.
    pub fn add_contribution(&mut self, x: usize, y: usize) {
        self.apply(x, y, 1.0);
    }

    /// Removes the contribution of a pixel that just flipped away from
    /// the tracked polarity.
    pub fn remove_contribution(&mut self, x: usize, y: usize) {
        self.apply(x, y, -1.0);
    }

    fn apply(&mut self, x: usize, y: usize, sign: f64) {
        for &(dx, dy, weight) in self.kernel.offsets() {
            let px = wrap(x, dx, self.width);
            let py = wrap(y, dy, self.width);
            self.values[py * self.width + px] += sign * weight;
        }
    }

    /// Finds the position of the maximum (tightest cluster) or minimum
    /// (largest void) field value among pixels whose pattern value
    /// equals `match_value`.
    ///
    /// Returns `None` when no pixel matches, which callers treat as the
    /// normal "search exhausted" termination signal.
    ///
    /// Ties go to the first candidate in row-major scan order. This is
    /// deterministic but arbitrary, and is kept so masks stay
    /// reproducible; randomized tie-breaking would improve mask
    /// quality slightly.
    pub fn find_extremum(
        &self,
        pattern: &BinaryPattern,
        kind: ExtremumKind,
        match_value: bool,
    ) -> Option<Cell> {
        debug_assert_eq!(pattern.width(), self.width);
        let mut best: Option<(Cell, f64)> = None;
        for y in 0..self.width {
            for x in 0..self.width {
                if pattern.get(x, y) != match_value {
                    continue;
                }
                let energy = self.value(x, y);
                let better = match best {
                    None => true,
                    Some((_, best_energy)) => match kind {
                        ExtremumKind::Cluster => energy > best_energy,
                        ExtremumKind::Void => energy < best_energy,
                    },
                };
                if better {
                    best = Some(((x, y), energy));
                }
            }
        }
        best.map(|(cell, _)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    const TOLERANCE: f64 = 1e-9;

    fn assert_fields_match(a: &EnergyField, b: &EnergyField, width: usize) {
        for y in 0..width {
            for x in 0..width {
                let (va, vb) = (a.value(x, y), b.value(x, y));
                assert!(
                    (va - vb).abs() < TOLERANCE,
                    "field mismatch at ({x}, {y}): {va} vs {vb}"
                );
            }
        }
    }

    /// 2×2 block of active pixels at the origin plus one isolated
    /// active pixel at (3, 3).
    fn block_and_corner() -> BinaryPattern {
        let mut pattern = BinaryPattern::new(4);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (3, 3)] {
            pattern.set(x, y, true);
        }
        pattern
    }

    #[test]
    fn block_is_tightest_cluster() {
        let pattern = block_and_corner();
        let field = EnergyField::new(&pattern, Polarity::Standard);

        let cluster = field
            .find_extremum(&pattern, ExtremumKind::Cluster, true)
            .unwrap();
        assert_eq!(cluster, (0, 0));

        // Every block pixel carries more energy than the isolated one.
        let corner = field.value(3, 3);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert!(field.value(x, y) > corner);
        }
    }

    #[test]
    fn isolated_pixel_is_least_clustered_active() {
        let pattern = block_and_corner();
        let field = EnergyField::new(&pattern, Polarity::Standard);
        let loosest = field
            .find_extremum(&pattern, ExtremumKind::Void, true)
            .unwrap();
        assert_eq!(loosest, (3, 3));
    }

    #[test]
    fn search_exhausted_on_empty_class() {
        let pattern = BinaryPattern::new(4);
        let field = EnergyField::new(&pattern, Polarity::Standard);
        assert_eq!(
            field.find_extremum(&pattern, ExtremumKind::Cluster, true),
            None
        );
    }

    #[test]
    fn ties_go_to_first_in_scan_order() {
        // Two isolated pixels far apart on a grid large enough that
        // their windows do not overlap: identical energy, so the scan
        // must pick the earlier one.
        let mut pattern = BinaryPattern::new(16);
        pattern.set(2, 2, true);
        pattern.set(12, 12, true);
        let field = EnergyField::new(&pattern, Polarity::Standard);
        assert_eq!(
            field.find_extremum(&pattern, ExtremumKind::Cluster, true),
            Some((2, 2))
        );
    }

    #[test]
    fn degenerate_two_pixel_grid_wraps_once() {
        // N=2: every pixel is within 3σ of every other through
        // wraparound. Each neighbor must contribute exactly once.
        let mut pattern = BinaryPattern::new(2);
        pattern.set(0, 0, true);
        let field = EnergyField::new(&pattern, Polarity::Standard);

        let w = 2.0 * SIGMA * SIGMA;
        assert!((field.value(0, 0) - 1.0).abs() < TOLERANCE);
        assert!((field.value(1, 0) - (-1.0 / w).exp()).abs() < TOLERANCE);
        assert!((field.value(0, 1) - (-1.0 / w).exp()).abs() < TOLERANCE);
        assert!((field.value(1, 1) - (-2.0 / w).exp()).abs() < TOLERANCE);
    }

    #[test]
    fn add_then_remove_restores_field() {
        let pattern = block_and_corner();
        let mut field = EnergyField::new(&pattern, Polarity::Standard);
        let before = field.clone();

        field.add_contribution(2, 3);
        field.remove_contribution(2, 3);
        assert_fields_match(&field, &before, 4);
    }

    #[test]
    fn incremental_updates_match_rebuild() {
        let width = 24;
        let mut rng = SmallRng::seed_from_u64(7);
        let mut pattern = BinaryPattern::new(width);
        for index in 0..width * width {
            pattern.set_index(index, rng.random_bool(0.3));
        }
        let mut field = EnergyField::new(&pattern, Polarity::Standard);

        // Random flips, mirrored into the field incrementally.
        for _ in 0..200 {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..width);
            let active = pattern.get(x, y);
            pattern.set(x, y, !active);
            if active {
                field.remove_contribution(x, y);
            } else {
                field.add_contribution(x, y);
            }
        }

        let rebuilt = EnergyField::new(&pattern, Polarity::Standard);
        assert_fields_match(&field, &rebuilt, width);
    }

    #[test]
    fn reversed_polarity_tracks_inactive_pixels() {
        let mut pattern = BinaryPattern::new(8);
        pattern.set(4, 4, true);
        let field = EnergyField::new(&pattern, Polarity::Reversed);
        // 63 inactive contributors; the lone active pixel still
        // receives their influence but contributes none itself.
        assert!(field.value(4, 4) > 0.0);
        let rebuilt_tracked = field.tracked_value();
        assert!(!rebuilt_tracked);
    }
}
