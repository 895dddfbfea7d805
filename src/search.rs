//! Extremum search parameters and the parallel brute-force variant.
//!
//! The fast path scans the incrementally maintained
//! [`EnergyField`](crate::EnergyField) directly; see
//! [`EnergyField::find_extremum`](crate::EnergyField::find_extremum).
//! The brute-force path kept here recomputes every candidate's energy
//! from the pattern alone and distributes rows over a worker pool. It
//! predates the energy LUT historically and is retained as a documented
//! alternative and as a cross-check for the incremental path.

#[cfg(feature = "rayon")]
use crate::{
    energy::Kernel,
    grid::{BinaryPattern, Cell, wrap},
};

/// Whether a search looks for the tightest cluster (field maximum) or
/// the largest void (field minimum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtremumKind {
    /// Maximum energy: the most crowded neighborhood.
    Cluster,
    /// Minimum energy: the emptiest neighborhood.
    Void,
}

/// Which pattern value generates energy.
///
/// The drain and fill-to-midpoint phases track active pixels
/// (`Standard`). The final fill phase swaps the minority/majority roles
/// and tracks inactive pixels (`Reversed`), so "largest void" becomes
/// "tightest grouping of the remaining zeros".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Active pixels contribute energy.
    Standard,
    /// Inactive pixels contribute energy.
    Reversed,
}

impl Polarity {
    /// The pattern value whose pixels contribute energy.
    #[inline]
    pub(crate) fn tracked_value(self) -> bool {
        matches!(self, Polarity::Standard)
    }
}

/// Execution strategy for every extremum search in the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Single-threaded scan of the incrementally maintained energy
    /// field. The fast path.
    #[default]
    IncrementalLut,
    /// Row-parallel scan recomputing each candidate's energy from the
    /// pattern, without the incremental field.
    #[cfg(feature = "rayon")]
    ParallelBruteForce,
}

/// Energy at one pixel, recomputed by gathering the kernel window over
/// the pattern.
#[cfg(feature = "rayon")]
fn point_energy(
    pattern: &BinaryPattern,
    tracked: bool,
    kernel: &Kernel,
    x: usize,
    y: usize,
) -> f64 {
    let width = pattern.width();
    let mut energy = 0.0;
    for &(dx, dy, weight) in kernel.offsets() {
        let px = wrap(x, dx, width);
        let py = wrap(y, dy, width);
        if pattern.get(px, py) == tracked {
            energy += weight;
        }
    }
    energy
}

/// Brute-force extremum search over all pixels matching `match_value`,
/// with per-row work distributed over the rayon pool.
///
/// Each row computes a local extremum independently; a sequential
/// row-major reduction then combines the row results. Within a row the
/// scan runs left to right with strict comparisons, so the combined
/// result keeps the same first-in-scan-order tie-break as the
/// sequential field scan. The pattern is immutable for the duration of
/// the call, so the row tasks share it without locking.
#[cfg(feature = "rayon")]
pub(crate) fn brute_force_extremum(
    pattern: &BinaryPattern,
    tracked: bool,
    kind: ExtremumKind,
    match_value: bool,
) -> Option<Cell> {
    use rayon::prelude::*;

    let width = pattern.width();
    let kernel = Kernel::new(width);

    let row_best: Vec<Option<(usize, f64)>> = (0..width)
        .into_par_iter()
        .map(|y| {
            let mut best: Option<(usize, f64)> = None;
            for x in 0..width {
                if pattern.get(x, y) != match_value {
                    continue;
                }
                let energy = point_energy(pattern, tracked, &kernel, x, y);
                if better(kind, energy, best.map(|(_, e)| e)) {
                    best = Some((x, energy));
                }
            }
            best
        })
        .collect();

    let mut overall: Option<(Cell, f64)> = None;
    for (y, row) in row_best.iter().enumerate() {
        if let Some((x, energy)) = *row {
            if better(kind, energy, overall.map(|(_, e)| e)) {
                overall = Some(((x, y), energy));
            }
        }
    }
    overall.map(|(cell, _)| cell)
}

#[cfg(feature = "rayon")]
#[inline]
fn better(kind: ExtremumKind, energy: f64, best: Option<f64>) -> bool {
    match best {
        None => true,
        Some(best) => match kind {
            ExtremumKind::Cluster => energy > best,
            ExtremumKind::Void => energy < best,
        },
    }
}
