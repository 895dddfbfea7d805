//! Toroidal grid primitives shared by the mask generator.
//!
//! All grids are square and wrap at the edges, so the grid behaves as a
//! torus: a pixel on the right edge is adjacent to the left edge, and
//! distances are measured along the shorter way around.

/// A pixel position as `(x, y)` grid coordinates.
pub type Cell = (usize, usize);

/// Wraps `base + offset` onto an axis of length `width`.
#[inline]
pub(crate) fn wrap(base: usize, offset: isize, width: usize) -> usize {
    (base as isize + offset).rem_euclid(width as isize) as usize
}

/// Inclusive offset range of a support window of the given radius on an
/// axis of length `width`.
///
/// When the grid is smaller than the full window, the range shrinks to
/// cover each pixel of the axis exactly once. Without the clamp a small
/// grid would receive the same contribution several times through
/// wraparound.
pub(crate) fn window_range(width: usize, radius: usize) -> (isize, isize) {
    if width > 2 * radius {
        (-(radius as isize), radius as isize)
    } else {
        let start = -((width / 2) as isize);
        let end = if width % 2 == 0 {
            (width / 2) as isize - 1
        } else {
            (width / 2) as isize
        };
        (start, end)
    }
}

/// A square grid of active/inactive pixels, stored row-major.
///
/// The pattern is exclusively owned by whichever pipeline phase is
/// currently running; phases that restart from the initial pattern take
/// a clone rather than sharing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPattern {
    width: usize,
    cells: Vec<bool>,
}

impl BinaryPattern {
    /// Creates an all-inactive pattern of `width × width` pixels.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cells: vec![false; width * width],
        }
    }

    /// Grid width (and height).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of pixels, `width²`.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` if the grid has no pixels.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.cells[y * self.width + x] = value;
    }

    /// Sets a pixel by row-major index. Used by the random seeding step,
    /// which draws flat indices.
    #[inline]
    pub(crate) fn set_index(&mut self, index: usize, value: bool) {
        self.cells[index] = value;
    }

    /// Number of active pixels.
    pub fn count_active(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
