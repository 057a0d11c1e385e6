//! Supersampled visit histogram filled by the chaos game.

/// Counters are 64-bit since a collapsed attractor can send every iteration to one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub hits: u64,
    pub color_sum: [f64; 3],
    pub alpha_count: u64,
}

impl Cell {
    pub fn is_touched(&self) -> bool {
        self.hits > 0
    }
}

/// Fixed-shape grid of [`Cell`]s, stored row-major and addressed by `(x, y)`.
///
/// The backing buffer is only reallocated when the requested shape changes; between renders
/// it is zeroed in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocates (zeroed) if the shape differs. Returns whether it did.
    pub fn ensure_size(&mut self, width: usize, height: usize) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        *self = Self::new(width, height);
        true
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Adds one visit of `color` at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn deposit(&mut self, x: usize, y: usize, color: [f64; 3]) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let cell = &mut self.cells[y * self.width + x];
        cell.hits = cell.hits.saturating_add(1);
        cell.alpha_count = cell.alpha_count.saturating_add(1);
        for (sum, c) in cell.color_sum.iter_mut().zip(color) {
            *sum += c;
        }
        true
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    pub fn touched_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_touched()).count()
    }

    pub fn total_hits(&self) -> u64 {
        self.cells.iter().map(|c| c.hits).sum()
    }

    pub(crate) fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }
}
