//! Enemy position density grid.

/// Grid of `(height / cell) x (width / cell)` counters.
#[derive(Debug, Clone)]
pub struct HeatMap {
    rows: usize,
    cols: usize,
    cell_px: f64,
    cells: Vec<u32>,
}

impl HeatMap {
    pub fn new(width: u32, height: u32, cell_px: u32) -> Self {
        let cell = cell_px.max(1);
        let rows = (height / cell) as usize;
        let cols = (width / cell) as usize;
        Self {
            rows,
            cols,
            cell_px: cell as f64,
            cells: vec![0; rows * cols],
        }
    }

    /// Count one observation at a pixel position; off-grid positions are ignored.
    pub fn add(&mut self, x: f64, y: f64) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let col = (x / self.cell_px) as usize;
        let row = (y / self.cell_px) as usize;
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col] += 1;
        }
    }

    pub fn max(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Rows of cells scaled so the hottest cell is 100; empty when nothing was counted.
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        let max = self.max();
        if max == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|&c| c as f64 / max as f64 * 100.0).collect())
            .collect()
    }
}
