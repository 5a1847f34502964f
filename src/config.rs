/// Default number of rows (and columns) of an editor grid.
pub const DEFAULT_ROWS: usize = 50;
/// Default side length in pixels of the square drawing surface.
pub const DEFAULT_PIXEL_WIDTH: u32 = 800;

/// Runtime geometry of a square editor grid. Only [cell_size](GridConfig::cell_size) depends on
/// the pixel width; it has no influence on the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: usize,
    pub pixel_width: u32,
}

impl Default for GridConfig {
    fn default() -> GridConfig {
        GridConfig {
            rows: DEFAULT_ROWS,
            pixel_width: DEFAULT_PIXEL_WIDTH,
        }
    }
}

impl GridConfig {
    pub fn new(rows: usize, pixel_width: u32) -> GridConfig {
        GridConfig { rows, pixel_width }
    }

    /// Side length of a single cell in pixels, rounded down. Zero for a grid without rows.
    pub fn cell_size(&self) -> u32 {
        if self.rows == 0 {
            0
        } else {
            self.pixel_width / self.rows as u32
        }
    }
}
