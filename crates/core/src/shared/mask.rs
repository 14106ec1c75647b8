use ndarray::Array2;

/// Binary foreground mask with the same dimensions as its source frame.
///
/// Indexed `[[row, col]]` like the frame's ndarray view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    cells: Array2<bool>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: Array2::from_elem((height as usize, width as usize), false),
        }
    }

    pub fn from_cells(cells: Array2<bool>) -> Self {
        Self { cells }
    }

    pub fn width(&self) -> u32 {
        self.cells.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.cells.nrows() as u32
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[[y as usize, x as usize]]
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        self.cells[[y as usize, x as usize]] = value;
    }

    /// Marks every cell of the axis-aligned rectangle as foreground,
    /// clipped to the mask bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = (x.saturating_add(width)).min(self.width());
        let y_end = (y.saturating_add(height)).min(self.height());
        for row in y..y_end {
            for col in x..x_end {
                self.set(col, row, true);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn cells(&self) -> &Array2<bool> {
        &self.cells
    }
}
