//! Fixed region grid for handwritten character input.
//!
//! The drawing surface is partitioned into rows x cols cells of identical
//! size, laid out row-major. Each cell owns a grayscale raster buffer that
//! accumulates strokes until recognition or a clear.

use image::{GrayImage, Luma};

/// Blank (background) raster value: white canvas, strokes are drawn dark.
pub const BLANK: u8 = 255;

/// A rectangle in canvas pixel coordinates with half-open bounds:
/// a point on the right or bottom edge belongs to the next cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Returns true if the point lies inside the rectangle.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.width) as f32
            && py < (self.y + self.height) as f32
    }
}

/// One grid cell: its canvas bounds plus the raster accumulating strokes.
pub struct Region {
    bounds: Rect,
    raster: GrayImage,
}

impl Region {
    fn new(bounds: Rect) -> Self {
        let raster = GrayImage::from_pixel(bounds.width, bounds.height, Luma([BLANK]));
        Self { bounds, raster }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut GrayImage {
        &mut self.raster
    }

    /// Resets the raster to the blank background value.
    fn reset(&mut self) {
        for pixel in self.raster.pixels_mut() {
            *pixel = Luma([BLANK]);
        }
    }
}

/// A fixed rows x cols grid of identically sized regions tiling the canvas.
pub struct RegionGrid {
    rows: u32,
    cols: u32,
    cell_size: u32,
    regions: Vec<Region>,
}

impl RegionGrid {
    /// Creates the grid with one blank raster per cell.
    ///
    /// Cells are created row-major (left-to-right, top-to-bottom) and tile
    /// the canvas without gaps or overlaps. Zero dimensions are a
    /// precondition violation.
    pub fn new(rows: u32, cols: u32, cell_size: u32) -> Self {
        assert!(rows > 0 && cols > 0 && cell_size > 0, "grid dimensions must be positive");

        let mut regions = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                regions.push(Region::new(Rect {
                    x: col * cell_size,
                    y: row * cell_size,
                    width: cell_size,
                    height: cell_size,
                }));
            }
        }

        Self { rows, cols, cell_size, regions }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Total canvas width covered by the grid.
    pub fn canvas_width(&self) -> u32 {
        self.cols * self.cell_size
    }

    /// Total canvas height covered by the grid.
    pub fn canvas_height(&self) -> u32 {
        self.rows * self.cell_size
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> &Region {
        &self.regions[index]
    }

    pub fn region_mut(&mut self, index: usize) -> &mut Region {
        &mut self.regions[index]
    }

    /// Returns the index of the region containing the point, or None.
    ///
    /// Bounds are disjoint by construction, so at most one region matches.
    pub fn locate(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x as u32) / self.cell_size;
        let row = (y as u32) / self.cell_size;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }

    /// Resets every region's raster to blank. Idempotent.
    pub fn clear(&mut self) {
        for region in &mut self.regions {
            region.reset();
        }
    }
}
