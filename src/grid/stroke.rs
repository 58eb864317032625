//! Freehand stroke capture into region rasters.
//!
//! A drag is confined to the region where it began: `begin` resolves the
//! active region, `extend` stamps line segments into that region's raster
//! while the pointer stays inside its bounds, `end` releases it. Segments
//! outside the bounds are skipped but the region stays active until release.

use imageproc::drawing::draw_filled_circle_mut;
use image::Luma;

use super::region::RegionGrid;

/// Ink value stamped into the raster (dark on the white background).
const INK: u8 = 0;

/// A line segment in canvas coordinates, for the UI layer to mirror
/// onto the visible surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

struct ActiveStroke {
    region: usize,
    /// Last pointer position in region-local coordinates.
    last: (f32, f32),
}

/// Converts pointer drags into raster strokes.
pub struct StrokeRenderer {
    width: f32,
    active: Option<ActiveStroke>,
}

impl StrokeRenderer {
    /// Creates a renderer with a stroke width derived from the cell size,
    /// so strokes stay finger-friendly at any grid scale.
    pub fn new(cell_size: u32, width_frac: f32) -> Self {
        let width = (cell_size as f32 * width_frac).max(1.0);
        Self { width, active: None }
    }

    pub fn stroke_width(&self) -> f32 {
        self.width
    }

    /// Returns the region index a drag is currently bound to, if any.
    pub fn active_region(&self) -> Option<usize> {
        self.active.as_ref().map(|s| s.region)
    }

    /// Starts a drag. If no region contains the point the drag is a no-op
    /// until the next `begin`.
    pub fn begin(&mut self, grid: &RegionGrid, x: f32, y: f32) -> Option<usize> {
        self.active = grid.locate(x, y).map(|region| {
            let bounds = grid.region(region).bounds();
            ActiveStroke {
                region,
                last: (x - bounds.x as f32, y - bounds.y as f32),
            }
        });
        self.active_region()
    }

    /// Continues a drag. Returns the canvas-space segment that was drawn,
    /// or None when there is no active region or the pointer has left its
    /// bounds (the drag pauses but stays bound to the region).
    pub fn extend(&mut self, grid: &mut RegionGrid, x: f32, y: f32) -> Option<Segment> {
        let stroke = self.active.as_mut()?;
        let bounds = grid.region(stroke.region).bounds();
        if !bounds.contains(x, y) {
            return None;
        }

        let local = (x - bounds.x as f32, y - bounds.y as f32);
        draw_thick_line(grid.region_mut(stroke.region).raster_mut(), stroke.last, local, self.width);

        let segment = Segment {
            from: (stroke.last.0 + bounds.x as f32, stroke.last.1 + bounds.y as f32),
            to: (x, y),
        };
        stroke.last = local;
        Some(segment)
    }

    /// Ends the drag. No further drawing until the next `begin`.
    pub fn end(&mut self) {
        self.active = None;
    }
}

/// Stamps filled circles along the segment to get a round-capped line of
/// the given width, matching how the touch UI renders it.
fn draw_thick_line(raster: &mut image::GrayImage, from: (f32, f32), to: (f32, f32), width: f32) {
    let radius = (width / 2.0).round().max(1.0) as i32;
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let length = (dx * dx + dy * dy).sqrt();
    let steps = length.ceil().max(1.0) as u32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let cx = (from.0 + dx * t).round() as i32;
        let cy = (from.1 + dy * t).round() as i32;
        draw_filled_circle_mut(raster, (cx, cy), radius, Luma([INK]));
    }
}
