pub mod engine;
pub mod label;
pub mod preprocess;

pub use engine::{check_engine, SymbolRecognizer, TesseractRecognizer};
pub use label::filter_label;
pub use preprocess::binarize_strokes;

use chrono::Local;
use std::path::Path;

use crate::grid::RegionGrid;

/// High-level pipeline: region rasters → label string.
///
/// For each region in creation order, binarizes the raster and runs the
/// recognition engine in single-symbol mode; an engine failure degrades
/// to an empty contribution for that region. The concatenated text is
/// filtered to the filename-safe character set.
///
/// Returns None when the filtered label is empty; callers must block the
/// save action until a label is produced or labeling is bypassed.
pub fn recognize_grid(
    grid: &RegionGrid,
    engine: &dyn SymbolRecognizer,
    debug_dir: Option<&Path>,
) -> Option<String> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut raw = String::new();

    for (index, region) in grid.regions().iter().enumerate() {
        let binarized = binarize_strokes(region.raster());

        if let Some(dir) = debug_dir {
            let debug_path = dir.join(format!("region_{}_{}.png", index, timestamp));
            if let Err(e) = binarized.save(&debug_path) {
                crate::log(&format!("Could not save debug image for region {}: {}", index, e));
            }
        }

        let text = match engine.recognize_symbol(&binarized) {
            Ok(text) => text,
            Err(e) => {
                crate::log(&format!("Recognition failed for region {}: {}", index, e));
                String::new()
            }
        };
        raw.push_str(text.trim());
    }

    let filtered = filter_label(&raw);
    if filtered.is_empty() {
        None
    } else {
        Some(filtered)
    }
}
