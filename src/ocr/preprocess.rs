//! Raster preprocessing for single-character recognition.

use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Binarizes a region raster so drawn strokes become foreground.
///
/// The raster is white (255) with dark ink, so a plain Otsu threshold would
/// make the background foreground. Inverting the threshold yields white
/// strokes on black, which is what the recognition engine expects.
pub fn binarize_strokes(raster: &GrayImage) -> GrayImage {
    let level = otsu_level(raster);
    threshold(raster, level, ThresholdType::BinaryInverted)
}
