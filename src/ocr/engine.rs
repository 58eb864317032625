use anyhow::{anyhow, Result};
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;

/// Recognizes a single handwritten symbol from a binarized raster.
///
/// Implemented by the Tesseract wrapper; tests substitute stubs.
pub trait SymbolRecognizer {
    /// Returns the recognized text, possibly empty. Surrounding whitespace
    /// is the caller's problem; implementations return the engine output
    /// as-is.
    fn recognize_symbol(&self, raster: &GrayImage) -> Result<String>;
}

/// Runs the Tesseract executable in single-character mode (`--psm 10`),
/// one external process call per region raster.
pub struct TesseractRecognizer {
    command: String,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }
}

impl SymbolRecognizer for TesseractRecognizer {
    fn recognize_symbol(&self, raster: &GrayImage) -> Result<String> {
        // Tesseract reads from a file, so round-trip through a temp PNG.
        let temp_input = NamedTempFile::with_suffix(".png")?;
        raster.save(temp_input.path())?;

        let output = Command::new(&self.command)
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("10") // Single character
            .arg("--oem")
            .arg("3")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Probes the OCR engine by running `<command> --version`.
///
/// Called once at startup so a missing installation is reported early;
/// recognition itself degrades per-region if the engine disappears later.
pub fn check_engine(command: &str) -> Result<()> {
    let output = Command::new(command)
        .arg("--version")
        .output()
        .map_err(|e| anyhow!("Could not run {}: {}", command, e))?;

    if !output.status.success() {
        return Err(anyhow!(
            "{} --version exited with {}",
            command,
            output.status
        ));
    }
    Ok(())
}
