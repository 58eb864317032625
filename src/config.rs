//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides camera resolution,
//! external command names, grid dimensions, and timing parameters.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Still capture width in pixels
    pub capture_width: u32,
    /// Still capture height in pixels
    pub capture_height: u32,
    /// Maximum time to wait for the capture tool (milliseconds)
    pub capture_timeout_ms: u64,
    /// Command for still capture
    #[serde(default = "default_still_command")]
    pub still_command: String,
    /// Command for the live preview window
    #[serde(default = "default_preview_command")]
    pub preview_command: String,
    /// Preview liveness polling interval (milliseconds)
    #[serde(default = "default_preview_poll_ms")]
    pub preview_poll_ms: u64,
    /// Character grid rows
    pub grid_rows: u32,
    /// Character grid columns
    pub grid_cols: u32,
    /// Side length of one grid cell in pixels
    pub cell_size: u32,
    /// Stroke width as a fraction of the cell size
    #[serde(default = "default_stroke_width_frac")]
    pub stroke_width_frac: f32,
    /// Command for the OCR engine
    #[serde(default = "default_tesseract_command")]
    pub tesseract_command: String,
    /// Save binarized region images to ocr_debug/ for inspection
    #[serde(default)]
    pub debug_mode: bool,
}

fn default_still_command() -> String {
    "libcamera-jpeg".to_string()
}

fn default_preview_command() -> String {
    "libcamera-hello".to_string()
}

fn default_preview_poll_ms() -> u64 {
    500
}

fn default_stroke_width_frac() -> f32 {
    0.05
}

fn default_tesseract_command() -> String {
    "tesseract".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture_width: 2304,
            capture_height: 1296,
            capture_timeout_ms: 10_000,
            still_command: default_still_command(),
            preview_command: default_preview_command(),
            preview_poll_ms: default_preview_poll_ms(),
            grid_rows: 1,
            grid_cols: 8,
            cell_size: 100,
            stroke_width_frac: default_stroke_width_frac(),
            tesseract_command: default_tesseract_command(),
            debug_mode: false,
        }
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> AppConfig {
    let config_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf());

    crate::log(&format!("Looking for config at: {}", config_path.display()));

    if config_path.exists() {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        // Only the required fields; the rest come from serde defaults.
        let json = r#"{
            "capture_width": 1920,
            "capture_height": 1080,
            "capture_timeout_ms": 5000,
            "grid_rows": 2,
            "grid_cols": 4,
            "cell_size": 80
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.capture_width, 1920);
        assert_eq!(config.still_command, "libcamera-jpeg");
        assert_eq!(config.tesseract_command, "tesseract");
        assert!(!config.debug_mode);
    }

    #[test]
    fn test_default_grid_is_single_strip() {
        let config = AppConfig::default();
        assert_eq!(config.grid_rows, 1);
        assert_eq!(config.grid_cols, 8);
    }
}
