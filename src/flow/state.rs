//! Capture flow state machine.
//!
//! Sequences camera capture → review → labeling → persistence, with retake
//! and cancel back-edges and a bypass edge that skips labeling. Transitions
//! out of a state on failure always land on the prior stable state; no
//! failure here is fatal to the application.

use anyhow::{anyhow, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::camera::{Preview, StillCamera};

/// Capture flow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// No photo taken yet
    Idle,
    /// Camera tool running
    Capturing,
    /// Photo on screen, awaiting retake / label / skip
    Reviewing,
    /// Character grid shown, awaiting a recognized label
    Labeling,
    /// Photo persisted under its final name
    Saved,
}

impl std::fmt::Display for FlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowState::Idle => write!(f, "Idle"),
            FlowState::Capturing => write!(f, "Capturing"),
            FlowState::Reviewing => write!(f, "Reviewing"),
            FlowState::Labeling => write!(f, "Labeling"),
            FlowState::Saved => write!(f, "Saved"),
        }
    }
}

/// Result of the save step. A failed rename keeps the original file and
/// carries the error text, but the flow still completes.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Final path of the image on disk.
    pub path: PathBuf,
    /// Whether the file carries the confirmed label (false = placeholder).
    pub renamed: bool,
    /// Error surfaced to the user when the rename was refused.
    pub error: Option<String>,
}

/// Orchestrates one card: capture, review, label, persist.
pub struct CaptureFlow {
    state: FlowState,
    camera: StillCamera,
    preview: Preview,
    output_dir: PathBuf,
    current_image: Option<PathBuf>,
}

impl CaptureFlow {
    pub fn new(camera: StillCamera, preview: Preview, output_dir: PathBuf) -> Self {
        Self {
            state: FlowState::Idle,
            camera,
            preview,
            output_dir,
            current_image: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn current_image(&self) -> Option<&Path> {
        self.current_image.as_deref()
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    /// Captures a photo into the output directory under a timestamped name.
    ///
    /// Valid from `Idle` (first shot) and `Reviewing` (retake). The preview
    /// is stopped for the duration of the capture and restarted afterwards
    /// whether or not the capture succeeded. On failure the flow reverts to
    /// the prior stable state and keeps any previously captured image.
    pub fn capture(&mut self) -> Result<PathBuf> {
        if !matches!(self.state, FlowState::Idle | FlowState::Reviewing) {
            return Err(anyhow!("Cannot capture while {}", self.state));
        }
        let prior = self.state;
        self.state = FlowState::Capturing;

        self.preview.stop();

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("image_{}.jpg", timestamp));

        let result = self.camera.capture(&path);

        if let Err(e) = self.preview.start() {
            crate::log(&format!("Could not restart preview: {}", e));
        }

        match result {
            Ok(()) => {
                self.current_image = Some(path.clone());
                self.state = FlowState::Reviewing;
                Ok(path)
            }
            Err(e) => {
                self.state = prior;
                Err(e)
            }
        }
    }

    /// Opens the labeling step for the captured photo.
    pub fn begin_labeling(&mut self) -> Result<()> {
        if self.state != FlowState::Reviewing {
            return Err(anyhow!("Cannot label while {}", self.state));
        }
        if self.current_image.is_none() {
            return Err(anyhow!("No captured image to label"));
        }
        self.state = FlowState::Labeling;
        Ok(())
    }

    /// Abandons labeling and returns to review. The drawn strokes are the
    /// grid's to discard.
    pub fn cancel_labeling(&mut self) -> Result<()> {
        if self.state != FlowState::Labeling {
            return Err(anyhow!("Not labeling (state is {})", self.state));
        }
        self.state = FlowState::Reviewing;
        Ok(())
    }

    /// Renames the captured file to `<label><ext>` and completes the flow.
    ///
    /// The label must be non-empty; the recognition pipeline reports "no
    /// label" separately and callers block the save until one exists. On a
    /// name collision or rename failure the original timestamped file is
    /// kept, the error is carried in the outcome, and the flow still
    /// reaches `Saved`.
    pub fn confirm_label(&mut self, label: &str) -> Result<SaveOutcome> {
        if self.state != FlowState::Labeling {
            return Err(anyhow!("Cannot confirm a label while {}", self.state));
        }
        if label.is_empty() {
            return Err(anyhow!("Empty label; retry recognition or skip labeling"));
        }
        let current = self
            .current_image
            .clone()
            .ok_or_else(|| anyhow!("No captured image to save"))?;

        let ext = current
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let target = self.output_dir.join(format!("{}{}", label, ext));

        let outcome = if target == current {
            SaveOutcome { path: current, renamed: true, error: None }
        } else if target.exists() {
            crate::log(&format!(
                "Rename refused, {} already exists; keeping {}",
                target.display(),
                current.display()
            ));
            SaveOutcome {
                path: current,
                renamed: false,
                error: Some(format!("{} already exists", target.display())),
            }
        } else {
            match std::fs::rename(&current, &target) {
                Ok(()) => {
                    crate::log(&format!("Saved as {}", target.display()));
                    SaveOutcome { path: target, renamed: true, error: None }
                }
                Err(e) => {
                    crate::log(&format!(
                        "Rename to {} failed: {}; keeping {}",
                        target.display(),
                        e,
                        current.display()
                    ));
                    SaveOutcome {
                        path: current,
                        renamed: false,
                        error: Some(e.to_string()),
                    }
                }
            }
        };

        self.current_image = Some(outcome.path.clone());
        self.state = FlowState::Saved;
        Ok(outcome)
    }

    /// Completes the flow without labeling, keeping the timestamp-based
    /// placeholder name. Valid from review or from an open labeling step.
    pub fn bypass_label(&mut self) -> Result<SaveOutcome> {
        if !matches!(self.state, FlowState::Reviewing | FlowState::Labeling) {
            return Err(anyhow!("Cannot skip labeling while {}", self.state));
        }
        let current = self
            .current_image
            .clone()
            .ok_or_else(|| anyhow!("No captured image to save"))?;

        crate::log(&format!("Labeling skipped, keeping {}", current.display()));
        self.state = FlowState::Saved;
        Ok(SaveOutcome { path: current, renamed: false, error: None })
    }

    /// Starts over for the next card.
    pub fn reset(&mut self) {
        self.current_image = None;
        self.state = FlowState::Idle;
    }
}
