//! Live camera preview process lifecycle.
//!
//! The preview (`libcamera-hello`) runs as a long-lived child. Its handle
//! lives in a shared slot so the liveness monitor can poll it; `stop` takes
//! the child out of the slot before signalling it, which is how the monitor
//! tells an intentional shutdown from an unexpected death.

use anyhow::{anyhow, Result};
use std::process::{Child, Command};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::still::terminate;

/// Grace period between terminate and kill on `stop`.
const STOP_GRACE: Duration = Duration::from_secs(5);

/// Shared slot holding the running preview child, if any.
pub type PreviewSlot = Arc<Mutex<Option<Child>>>;

pub struct Preview {
    command: String,
    width: u32,
    height: u32,
    slot: PreviewSlot,
}

impl Preview {
    pub fn new(command: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            command: command.into(),
            width,
            height,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Clones the child slot for the liveness monitor.
    pub fn slot(&self) -> PreviewSlot {
        Arc::clone(&self.slot)
    }

    /// Starts the preview window. Does nothing if one is already running.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Ok(());
        }

        let child = Command::new(&self.command)
            .arg("--qt")
            .arg("--width")
            .arg(self.width.to_string())
            .arg("--height")
            .arg(self.height.to_string())
            .spawn()
            .map_err(|e| anyhow!("Failed to start {}: {}", self.command, e))?;

        crate::log(&format!("Preview started (pid {})", child.id()));
        *slot = Some(child);
        Ok(())
    }

    /// Stops the preview if it is running: terminate, wait up to the grace
    /// period, then kill. Safe to call when no preview is active.
    pub fn stop(&self) {
        let child = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.take()
        };

        let Some(mut child) = child else {
            return;
        };

        terminate(&mut child);
        let deadline = Instant::now() + STOP_GRACE;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => {
                    crate::log("Preview stopped");
                    return;
                }
                Ok(None) => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    crate::log(&format!("Error waiting for preview to stop: {}", e));
                    break;
                }
            }
        }

        let _ = child.kill();
        let _ = child.wait();
        crate::log("Preview killed after grace period");
    }

    /// Whether a preview child is currently held. The monitor clears the
    /// slot when the process dies, so this reflects liveness within one
    /// polling interval.
    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_start_and_stop() {
        let preview = Preview::new("sleep", 30, 30);
        // `sleep --qt --width 30 --height 30` exits immediately with a usage
        // error, but spawn itself succeeds, which is all start() checks.
        preview.start().unwrap();
        assert!(preview.is_active());
        preview.stop();
        assert!(!preview.is_active());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let preview = Preview::new("whatever", 30, 30);
        preview.stop();
        assert!(!preview.is_active());
    }

    #[test]
    fn test_start_with_missing_command_errors() {
        let preview = Preview::new("definitely-not-a-preview-tool", 30, 30);
        assert!(preview.start().is_err());
        assert!(!preview.is_active());
    }
}
