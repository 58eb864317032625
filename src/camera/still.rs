//! Synchronous still capture via the external camera tool.

use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};

/// How long a timed-out child gets to exit after the termination signal
/// before it is forcibly killed.
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Interval between child exit polls while waiting.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Invokes the still-capture tool (`libcamera-jpeg`) as a blocking call.
pub struct StillCamera {
    command: String,
    width: u32,
    height: u32,
    timeout: Duration,
}

impl StillCamera {
    pub fn new(command: impl Into<String>, width: u32, height: u32, timeout: Duration) -> Self {
        Self { command: command.into(), width, height, timeout }
    }

    /// Captures one frame to `output`.
    ///
    /// Blocks until the tool exits or the timeout elapses; on timeout the
    /// child is terminated, then killed after a grace period. Success means
    /// a zero exit status and the output file existing afterwards.
    pub fn capture(&self, output: &Path) -> Result<()> {
        crate::log(&format!(
            "Capturing {}x{} to {}",
            self.width,
            self.height,
            output.display()
        ));

        let child = Command::new(&self.command)
            .arg("--qt")
            .arg("-o")
            .arg(output)
            .arg("--width")
            .arg(self.width.to_string())
            .arg("--height")
            .arg(self.height.to_string())
            .arg("--nopreview")
            .spawn()
            .map_err(|e| anyhow!("Failed to start {}: {}", self.command, e))?;

        let status = wait_with_timeout(child, self.timeout)?;

        if !status.success() {
            return Err(anyhow!("{} exited with {}", self.command, status));
        }
        if !output.exists() {
            return Err(anyhow!(
                "{} reported success but {} does not exist",
                self.command,
                output.display()
            ));
        }
        Ok(())
    }
}

/// Waits for the child, escalating to termination and then a kill once the
/// timeout elapses. There is no retry; the error surfaces to the caller.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(WAIT_POLL);
    }

    crate::log("Capture tool timed out, terminating");
    terminate(&mut child);

    let grace_deadline = Instant::now() + TERM_GRACE;
    while Instant::now() < grace_deadline {
        if child.try_wait()?.is_some() {
            return Err(anyhow!("Capture tool timed out"));
        }
        std::thread::sleep(WAIT_POLL);
    }

    let _ = child.kill();
    let _ = child.wait();
    Err(anyhow!("Capture tool timed out and was killed"))
}

/// Asks the child to exit gracefully (SIGTERM on unix).
#[cfg(unix)]
pub(crate) fn terminate(child: &mut Child) {
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
pub(crate) fn terminate(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Writes an executable stub that touches its `-o` argument, standing in
    /// for the real capture tool.
    #[cfg(unix)]
    fn write_fake_camera(dir: &Path) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("fake-camera.sh");
        // Args: --qt -o <path> --width W --height H --nopreview
        std::fs::write(&script, "#!/bin/sh\ntouch \"$3\"\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        script
    }

    #[test]
    #[cfg(unix)]
    fn test_capture_success_creates_file() {
        let dir = tempdir().unwrap();
        let script = write_fake_camera(dir.path());
        let output = dir.path().join("shot.jpg");

        let camera = StillCamera::new(
            script.to_string_lossy().to_string(),
            2304,
            1296,
            Duration::from_secs(5),
        );
        camera.capture(&output).unwrap();
        assert!(output.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_nonzero_exit_is_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("shot.jpg");

        let camera = StillCamera::new("false", 2304, 1296, Duration::from_secs(5));
        let err = camera.capture(&output).unwrap_err();
        assert!(err.to_string().contains("exited with"));
        assert!(!output.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_missing_output_file_is_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("shot.jpg");

        // Exits zero but never writes the file.
        let camera = StillCamera::new("true", 2304, 1296, Duration::from_secs(5));
        let err = camera.capture(&output).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    #[cfg(unix)]
    fn test_timeout_terminates_child() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("shot.jpg");

        // Stub that ignores its arguments and outlives the timeout.
        use std::os::unix::fs::PermissionsExt;
        let script = dir.path().join("slow-camera.sh");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();

        let camera = StillCamera::new(
            script.to_string_lossy().to_string(),
            30,
            30,
            Duration::from_millis(200),
        );
        let start = Instant::now();
        let err = camera.capture(&output).unwrap_err();
        assert!(err.to_string().contains("timed out"));
        // Terminated well before the 30s sleep would have finished.
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_command_is_error() {
        let camera = StillCamera::new(
            "definitely-not-a-camera-tool",
            100,
            100,
            Duration::from_secs(1),
        );
        assert!(camera.capture(Path::new("/tmp/never.jpg")).is_err());
    }
}
