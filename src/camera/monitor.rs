//! Preview liveness monitor.
//!
//! A dedicated thread polls the shared preview slot and reports an
//! unexpected child exit over a single-consumer channel. The interaction is
//! one-directional (monitor → UI loop); the monitor itself mutates nothing
//! but the slot it reaps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::preview::PreviewSlot;

/// Events posted by the monitor thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewEvent {
    /// The preview process exited without `stop` being called.
    Exited,
}

/// Creates the monitor event channel.
///
/// The sender lives in the monitor thread, the receiver is drained by the
/// UI loop. Unbounded, but the monitor posts at most one event per death.
pub fn create_event_channel() -> (Sender<PreviewEvent>, Receiver<PreviewEvent>) {
    channel()
}

/// Spawns the monitor thread.
///
/// Each interval it checks the shared slot: a child that has exited is
/// reaped, removed from the slot, and reported. An intentional `stop`
/// empties the slot first, so it is never reported. The thread exits when
/// the shutdown flag is set or the receiver is dropped.
pub fn spawn_preview_monitor(
    slot: PreviewSlot,
    sender: Sender<PreviewEvent>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        crate::log("Preview monitor started");

        while !shutdown.load(Ordering::SeqCst) {
            std::thread::sleep(interval);

            let exited = {
                let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
                match guard.as_mut().map(|child| child.try_wait()) {
                    Some(Ok(Some(status))) => {
                        guard.take();
                        crate::log(&format!("Preview exited unexpectedly ({})", status));
                        true
                    }
                    Some(Err(e)) => {
                        crate::log(&format!("Preview monitor poll failed: {}", e));
                        false
                    }
                    _ => false,
                }
            };

            if exited && sender.send(PreviewEvent::Exited).is_err() {
                // Receiver gone, nobody to notify anymore.
                break;
            }
        }

        crate::log("Preview monitor stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::sync::Mutex;

    fn spawn_short_lived() -> std::process::Child {
        Command::new("sleep").arg("0.05").spawn().unwrap()
    }

    #[test]
    #[cfg(unix)]
    fn test_detects_unexpected_exit_within_interval() {
        let slot: PreviewSlot = Arc::new(Mutex::new(Some(spawn_short_lived())));
        let (sender, receiver) = create_event_channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        let handle = spawn_preview_monitor(
            Arc::clone(&slot),
            sender,
            Duration::from_millis(20),
            Arc::clone(&shutdown),
        );

        let event = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event, PreviewEvent::Exited);
        assert!(slot.lock().unwrap().is_none(), "dead child should be reaped");

        shutdown.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_intentional_stop_is_not_reported() {
        let slot: PreviewSlot = Arc::new(Mutex::new(Some(spawn_short_lived())));
        let (sender, receiver) = create_event_channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        // Emulate Preview::stop(): take the child out before it exits.
        let mut child = slot.lock().unwrap().take().unwrap();
        let _ = child.wait();

        let handle = spawn_preview_monitor(
            Arc::clone(&slot),
            sender,
            Duration::from_millis(20),
            Arc::clone(&shutdown),
        );

        assert!(receiver.recv_timeout(Duration::from_millis(200)).is_err());

        shutdown.store(true, Ordering::SeqCst);
        handle.join().unwrap();
    }

    #[test]
    fn test_monitor_exits_on_shutdown_flag() {
        let slot: PreviewSlot = Arc::new(Mutex::new(None));
        let (sender, _receiver) = create_event_channel();
        let shutdown = Arc::new(AtomicBool::new(true));

        let handle = spawn_preview_monitor(slot, sender, Duration::from_millis(10), shutdown);
        handle.join().unwrap();
    }
}
