//! Flashcard Capture Tool
//!
//! A Raspberry Pi touchscreen application for photographing flashcards:
//! capture a photo with the Pi camera, optionally hand-write a label on an
//! on-screen character grid recognized one cell at a time, and save the
//! photo under the recognized name.
//!
//! The touchscreen UI layer drives the modules below; this binary wires
//! them to a line-oriented console loop for bench use without the panel.

mod camera;
mod config;
mod flow;
mod gallery;
mod grid;
mod ocr;
mod paths;

use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use camera::{create_event_channel, spawn_preview_monitor, Preview, PreviewEvent, StillCamera};
use flow::{CaptureFlow, FlowState};
use gallery::Gallery;
use grid::{RegionGrid, StrokeRenderer};
use ocr::TesseractRecognizer;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("flashcard_capture.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        // Try to log even if paths module isn't initialized
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        if let Ok(Some(exe_dir)) =
            std::env::current_exe().map(|p| p.parent().map(|d| d.to_path_buf()))
        {
            let log_path = exe_dir.join("logs").join("flashcard_capture.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
            {
                let _ = file.write_all(log_msg.as_bytes());
            }
        }
    }));

    // Ensure output directories exist
    paths::ensure_directories()?;

    // Load configuration
    config::init_config();
    let config = config::get_config();

    // Probe the OCR engine so a missing install is visible at startup
    if let Err(e) = ocr::check_engine(&config.tesseract_command) {
        log(&format!("Warning: OCR engine check failed: {}", e));
        log("Handwritten labels will come back empty until it is installed.");
    }

    let camera = StillCamera::new(
        config.still_command.as_str(),
        config.capture_width,
        config.capture_height,
        Duration::from_millis(config.capture_timeout_ms),
    );
    let preview = Preview::new(
        config.preview_command.as_str(),
        config.capture_width,
        config.capture_height,
    );

    // Preview liveness monitor: background thread, events drained by the loop
    let (event_sender, event_receiver) = create_event_channel();
    let monitor_shutdown = Arc::new(AtomicBool::new(false));
    let monitor_handle = spawn_preview_monitor(
        preview.slot(),
        event_sender,
        Duration::from_millis(config.preview_poll_ms),
        Arc::clone(&monitor_shutdown),
    );

    let mut flow = CaptureFlow::new(camera, preview, paths::get_images_dir());
    let mut gallery = Gallery::new(paths::get_images_dir(), gallery::DEFAULT_PER_PAGE);
    gallery.refresh()?;

    // Character grid the touchscreen draws into; `draw` feeds it here.
    let mut char_grid = RegionGrid::new(config.grid_rows, config.grid_cols, config.cell_size);
    let mut pen = StrokeRenderer::new(config.cell_size, config.stroke_width_frac);
    let recognizer = TesseractRecognizer::new(config.tesseract_command.as_str());
    let debug_dir = config.debug_mode.then(paths::get_debug_dir);

    if let Err(e) = flow.preview().start() {
        log(&format!("Preview unavailable: {}", e));
    }

    log("Flashcard capture tool started");
    log("Commands: capture | draw x0 y0 x1 y1 | clear | label [text] | skip | cancel | list | next | prev | quit");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;

        // Surface anything the monitor saw while we were waiting for input
        while let Ok(event) = event_receiver.try_recv() {
            match event {
                PreviewEvent::Exited => log("Preview window closed; it will restart on the next capture"),
            }
        }

        let mut parts = line.trim().splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let argument = parts.next().unwrap_or("").trim();

        match command {
            "capture" => match flow.capture() {
                Ok(path) => {
                    log(&format!("Captured {}", path.display()));
                    log("Review it, then `label <text>`, `skip`, or `capture` to retake");
                }
                Err(e) => log(&format!("Capture failed: {}", e)),
            },
            "draw" => {
                let coords: Vec<f32> = argument
                    .split_whitespace()
                    .filter_map(|v| v.parse().ok())
                    .collect();
                match coords[..] {
                    [x0, y0, x1, y1] => {
                        match pen.begin(&char_grid, x0, y0) {
                            Some(region) => {
                                pen.extend(&mut char_grid, x1, y1);
                                log(&format!("Stroke in region {}", region));
                            }
                            None => log("Point is outside the grid"),
                        }
                        pen.end();
                    }
                    _ => log("Usage: draw x0 y0 x1 y1"),
                }
            }
            "clear" => {
                char_grid.clear();
                log("Grid cleared");
            }
            "label" => {
                // Typed text wins; otherwise recognize the drawn grid.
                let label = if argument.is_empty() {
                    ocr::recognize_grid(&char_grid, &recognizer, debug_dir.as_deref())
                        .unwrap_or_default()
                } else {
                    ocr::filter_label(argument)
                };
                if label.is_empty() {
                    log("No label produced; draw more, type `label <text>`, or `skip`");
                    continue;
                }
                log(&format!("Label: {}", label));
                let result = flow
                    .begin_labeling()
                    .and_then(|_| flow.confirm_label(&label));
                match result {
                    Ok(outcome) => {
                        match &outcome.error {
                            Some(err) => log(&format!(
                                "Kept {} ({})",
                                outcome.path.display(),
                                err
                            )),
                            None => log(&format!("Saved {}", outcome.path.display())),
                        }
                        flow.reset();
                        char_grid.clear();
                        gallery.refresh()?;
                    }
                    Err(e) => log(&format!("Could not save: {}", e)),
                }
            }
            "skip" => match flow.bypass_label() {
                Ok(outcome) => {
                    log(&format!("Saved {}", outcome.path.display()));
                    flow.reset();
                    char_grid.clear();
                    gallery.refresh()?;
                }
                Err(e) => log(&format!("Could not skip: {}", e)),
            },
            "cancel" => {
                if let Err(e) = flow.cancel_labeling() {
                    log(&format!("{}", e));
                }
            }
            "list" => show_page(&gallery),
            "next" => {
                if gallery.next_page() {
                    show_page(&gallery);
                } else {
                    log("Already at the last page");
                }
            }
            "prev" => {
                if gallery.prev_page() {
                    show_page(&gallery);
                } else {
                    log("Already at the first page");
                }
            }
            "quit" | "exit" => break,
            "" => {}
            other => log(&format!("Unknown command: {}", other)),
        }

        if flow.state() != FlowState::Idle {
            log(&format!("State: {}", flow.state()));
        }
    }

    log("Shutting down");
    flow.preview().stop();
    monitor_shutdown.store(true, Ordering::SeqCst);
    if monitor_handle.join().is_err() {
        log("Preview monitor thread panicked");
    }

    Ok(())
}

fn show_page(gallery: &Gallery) {
    log(&format!("Images (page {}):", gallery.page_indicator()));
    for name in gallery.page_files() {
        log(&format!("  {}", name));
    }
    if gallery.page_files().is_empty() {
        log("  (no captured images)");
    }
}
