pub mod monitor;
pub mod preview;
pub mod still;

pub use monitor::{create_event_channel, spawn_preview_monitor, PreviewEvent};
pub use preview::Preview;
pub use still::StillCamera;
