pub mod state;

pub use state::{CaptureFlow, FlowState, SaveOutcome};
