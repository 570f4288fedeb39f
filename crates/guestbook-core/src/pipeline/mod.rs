//! Media submission pipeline state machine

mod state;

pub use state::{PipelineEvent, PipelineStage, PipelineState};
