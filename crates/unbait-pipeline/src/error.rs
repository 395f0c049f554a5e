use thiserror::Error;

use crate::phase::RunPhase;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] unbait_core::ConfigError),

    #[error("collector setup error: {0}")]
    Collect(#[from] unbait_collect::CollectError),

    #[error("detector setup error: {0}")]
    Detect(#[from] unbait_detect::DetectError),

    #[error("index setup error: {0}")]
    Index(#[from] unbait_index::IndexError),

    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidPhaseTransition { from: RunPhase, to: RunPhase },
}
