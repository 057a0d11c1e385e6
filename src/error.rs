use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlameError {
    #[error("A flame needs at least 2 functions, got {0}")]
    TooFewFunctions(usize),
    #[error("Iteration count must be at least 1")]
    ZeroIterations,
    #[error("Zoom {zoom} is outside the configured range {min}..={max}")]
    ZoomOutOfRange { zoom: u32, min: u32, max: u32 },
    #[error("Gamma must be finite and positive, got {0}")]
    InvalidGamma(f64),
    #[error("Variation index {index} out of range (catalog has {len} entries)")]
    VariationIndex { index: usize, len: usize },
    #[error("Variation weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to paint pixel buffer: {0}")]
    Paint(String),
    #[error("Failed to spawn render worker: {0}")]
    WorkerSpawn(String),
    #[error("Render worker is no longer running")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, FlameError>;
