//! Error types for porewalk.
//!
//! One unified enum covers configuration, numerical and I/O failures across
//! the workspace. Frame-level context (frame index) is attached by the
//! pipeline layer, which logs and counts failed frames without aborting the
//! run.

use thiserror::Error;

/// Unified error type for all porewalk operations.
#[derive(Error, Debug)]
pub enum PorewalkError {
    /// Configuration validation errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Input data errors (missing radii, bad selections, unusable frames)
    #[error("input data error: {0}")]
    InputData(String),

    /// Interpolation abscissas are not strictly increasing
    #[error("interpolation input is not strictly increasing")]
    InputNotMonotonic,

    /// Paired input vectors differ in length
    #[error("input size mismatch: {left} abscissas vs {right} ordinates")]
    InputSizeMismatch { left: usize, right: usize },

    /// The initial probe position overlaps an obstacle sphere
    #[error("initial probe position lies inside an obstacle (clearance {clearance:.4} nm)")]
    InitialPositionInObstacle { clearance: f64 },

    /// Neither probe walk produced a usable pathway
    #[error("probe walk found no feasible direction from the initial position")]
    NoFeasibleDirection,

    /// Too few (distinct) samples for an estimator
    #[error("need at least {required} distinct samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Annealing initial temperature must be positive
    #[error("initial temperature must be positive, got {0}")]
    InvalidTemperature(f64),

    /// Annealing cooling factor must lie in the open unit interval
    #[error("cooling factor must lie in (0, 1), got {0}")]
    InvalidCoolingFactor(f64),

    /// A required parameter has no value and no default
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Curvilinear mapping failed to converge
    #[error("mapping onto pathway did not converge within {max_iter} iterations")]
    MappingDidNotConverge { max_iter: usize },

    /// End-of-run summary error: some frames could not be analysed
    #[error("{failed} of {total} frames failed analysis")]
    FailedFrames { failed: usize, total: usize },

    /// I/O errors (trajectory input, per-frame stream, output files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the per-frame stream (or trajectory) is not a valid record
    #[error("malformed frame record at line {line}: {message}")]
    MalformedFrameRecord { line: usize, message: String },

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors (fallback)
    #[error("internal error: {0}")]
    Internal(String),
}

impl PorewalkError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        PorewalkError::Config(message.into())
    }

    /// Creates an input data error.
    pub fn input(message: impl Into<String>) -> Self {
        PorewalkError::InputData(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PorewalkError::Internal(message.into())
    }

    /// Process exit code associated with this error kind.
    ///
    /// 2 = configuration, 3 = input data, 4 = algorithm failure, 1 = internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            PorewalkError::Config(_)
            | PorewalkError::InvalidTemperature(_)
            | PorewalkError::InvalidCoolingFactor(_)
            | PorewalkError::MissingParameter(_) => 2,
            PorewalkError::InputData(_)
            | PorewalkError::InputNotMonotonic
            | PorewalkError::InputSizeMismatch { .. }
            | PorewalkError::MalformedFrameRecord { .. }
            | PorewalkError::Io(_) => 3,
            PorewalkError::InitialPositionInObstacle { .. }
            | PorewalkError::NoFeasibleDirection
            | PorewalkError::InsufficientSamples { .. }
            | PorewalkError::MappingDidNotConverge { .. }
            | PorewalkError::FailedFrames { .. } => 4,
            PorewalkError::Json(_) | PorewalkError::Internal(_) => 1,
        }
    }
}

/// Result type alias for porewalk operations.
pub type Result<T> = std::result::Result<T, PorewalkError>;
