use thiserror::Error;

#[derive(Debug, Error)]
pub enum PmiError {
    /// A word asked for by an evaluation pair or a neighbor query is not in the vocabulary.
    #[error("word '{0}' is not in the vocabulary")]
    UnknownWord(String),

    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("window size {0} is not valid, must be positive")]
    InvalidWindow(usize),

    #[error("sample fraction {0} is not valid, must be in (0, 1]")]
    InvalidFraction(f64),

    #[error("no evaluation pairs left to correlate")]
    EmptyEvaluation,

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Stats(#[from] statrs::StatsError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PmiError>;
