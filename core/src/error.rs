use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Shape mismatch: {left} values vs {right} values")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Invalid label at row {index}: expected 0 or 1, got {value}")]
    InvalidLabel { index: usize, value: i64 },

    #[error("Invalid probability at row {index}: {value} is outside [0, 1]")]
    InvalidProbability { index: usize, value: f64 },

    #[error("Degenerate labels: every ground-truth label is {label}, ROC/AUC is undefined")]
    DegenerateLabels { label: u8 },

    #[error("'{operation}' requires at least one record")]
    EmptyInput { operation: &'static str },

    #[error("Unknown funnel stage '{name}'")]
    UnknownStage { name: String },

    #[error("Attribution model '{name}' not found")]
    UnknownModel { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
