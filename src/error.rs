use chrono::NaiveDate;

/// Errors raised by the pure timeline/statistics pipeline.
///
/// These never carry partial results: a failed computation produces nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A timeline key matched neither `M/D/YY` nor `YYYY-MM-DD`.
    #[error("Unrecognized timeline date '{key}' (expected M/D/YY or YYYY-MM-DD).")]
    Parse { key: String },

    #[error("Invalid date range: start {start} is after end {end}.")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The selected country has no usable timeline or population.
    #[error("No data available: {0}")]
    MissingData(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let exit_code = match err {
            PipelineError::InvalidRange { .. } => 2,
            PipelineError::MissingData(_) => 3,
            PipelineError::Parse { .. } => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
