//! Domain error types.

/// Top-level error type for galgoz.
#[derive(Debug, thiserror::Error)]
pub enum GalgozError {
    #[error("invalid configuration for indicator {indicator}: {reason}")]
    Configuration { indicator: String, reason: String },

    #[error("duplicate indicator name: {0}")]
    DuplicateIndicator(String),

    #[error("insufficient data for {indicator}: have {bars} rows, need {minimum}")]
    InsufficientData {
        indicator: String,
        bars: usize,
        minimum: usize,
    },

    #[error("evaluation of {indicator} failed at row {row}: {source}")]
    Evaluation {
        indicator: String,
        row: usize,
        #[source]
        source: Box<GalgozError>,
    },

    #[error("cell ({row}, {column}) already written")]
    CellRewritten { row: usize, column: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("invalid price series at row {row}: {reason}")]
    InvalidSeries { row: usize, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GalgozError {
    pub(crate) fn configuration(indicator: &str, reason: impl Into<String>) -> Self {
        GalgozError::Configuration {
            indicator: indicator.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&GalgozError> for std::process::ExitCode {
    fn from(err: &GalgozError) -> Self {
        let code: u8 = match err {
            GalgozError::Io(_) => 1,
            GalgozError::Configuration { .. }
            | GalgozError::DuplicateIndicator(_)
            | GalgozError::ConfigParse { .. }
            | GalgozError::ConfigMissing { .. }
            | GalgozError::ConfigInvalid { .. } => 2,
            GalgozError::Data { .. } | GalgozError::InvalidSeries { .. } => 3,
            GalgozError::InsufficientData { .. }
            | GalgozError::Evaluation { .. }
            | GalgozError::CellRewritten { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
