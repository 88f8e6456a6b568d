#![deny(unsafe_code)]

use std::fmt;
use std::path::PathBuf;

use tea_model::{ErrorResponse, ModelError};

/// Error codes surfaced in error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    E7100,
    E7120,
    E7125,
    E7130,
    E7131,
    E7132,
    E7133,
    E7134,
    E7253,
    E7611,
    E7900,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E7100 => "E7100",
            ErrorCode::E7120 => "E7120",
            ErrorCode::E7125 => "E7125",
            ErrorCode::E7130 => "E7130",
            ErrorCode::E7131 => "E7131",
            ErrorCode::E7132 => "E7132",
            ErrorCode::E7133 => "E7133",
            ErrorCode::E7134 => "E7134",
            ErrorCode::E7253 => "E7253",
            ErrorCode::E7611 => "E7611",
            ErrorCode::E7900 => "E7900",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::E7120 => 400,
            ErrorCode::E7900 => 500,
            _ => 409,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid value `{value}` for parameter `{name}`")]
    InvalidParameter { name: String, value: String },

    #[error("Specified program {0} does not exist")]
    ProgramNotFound(String),

    #[error("Tracked entity type does not exist: `{0}`")]
    TrackedEntityTypeNotFound(String),

    #[error("Query item or filter is invalid: `{0}`")]
    UnknownDimension(String),

    #[error("Program stage `{stage}` is not part of program `{program}`")]
    StageNotInProgram { stage: String, program: String },

    #[error("Dimension is malformed: {0}")]
    MalformedDimension(ModelError),

    #[error("Filter is malformed: {0}")]
    MalformedFilter(ModelError),

    #[error("Sort key is not a valid column: `{0}`")]
    UnknownSortKey(String),

    #[error(
        "Dimension `{dimension}` is not supported for program stage `{stage}`. \
         Only event-level dimensions are supported for stage-specific scope"
    )]
    StageScopeNotSupported { dimension: String, stage: String },

    #[error("Period not valid: `{0}`")]
    InvalidPeriod(String),

    /// Internal failure while resolving a value; never reported as a qualifier.
    #[error("Failed to resolve {context}: {reason}")]
    Resolution { context: String, reason: String },
}

impl QueryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            QueryError::InvalidParameter { .. } => ErrorCode::E7100,
            QueryError::ProgramNotFound(_) => ErrorCode::E7120,
            QueryError::TrackedEntityTypeNotFound(_) => ErrorCode::E7125,
            QueryError::UnknownDimension(_) => ErrorCode::E7130,
            QueryError::StageNotInProgram { .. } => ErrorCode::E7131,
            QueryError::MalformedDimension(_) => ErrorCode::E7132,
            QueryError::MalformedFilter(_) => ErrorCode::E7133,
            QueryError::UnknownSortKey(_) => ErrorCode::E7134,
            QueryError::StageScopeNotSupported { .. } => ErrorCode::E7253,
            QueryError::InvalidPeriod(_) => ErrorCode::E7611,
            QueryError::Resolution { .. } => ErrorCode::E7900,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }

    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.http_status(), self.to_string())
            .with_error_code(self.code().as_str())
    }

    pub(crate) fn parameter(name: &str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn resolution(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

impl From<ModelError> for QueryError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::MalformedFilter { .. } => QueryError::MalformedFilter(error),
            ModelError::InvalidCellValue { .. } => QueryError::Resolution {
                context: "cell value".to_string(),
                reason: error.to_string(),
            },
            ModelError::InvalidUid(_) | ModelError::MalformedDimension { .. } => {
                QueryError::MalformedDimension(error)
            }
        }
    }
}

/// Failure loading configuration or datasets from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
