use thiserror::Error;

use crate::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid uid: `{0}`")]
    InvalidUid(String),
    #[error("malformed dimension `{key}`: {reason}")]
    MalformedDimension { key: String, reason: String },
    #[error("malformed filter on `{dimension}`: {reason}")]
    MalformedFilter { dimension: String, reason: String },
    #[error("value `{value}` is not a valid {value_type}")]
    InvalidCellValue {
        value_type: ValueType,
        value: String,
    },
}

impl ModelError {
    pub(crate) fn dimension(key: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDimension {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn filter(dimension: &str, reason: impl Into<String>) -> Self {
        Self::MalformedFilter {
            dimension: dimension.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
