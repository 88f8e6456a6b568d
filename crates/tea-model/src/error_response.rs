use serde::{Deserialize, Serialize};

/// Status value carried by every error body.
pub const ERROR_STATUS: &str = "ERROR";

/// Body returned instead of an envelope when a query cannot be answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub http_status: String,
    pub http_status_code: u16,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl ErrorResponse {
    pub fn new(http_status_code: u16, message: impl Into<String>) -> Self {
        Self {
            http_status: reason_phrase(http_status_code).to_string(),
            http_status_code,
            status: ERROR_STATUS.to_string(),
            message: message.into(),
            error_code: None,
        }
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code)
    }
}

fn reason_phrase(code: u16) -> &'static str {
    match code {
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_body() {
        let body = ErrorResponse::new(409, "Period not valid: `INVALID_PERIOD`")
            .with_error_code("E7611");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "httpStatus": "Conflict",
                "httpStatusCode": 409,
                "status": "ERROR",
                "message": "Period not valid: `INVALID_PERIOD`",
                "errorCode": "E7611"
            })
        );
        assert!(body.is_client_error());
    }
}
