use std::fmt;

#[derive(Debug)]
pub enum GeminiError {
    ConfigError(String),
    MissingInput(String),
    RequestError(String),
    SerializationError(String),
    HttpError(String),
    ServiceError { status: u16, message: String },
    ResponseError(String),
    NoImage(String),
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            GeminiError::MissingInput(msg) => write!(f, "{}", msg),
            GeminiError::RequestError(msg) => write!(f, "Request error: {}", msg),
            GeminiError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            GeminiError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            GeminiError::ServiceError { status, message } => {
                write!(f, "Gemini service error ({}): {}", status, message)
            }
            GeminiError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            GeminiError::NoImage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for GeminiError {}

pub type Result<T> = std::result::Result<T, GeminiError>;

/// Coarse-grained failure category surfaced to the caller. The UI layer only
/// ever sees one of these plus a display-ready message, never a raw
/// transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    MissingInput,
    QuotaExceeded,
    TransientServerError,
    NoImageReturned,
    Unclassified,
}

impl GeminiError {
    pub fn classify(&self) -> ErrorClass {
        match self {
            GeminiError::MissingInput(_) => ErrorClass::MissingInput,
            GeminiError::NoImage(_) => ErrorClass::NoImageReturned,
            GeminiError::ServiceError { status, message } => {
                if Self::is_quota_signal(*status, message) {
                    ErrorClass::QuotaExceeded
                } else if Self::is_server_signal(*status, message) {
                    ErrorClass::TransientServerError
                } else {
                    ErrorClass::Unclassified
                }
            }
            _ => {
                let msg = self.to_string();
                if Self::is_quota_signal(0, &msg) {
                    ErrorClass::QuotaExceeded
                } else if Self::is_server_signal(0, &msg) {
                    ErrorClass::TransientServerError
                } else {
                    ErrorClass::Unclassified
                }
            }
        }
    }

    /// Transient errors are the only ones worth retrying.
    pub fn is_transient(&self) -> bool {
        self.classify() == ErrorClass::TransientServerError
    }

    fn is_quota_signal(status: u16, message: &str) -> bool {
        status == 429
            || message.contains("429")
            || message.contains("Quota")
            || message.contains("RESOURCE_EXHAUSTED")
    }

    fn is_server_signal(status: u16, message: &str) -> bool {
        status == 500
            || status == 503
            || message.contains("500")
            || message.contains("503")
            || message.contains("INTERNAL")
            || message.contains("UNAVAILABLE")
    }

    /// Display-ready message for the final outcome of an attempt sequence.
    pub fn user_message(&self) -> String {
        match self.classify() {
            ErrorClass::MissingInput | ErrorClass::Unclassified => self.to_string(),
            ErrorClass::QuotaExceeded => {
                "Quota exceeded. The Pro image model requires a paid API key (Pay-as-you-go). Please select a paid key.".to_string()
            }
            ErrorClass::TransientServerError => {
                "Internal server error. The model is currently experiencing high traffic or instability. Please wait a moment and try again.".to_string()
            }
            ErrorClass::NoImageReturned => "Failed to generate image.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_server_statuses_as_transient() {
        let err = GeminiError::ServiceError {
            status: 503,
            message: "overloaded".into(),
        };
        assert_eq!(err.classify(), ErrorClass::TransientServerError);
        assert!(err.is_transient());

        let err = GeminiError::ServiceError {
            status: 500,
            message: "boom".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn classifies_internal_message_as_transient() {
        let err = GeminiError::HttpError("code INTERNAL while streaming body".into());
        assert_eq!(err.classify(), ErrorClass::TransientServerError);
    }

    #[test]
    fn classifies_quota_signals_as_terminal() {
        let err = GeminiError::ServiceError {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(err.classify(), ErrorClass::QuotaExceeded);
        assert!(!err.is_transient());

        let err = GeminiError::ServiceError {
            status: 400,
            message: "RESOURCE_EXHAUSTED: daily limit".into(),
        };
        assert_eq!(err.classify(), ErrorClass::QuotaExceeded);
    }

    #[test]
    fn missing_input_and_no_image_keep_their_own_classes() {
        assert_eq!(
            GeminiError::MissingInput("Please upload an image to edit.".into()).classify(),
            ErrorClass::MissingInput
        );
        assert_eq!(
            GeminiError::NoImage("No image generated in the response.".into()).classify(),
            ErrorClass::NoImageReturned
        );
    }

    #[test]
    fn everything_else_is_unclassified_and_passed_through() {
        let err = GeminiError::ServiceError {
            status: 400,
            message: "invalid argument: bad mime type".into(),
        };
        assert_eq!(err.classify(), ErrorClass::Unclassified);
        assert!(err.user_message().contains("bad mime type"));
    }

    #[test]
    fn quota_message_points_at_paid_key() {
        let err = GeminiError::ServiceError {
            status: 429,
            message: "quota".into(),
        };
        assert!(err.user_message().contains("paid API key"));
    }
}
