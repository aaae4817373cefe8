// Client Error Types
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Errors surfaced by the admin client, from form validation through transport
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Client-side, field-level; never reaches the network
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    // 401 - session torn down by the client before this is returned
    #[error("{message}")]
    Authentication { message: String },

    // Any other non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    // 2xx response whose envelope reports success: false
    #[error("{message}")]
    Rejected { message: String },

    // Transport failure (connect, timeout, TLS)
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unsupported file type '{content_type}': only PDF and Word documents are allowed")]
    UnsupportedFile { content_type: String },

    #[error("File is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Malformed response body: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// HTTP status associated with the error, when one exists
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Authentication { .. } => Some(401),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message suitable for showing inline to the administrator
    pub fn message(&self) -> String {
        match self {
            ClientError::Validation { message, .. } => message.clone(),
            ClientError::Authentication { message } => message.clone(),
            ClientError::Http { message, .. } => message.clone(),
            ClientError::Rejected { message } => message.clone(),
            ClientError::Network { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Authentication { .. } => "UNAUTHORIZED",
            ClientError::Http { .. } => "HTTP_ERROR",
            ClientError::Rejected { .. } => "REJECTED",
            ClientError::Network { .. } => "NETWORK_ERROR",
            ClientError::UnsupportedFile { .. } => "UNSUPPORTED_FILE",
            ClientError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True when the error was raised locally, before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation { .. }
                | ClientError::UnsupportedFile { .. }
                | ClientError::FileTooLarge { .. }
                | ClientError::Config(_)
        )
    }

    /// Convert to a JSON body for `--json` output
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code()
        });

        if let Some(status) = self.status_code() {
            response["status"] = json!(status);
        }

        if let ClientError::Validation { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

// Static constructor methods
impl ClientError {
    pub fn validation(field_errors: BTreeMap<String, String>) -> Self {
        let message = match field_errors.len() {
            1 => field_errors
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| "Invalid form".to_string()),
            n => format!("{} fields are invalid", n),
        };
        ClientError::Validation { message, field_errors }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.to_string(), message.into());
        Self::validation(field_errors)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ClientError::Authentication { message: message.into() }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        ClientError::Http { status, message: message.into() }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        ClientError::Rejected { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ClientError::Storage(message.into())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "The server did not answer in time".to_string()
        } else if err.is_connect() {
            "Unable to reach the server".to_string()
        } else if err.is_decode() {
            return ClientError::Decode(err.to_string());
        } else {
            "Network error".to_string()
        };
        ClientError::Network { message, source: err }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}
