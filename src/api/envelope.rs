use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Uniform response body returned by every portfolio API endpoint.
///
/// `data` is only meaningful when `success` is true. The remaining optional
/// fields are endpoint-specific: `access_token` (login), `user`
/// (verify-token), `id` (create) and `file_path` (CV upload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

// `#[serde(default)]` would require `T: Default`
fn none<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            access_token: None,
            user: None,
            id: None,
            file_path: None,
        }
    }

    /// What a 2xx with an empty body stands for
    pub fn empty_success() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            access_token: None,
            user: None,
            id: None,
            file_path: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            access_token: None,
            user: None,
            id: None,
            file_path: None,
        }
    }

    /// Turn `success: false` into `ClientError::Rejected`, using `fallback`
    /// when the server sent no message
    pub fn ensure_success(self, fallback: &str) -> ClientResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ClientError::rejected(
                self.message.unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }

    /// Display name for the identity `verify-token` returned. The server may
    /// send a bare name or a user object.
    pub fn user_label(&self) -> Option<String> {
        match self.user.as_ref()? {
            Value::Null => None,
            Value::String(name) => Some(name.clone()),
            Value::Object(fields) => ["username", "name", "email"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| Some(Value::Object(fields.clone()).to_string())),
            other => Some(other.to_string()),
        }
    }

    /// Checked access to the payload
    pub fn into_data(self, fallback: &str) -> ClientResult<T> {
        let envelope = self.ensure_success(fallback)?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }
}
