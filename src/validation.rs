//! Client-side form checks. Everything here runs before a request is built.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::api::Resource;
use crate::config::UploadConfig;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Every required field must be filled
    Create,
    /// Only the fields present are checked
    Update,
}

pub fn validate_credentials(username: &str, password: &str) -> ClientResult<()> {
    let mut field_errors = BTreeMap::new();
    if username.trim().is_empty() {
        field_errors.insert("username".to_string(), "Username is required".to_string());
    }
    if password.is_empty() {
        field_errors.insert("password".to_string(), "Password is required".to_string());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::validation(field_errors))
    }
}

/// Check a serialized form against the required fields of `R`
pub fn validate_form<R: Resource>(form: &Value, mode: FormMode) -> ClientResult<()> {
    let object = match form {
        Value::Object(object) => object,
        _ => return Err(ClientError::field("form", "Form must be a JSON object")),
    };

    if mode == FormMode::Update && object.is_empty() {
        return Err(ClientError::field("form", "Nothing to update"));
    }

    let mut field_errors = BTreeMap::new();
    for field in R::REQUIRED {
        let filled = match object.get(*field) {
            Some(value) => is_filled(value),
            None => mode == FormMode::Update,
        };
        if !filled {
            field_errors.insert(field.to_string(), format!("{} is required", field));
        }
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ClientError::validation(field_errors))
    }
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => items.iter().any(is_filled),
        _ => true,
    }
}

/// CV pre-checks: document type first, then size
pub fn check_upload(content_type: &str, size: u64, limits: &UploadConfig) -> ClientResult<()> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !limits.allowed_types.iter().any(|allowed| *allowed == essence) {
        return Err(ClientError::UnsupportedFile {
            content_type: content_type.to_string(),
        });
    }

    if size > limits.max_bytes {
        return Err(ClientError::FileTooLarge {
            size,
            limit: limits.max_bytes,
        });
    }

    Ok(())
}
