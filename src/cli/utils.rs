use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::panel::PanelMessage;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Report a client error in the appropriate format and hand it back for the
/// exit path. Text mode leaves the headline to `main`.
pub fn report_error(output_format: &OutputFormat, error: ClientError) -> anyhow::Error {
    match output_format {
        OutputFormat::Json => match serde_json::to_string_pretty(&error.to_json()) {
            Ok(body) => println!("{}", body),
            Err(e) => return e.into(),
        },
        OutputFormat::Text => {
            if let ClientError::Validation { field_errors, .. } = &error {
                if field_errors.len() > 1 {
                    for (field, message) in field_errors {
                        eprintln!("  {}: {}", field, message);
                    }
                }
            }
        }
    }
    anyhow::Error::new(error)
}

/// Print the panel's transient message, if it left one
pub fn output_panel_message(
    output_format: &OutputFormat,
    message: Option<&PanelMessage>,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match message {
        Some(message) if !message.is_error() => output_success(output_format, &message.text, data),
        _ => Ok(()),
    }
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print `rows` as `ID  SUMMARY` lines, or the raw records as JSON
pub fn output_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    records: Value,
    rows: &[(String, String)],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: records
            }))?);
        }
        OutputFormat::Text => {
            let id_width = rows.iter().map(|(id, _)| id.len()).max().unwrap_or(2).max(2);
            println!("{:<width$}  {}", "ID", "SUMMARY", width = id_width);
            println!("{}", "-".repeat(id_width + 40));
            for (id, summary) in rows {
                println!("{:<width$}  {}", id, summary, width = id_width);
            }
        }
    }
    Ok(())
}

/// Read a record form from a file or stdin (`-` or no path).
///
/// JSON is tried first, then YAML.
pub fn read_form(path: Option<&Path>) -> anyhow::Result<Value> {
    let content = match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_form(&content)
}

pub fn parse_form(content: &str) -> anyhow::Result<Value> {
    if content.trim().is_empty() {
        anyhow::bail!("no form data provided");
    }

    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(content)
            .map_err(|yaml_err| anyhow::anyhow!("form is neither JSON ({}) nor YAML ({})", json_err, yaml_err)),
    }
}

/// Ask a yes/no question on stderr; anything but y/yes declines
pub fn prompt_confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Render a server timestamp (RFC 2822 from the API) as `YYYY-MM-DD HH:MM`
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(text) => chrono::DateTime::parse_from_rfc2822(text)
            .or_else(|_| chrono::DateTime::parse_from_rfc3339(text))
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| text.to_string()),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_parse_from_json_or_yaml() {
        let json_form = parse_form(r#"{"name": "Rust"}"#).unwrap();
        assert_eq!(json_form["name"], "Rust");

        let yaml_form = parse_form("title: Engineer\npoints:\n  - Shipped\n  - Led\n").unwrap();
        assert_eq!(yaml_form["points"][1], "Led");

        assert!(parse_form("   ").is_err());
    }

    #[test]
    fn timestamps_render_from_rfc2822() {
        assert_eq!(
            format_timestamp(Some("Mon, 02 Sep 2024 10:30:00 GMT")),
            "2024-09-02 10:30"
        );
        assert_eq!(format_timestamp(Some("yesterday")), "yesterday");
        assert_eq!(format_timestamp(None), "-");
    }
}
