use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_settings, resolve_app_config, save_settings};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Switch to an API base URL (persistent selection)")]
    Use {
        #[arg(help = "API base URL, e.g. https://portfolio.example.com/api")]
        url: String,
    },

    #[command(about = "Show the API base URL commands will talk to")]
    Current,

    #[command(about = "Check that the API base URL answers")]
    Ping,
}

/// The server a command would talk to; `--api-url` wins over the saved selection
fn target_config(api_url: Option<&str>) -> anyhow::Result<AppConfig> {
    resolve_app_config(crate::config::config(), api_url)
}

pub async fn handle(
    cmd: ServerCommands,
    api_url: Option<&str>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Use { url } => {
            let parsed = url::Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("invalid API URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("API URL must use http or https, got '{}'", parsed.scheme());
            }

            let mut settings = load_settings()?;
            settings.set_api_url(url.clone());
            save_settings(&settings)?;

            output_success(
                &output_format,
                &format!("Now using {}", url),
                Some(json!({ "api_url": url })),
            )
        }
        ServerCommands::Current => {
            let config = target_config(api_url)?;
            let saved = load_settings()?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "api_url": config.api.base_url,
                        "saved_api_url": saved.api_url,
                        "updated_at": saved.updated_at,
                    }))?);
                }
                OutputFormat::Text => {
                    println!("API: {}", config.api.base_url);
                    if let (Some(_), Some(updated_at)) = (saved.api_url, saved.updated_at) {
                        println!("Selected: {}", updated_at.format("%Y-%m-%d %H:%M UTC"));
                    }
                }
            }
            Ok(())
        }
        ServerCommands::Ping => {
            let config = target_config(api_url)?;
            let started = std::time::Instant::now();
            let response = reqwest::Client::new()
                .get(&config.api.base_url)
                .timeout(std::time::Duration::from_secs(10))
                .send()
                .await;

            match response {
                Ok(response) => {
                    let elapsed = started.elapsed().as_millis();
                    output_success(
                        &output_format,
                        &format!("{} answered {} in {}ms", config.api.base_url, response.status(), elapsed),
                        Some(json!({
                            "api_url": config.api.base_url,
                            "status": response.status().as_u16(),
                            "elapsed_ms": elapsed,
                        })),
                    )
                }
                Err(e) => Err(anyhow::anyhow!("{} is unreachable: {}", config.api.base_url, e)),
            }
        }
    }
}
