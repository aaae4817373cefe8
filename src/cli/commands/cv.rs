use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::api::format_file_size;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::services::UploadFile;

#[derive(Subcommand)]
pub enum CvCommands {
    #[command(about = "List uploaded CV documents")]
    List,

    #[command(about = "Upload a CV (PDF, DOC or DOCX, at most 10 MB)")]
    Upload {
        #[arg(help = "Path to the document")]
        path: PathBuf,
    },

    #[command(about = "Delete a CV document")]
    Delete {
        #[arg(help = "CV id")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Print the public download URL of a CV")]
    Url {
        #[arg(help = "CV id")]
        id: String,
    },
}

pub async fn handle(cmd: CvCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;

    let output_format = &ctx.output_format;
    let mut panel = ctx.app.cv_panel();

    match cmd {
        CvCommands::List => {
            panel.refresh().await.map_err(|e| report_error(output_format, e))?;
            if panel.items().is_empty() {
                return output_empty_collection(output_format, "cvs", "No CV uploaded yet");
            }

            let rows: Vec<(String, String)> = panel
                .items()
                .iter()
                .map(|cv| {
                    let size = cv.size.map(format_file_size).unwrap_or_else(|| "-".to_string());
                    let uploaded = format_timestamp(cv.created_at.as_deref());
                    (cv.id.clone(), format!("{}  {}  {}", cv.filename, size, uploaded))
                })
                .collect();
            output_collection(output_format, "cvs", serde_json::to_value(panel.items())?, &rows)
        }
        CvCommands::Upload { path } => {
            let file = UploadFile::from_path(&path, &ctx.app.config().upload)
                .map_err(|e| report_error(output_format, e))?;
            let size = file.size();
            let envelope = panel
                .upload(file)
                .await
                .map_err(|e| report_error(output_format, e))?;

            let file_path = envelope
                .file_path
                .or_else(|| envelope.data.as_ref().map(|cv| cv.file_path.clone()));
            output_panel_message(
                output_format,
                panel.message(),
                Some(json!({
                    "file_path": file_path,
                    "size": size,
                })),
            )
        }
        CvCommands::Delete { id, yes } => {
            let confirm = |prompt: &str| yes || prompt_confirm(prompt);
            let deleted = panel
                .delete(&id, &confirm)
                .await
                .map_err(|e| report_error(output_format, e))?;

            if deleted {
                output_panel_message(output_format, panel.message(), Some(json!({ "id": id })))
            } else {
                output_success(output_format, "Cancelled, nothing was deleted", Some(json!({ "deleted": false })))
            }
        }
        CvCommands::Url { id } => {
            panel.refresh().await.map_err(|e| report_error(output_format, e))?;
            let cv = panel
                .find(&id)
                .ok_or_else(|| anyhow::anyhow!("CV '{}' not found", id))?;
            let url = panel
                .service()
                .download_url(cv)
                .map_err(|e| report_error(output_format, e))?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "id": cv.id,
                        "filename": cv.filename,
                        "url": url.as_str(),
                    }))?);
                }
                OutputFormat::Text => println!("{}", url),
            }
            Ok(())
        }
    }
}
