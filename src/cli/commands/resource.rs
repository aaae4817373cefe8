use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::api::Resource;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::panel::CrudPanel;

/// Commands shared by every record kind
#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List all records")]
    List,

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Record id")]
        id: String,
    },

    #[command(about = "Create a record from a JSON or YAML form")]
    Create {
        #[arg(long, short, help = "Form file (reads stdin when omitted or '-')")]
        file: Option<PathBuf>,
    },

    #[command(about = "Update a record with the fields in a JSON or YAML form")]
    Update {
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, short, help = "Form file (reads stdin when omitted or '-')")]
        file: Option<PathBuf>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle<R: Resource>(cmd: ResourceCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;

    let output_format = &ctx.output_format;
    let mut panel: CrudPanel<R> = ctx.app.panel();

    match cmd {
        ResourceCommands::List => {
            panel.refresh().await.map_err(|e| report_error(output_format, e))?;
            print_items(output_format, &panel)
        }
        ResourceCommands::Show { id } => {
            panel.refresh().await.map_err(|e| report_error(output_format, e))?;
            let record = panel
                .find(&id)
                .ok_or_else(|| anyhow::anyhow!("{} '{}' not found", R::LABEL, id))?;

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(record)?);
                }
                OutputFormat::Text => {
                    println!("{}: {}", R::LABEL, record.id());
                    println!("{}", serde_yaml::to_string(record)?);
                }
            }
            Ok(())
        }
        ResourceCommands::Create { file } => {
            let form = read_form(file.as_deref())?;
            let envelope = panel
                .submit(&form)
                .await
                .map_err(|e| report_error(output_format, e))?;

            let created_id = envelope
                .id
                .or_else(|| envelope.data.as_ref().map(|record| record.id().to_string()));
            output_panel_message(output_format, panel.message(), Some(json!({ "id": created_id })))
        }
        ResourceCommands::Update { id, file } => {
            let form = read_form(file.as_deref())?;
            panel.begin_edit(id.as_str());
            panel
                .submit(&form)
                .await
                .map_err(|e| report_error(output_format, e))?;

            output_panel_message(output_format, panel.message(), Some(json!({ "id": id })))
        }
        ResourceCommands::Delete { id, yes } => {
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
    }
}

fn print_items<R: Resource>(output_format: &OutputFormat, panel: &CrudPanel<R>) -> anyhow::Result<()> {
    let collection = collection_name(R::LABEL);
    if panel.items().is_empty() {
        return output_empty_collection(output_format, &collection, &format!("No {} records", R::LABEL));
    }

    let rows: Vec<(String, String)> = panel
        .items()
        .iter()
        .map(|record| (record.id().to_string(), record.summary()))
        .collect();
    output_collection(output_format, &collection, serde_json::to_value(panel.items())?, &rows)
}

/// `work experience` -> `work_experiences`, `technology` -> `technologies`
fn collection_name(label: &str) -> String {
    let snake = label.replace(' ', "_");
    match snake.strip_suffix('y') {
        Some(stem) => format!("{}ies", stem),
        None => format!("{}s", snake),
    }
}
