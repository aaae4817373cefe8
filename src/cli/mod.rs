pub mod commands;
pub mod config;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::api::{Certification, Project, Technology, Testimonial, WorkExperience};
use crate::app::AdminApp;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI - Administration client for the portfolio API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL for this invocation")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Select the portfolio API to administer")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Work experience entries")]
    WorkExperience {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Testimonials")]
    Testimonial {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Certifications")]
    Certification {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Projects")]
    Project {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Technologies")]
    Technology {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "CV documents")]
    Cv {
        #[command(subcommand)]
        cmd: commands::cv::CvCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command handler needs
pub struct CliContext {
    pub app: AdminApp,
    pub output_format: OutputFormat,
}

impl CliContext {
    pub fn new(api_url: Option<&str>, output_format: OutputFormat) -> anyhow::Result<Self> {
        let app_config = config::resolve_app_config(crate::config::config(), api_url)?;
        let store = config::session_store(&app_config)?;

        let navigator = |route: &str| {
            eprintln!(
                "Session expired or rejected ({}). Log in again with `folio auth login <username>`.",
                route
            );
        };
        let app = AdminApp::new(app_config, Arc::new(store), Arc::new(navigator))?;

        Ok(Self { app, output_format })
    }

    /// Resource commands need a stored token; its validity is left to the server
    pub fn require_session(&self) -> anyhow::Result<()> {
        if self.app.client().session().is_present() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Not logged in. Run `folio auth login <username>` first"))
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    if let Commands::Server { cmd } = cli.command {
        return commands::server::handle(cmd, cli.api_url.as_deref(), output_format).await;
    }

    let ctx = CliContext::new(cli.api_url.as_deref(), output_format)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::WorkExperience { cmd } => commands::resource::handle::<WorkExperience>(cmd, &ctx).await,
        Commands::Testimonial { cmd } => commands::resource::handle::<Testimonial>(cmd, &ctx).await,
        Commands::Certification { cmd } => commands::resource::handle::<Certification>(cmd, &ctx).await,
        Commands::Project { cmd } => commands::resource::handle::<Project>(cmd, &ctx).await,
        Commands::Technology { cmd } => commands::resource::handle::<Technology>(cmd, &ctx).await,
        Commands::Cv { cmd } => commands::cv::handle(cmd, &ctx).await,
        Commands::Server { .. } => Ok(()),
    }
}
