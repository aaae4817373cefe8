use clap::Subcommand;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::json;

use crate::app::SessionState;
use crate::cli::utils::*;
use crate::cli::{CliContext, OutputFormat};
use crate::services::Credentials;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the portfolio API")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show the user the server associates with the token")]
    Whoami,
}

/// Claims of the stored token, read without verifying the signature
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
}

pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let output_format = &ctx.output_format;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_line("Password: ")?,
            };
            let credentials = Credentials::new(username, password);

            match ctx.app.login(&credentials).await {
                Ok(_) => output_success(
                    output_format,
                    &format!("Logged in as {}", credentials.username),
                    Some(json!({ "user": credentials.username })),
                ),
                Err(e) => Err(report_error(output_format, e)),
            }
        }
        AuthCommands::Logout => {
            ctx.app
                .logout()
                .await
                .map_err(|e| report_error(output_format, e))?;
            output_success(output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let token = ctx.app.client().session().get();
            let claims = token.as_deref().and_then(peek_claims);
            let state = ctx.app.start().await;

            let (authenticated, user) = match &state {
                SessionState::Authenticated { user } => (true, user.clone()),
                _ => (false, None),
            };
            let expires_at = claims
                .as_ref()
                .and_then(|c| c.exp)
                .and_then(|exp| chrono::DateTime::from_timestamp(exp, 0));

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "server": ctx.app.client().base_url().as_str(),
                        "authenticated": authenticated,
                        "user": user,
                        "token_subject": claims.as_ref().and_then(|c| c.sub.clone()),
                        "token_expires_at": expires_at,
                    }))?);
                }
                OutputFormat::Text => {
                    println!("Server: {}", ctx.app.client().base_url());
                    match (authenticated, token.is_some()) {
                        (true, _) => println!(
                            "Authenticated as {}",
                            user.as_deref().unwrap_or("unknown user")
                        ),
                        (false, true) => println!("Stored token was rejected and has been cleared"),
                        (false, false) => println!("Not logged in"),
                    }
                    if let (true, Some(expires_at)) = (authenticated, expires_at) {
                        println!("Token expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            ctx.require_session()?;
            match ctx.app.start().await {
                SessionState::Authenticated { user } => {
                    let user = user.unwrap_or_else(|| "unknown user".to_string());
                    output_success(output_format, &user, Some(json!({ "user": user })))
                }
                _ => Err(anyhow::anyhow!("Session is no longer valid. Run `folio auth login <username>`")),
            }
        }
    }
}
