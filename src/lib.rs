pub mod api;
pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod panel;
pub mod services;
pub mod session;
pub mod validation;

pub use app::{AdminApp, Navigator, SessionState};
pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
