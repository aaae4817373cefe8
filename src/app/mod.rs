//! Application shell: the session gate in front of the admin panels.
//!
//! States are `Unauthenticated`, `VerifyingSession` and `Authenticated`.
//! Only the token is persisted; the state itself is rebuilt by `start`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::Resource;
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::panel::{CrudPanel, CvPanel};
use crate::services::{AuthService, Credentials, CvService, ResourceService};
use crate::session::SessionStore;
use crate::validation::validate_credentials;

/// Fallback shown when a login is refused without a server message
pub const LOGIN_FAILED: &str = "Erreur de connexion";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    VerifyingSession,
    Authenticated { user: Option<String> },
}

/// Receives the login route when the session ends underneath the app
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

pub struct AdminApp {
    config: AppConfig,
    client: ApiClient,
    auth: AuthService,
    state: Arc<Mutex<SessionState>>,
}

impl AdminApp {
    pub fn new(
        config: AppConfig,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let state = Arc::new(Mutex::new(SessionState::Unauthenticated));

        let hook_state = Arc::clone(&state);
        let client = ApiClient::new(&config, session)?.on_unauthenticated(move |route| {
            *hook_state.lock() = SessionState::Unauthenticated;
            navigator.navigate(route);
        });
        let auth = AuthService::new(client.clone());

        Ok(Self {
            config,
            client,
            auth,
            state,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Authenticated { .. })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Rebuild the session state from the stored token
    pub async fn start(&self) -> SessionState {
        if !self.client.session().is_present() {
            return self.transition(SessionState::Unauthenticated);
        }

        self.transition(SessionState::VerifyingSession);
        match self.auth.verify_token().await {
            Ok(envelope) if envelope.success => {
                self.transition(SessionState::Authenticated { user: envelope.user_label() })
            }
            Ok(envelope) => {
                tracing::info!(
                    "Stored session refused: {}",
                    envelope.message.as_deref().unwrap_or("no reason given")
                );
                self.drop_session()
            }
            Err(e) => {
                tracing::info!("Stored session could not be verified: {}", e);
                self.drop_session()
            }
        }
    }

    /// Validate, exchange credentials for a token and persist it.
    ///
    /// Any refusal leaves the stored session untouched and carries the
    /// server's message verbatim.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<SessionState> {
        validate_credentials(&credentials.username, &credentials.password)?;

        let envelope = self.auth.login(credentials).await?.ensure_success(LOGIN_FAILED)?;
        let token = envelope
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::Decode("login response carried no access token".to_string()))?;

        self.client.session().set(&token)?;
        tracing::info!("Logged in as {}", credentials.username);
        Ok(self.transition(SessionState::Authenticated {
            user: Some(credentials.username.clone()),
        }))
    }

    /// Always ends in `Unauthenticated`; only a local storage failure is an error
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self.auth.logout().await;
        self.transition(SessionState::Unauthenticated);

        match result {
            Err(e @ ClientError::Storage(_)) => Err(e),
            _ => Ok(()),
        }
    }

    pub fn resource<R: Resource>(&self) -> ResourceService<R> {
        ResourceService::new(self.client.clone())
    }

    pub fn cv(&self) -> CvService {
        CvService::new(self.client.clone(), self.config.upload.clone())
    }

    pub fn panel<R: Resource>(&self) -> CrudPanel<R> {
        CrudPanel::new(self.resource())
    }

    pub fn cv_panel(&self) -> CvPanel {
        CvPanel::new(self.cv())
    }

    fn drop_session(&self) -> SessionState {
        if let Err(e) = self.client.session().clear() {
            tracing::warn!("Failed to clear session: {}", e);
        }
        self.transition(SessionState::Unauthenticated)
    }

    fn transition(&self, next: SessionState) -> SessionState {
        let mut state = self.state.lock();
        if *state != next {
            tracing::debug!("Session state {:?} -> {:?}", *state, next);
        }
        *state = next.clone();
        next
    }
}
