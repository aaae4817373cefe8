use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::Envelope;
use crate::client::{ApiClient, RequestBody, RequestOptions};
use crate::error::{ClientError, ClientResult};

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Login, token verification and logout against `/auth`
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Exchange credentials for an access token.
    ///
    /// The token is returned in the envelope, not stored; persisting it is
    /// the caller's decision. A 401 here rejects the credentials only and
    /// leaves any stored session alone.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Envelope<()>> {
        let body = serde_json::to_value(credentials)
            .map_err(|e| ClientError::Decode(format!("failed to encode credentials: {}", e)))?;

        self.client
            .send(
                Method::POST,
                "auth/login",
                RequestBody::Json(body),
                RequestOptions::anonymous(),
            )
            .await
    }

    /// Confirm server-side that the attached token is still valid
    pub async fn verify_token(&self) -> ClientResult<Envelope<()>> {
        self.client.get("auth/verify-token").await
    }

    /// Notify the server, then clear the local session whatever it answered.
    ///
    /// The server's result is returned so callers can log it; a failure here
    /// never leaves a token behind.
    pub async fn logout(&self) -> ClientResult<Envelope<()>> {
        let notified = self.client.post_empty::<()>("auth/logout").await;
        if let Err(e) = &notified {
            tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
        }

        self.client.session().clear()?;
        tracing::info!("Logged out");
        notified
    }
}
