//! Single egress point for every portfolio API call.
//!
//! The client attaches the stored bearer token to each request and owns the
//! global reaction to a rejected session: on HTTP 401 it clears the session
//! store, notifies the unauthenticated hook with the login route, and only
//! then hands the failure back to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::Envelope;
use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

/// Invoked with the login route whenever the server rejects the session
pub type UnauthenticatedHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-call adjustments layered over the client defaults
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Extra or overriding headers for this call only
    pub headers: HeaderMap,
    /// A 401 on an anonymous call is a credential rejection, not a
    /// session rejection: the store is left alone
    pub anonymous: bool,
}

impl RequestOptions {
    pub fn anonymous() -> Self {
        Self {
            anonymous: true,
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> ClientResult<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid header name {}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Config(format!("invalid header {}: {}", name, e)))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }
}

pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    login_route: String,
    on_unauthenticated: Option<UnauthenticatedHook>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("login_route", &self.login_route)
            .field("authenticated", &self.session.is_present())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &AppConfig, session: Arc<dyn SessionStore>) -> ClientResult<Self> {
        let base_url = normalize_base_url(&config.api.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(agent) = HeaderValue::from_str(&config.api.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
            login_route: config.session.login_route.clone(),
            on_unauthenticated: None,
        })
    }

    /// Install the navigation callback fired after a 401 teardown
    pub fn on_unauthenticated<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_unauthenticated = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Resolve an API path (`admin/projects/42`) against the base URL
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Envelope<T>> {
        self.send(Method::GET, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, json_body(body)?, RequestOptions::default())
            .await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Envelope<T>> {
        self.send(Method::POST, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, json_body(body)?, RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Envelope<T>> {
        self.send(Method::DELETE, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        options: RequestOptions,
    ) -> ClientResult<Envelope<T>> {
        self.send(Method::POST, path, RequestBody::Multipart(form), options)
            .await
    }

    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ClientResult<Envelope<T>> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.session.get() {
            request = request.bearer_auth(token);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };
        if !options.headers.is_empty() {
            request = request.headers(options.headers);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!("{} {} failed: {}", method, path, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            let message = server_message(&bytes)
                .unwrap_or_else(|| "Session expired, please log in again".to_string());
            if options.anonymous {
                return Err(ClientError::http(status.as_u16(), message));
            }
            self.end_session();
            return Err(ClientError::authentication(message));
        }

        if !status.is_success() {
            let message = server_message(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            tracing::debug!("{} {} -> {}: {}", method, path, status, message);
            return Err(ClientError::http(status.as_u16(), message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::empty_success());
        }

        serde_json::from_slice::<Envelope<T>>(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Clear the stored token and hand control to the navigation hook
    fn end_session(&self) {
        tracing::warn!(
            "Session rejected by server, redirecting to {}",
            self.login_route
        );
        if let Err(e) = self.session.clear() {
            tracing::warn!("Failed to clear session: {}", e);
        }
        if let Some(hook) = &self.on_unauthenticated {
            hook(&self.login_route);
        }
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> ClientResult<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| ClientError::Decode(format!("failed to encode request body: {}", e)))
}

/// Base URLs are joined against, so they must end with a slash
fn normalize_base_url(raw: &str) -> ClientResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(ClientError::Config(format!("'{}' cannot be used as a base URL", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Pull a human message out of an error body.
///
/// The portfolio routes answer `{message}`; the JWT layer in front of them
/// answers `{msg}`.
fn server_message(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    ["message", "msg", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
