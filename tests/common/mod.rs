#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use portfolio_admin::config::AppConfig;
use portfolio_admin::session::{MemorySessionStore, SessionStore};
use portfolio_admin::{AdminApp, ApiClient, Navigator};
use serde_json::{json, Map, Value};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin123";
pub const TOKEN: &str = "test-token";

/// One request as the mock API saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    collections: Mutex<HashMap<String, Vec<Value>>>,
    overrides: Mutex<HashMap<(String, String), (u16, Value)>>,
    valid_token: Mutex<String>,
    next_id: AtomicU64,
}

/// In-process stand-in for the portfolio API, mounted under `/api`
pub struct MockApi {
    pub port: u16,
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let state = Arc::new(MockState::default());
        *state.valid_token.lock() = TOKEN.to_string();

        let app = Router::new()
            .fallback(handle)
            .layer(DefaultBodyLimit::max(32 * 1024 * 1024))
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock API")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}/api", port),
            state,
        })
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::development().with_base_url(self.base_url.as_str())
    }

    /// Force `status` and `body` for `method path`; a null body is sent empty
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.state
            .overrides
            .lock()
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    /// Make the server reject every token it has issued
    pub fn expire_tokens(&self) {
        *self.state.valid_token.lock() = "rotated".to_string();
    }

    /// Insert a record and return its id
    pub fn seed(&self, kind: &str, mut record: Value) -> String {
        let id = match record.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = self.state.new_id();
                record["_id"] = json!(id);
                id
            }
        };
        self.state
            .collections
            .lock()
            .entry(kind.to_string())
            .or_default()
            .push(record);
        id
    }

    pub fn records(&self, kind: &str) -> Vec<Value> {
        self.state
            .collections
            .lock()
            .get(kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().last().cloned()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().clear();
    }
}

impl MockState {
    fn new_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("64f{:021x}", n)
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().trim_start_matches("/api/").to_string();
    let request = RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: body.to_vec(),
    };
    state.requests.lock().push(request.clone());

    let forced = state
        .overrides
        .lock()
        .get(&(request.method.clone(), path.clone()))
        .cloned();
    if let Some((status, body)) = forced {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return match body {
            Value::Null => status.into_response(),
            body => (status, Json(body)).into_response(),
        };
    }

    if method == Method::POST && path == "auth/login" {
        return login(&state, &request);
    }

    let expected = format!("Bearer {}", state.valid_token.lock());
    if request.authorization.as_deref() != Some(expected.as_str()) {
        return reply(StatusCode::UNAUTHORIZED, json!({ "msg": "Token has expired" }));
    }

    match (method.as_str(), path.as_str()) {
        ("GET", "auth/verify-token") => reply(StatusCode::OK, json!({ "success": true, "user": USERNAME })),
        ("POST", "auth/logout") => reply(StatusCode::OK, json!({ "success": true, "message": "Déconnexion réussie" })),
        _ => admin(&state, &method, &path, &request),
    }
}

fn login(state: &MockState, request: &RecordedRequest) -> Response {
    let body = request.json().unwrap_or(Value::Null);
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        let token = state.valid_token.lock().clone();
        reply(
            StatusCode::OK,
            json!({ "success": true, "access_token": token, "message": "Connexion réussie" }),
        )
    } else {
        reply(
            StatusCode::UNAUTHORIZED,
            json!({ "success": false, "message": "Identifiants invalides" }),
        )
    }
}

fn admin(state: &MockState, method: &Method, path: &str, request: &RecordedRequest) -> Response {
    let mut segments = path.split('/');
    let (Some("admin"), Some(kind)) = (segments.next(), segments.next()) else {
        return reply(StatusCode::NOT_FOUND, json!({ "success": false, "message": "Not found" }));
    };
    let id = segments.next();
    let mut collections = state.collections.lock();
    let records = collections.entry(kind.to_string()).or_default();

    match (method.as_str(), id) {
        ("GET", None) => reply(StatusCode::OK, json!({ "success": true, "data": records.clone() })),
        ("POST", None) if kind == "cv" => {
            let filename = multipart_filename(&request.body).unwrap_or_else(|| "cv.pdf".to_string());
            let file_path = format!("uploads/cv/{}", filename);
            let id = state.new_id();
            let record = json!({
                "_id": id,
                "filename": filename,
                "file_path": file_path,
                "size": request.body.len(),
                "created_at": "Mon, 02 Sep 2024 10:30:00 GMT",
            });
            records.push(record.clone());
            reply(
                StatusCode::CREATED,
                json!({ "success": true, "message": "CV uploaded", "file_path": file_path, "data": record }),
            )
        }
        ("POST", None) => {
            let mut record = match request.json() {
                Some(Value::Object(fields)) => fields,
                _ => return reply(StatusCode::BAD_REQUEST, json!({ "success": false, "message": "Invalid JSON" })),
            };
            let id = state.new_id();
            record.insert("_id".to_string(), json!(id));
            records.push(Value::Object(record));
            reply(StatusCode::CREATED, json!({ "success": true, "message": "Created", "id": id }))
        }
        ("PUT", Some(id)) => {
            let Some(existing) = records.iter_mut().find(|r| r["_id"] == id) else {
                return reply(StatusCode::NOT_FOUND, json!({ "success": false, "message": "Not found" }));
            };
            if let (Some(Value::Object(fields)), Value::Object(target)) = (request.json(), existing) {
                merge(target, fields);
            }
            reply(StatusCode::OK, json!({ "success": true, "message": "Updated" }))
        }
        ("DELETE", Some(id)) => {
            let before = records.len();
            records.retain(|r| r["_id"] != id);
            if records.len() == before {
                reply(StatusCode::NOT_FOUND, json!({ "success": false, "message": "Not found" }))
            } else {
                reply(StatusCode::OK, json!({ "success": true, "message": "Deleted" }))
            }
        }
        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({ "success": false, "message": "Method not allowed" })),
    }
}

fn merge(target: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (key, value) in fields {
        target.insert(key, value);
    }
}

fn multipart_filename(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let start = text.find("filename=\"")? + "filename=\"".len();
    let end = text[start..].find('"')? + start;
    Some(text[start..end].to_string())
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Base URL on a port nothing listens on
pub fn unreachable_base_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}/api", port))
}

/// Navigation targets handed to the app, in order
#[derive(Clone, Default)]
pub struct Routes(Arc<Mutex<Vec<String>>>);

impl Routes {
    pub fn navigator(&self) -> Arc<dyn Navigator> {
        let routes = Arc::clone(&self.0);
        Arc::new(move |route: &str| routes.lock().push(route.to_string()))
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

pub fn client(config: &AppConfig, store: &Arc<MemorySessionStore>) -> Result<ApiClient> {
    let session: Arc<dyn SessionStore> = store.clone();
    Ok(ApiClient::new(config, session)?)
}

pub fn app(config: AppConfig, store: &Arc<MemorySessionStore>, routes: &Routes) -> Result<AdminApp> {
    let session: Arc<dyn SessionStore> = store.clone();
    Ok(AdminApp::new(config, session, routes.navigator())?)
}

pub fn logged_in_store() -> Arc<MemorySessionStore> {
    Arc::new(MemorySessionStore::with_token(TOKEN))
}
