use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Path, Query},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, ListQuery};

#[derive(Debug, Clone)]
pub struct StubOptions {
    pub username: String,
    pub password: String,
    pub catalog: Catalog,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            username: "emilys".to_string(),
            password: "emilyspass".to_string(),
            catalog: Catalog::generated(),
        }
    }
}

#[derive(Clone)]
struct StubState {
    inner: Arc<StubStateInner>,
}

struct StubStateInner {
    options: StubOptions,
    tokens: Mutex<TokenBook>,
}

#[derive(Default)]
struct TokenBook {
    issued: u64,
    access: HashSet<String>,
    /// Live refresh token → the access token issued with it.
    refresh: HashMap<String, String>,
}

impl StubState {
    fn new(options: StubOptions) -> Self {
        Self {
            inner: Arc::new(StubStateInner {
                options,
                tokens: Mutex::new(TokenBook::default()),
            }),
        }
    }

    fn catalog(&self) -> &Catalog {
        &self.inner.options.catalog
    }

    fn issue_tokens(&self, retire_refresh: Option<&str>) -> (String, String) {
        let mut book = self
            .inner
            .tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(paired) = retire_refresh.and_then(|old| book.refresh.remove(old)) {
            book.access.remove(&paired);
        }
        book.issued += 1;
        let access = format!("stub-access-{}", book.issued);
        let refresh = format!("stub-refresh-{}", book.issued);
        book.access.insert(access.clone());
        book.refresh.insert(refresh.clone(), access.clone());
        (access, refresh)
    }

    fn access_valid(&self, token: &str) -> bool {
        self.inner
            .tokens
            .lock()
            .map(|book| book.access.contains(token))
            .unwrap_or(false)
    }

    fn refresh_valid(&self, token: &str) -> bool {
        self.inner
            .tokens
            .lock()
            .map(|book| book.refresh.contains_key(token))
            .unwrap_or(false)
    }

    fn user(&self) -> Value {
        json!({
            "id": 1,
            "username": self.inner.options.username,
            "email": format!("{}@example.com", self.inner.options.username),
            "firstName": "Emily",
            "lastName": "Johnson",
            "gender": "female",
        })
    }
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub fn router(options: StubOptions) -> Router {
    let state = StubState::new(options);
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(search_products))
        .route("/products/categories", get(categories))
        .route("/products/category-list", get(category_list))
        .route("/products/category/:slug", get(products_by_category))
        .route("/products/:id", get(product))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/refresh", post(refresh))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// A stub bound to an ephemeral localhost port. The server task stops when
/// the handle is dropped.
pub struct StubServer {
    base_url: String,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn(options: StubOptions) -> Result<StubServer> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind stub catalog server")?;
    let addr = listener.local_addr()?;
    let app = router(options);
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("stub catalog server stopped: {err}");
        }
    });
    Ok(StubServer {
        base_url: format!("http://{}", addr),
        handle,
    })
}

pub async fn serve(addr: SocketAddr, options: StubOptions) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind stub catalog server to {addr}"))?;
    tracing::info!("stub catalog listening on http://{addr}");
    axum::serve(listener, router(options))
        .await
        .context("stub catalog server encountered an unrecoverable error")?;
    Ok(())
}

fn parse_usize(params: &HashMap<String, String>, name: &str) -> Result<Option<usize>, ApiError> {
    match params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid '{}' value", name))),
    }
}

fn parse_list_query(params: &HashMap<String, String>) -> Result<ListQuery, ApiError> {
    let descending = match params.get("order").map(|o| o.to_lowercase()).as_deref() {
        None | Some("asc") => false,
        Some("desc") => true,
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Order should be 'asc' or 'desc'".to_string(),
            ))
        }
    };
    Ok(ListQuery {
        limit: parse_usize(params, "limit")?,
        skip: parse_usize(params, "skip")?,
        select: params.get("select").map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect()
        }),
        sort_by: params.get("sortBy").filter(|s| !s.is_empty()).cloned(),
        descending,
    })
}

async fn list_products(
    Extension(state): Extension<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let query = parse_list_query(&params)?;
    Ok(Json(state.catalog().list(&query)))
}

async fn search_products(
    Extension(state): Extension<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let query = parse_list_query(&params)?;
    let term = params.get("q").map(String::as_str).unwrap_or("");
    Ok(Json(state.catalog().search(term, &query)))
}

async fn product(
    Extension(state): Extension<StubState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let numeric = id
        .parse::<u64>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid product id '{}'", id)))?;
    state
        .catalog()
        .product(numeric)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product with id '{}' not found", id)))
}

async fn categories(Extension(state): Extension<StubState>) -> Json<Value> {
    let list: Vec<Value> = state
        .catalog()
        .categories()
        .into_iter()
        .map(|(slug, name)| {
            json!({
                "slug": slug,
                "name": name,
                "url": format!("/products/category/{}", slug),
            })
        })
        .collect();
    Json(Value::Array(list))
}

async fn category_list(Extension(state): Extension<StubState>) -> Json<Value> {
    let slugs: Vec<&str> = state
        .catalog()
        .categories()
        .into_iter()
        .map(|(slug, _)| slug)
        .collect();
    Json(json!(slugs))
}

async fn products_by_category(
    Extension(state): Extension<StubState>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let query = parse_list_query(&params)?;
    Ok(Json(state.catalog().by_category(&slug, &query)))
}

async fn login(
    Extension(state): Extension<StubState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::BadRequest(
            "Username and password required".to_string(),
        ));
    };
    let options = &state.inner.options;
    if username != options.username || password != options.password {
        return Err(ApiError::BadRequest("Invalid credentials".to_string()));
    }

    let (access, refresh) = state.issue_tokens(None);
    let mut user = state.user();
    user["accessToken"] = json!(access);
    user["refreshToken"] = json!(refresh);
    Ok(Json(user))
}

async fn me(
    Extension(state): Extension<StubState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized("Access Token is required".to_string()))?;
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    if !state.access_valid(token) {
        return Err(ApiError::Unauthorized("Invalid/Expired Token!".to_string()));
    }
    Ok(Json(state.user()))
}

async fn refresh(
    Extension(state): Extension<StubState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let token = body
        .get("refreshToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Refresh token required".to_string()))?;
    if !state.refresh_valid(token) {
        return Err(ApiError::Forbidden("Invalid refresh token".to_string()));
    }
    let (access, refresh) = state.issue_tokens(Some(token));
    Ok(Json(json!({
        "accessToken": access,
        "refreshToken": refresh,
    })))
}
