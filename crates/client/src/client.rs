use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::redirect::Policy as RedirectPolicy;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::auth::{self, Credentials};
use crate::config::{ClientConfig, ResolvedClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::request::RequestDescriptor;
use crate::session::Session;

/// Status, headers and decoded body of one API call.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Array stored under `name`, or the body itself when it is an array.
    /// Empty when neither holds.
    pub fn items(&self, name: &str) -> &[Value] {
        self.body
            .get(name)
            .and_then(Value::as_array)
            .or_else(|| self.body.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.body.get(name).and_then(Value::as_u64)
    }
}

/// Sends [`RequestDescriptor`]s to the configured catalog service.
pub struct CatalogClient {
    http: reqwest::Client,
    config: ResolvedClientConfig,
}

impl CatalogClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::from_resolved(config.resolve()?)
    }

    pub fn from_resolved(config: ResolvedClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .redirect(RedirectPolicy::limited(config.limits.max_redirects as usize))
            .timeout(Duration::from_millis(config.limits.timeout_ms))
            .gzip(true)
            .build()?;
        debug!(target: "catalog.http", base_url = %config.base_url, limits = ?config.limits, sources = ?config.sources, "client ready");
        Ok(Self { http, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    pub fn config(&self) -> &ResolvedClientConfig {
        &self.config
    }

    /// Absolute URL for `req`: the descriptor path is appended to the base
    /// path, so a base of `http://host/api` yields `http://host/api/products`.
    pub fn url_for(&self, req: &RequestDescriptor) -> ClientResult<Url> {
        let mut url = self.config.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            req.path.trim_start_matches('/')
        );
        url.set_path(&path);
        if !req.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &req.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    pub async fn execute(&self, req: &RequestDescriptor) -> ClientResult<ApiResponse> {
        let url = self.url_for(req)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::Config(format!("invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("invalid header value for '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .http
            .request(req.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let start = Instant::now();
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = header_map_to_btree(resp.headers());
        let bytes = resp.bytes().await?;
        let body = decode_body(&bytes);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(target: "catalog.http", method = %req.method, path = %req.path, status, bytes = bytes.len(), elapsed_ms, "request done");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// Logs in and caches both tokens on success.
    pub async fn login(
        &self,
        session: &mut Session,
        credentials: &Credentials,
    ) -> ClientResult<ApiResponse> {
        let resp = self.execute(&auth::login(credentials)).await?;
        if resp.is_success() {
            session.store_from_body(&resp.body);
        }
        Ok(resp)
    }

    pub async fn current_user(&self, session: &Session) -> ClientResult<ApiResponse> {
        self.execute(&auth::current_user(session)?).await
    }

    /// Exchanges a refresh token for new tokens, overwriting the cached ones
    /// on success.
    pub async fn refresh(
        &self,
        session: &mut Session,
        explicit: Option<&str>,
        expires_in_mins: Option<u32>,
    ) -> ClientResult<ApiResponse> {
        let req = auth::refresh(session, explicit, expires_in_mins)?;
        let resp = self.execute(&req).await?;
        if resp.is_success() {
            session.store_from_body(&resp.body);
        }
        Ok(resp)
    }
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn header_map_to_btree(map: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (k, v) in map.iter() {
        if let Ok(val) = v.to_str() {
            out.insert(k.as_str().to_string(), val.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products;
    use crate::request::Page;
    use serde_json::json;

    fn client(base: &str) -> CatalogClient {
        let resolved = ClientConfig::with_base_url(base)
            .resolve_with(|_| None)
            .unwrap();
        CatalogClient::from_resolved(resolved).unwrap()
    }

    #[test]
    fn url_keeps_base_path_and_query() {
        let c = client("http://localhost:9000/api/");
        let url = c.url_for(&products::search("red shoe", Page::new(5, 0))).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/products/search?q=red+shoe&limit=5&skip=0"
        );
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        let c = client("https://dummyjson.com");
        let url = c.url_for(&products::categories()).unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/products/categories");
    }

    #[test]
    fn body_decoding() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"{\"a\":1}"), json!({"a": 1}));
        assert_eq!(decode_body(b"Not Found"), json!("Not Found"));
    }

    #[test]
    fn items_reads_named_array_or_bare_array() {
        let named = ApiResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: json!({"products": [{"id": 1}], "total": 1}),
        };
        assert_eq!(named.items("products").len(), 1);
        assert_eq!(named.u64_field("total"), Some(1));

        let bare = ApiResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: json!(["beauty", "groceries"]),
        };
        assert_eq!(bare.items("products").len(), 2);
        assert!(bare.is_success());
    }
}
