use serde_json::Value;
use tracing::debug;

use crate::error::{ClientError, ClientResult, TokenKind};

/// Tokens cached for one run. Unset on creation, set by login, overwritten
/// by refresh, never cleared.
#[derive(Clone, Default)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access_token: Some(access.into()),
            refresh_token: refresh,
        }
    }

    pub fn access_token(&self) -> ClientResult<&str> {
        self.access_token
            .as_deref()
            .ok_or(ClientError::MissingCredential(TokenKind::Access))
    }

    pub fn refresh_token(&self) -> ClientResult<&str> {
        self.refresh_token
            .as_deref()
            .ok_or(ClientError::MissingCredential(TokenKind::Refresh))
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn store_tokens(&mut self, access: impl Into<String>, refresh: Option<String>) {
        self.access_token = Some(access.into());
        if refresh.is_some() {
            self.refresh_token = refresh;
        }
    }

    /// Caches `accessToken`/`refreshToken` from a login or refresh body.
    /// Returns false when the body carries no access token.
    pub fn store_from_body(&mut self, body: &Value) -> bool {
        let Some(access) = body.get("accessToken").and_then(Value::as_str) else {
            return false;
        };
        let refresh = body
            .get("refreshToken")
            .and_then(Value::as_str)
            .map(str::to_string);
        debug!(target: "catalog.session", has_refresh = refresh.is_some(), "tokens cached");
        self.store_tokens(access, refresh);
        true
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
