//! Request helpers for the `/auth` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ClientResult;
use crate::request::RequestDescriptor;
use crate::session::Session;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_mins: Option<u32>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            expires_in_mins: None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("expires_in_mins", &self.expires_in_mins)
            .finish()
    }
}

/// `POST /auth/login`
pub fn login(credentials: &Credentials) -> RequestDescriptor {
    let mut body = Map::new();
    body.insert("username".into(), json!(credentials.username));
    body.insert("password".into(), json!(credentials.password));
    if let Some(mins) = credentials.expires_in_mins {
        body.insert("expiresInMins".into(), json!(mins));
    }
    RequestDescriptor::post("/auth/login").json(Value::Object(body))
}

/// `GET /auth/me` with the session's cached access token.
pub fn current_user(session: &Session) -> ClientResult<RequestDescriptor> {
    Ok(current_user_with_token(session.access_token()?))
}

pub fn current_user_with_token(token: &str) -> RequestDescriptor {
    RequestDescriptor::get("/auth/me").bearer(token)
}

/// `POST /auth/refresh`. Uses `explicit` when given, the cached refresh
/// token otherwise.
pub fn refresh(
    session: &Session,
    explicit: Option<&str>,
    expires_in_mins: Option<u32>,
) -> ClientResult<RequestDescriptor> {
    let token = match explicit {
        Some(token) => token,
        None => session.refresh_token()?,
    };
    let mut body = Map::new();
    body.insert("refreshToken".into(), json!(token));
    if let Some(mins) = expires_in_mins {
        body.insert("expiresInMins".into(), json!(mins));
    }
    Ok(RequestDescriptor::post("/auth/refresh").json(Value::Object(body)))
}
