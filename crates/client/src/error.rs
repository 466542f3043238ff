use std::fmt;

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// A helper needed a cached token before any login happened.
    #[error("missing credential: no {0} token cached, log in first")]
    MissingCredential(TokenKind),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, ClientError::MissingCredential(_))
    }
}
