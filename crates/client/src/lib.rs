//! Catalog API client.
//!
//! Request helpers in [`products`] and [`auth`] are pure: they only build a
//! [`RequestDescriptor`]. [`CatalogClient`] sends descriptors over HTTP and
//! [`Session`] holds the two tokens handed out by the login endpoint.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod limits;
pub mod products;
pub mod request;
pub mod session;

pub use auth::Credentials;
pub use client::{ApiResponse, CatalogClient};
pub use config::{ClientConfig, ResolvedClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult, TokenKind};
pub use request::{Method, Page, RequestDescriptor};
pub use session::Session;
