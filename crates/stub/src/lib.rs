//! Stand-in product catalog service.
//!
//! Serves the same routes and response shapes as the public catalog API from
//! a generated in-memory catalog, so the client and the check suite can be
//! exercised without network access.

pub mod catalog;
pub mod http_server;

pub use catalog::{Catalog, ListQuery, DEFAULT_LIMIT};
pub use http_server::{router, spawn, StubOptions, StubServer};
