//! Blocking client for the Notion REST API.
//!
//! # Overview
//! `NotionClient` exposes one method per supported operation: OAuth
//! authorization, user lookup, search, database fetch and query, page create
//! and update. Every call builds a JSON body or query string, performs a
//! single HTTP round-trip through a `Transport`, and classifies the response
//! into a `Payload` or an `ApiError`.
//!
//! # Design
//! - `build_*` methods produce `HttpRequest` values without any I/O, so
//!   request shapes are testable in isolation.
//! - `parse` maps status codes through a closed table (`StatusClass`).
//! - Base headers are fixed per client; per-call overrides travel in
//!   `RequestOptions`.
//! - There are no retries, pagination loops, or caches.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;
pub mod types;

pub use client::{NotionClient, RequestOptions};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{parse, StatusClass};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Cover, CreatePage, DatabaseQuery, ObjectType, Pagination, Payload, SearchRequest,
    TokenRequest, TokenResponse, UpdatePage, MAX_PAGE_SIZE,
};
