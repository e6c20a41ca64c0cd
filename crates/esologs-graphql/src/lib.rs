//! ESO Logs GraphQL - typed transport for the ESO Logs v2 API.
//!
//! This crate provides:
//! - Typed GraphQL operations and request/response envelopes.
//! - An HTTP client that attaches a caller-supplied bearer token per request.
//! - Error classification (transport, HTTP status, GraphQL errors).
//! - Page-number and cursor pagination helpers.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod client;
mod error;
mod operation;
mod pagination;

pub use client::{DEFAULT_TIMEOUT, GraphqlClient, GraphqlClientBuilder, GraphqlClientConfig};
pub use error::{
    GraphqlClientError, GraphqlError, GraphqlErrorLocation, GraphqlPathSegment, HttpErrorInfo,
};
pub use operation::{GraphqlOperation, GraphqlQuery, GraphqlRequest, GraphqlResponse};
pub use pagination::{
    CursorPage, PageLimit, PaginatedResult, paginate_cursor, paginate_pages,
};
