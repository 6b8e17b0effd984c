//! Catalogue API access layer
//!
//! This module provides everything needed to talk to the MangaDex REST API:
//! - Query-string encoding with array/object flattening
//! - The client-side rate-limit guard
//! - The HTTP transport seam and its `reqwest` implementation
//! - The gateway that ties them together
//! - Typed response records

pub mod gateway;
pub mod models;
pub mod query;
pub mod rate_limit;
pub mod transport;

pub use gateway::ApiGateway;
pub use models::{AtHomeServer, Chapter, Collection, Cover, Entity, Manga, Relationship};
pub use query::{build_url, NestedValue, QueryParams, QueryValue, Scalar};
pub use rate_limit::{RateLimitGuard, RateLimitState, DEFAULT_COOLDOWN};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
