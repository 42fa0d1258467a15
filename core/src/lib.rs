//! Client-side data access for the product API.
//!
//! # Overview
//! `ProductStore` keeps an in-memory list of products and mediates every read
//! and write between a UI layer and the remote REST API. Each operation is an
//! `async fn` resolving to exactly one value or one `FetchError`.
//!
//! # Design
//! - `ProductClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so the I/O boundary is explicit.
//! - `Transport` executes requests; `ReqwestTransport` is the default one.
//! - `ProductStore` glues the two together and owns the cache.
//! - Errors are reduced to a readable message, logged through `tracing`,
//!   and returned. Nothing is retried.

pub mod client;
pub mod error;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

pub use client::ProductClient;
pub use error::FetchError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::ProductStore;
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::{Transport, TransportError};
pub use types::Product;
