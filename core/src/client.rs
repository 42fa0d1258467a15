//! Stateless HTTP request builder and response parser for the product API.
//!
//! # Design
//! `ProductClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. Executing the round-trip is someone else's job,
//! which keeps this module deterministic and free of I/O.

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Product;

const PRODUCTS_PATH: &str = "api/products";

/// Synchronous, stateless client for the product API.
#[derive(Debug, Clone)]
pub struct ProductClient {
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{PRODUCTS_PATH}", self.base_url)
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{PRODUCTS_PATH}/{id}", self.base_url)
    }

    pub fn build_list_products(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// The identifier is reset before serialization so the body never carries one.
    pub fn build_create_product(&self, draft: &Product) -> Result<HttpRequest, FetchError> {
        let body = serde_json::to_string(&Product {
            id: 0,
            ..draft.clone()
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_product(&self, product: &Product) -> Result<HttpRequest, FetchError> {
        let body = serde_json::to_string(product)?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(product.id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_product(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<Product>, FetchError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> Result<Product, FetchError> {
        check_status(&response)?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Only the status matters; whatever body the server echoes is discarded.
    pub fn parse_update_product(&self, response: HttpResponse) -> Result<(), FetchError> {
        check_status(&response)
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> Result<(), FetchError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map any non-2xx status to `FetchError::Server`.
fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.is_success() {
        return Ok(());
    }
    Err(FetchError::Server {
        status: response.status,
        body: response.body.clone(),
    })
}
