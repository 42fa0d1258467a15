//! Domain DTOs for the product API.
//!
//! # Design
//! `Product` mirrors the mock-server's schema but is defined independently;
//! integration tests catch schema drift between the two crates. Field names
//! go over the wire in camelCase. An `id` of 0 marks a draft that has not been
//! persisted yet, and is left out of the serialized JSON so create requests
//! carry no identifier.

use serde::{Deserialize, Serialize};

/// A single product record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(skip_serializing_if = "is_transient")]
    pub id: u64,
    pub product_name: String,
    pub product_code: String,
    pub category: String,
    pub tags: Vec<String>,
    pub release_date: String,
    pub price: f64,
    pub description: String,
    pub star_rating: f64,
    pub image_url: String,
}

impl Product {
    /// A zero-valued draft: id 0 and empty fields.
    pub fn draft() -> Self {
        Self::default()
    }

    /// True when the record has not been created on the server yet.
    pub fn is_draft(&self) -> bool {
        is_transient(&self.id)
    }
}

fn is_transient(id: &u64) -> bool {
    *id == 0
}
