use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
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

pub type Db = Arc<RwLock<BTreeMap<u64, Product>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router seeded with `products`, keyed by their ids.
pub fn app_with(products: Vec<Product>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        products.into_iter().map(|p| (p.id, p)).collect(),
    ));
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    let products = db.read().await;
    Json(products.values().cloned().collect())
}

/// Assigns the highest existing id plus one; 500 once `u64::MAX` is taken.
async fn create_product(
    State(db): State<Db>,
    Json(input): Json<Product>,
) -> Result<(StatusCode, Json<Product>), StatusCode> {
    let mut products = db.write().await;
    let id = match products.keys().next_back() {
        Some(last) => last.checked_add(1).ok_or_else(|| {
            tracing::error!(last, "product id space exhausted");
            StatusCode::INTERNAL_SERVER_ERROR
        })?,
        None => 1,
    };
    let product = Product { id, ..input };
    products.insert(id, product.clone());
    tracing::info!(id, name = %product.product_name, "created product");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Product>,
) -> StatusCode {
    let mut products = db.write().await;
    match products.get_mut(&id) {
        Some(existing) => {
            *existing = Product { id, ..input };
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_product(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut products = db.write().await;
    products
        .remove(&id)
        .map_or(StatusCode::NOT_FOUND, |_| StatusCode::NO_CONTENT)
}
