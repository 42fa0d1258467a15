//! In-memory product cache in front of the product API.
//!
//! # Design
//! `ProductStore` owns its cache outright; nothing is global. The cache starts
//! unpopulated (`None`), is filled by the first successful `list()`, and from
//! then on is only touched by successful mutations. Each operation is a single
//! future resolving to one value or one `FetchError`. Dropping the future
//! abandons the request and leaves the cache as it was, because the cache is
//! only written after the response has been parsed.

use tracing::{debug, error};

use crate::client::ProductClient;
use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::Product;

/// Environment variable read by `ProductStore::from_env`.
pub const API_URL_ENV: &str = "PRODUCT_API_URL";
/// Base URL used when `PRODUCT_API_URL` is unset, blank, or not valid unicode.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Cached, single-owner view of the product API.
pub struct ProductStore<T> {
    client: ProductClient,
    transport: T,
    cache: Option<Vec<Product>>,
}

#[cfg(feature = "reqwest")]
impl ProductStore<crate::transport::ReqwestTransport> {
    /// Store over reqwest, pointed at `PRODUCT_API_URL` or the local default.
    pub fn from_env() -> Self {
        Self::new(
            ProductClient::new(&api_url(std::env::var(API_URL_ENV).ok())),
            crate::transport::ReqwestTransport::default(),
        )
    }
}

#[cfg_attr(not(feature = "reqwest"), allow(dead_code))]
fn api_url(configured: Option<String>) -> String {
    configured
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

impl<T: Transport> ProductStore<T> {
    pub fn new(client: ProductClient, transport: T) -> Self {
        Self {
            client,
            transport,
            cache: None,
        }
    }

    pub fn client(&self) -> &ProductClient {
        &self.client
    }

    /// Cached products, or `None` before the first successful `list()`.
    pub fn cached(&self) -> Option<&[Product]> {
        self.cache.as_deref()
    }

    /// A fresh zero-valued draft. Never touches the cache or the network.
    pub fn new_draft() -> Product {
        Product::draft()
    }

    pub async fn list(&mut self) -> Result<Vec<Product>, FetchError> {
        if let Some(products) = &self.cache {
            return Ok(products.clone());
        }

        let request = self.client.build_list_products();
        let products = self
            .round_trip(request)
            .await
            .and_then(|response| self.client.parse_list_products(response))
            .inspect_err(|err| error!(error = %err, "list products failed"))?;

        debug!(count = products.len(), "fetched products");
        self.cache = Some(products.clone());
        Ok(products)
    }

    /// Persist `product`: create when its id is 0, update otherwise.
    pub async fn save(&mut self, product: Product) -> Result<Product, FetchError> {
        if product.is_draft() {
            self.create(product).await
        } else {
            self.update(product).await
        }
    }

    /// Create `draft` on the server and cache the record it returns.
    pub async fn create(&mut self, draft: Product) -> Result<Product, FetchError> {
        let created = async {
            let request = self.client.build_create_product(&draft)?;
            let response = self.round_trip(request).await?;
            self.client.parse_create_product(response)
        }
        .await
        .inspect_err(|err| error!(error = %err, "create product failed"))?;

        debug!(id = created.id, name = %created.product_name, "created product");
        if let Some(products) = self.cache.as_mut() {
            products.push(created.clone());
        }
        Ok(created)
    }

    /// Update `product` on the server; the cached entry becomes `product` itself.
    ///
    /// Drafts (id 0) are rejected without a request; use `save` to route them
    /// to `create`.
    pub async fn update(&mut self, product: Product) -> Result<Product, FetchError> {
        if product.is_draft() {
            let err = FetchError::network("cannot update a product that has not been created");
            error!(error = %err, "update product failed");
            return Err(err);
        }

        async {
            let request = self.client.build_update_product(&product)?;
            let response = self.round_trip(request).await?;
            self.client.parse_update_product(response)
        }
        .await
        .inspect_err(|err| error!(id = product.id, error = %err, "update product failed"))?;

        debug!(id = product.id, "updated product");
        if let Some(slot) = self
            .cache
            .as_mut()
            .and_then(|products| products.iter_mut().find(|p| p.id == product.id))
        {
            *slot = product.clone();
        }
        Ok(product)
    }

    /// Delete by id. Returns the cache entry that was removed, if one matched.
    pub async fn delete(&mut self, id: u64) -> Result<Option<Product>, FetchError> {
        let request = self.client.build_delete_product(id);
        self.round_trip(request)
            .await
            .and_then(|response| self.client.parse_delete_product(response))
            .inspect_err(|err| error!(id, error = %err, "delete product failed"))?;

        debug!(id, "deleted product");
        let removed = self.cache.as_mut().and_then(|products| {
            products
                .iter()
                .position(|p| p.id == id)
                .map(|index| products.remove(index))
        });
        Ok(removed)
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport
            .execute(request)
            .await
            .map_err(|e| FetchError::Network(e.message))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::http::HttpMethod;
    use crate::transport::TransportError;

    /// Replays canned outcomes in order and records every request it sees.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        outcomes: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
        requests: Arc<Mutex<Vec<HttpRequest>>>,
    }

    impl ScriptedTransport {
        fn respond(&self, status: u16, body: &str) -> &Self {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(&self, message: &str) -> &Self {
            self.outcomes
                .lock()
                .unwrap()
                .push_back(Err(TransportError::new(message)));
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
        }
    }

    fn store(transport: &ScriptedTransport) -> ProductStore<ScriptedTransport> {
        ProductStore::new(ProductClient::new("http://api.test"), transport.clone())
    }

    fn widget(id: u64, name: &str) -> Product {
        Product {
            id,
            product_name: name.to_string(),
            product_code: "WDG-1".to_string(),
            price: 10.0,
            ..Product::default()
        }
    }

    fn json(products: &[Product]) -> String {
        serde_json::to_string(products).unwrap()
    }

    #[tokio::test]
    async fn list_is_served_from_cache_after_first_fetch() {
        let transport = ScriptedTransport::default();
        transport.respond(200, "[]");
        let mut store = store(&transport);

        assert!(store.cached().is_none());
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.list().await.unwrap().is_empty());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].path, "http://api.test/api/products");
        assert!(store.cached().unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_server_error_leaves_cache_empty() {
        let transport = ScriptedTransport::default();
        transport.respond(500, "oops").respond(200, "[]");
        let mut store = store(&transport);

        let err = store.list().await.unwrap_err();
        assert_eq!(err.to_string(), "Backend returned code 500, body was: oops");
        assert!(store.cached().is_none());

        // A later call fetches again instead of caching the failure.
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn list_network_error_message() {
        let transport = ScriptedTransport::default();
        transport.fail("connection refused");
        let mut store = store(&transport);

        let err = store.list().await.unwrap_err();
        assert_eq!(err, FetchError::Network("connection refused".to_string()));
        assert_eq!(err.to_string(), "An error occurred: connection refused");
    }

    #[tokio::test]
    async fn save_draft_creates_and_caches_server_record() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, "[]")
            .respond(201, &serde_json::to_string(&widget(42, "Widget")).unwrap());
        let mut store = store(&transport);
        store.list().await.unwrap();

        let created = store.save(widget(0, "Widget")).await.unwrap();
        assert_eq!(created.id, 42);

        let cached = store.cached().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached.iter().filter(|p| p.id == 42).count(), 1);

        let post = &transport.requests()[1];
        assert_eq!(post.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(post.body.as_deref().unwrap()).unwrap();
        assert!(body.get("id").is_none());
    }

    #[tokio::test]
    async fn create_before_first_list_does_not_populate_cache() {
        let transport = ScriptedTransport::default();
        transport.respond(201, r#"{"id":3,"productName":"Saw"}"#);
        let mut store = store(&transport);

        let created = store.create(ProductStore::<ScriptedTransport>::new_draft()).await.unwrap();
        assert_eq!(created.id, 3);
        assert!(store.cached().is_none());
    }

    #[tokio::test]
    async fn create_failure_leaves_cache_unchanged() {
        let transport = ScriptedTransport::default();
        transport.respond(200, "[]").respond(400, "bad product");
        let mut store = store(&transport);
        store.list().await.unwrap();

        let err = store.save(widget(0, "Widget")).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(store.cached().unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_existing_replaces_cache_entry_with_input() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(42, "Widget"), widget(7, "Other")]))
            .respond(200, r#"{"id":42,"productName":"Server Echo"}"#);
        let mut store = store(&transport);
        store.list().await.unwrap();

        let edited = widget(42, "Widget2");
        let saved = store.save(edited.clone()).await.unwrap();
        assert_eq!(saved, edited);

        let cached = store.cached().unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0], edited);
        assert_eq!(cached[1].product_name, "Other");

        let put = &transport.requests()[1];
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(put.path, "http://api.test/api/products/42");
    }

    #[tokio::test]
    async fn update_of_uncached_id_leaves_cache_unchanged() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(1, "One")]))
            .respond(204, "");
        let mut store = store(&transport);
        store.list().await.unwrap();

        let saved = store.update(widget(99, "Ghost")).await.unwrap();
        assert_eq!(saved.id, 99);
        assert_eq!(store.cached().unwrap(), &[widget(1, "One")][..]);
    }

    #[tokio::test]
    async fn update_failure_keeps_previous_entry() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(1, "One")]))
            .fail("timed out");
        let mut store = store(&transport);
        store.list().await.unwrap();

        let err = store.update(widget(1, "Changed")).await.unwrap_err();
        assert_eq!(err.to_string(), "An error occurred: timed out");
        assert_eq!(store.cached().unwrap()[0].product_name, "One");
    }

    #[tokio::test]
    async fn delete_removes_matching_entry() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(42, "Widget"), widget(7, "Other")]))
            .respond(204, "");
        let mut store = store(&transport);
        store.list().await.unwrap();

        let removed = store.delete(42).await.unwrap();
        assert_eq!(removed, Some(widget(42, "Widget")));

        let cached = store.cached().unwrap();
        assert_eq!(cached.len(), 1);
        assert!(cached.iter().all(|p| p.id != 42));
    }

    #[tokio::test]
    async fn delete_unknown_id_still_sends_request() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(42, "Widget")]))
            .respond(200, "{}");
        let mut store = store(&transport);
        store.list().await.unwrap();

        assert_eq!(store.delete(999).await.unwrap(), None);
        assert_eq!(store.cached().unwrap().len(), 1);

        let delete = &transport.requests()[1];
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "http://api.test/api/products/999");
    }

    #[tokio::test]
    async fn delete_failure_keeps_entry() {
        let transport = ScriptedTransport::default();
        transport
            .respond(200, &json(&[widget(42, "Widget")]))
            .respond(404, "not found");
        let mut store = store(&transport);
        store.list().await.unwrap();

        let err = store.delete(42).await.unwrap_err();
        assert_eq!(err.to_string(), "Backend returned code 404, body was: not found");
        assert_eq!(store.cached().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_draft_without_request() {
        let transport = ScriptedTransport::default();
        transport.respond(200, &json(&[widget(1, "One")]));
        let mut store = store(&transport);
        store.list().await.unwrap();

        let err = store.update(widget(0, "Draft")).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(store.cached().unwrap(), &[widget(1, "One")][..]);
    }

    #[test]
    fn api_url_falls_back_to_default() {
        assert_eq!(api_url(None), DEFAULT_API_URL);
        assert_eq!(api_url(Some("  ".to_string())), DEFAULT_API_URL);
        assert_eq!(
            api_url(Some("http://products.internal:8080".to_string())),
            "http://products.internal:8080"
        );
    }

    #[cfg(feature = "reqwest")]
    #[test]
    fn from_env_builds_an_empty_store() {
        let store = ProductStore::from_env();
        assert!(store.cached().is_none());
        assert!(store.client().base_url().starts_with("http"));
    }

    #[tokio::test]
    async fn new_draft_never_touches_cache_or_network() {
        let transport = ScriptedTransport::default();
        let store = store(&transport);

        for _ in 0..3 {
            let draft = ProductStore::<ScriptedTransport>::new_draft();
            assert_eq!(draft.id, 0);
            assert_eq!(draft, Product::default());
        }
        assert!(store.cached().is_none());
        assert!(transport.requests().is_empty());
    }
}
