//! # Sale Session
//!
//! One sale in progress: the cart, the current search, and the two
//! collaborators it talks to.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Session                                         │
//! │                                                                         │
//! │  search("caf") ──► catalog.search ──► results = [Cafeteira, Café]      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  select_result(1) ──► query = "", results = []  ──► cart.add_product   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  set_quantity / remove_line ──► cart                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  finalize_sale ──► cart.checkout ──► recorder.record_sale              │
//! │                                          │                              │
//! │                      ok ◄────────────────┴───────────► err              │
//! │                      │                                  │               │
//! │                cart.clear()                   cart kept, RecordingFailed│
//! │                                          stock conflict? │              │
//! │                                                          ▼              │
//! │                         re-read stock, cart.restock ──► StockChanged    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every method takes `&mut self`, so operations on a session never
//! overlap. Every refusal leaves the session as it was, with one exception:
//! `select_result` clears the search before adding, even if the add is
//! refused.

use tracing::{debug, error, info, warn};

use crate::collaborators::{ProductCatalog, SaleRecorder};
use crate::config::CurrencyFormat;
use crate::view::CartView;
use caixa_core::validation::validate_search_query;
use caixa_core::{Cart, CartError, CoreError, CoreResult, Money, Product, Sale};

/// A sale in progress.
#[derive(Debug)]
pub struct SaleSession<C, R> {
    catalog: C,
    recorder: R,
    search_limit: u32,

    cart: Cart,
    query: String,
    results: Vec<Product>,
}

impl<C, R> SaleSession<C, R>
where
    C: ProductCatalog,
    R: SaleRecorder,
{
    pub fn new(catalog: C, recorder: R, search_limit: u32) -> Self {
        SaleSession {
            catalog,
            recorder,
            search_limit,
            cart: Cart::new(),
            query: String::new(),
            results: Vec::new(),
        }
    }

    /// Abandons the sale in progress: empty cart, no search.
    pub fn reset(&mut self) {
        debug!(lines = self.cart.line_count(), "Resetting sale session");
        self.cart.clear();
        self.clear_search();
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Runs a catalog search and keeps the results for `select_result`.
    ///
    /// An empty (or blank) query clears the search without asking the
    /// catalog.
    pub async fn search(&mut self, query: &str) -> CoreResult<&[Product]> {
        let query = validate_search_query(query)?;

        if query.is_empty() {
            self.clear_search();
            return Ok(&self.results);
        }

        debug!(query = %query, limit = self.search_limit, "Searching catalog");

        let results = self
            .catalog
            .search(&query, self.search_limit)
            .await
            .map_err(|e| {
                error!(error = %e, "Catalog search failed");
                CoreError::CatalogUnavailable {
                    reason: e.to_string(),
                }
            })?;

        debug!(count = results.len(), "Search results");

        self.query = query;
        self.results = results;
        Ok(&self.results)
    }

    /// Adds the search result at `index` (0-based) and closes the search.
    pub fn select_result(&mut self, index: usize) -> CoreResult<Money> {
        let product = self
            .results
            .get(index)
            .cloned()
            .ok_or(CoreError::SearchResultOutOfRange {
                index,
                len: self.results.len(),
            })?;

        self.clear_search();
        self.add_product(&product)
    }

    fn clear_search(&mut self) {
        self.query.clear();
        self.results.clear();
    }

    // =========================================================================
    // Cart Operations
    // =========================================================================

    /// Looks the product up in the catalog and adds one unit.
    pub async fn add_product_by_id(&mut self, id: &str) -> CoreResult<Money> {
        let product = self
            .catalog
            .find_by_id(id)
            .await
            .map_err(|e| {
                error!(error = %e, product_id = %id, "Catalog lookup failed");
                CoreError::CatalogUnavailable {
                    reason: e.to_string(),
                }
            })?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        self.add_product(&product)
    }

    pub fn add_product(&mut self, product: &Product) -> CoreResult<Money> {
        debug!(product_id = %product.id, stock = product.stock, "Adding product");
        let total = self.cart.add_product(product).map_err(refused)?;
        Ok(total)
    }

    /// `index` is 0-based.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<Money> {
        debug!(index, quantity, "Setting quantity");
        let total = self.cart.set_quantity(index, quantity).map_err(refused)?;
        Ok(total)
    }

    /// `index` is 0-based.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<Money> {
        debug!(index, "Removing line");
        let total = self.cart.remove_line(index).map_err(refused)?;
        Ok(total)
    }

    pub fn total(&self) -> Money {
        self.cart.total()
    }

    // =========================================================================
    // Finalize
    // =========================================================================

    /// Hands the cart to the recorder.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - Recorded; the cart is now empty
    /// * `Err(EmptyCart)` - Nothing to sell; the recorder is not called
    /// * `Err(StockChanged)` - The catalog holds less stock than a line
    ///   asks for; every line's stock is re-read and quantities are cut down
    ///   to it, so finalize can be retried on the adjusted cart
    /// * `Err(RecordingFailed)` - The recorder failed; the cart is untouched
    ///   and finalize can be retried
    pub async fn finalize_sale(&mut self) -> CoreResult<Sale> {
        let draft = self.cart.checkout().map_err(refused)?;

        debug!(lines = draft.lines.len(), total = %draft.total, "Finalizing sale");

        match self.recorder.record_sale(&draft).await {
            Ok(sale) => {
                info!(
                    receipt_number = %sale.receipt_number,
                    total = %sale.total(),
                    "Sale finalized"
                );
                self.cart.clear();
                Ok(sale)
            }
            Err(e) => {
                let reason = e.to_string();
                match R::stock_conflict(&e).map(str::to_string) {
                    Some(product_id) => {
                        warn!(
                            product_id = %product_id,
                            error = %reason,
                            "Stock changed before the sale was stored"
                        );
                        Err(self.refresh_stock(&product_id, reason).await)
                    }
                    None => {
                        error!(error = %reason, "Sale recording failed, cart kept");
                        Err(CartError::RecordingFailed { reason }.into())
                    }
                }
            }
        }
    }

    /// Re-reads the stock of every line after a stock conflict on
    /// `conflict_id`. A product missing from the catalog counts as 0 stock.
    ///
    /// Returns `StockChanged` for the conflicting product, or
    /// `RecordingFailed` with `reason` if the catalog cannot be read.
    async fn refresh_stock(&mut self, conflict_id: &str, reason: String) -> CoreError {
        let lines: Vec<(String, String)> = self
            .cart
            .lines()
            .iter()
            .map(|l| (l.product.id.clone(), l.product.name.clone()))
            .collect();

        let mut conflict = None;
        for (id, name) in lines {
            let stock = match self.catalog.find_by_id(&id).await {
                Ok(found) => found.map_or(0, |p| p.stock),
                Err(e) => {
                    error!(error = %e, product_id = %id, "Stock refresh failed");
                    return CartError::RecordingFailed { reason }.into();
                }
            };
            let total = self.cart.restock(&id, stock);
            debug!(product_id = %id, stock, total = %total, "Line stock refreshed");
            if id == conflict_id {
                conflict = Some((name, stock));
            }
        }

        match conflict {
            Some((product, available)) => CartError::StockChanged { product, available }.into(),
            None => CartError::RecordingFailed { reason }.into(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn view(&self, format: &CurrencyFormat) -> CartView {
        CartView::build(&self.cart, &self.query, &self.results, format)
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Product] {
        &self.results
    }
}

fn refused(err: CartError) -> CoreError {
    warn!(reason = %err, "Cart operation refused");
    err.into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use caixa_core::SaleDraft;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    pub struct FakeError(pub String);

    /// In-memory catalog; counts calls and can be switched to failing.
    #[derive(Debug, Clone, Default)]
    pub struct FakeCatalog {
        pub products: Vec<Product>,
        pub fail: Arc<AtomicBool>,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeCatalog {
        pub fn with(products: Vec<Product>) -> Self {
            FakeCatalog {
                products,
                ..Default::default()
            }
        }
    }

    impl ProductCatalog for FakeCatalog {
        type Error = FakeError;

        async fn search(&self, query: &str, limit: u32) -> Result<Vec<Product>, FakeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(FakeError("catalog offline".into()));
            }
            let needle = query.to_lowercase();
            Ok(self
                .products
                .iter()
                .filter(|p| p.name.to_lowercase().contains(&needle))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Product>, FakeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(FakeError("catalog offline".into()));
            }
            Ok(self.products.iter().find(|p| p.id == id).cloned())
        }
    }

    /// Keeps every draft it is handed; can be switched to failing.
    #[derive(Debug, Clone, Default)]
    pub struct FakeRecorder {
        pub drafts: Arc<Mutex<Vec<SaleDraft>>>,
        pub fail: Arc<AtomicBool>,
    }

    impl FakeRecorder {
        pub fn recorded(&self) -> Vec<SaleDraft> {
            self.drafts.lock().unwrap().clone()
        }
    }

    impl SaleRecorder for FakeRecorder {
        type Error = FakeError;

        async fn record_sale(&self, draft: &SaleDraft) -> Result<Sale, FakeError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(FakeError("disk full".into()));
            }
            let mut drafts = self.drafts.lock().unwrap();
            drafts.push(draft.clone());
            Ok(fake_sale(drafts.len(), draft))
        }
    }

    fn fake_sale(sequence: usize, draft: &SaleDraft) -> Sale {
        Sale {
            id: format!("sale-{}", sequence),
            receipt_number: format!("TEST-{:04}", sequence),
            total_cents: draft.total.cents(),
            item_count: draft.lines.len() as i64,
            created_at: Default::default(),
        }
    }

    pub fn product(id: &str, name: &str, price_cents: i64, stock: i64) -> Product {
        Product::new(id, name, Money::from_cents(price_cents), stock)
    }

    pub fn catalog() -> Vec<Product> {
        vec![
            product("a", "Café 500g", 1000, 2),
            product("b", "Cafeteira", 8990, 1),
            product("c", "Arroz 5kg", 2490, 0),
            product("d", "Leite 1L", 549, 10),
        ]
    }

    fn session() -> (SaleSession<FakeCatalog, FakeRecorder>, FakeCatalog, FakeRecorder) {
        let catalog = FakeCatalog::with(catalog());
        let recorder = FakeRecorder::default();
        let session = SaleSession::new(catalog.clone(), recorder.clone(), 20);
        (session, catalog, recorder)
    }

    fn cart_error(result: CoreResult<impl std::fmt::Debug>) -> CartError {
        match result {
            Err(CoreError::Cart(e)) => e,
            other => panic!("expected a cart error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stock_ceiling_scenario() {
        let (mut session, _, recorder) = session();

        assert_eq!(session.add_product_by_id("a").await.unwrap().cents(), 1000);
        assert_eq!(session.add_product_by_id("a").await.unwrap().cents(), 2000);
        assert!(matches!(
            cart_error(session.add_product_by_id("a").await),
            CartError::StockExceeded { stock: 2, .. }
        ));
        assert_eq!(session.total().cents(), 2000);

        let sale = session.finalize_sale().await.unwrap();
        assert_eq!(sale.total_cents, 2000);

        let drafts = recorder.recorded();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].lines.len(), 1);
        assert_eq!(drafts[0].lines[0].product_id(), "a");
        assert_eq!(drafts[0].lines[0].quantity, 2);
        assert_eq!(drafts[0].total.cents(), 2000);
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_stock_product_is_refused() {
        let (mut session, _, _) = session();

        assert!(matches!(
            cart_error(session.add_product_by_id("c").await),
            CartError::OutOfStock { .. }
        ));
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (mut session, _, _) = session();

        assert!(matches!(
            session.add_product_by_id("zzz").await,
            Err(CoreError::ProductNotFound(id)) if id == "zzz"
        ));
    }

    #[tokio::test]
    async fn test_finalize_empty_cart_does_not_call_recorder() {
        let (mut session, _, recorder) = session();

        assert_eq!(
            cart_error(session.finalize_sale().await),
            CartError::EmptyCart
        );

        session.add_product_by_id("d").await.unwrap();
        session.remove_line(0).unwrap();
        assert_eq!(
            cart_error(session.finalize_sale().await),
            CartError::EmptyCart
        );
        assert!(recorder.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_recording_failure_keeps_cart_and_retry_succeeds() {
        let (mut session, _, recorder) = session();
        session.add_product_by_id("d").await.unwrap();
        session.set_quantity(0, 3).unwrap();

        recorder.fail.store(true, Ordering::SeqCst);
        assert!(matches!(
            cart_error(session.finalize_sale().await),
            CartError::RecordingFailed { reason } if reason == "disk full"
        ));
        assert_eq!(session.cart().total_quantity(), 3);
        assert_eq!(session.total().cents(), 1647);

        recorder.fail.store(false, Ordering::SeqCst);
        let sale = session.finalize_sale().await.unwrap();
        assert_eq!(sale.total_cents, 1647);
        assert!(session.cart().is_empty());
        assert_eq!(recorder.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_stock_conflict_refreshes_cart_and_retry_succeeds() {
        use caixa_db::{Database, DbConfig};

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cafe = product(&uuid::Uuid::new_v4().to_string(), "Café 500g", 1000, 2);
        let leite = product(&uuid::Uuid::new_v4().to_string(), "Leite 1L", 549, 5);
        db.products().insert(&cafe).await.unwrap();
        db.products().insert(&leite).await.unwrap();

        let mut session = SaleSession::new(db.clone(), db.clone(), 20);
        session.add_product_by_id(&cafe.id).await.unwrap();
        session.add_product_by_id(&cafe.id).await.unwrap();
        session.add_product_by_id(&leite.id).await.unwrap();

        // Another register sold one café meanwhile
        db.products().set_stock(&cafe.id, 1).await.unwrap();

        assert_eq!(
            cart_error(session.finalize_sale().await),
            CartError::StockChanged {
                product: "Café 500g".to_string(),
                available: 1,
            }
        );
        assert_eq!(session.cart().lines()[0].quantity, 1);
        assert_eq!(session.cart().lines()[0].stock(), 1);
        assert_eq!(session.total().cents(), 1549);

        let sale = session.finalize_sale().await.unwrap();
        assert_eq!(sale.total_cents, 1549);
        assert!(session.cart().is_empty());
        assert_eq!(db.products().get_by_id(&cafe.id).await.unwrap().unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_sold_out_line_is_dropped_on_stock_conflict() {
        use caixa_db::{Database, DbConfig};

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cafe = product(&uuid::Uuid::new_v4().to_string(), "Café 500g", 1000, 2);
        let leite = product(&uuid::Uuid::new_v4().to_string(), "Leite 1L", 549, 5);
        db.products().insert(&cafe).await.unwrap();
        db.products().insert(&leite).await.unwrap();

        let mut session = SaleSession::new(db.clone(), db.clone(), 20);
        session.add_product_by_id(&leite.id).await.unwrap();
        session.add_product_by_id(&cafe.id).await.unwrap();
        db.products().set_stock(&cafe.id, 0).await.unwrap();

        assert!(matches!(
            cart_error(session.finalize_sale().await),
            CartError::StockChanged { available: 0, .. }
        ));
        assert_eq!(session.cart().line_count(), 1);
        assert_eq!(session.cart().lines()[0].product_id(), leite.id);

        assert_eq!(session.finalize_sale().await.unwrap().total_cents, 549);
    }

    #[tokio::test]
    async fn test_search_and_select() {
        let (mut session, _, _) = session();

        let results = session.search("  CAF ").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(session.query(), "CAF");

        let total = session.select_result(1).unwrap();
        assert_eq!(total.cents(), 8990);
        assert_eq!(session.query(), "");
        assert!(session.results().is_empty());
    }

    #[tokio::test]
    async fn test_select_clears_search_even_when_refused() {
        let (mut session, _, _) = session();

        session.search("arroz").await.unwrap();
        assert!(matches!(
            cart_error(session.select_result(0)),
            CartError::OutOfStock { .. }
        ));
        assert_eq!(session.query(), "");
        assert!(session.results().is_empty());
    }

    #[tokio::test]
    async fn test_select_out_of_range_keeps_search() {
        let (mut session, _, _) = session();

        session.search("leite").await.unwrap();
        assert!(matches!(
            session.select_result(5),
            Err(CoreError::SearchResultOutOfRange { index: 5, len: 1 })
        ));
        assert_eq!(session.query(), "leite");
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_clears_without_catalog_call() {
        let (mut session, catalog, _) = session();

        session.search("caf").await.unwrap();
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);

        assert!(session.search("   ").await.unwrap().is_empty());
        assert_eq!(session.query(), "");
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported() {
        let (mut session, catalog, _) = session();
        catalog.fail.store(true, Ordering::SeqCst);

        assert!(matches!(
            session.search("caf").await,
            Err(CoreError::CatalogUnavailable { .. })
        ));
        assert!(matches!(
            session.add_product_by_id("a").await,
            Err(CoreError::CatalogUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_overlong_query_is_rejected() {
        let (mut session, catalog, _) = session();

        assert!(matches!(
            session.search(&"x".repeat(150)).await,
            Err(CoreError::Validation(_))
        ));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_view_flags_follow_search() {
        let (mut session, _, _) = session();
        let format = CurrencyFormat::default();

        assert!(session.view(&format).show_empty_placeholder);

        session.add_product_by_id("a").await.unwrap();
        session.search("leite").await.unwrap();
        let view = session.view(&format);
        assert!(view.show_search_results);
        assert!(!view.show_cart);

        session.search("").await.unwrap();
        let view = session.view(&format);
        assert!(view.show_cart);
        assert_eq!(view.total_display, "R$ 10,00");
    }

    #[tokio::test]
    async fn test_reset() {
        let (mut session, _, _) = session();
        session.add_product_by_id("d").await.unwrap();
        session.search("caf").await.unwrap();

        session.reset();
        assert!(session.cart().is_empty());
        assert_eq!(session.query(), "");
        assert!(session.results().is_empty());
    }
}
