//! # Collaborators
//!
//! The two services a sale session talks to: the product catalog (search
//! and lookup) and the sale recorder (persist a finalized cart).
//!
//! ```text
//! SaleSession ──search / find_by_id──► ProductCatalog ─┐
//!      │                                               ├── caixa_db::Database
//!      └───────record_sale(draft)────► SaleRecorder ───┘
//! ```
//!
//! Both are traits so the session can be driven against in-memory fakes in
//! tests.

use std::future::Future;

use caixa_core::{Product, Sale, SaleDraft};
use caixa_db::{Database, DbError};

/// Product search and lookup.
pub trait ProductCatalog {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Active products whose name matches `query`, at most `limit`.
    fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send;

    /// An active product by id.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send;
}

/// Persists finalized sales.
pub trait SaleRecorder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Records the draft. Either the whole sale is stored or nothing is.
    fn record_sale(
        &self,
        draft: &SaleDraft,
    ) -> impl Future<Output = Result<Sale, Self::Error>> + Send;

    /// The product id, if `error` means the catalog no longer holds enough
    /// stock for one of the draft's lines.
    fn stock_conflict(_error: &Self::Error) -> Option<&str> {
        None
    }
}

impl ProductCatalog for Database {
    type Error = DbError;

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Product>, DbError> {
        self.products().search(query, limit).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, DbError> {
        let product = self.products().get_by_id(id).await?;
        Ok(product.filter(|p| p.is_active))
    }
}

impl SaleRecorder for Database {
    type Error = DbError;

    async fn record_sale(&self, draft: &SaleDraft) -> Result<Sale, DbError> {
        self.sales().record_sale(draft).await
    }

    fn stock_conflict(error: &DbError) -> Option<&str> {
        match error {
            DbError::InsufficientStock { product_id, .. } => Some(product_id),
            _ => None,
        }
    }
}
