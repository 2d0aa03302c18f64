//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleSession                                                           │
//! │       │                                                                 │
//! │       │  db.products().search("café", 20)                              │
//! │       │  db.sales().record_sale(&draft)                                │
//! │       ▼                                                                 │
//! │  ProductRepository              SaleRepository                         │
//! │  ├── search(query, limit)       ├── record_sale(draft)   (atomic)      │
//! │  ├── get_by_id(id)              ├── get_by_id(id)                      │
//! │  ├── insert(product)            ├── get_items(sale_id)                 │
//! │  └── set_stock(id, stock)       └── list_recent(limit)                 │
//! │       │                                                                 │
//! │       ▼  SQL                                                            │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`product::ProductRepository`] - Catalog search and maintenance
//! - [`sale::SaleRepository`] - Sale recording and history

pub mod product;
pub mod sale;

/// Column list shared by every `Product` query.
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, price_cents, stock, is_active, created_at, updated_at";
