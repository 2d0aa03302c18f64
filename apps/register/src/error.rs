//! # API Error Type
//!
//! What the cashier sees when an operation is refused.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  Console command ("pick 2")                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  SaleSession → CoreResult<T>                                           │
//! │         │                                                               │
//! │         ├── CartError::StockExceeded ──┐                               │
//! │         ├── CoreError::ProductNotFound ├──► ApiError { code, message } │
//! │         └── DbError / ConfigError ─────┘            │                  │
//! │                                                      ▼                  │
//! │                            "! Maximum stock reached for Café 500g (2)" │
//! │                                                                         │
//! │  The sale in progress is never lost: every notice is recoverable.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! `ApiError` serializes with a machine-readable `code` and a human-readable
//! `message`, so a graphical front end can branch on the code.

use serde::Serialize;
use ts_rs::TS;

use crate::config::ConfigError;
use caixa_core::{CartError, CoreError};
use caixa_db::DbError;

/// Error returned across the register boundary.
///
/// ```json
/// {
///   "code": "STOCK_EXCEEDED",
///   "message": "Maximum stock reached for Café 500g (2)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Line already at the stock ceiling
    StockExceeded,

    /// Product has no stock at all
    OutOfStock,

    /// Quantity outside 1..=stock
    InvalidQuantity,

    /// Cart line or search result does not exist
    OutOfRange,

    /// Finalize with nothing in the cart
    EmptyCart,

    /// Change would make the total too large to represent
    AmountTooLarge,

    /// Stock changed before the sale was stored; the cart was adjusted
    StockChanged,

    /// Sale could not be stored; the cart is kept
    RecordingFailed,

    /// Product or record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Catalog could not be searched
    CatalogUnavailable,

    /// Database operation failed
    DatabaseError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::StockExceeded { .. } => ErrorCode::StockExceeded,
            CartError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CartError::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            CartError::IndexOutOfRange { .. } => ErrorCode::OutOfRange,
            CartError::AmountTooLarge { .. } => ErrorCode::AmountTooLarge,
            CartError::StockChanged { .. } => ErrorCode::StockChanged,
            CartError::EmptyCart => ErrorCode::EmptyCart,
            CartError::RecordingFailed { .. } => ErrorCode::RecordingFailed,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Cart(e) => e.into(),
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            e @ CoreError::SearchResultOutOfRange { .. } => {
                ApiError::new(ErrorCode::OutOfRange, e.to_string())
            }
            e @ CoreError::CatalogUnavailable { .. } => {
                ApiError::new(ErrorCode::CatalogUnavailable, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Invalid { .. } => ApiError::validation(err.to_string()),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            other => {
                // Full detail goes to the log, the cashier gets a short notice
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(format!("I/O error: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
