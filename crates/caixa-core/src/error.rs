//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caixa-core errors (this file)                                         │
//! │  ├── CartError        - Cart aggregator refusals (all recoverable)     │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CoreError        - Everything a sale session can hit              │
//! │                                                                         │
//! │  caixa-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  register errors (in app)                                              │
//! │  └── ApiError         - What the cashier sees (serialized notice)      │
//! │                                                                         │
//! │  Flow: CartError/ValidationError → CoreError → ApiError → notice       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `CartError` leaves the cart exactly as it was before the call.

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Refusals from the cart aggregator.
///
/// None of these end the sale: the register shows a short notice and the
/// cashier carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product's line is already at the stock ceiling.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Café 500g x2   (stock: 2)
    ///      │
    ///      ▼
    /// pick "Café 500g" again
    ///      │
    ///      ▼
    /// StockExceeded { product: "Café 500g", stock: 2 }
    ///      │
    ///      ▼
    /// Notice: "Maximum stock reached for Café 500g (2)"
    /// ```
    #[error("Maximum stock reached for {product} ({stock})")]
    StockExceeded { product: String, stock: i64 },

    /// First add of a product with zero stock.
    #[error("{product} is out of stock")]
    OutOfStock { product: String },

    /// Quantity change outside `1..=stock`.
    #[error("Quantity {requested} is invalid: must be between 1 and {stock}")]
    InvalidQuantity { requested: i64, stock: i64 },

    /// The operation targets a line that does not exist. `index` is
    /// 0-based; the message shows the 1-based position.
    #[error("Cart line {position} does not exist (cart has {len} lines)", position = .index + 1)]
    IndexOutOfRange { index: usize, len: usize },

    /// The change would push the cart total past what an `i64` of centavos
    /// holds.
    #[error("Total would be too large with {product}")]
    AmountTooLarge { product: String },

    /// Finalize found less stock than the cart holds. The line has been
    /// cut down to `available` (or removed when it is 0).
    #[error("Stock of {product} changed: {available} available")]
    StockChanged { product: String, available: i64 },

    /// Finalize attempted with no lines.
    #[error("The cart is empty")]
    EmptyCart,

    /// The sale recorder failed after finalize. The cart is kept so the
    /// sale can be retried.
    #[error("Sale could not be recorded: {reason}")]
    RecordingFailed { reason: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors surfaced by a sale session.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Cart aggregator refusal.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Picked a search result that is not on screen.
    #[error("Search result {position} does not exist ({len} results)", position = .index + 1)]
    SearchResultOutOfRange { index: usize, len: usize },

    /// The catalog could not answer a search or lookup.
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID, malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result of a cart aggregator operation.
pub type CartResult<T> = Result<T, CartError>;

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
