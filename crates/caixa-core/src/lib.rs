//! # caixa-core: Pure Business Logic for Meu Caixa
//!
//! This crate is the heart of the register. It contains the cart aggregator
//! and the types it works on, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Meu Caixa Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Register (session + console driver)                │   │
//! │  │    search ──► pick/add ──► qty/rm ──► finalize                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caixa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │ CartLine  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    caixa-db (Database Layer)                    │   │
//! │  │              SQLite catalog, sale recording, migrations         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart aggregator (lines, stock ceiling, totals)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use caixa_core::{Cart, CartError, Money, Product};
//!
//! let coffee = Product::new("p-1", "Café 500g", Money::from_cents(1000), 2);
//! let mut cart = Cart::new();
//!
//! assert_eq!(cart.add_product(&coffee).unwrap(), Money::from_cents(1000));
//! assert_eq!(cart.add_product(&coffee).unwrap(), Money::from_cents(2000));
//! assert!(matches!(
//!     cart.add_product(&coffee),
//!     Err(CartError::StockExceeded { .. })
//! ));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, SaleDraft};
pub use error::{CartError, CartResult, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
