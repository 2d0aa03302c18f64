//! # Cart Aggregator
//!
//! The in-memory cart of one sale in progress.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action           Cart Method             Cart Change           │
//! │  ──────────────           ───────────             ───────────           │
//! │                                                                         │
//! │  Pick product ───────────► add_product() ───────► line.qty += 1         │
//! │                                                   or lines.push(qty 1)  │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► lines[i].qty = n      │
//! │                                                                         │
//! │  Delete line ────────────► remove_line() ───────► lines.remove(i)       │
//! │                                                                         │
//! │  Finalize ───────────────► checkout() ──────────► (read only snapshot)  │
//! │                                                                         │
//! │  Every mutation returns the recomputed total, or an error with the     │
//! │  cart left exactly as it was.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by product id (adding the same product bumps quantity)
//! - `1 <= quantity <= stock` for every line
//! - `total()` is the exact integer sum of `quantity × unit price`, and
//!   always fits in an `i64`: a change whose total would not fit is
//!   refused with [`CartError::AmountTooLarge`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// One product-quantity pairing within the sale in progress.
///
/// The product is a snapshot taken when the line was created, so the line
/// keeps its price even if the catalog changes mid-sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    fn new(product: &Product) -> Self {
        CartLine {
            product: product.clone(),
            quantity: 1,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.product.price()
    }

    /// Stock ceiling for this line.
    #[inline]
    pub fn stock(&self) -> i64 {
        self.product.stock
    }

    /// Unit price × quantity. Exact for any line held by a [`Cart`].
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// What finalize hands to the sale recorder: the lines and their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub lines: Vec<CartLine>,
    pub total: Money,
}

impl SaleDraft {
    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart of one sale in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, unless the line is already
    ///   at `product.stock` → [`CartError::StockExceeded`]
    /// - Product not in cart: new line with quantity 1, unless
    ///   `product.stock == 0` → [`CartError::OutOfStock`]
    ///
    /// The ceiling is the stock of `product` as passed in, i.e. the latest
    /// catalog view. The line's own snapshot is left alone.
    ///
    /// ## Returns
    /// The recomputed cart total.
    pub fn add_product(&mut self, product: &Product) -> CartResult<Money> {
        if let Some(index) = self.lines.iter().position(|l| l.product.id == product.id) {
            let quantity = self.lines[index].quantity;
            if quantity >= product.stock {
                return Err(CartError::StockExceeded {
                    product: product.name.clone(),
                    stock: product.stock,
                });
            }
            let total = self.total_with(index, quantity + 1).ok_or_else(|| {
                CartError::AmountTooLarge {
                    product: product.name.clone(),
                }
            })?;
            self.lines[index].quantity += 1;
            return Ok(total);
        }

        if !product.is_in_stock() {
            return Err(CartError::OutOfStock {
                product: product.name.clone(),
            });
        }

        let total = self
            .total()
            .checked_add(product.price())
            .ok_or_else(|| CartError::AmountTooLarge {
                product: product.name.clone(),
            })?;
        self.lines.push(CartLine::new(product));
        Ok(total)
    }

    /// Sets the quantity of the line at `index`.
    ///
    /// ## Errors
    /// - [`CartError::IndexOutOfRange`] if there is no such line
    /// - [`CartError::InvalidQuantity`] if `quantity` is outside `1..=stock`
    /// - [`CartError::AmountTooLarge`] if the new total would overflow
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> CartResult<Money> {
        let len = self.lines.len();
        let line = self
            .lines
            .get(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;

        if quantity < 1 || quantity > line.stock() {
            return Err(CartError::InvalidQuantity {
                requested: quantity,
                stock: line.stock(),
            });
        }

        let total = self
            .total_with(index, quantity)
            .ok_or_else(|| CartError::AmountTooLarge {
                product: line.product.name.clone(),
            })?;
        self.lines[index].quantity = quantity;
        Ok(total)
    }

    /// Removes the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CartResult<Money> {
        if index >= self.lines.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }

        self.lines.remove(index);
        Ok(self.total())
    }

    /// Updates the stock snapshot of a product's line to what the catalog
    /// holds now.
    ///
    /// The quantity is cut down to `stock`; a line left with no stock is
    /// removed. Does nothing if the product has no line.
    ///
    /// ## Returns
    /// The recomputed cart total.
    pub fn restock(&mut self, product_id: &str, stock: i64) -> Money {
        if let Some(index) = self.lines.iter().position(|l| l.product.id == product_id) {
            if stock < 1 {
                self.lines.remove(index);
            } else {
                let line = &mut self.lines[index];
                line.product.stock = stock;
                line.quantity = line.quantity.min(stock);
            }
        }
        self.total()
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// The total the cart would have with line `index` at `quantity`, or
    /// `None` if it does not fit.
    fn total_with(&self, index: usize, quantity: i64) -> Option<Money> {
        self.lines.iter().enumerate().try_fold(Money::zero(), |acc, (i, line)| {
            let quantity = if i == index { quantity } else { line.quantity };
            acc.checked_add(line.unit_price().checked_mul(quantity)?)
        })
    }

    /// Snapshot for finalize.
    ///
    /// Does not clear the cart: that only happens once the sale has been
    /// recorded.
    pub fn checkout(&self) -> CartResult<SaleDraft> {
        if self.lines.is_empty() {
            return Err(CartError::EmptyCart);
        }

        Ok(SaleDraft {
            lines: self.lines.clone(),
            total: self.total(),
        })
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&CartLine> {
        self.lines.get(index)
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
