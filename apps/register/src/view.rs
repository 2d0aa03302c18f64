//! # Cart View
//!
//! Read-only snapshot of a sale session, shaped for display.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  query = ""                          query = "caf"                      │
//! │  ┌───────────────────────────┐       ┌───────────────────────────┐      │
//! │  │ 1. Café 500g  x2 R$ 20,00 │       │ 1. Cafeteira   R$ 89,90   │      │
//! │  │ 2. Leite 1L   x1  R$ 5,49 │       │ 2. Café 500g   R$ 10,00   │      │
//! │  │ TOTAL          R$ 25,49   │       └───────────────────────────┘      │
//! │  └───────────────────────────┘        showSearchResults = true          │
//! │   showCart = true                     showCart = false                  │
//! │   canFinalize = true                  canFinalize = true (cart kept)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! While the cashier is searching the cart is hidden; the empty placeholder
//! only shows when not searching and the cart has no lines.

use serde::Serialize;
use ts_rs::TS;

use crate::config::CurrencyFormat;
use caixa_core::{Cart, CartLine, Product};

/// One cart line, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineView {
    /// 1-based, as shown to the cashier.
    pub position: usize,
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub stock: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub unit_price_display: String,
    pub line_total_display: String,
}

impl CartLineView {
    fn new(index: usize, line: &CartLine, format: &CurrencyFormat) -> Self {
        CartLineView {
            position: index + 1,
            product_id: line.product_id().to_string(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            stock: line.stock(),
            unit_price_cents: line.unit_price().cents(),
            line_total_cents: line.line_total().cents(),
            unit_price_display: format.format(line.unit_price()),
            line_total_display: format.format(line.line_total()),
        }
    }
}

/// One search result, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SearchResultView {
    pub position: usize,
    pub product_id: String,
    pub name: String,
    pub stock: i64,
    pub price_display: String,
}

/// Everything the sale screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
    pub total_display: String,

    pub query: String,
    pub search_results: Vec<SearchResultView>,

    /// Query is non-empty.
    pub is_searching: bool,
    /// Searching and there is something to show.
    pub show_search_results: bool,
    /// Not searching and the cart has lines.
    pub show_cart: bool,
    /// Not searching and the cart is empty.
    pub show_empty_placeholder: bool,
    pub can_finalize: bool,
}

impl CartView {
    pub fn build(cart: &Cart, query: &str, results: &[Product], format: &CurrencyFormat) -> Self {
        let is_searching = !query.is_empty();
        let has_lines = !cart.is_empty();

        CartView {
            lines: cart
                .lines()
                .iter()
                .enumerate()
                .map(|(i, line)| CartLineView::new(i, line, format))
                .collect(),
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_cents: cart.total().cents(),
            total_display: format.format(cart.total()),

            query: query.to_string(),
            search_results: results
                .iter()
                .enumerate()
                .map(|(i, p)| SearchResultView {
                    position: i + 1,
                    product_id: p.id.clone(),
                    name: p.name.clone(),
                    stock: p.stock,
                    price_display: format.format(p.price()),
                })
                .collect(),

            is_searching,
            show_search_results: is_searching && !results.is_empty(),
            show_cart: !is_searching && has_lines,
            show_empty_placeholder: !is_searching && !has_lines,
            can_finalize: has_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caixa_core::Money;

    fn cafe() -> Product {
        Product::new("p-1", "Café 500g", Money::from_cents(1000), 2)
    }

    #[test]
    fn test_empty_cart_not_searching() {
        let view = CartView::build(&Cart::new(), "", &[], &CurrencyFormat::default());

        assert!(view.show_empty_placeholder);
        assert!(!view.show_cart);
        assert!(!view.can_finalize);
        assert!(!view.is_searching);
        assert_eq!(view.total_display, "R$ 0,00");
    }

    #[test]
    fn test_searching_hides_cart_and_placeholder() {
        let mut cart = Cart::new();
        cart.add_product(&cafe()).unwrap();

        let view = CartView::build(&cart, "caf", &[cafe()], &CurrencyFormat::default());
        assert!(view.is_searching);
        assert!(view.show_search_results);
        assert!(!view.show_cart);
        assert!(!view.show_empty_placeholder);
        assert!(view.can_finalize);
        assert_eq!(view.search_results[0].position, 1);
        assert_eq!(view.search_results[0].price_display, "R$ 10,00");

        let no_hits = CartView::build(&cart, "xyz", &[], &CurrencyFormat::default());
        assert!(!no_hits.show_search_results);
        assert!(!no_hits.show_cart);
    }

    #[test]
    fn test_lines_and_totals() {
        let mut cart = Cart::new();
        cart.add_product(&cafe()).unwrap();
        cart.add_product(&cafe()).unwrap();

        let view = CartView::build(&cart, "", &[], &CurrencyFormat::default());
        assert!(view.show_cart);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].position, 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].line_total_display, "R$ 20,00");
        assert_eq!(view.total_cents, 2000);
        assert_eq!(view.total_quantity, 2);
    }

    #[test]
    fn test_serializes_camel_case_flags() {
        let view = CartView::build(&Cart::new(), "", &[], &CurrencyFormat::default());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["showEmptyPlaceholder"], true);
        assert_eq!(json["canFinalize"], false);
        assert_eq!(json["totalCents"], 0);
    }
}
