//! # Money
//!
//! Prices and totals as a whole number of centavos.
//!
//! ```text
//! Product.price_cents ──► CartLine::line_total ──► Cart::total ──► Sale.total_cents
//!                                                      │
//!                                                      └──► "R$ 20,00"  (register only)
//! ```
//!
//! The running total is re-summed after every cart change. With `f64`
//! that accumulates drift (`0.1 + 0.2 != 0.3`); with centavos it cannot:
//!
//! ```rust
//! use caixa_core::money::Money;
//!
//! let cafe = Money::from_cents(1899);          // R$ 18,99
//! let total = cafe * 2 + Money::from_cents(549);
//! assert_eq!(total.cents(), 4347);
//! ```
//!
//! Operators saturate at the `i64` bounds instead of panicking. Code that
//! must refuse an amount it cannot represent (the cart, the sale recorder)
//! uses `checked_mul` / `checked_add`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

/// An amount in centavos. Serialized as a bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole reais, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Centavos part, always `0..=99`.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Unit price times quantity, saturating.
    ///
    /// ```rust
    /// use caixa_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(549).multiply_quantity(3).cents(), 1647);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` if the product does not fit in an `i64`.
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// `major.minor` with a dot, for log fields. The cashier sees the
/// register's currency format instead.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_and_minor_parts() {
        let cafe = Money::from_cents(1899);
        assert_eq!(cafe.major(), 18);
        assert_eq!(cafe.minor(), 99);

        let refund = Money::from_cents(-550);
        assert_eq!(refund.major(), -5);
        assert_eq!(refund.minor(), 50);
    }

    #[test]
    fn test_log_display() {
        assert_eq!(Money::from_cents(1899).to_string(), "18.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_line_arithmetic() {
        let leite = Money::from_cents(549);

        assert_eq!((leite * 4).cents(), 2196);
        assert_eq!(leite * 4, leite.multiply_quantity(4));

        let mut total = Money::zero();
        total += leite;
        total += Money::from_cents(1000);
        assert_eq!(total.cents(), 1549);
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_cents(2000), Money::from_cents(549), Money::from_cents(8990)];
        let by_ref: Money = lines.iter().sum();
        let by_value: Money = lines.into_iter().sum();
        assert_eq!(by_ref.cents(), 11539);
        assert_eq!(by_value, by_ref);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_overflow_is_checked_or_saturated() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);

        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(huge.checked_mul(1), Some(huge));
        assert_eq!(
            Money::from_cents(549).checked_mul(3),
            Some(Money::from_cents(1647))
        );

        assert_eq!((huge * 2).cents(), i64::MAX);
        assert_eq!((huge + huge).cents(), i64::MAX);
        let total: Money = [huge, huge, huge].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    /// Ten thousand additions of 0.10 land exactly on 1000.00, which a
    /// binary float accumulator does not.
    #[test]
    fn test_repeated_addition_has_no_drift() {
        let total: Money = std::iter::repeat(Money::from_cents(10)).take(10_000).sum();
        assert_eq!(total.cents(), 100_000);

        let float_total: f64 = std::iter::repeat(0.1_f64).take(10_000).sum();
        assert_ne!(float_total, 1000.0);
    }
}
