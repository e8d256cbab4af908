//! Commerce error types.

use crate::cart::StockError;
use thiserror::Error;

/// Errors raised by cart mutations.
///
/// Every variant leaves the cart untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Requested quantity conflicts with the product's stock.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// Product priced in a different currency than the cart.
    #[error("Currency mismatch: cart is in {expected}, product is priced in {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Product snapshot carries a negative price.
    #[error("Invalid price for {0}")]
    InvalidPrice(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in cart totals")]
    Overflow,
}
