//! Stock checks for cart mutations.
//!
//! Adding to a line and overwriting a line use different arithmetic, so they
//! get separate checks: an add is measured against what is already held,
//! an overwrite is measured against stock alone.

use crate::catalog::Product;
use thiserror::Error;

/// Why a requested quantity cannot be satisfied.
///
/// The `Display` text is shown to the shopper as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("{product} is out of stock")]
    OutOfStock { product: String },

    #[error("Only {available} of {product} available in stock")]
    Insufficient { product: String, available: i64 },

    #[error(
        "Only {remaining} more of {product} available. You already have {in_cart} in your cart"
    )]
    InsufficientWithCart {
        product: String,
        remaining: i64,
        in_cart: i64,
    },

    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,
}

/// Check whether `requested` more units can be added on top of `in_cart`.
pub fn validate_stock_availability(
    product: &Product,
    requested: i64,
    in_cart: i64,
) -> Result<(), StockError> {
    if product.stock <= 0 {
        return Err(StockError::OutOfStock {
            product: product.name.clone(),
        });
    }

    let total = in_cart.saturating_add(requested);
    if total > product.stock {
        if in_cart > 0 {
            return Err(StockError::InsufficientWithCart {
                product: product.name.clone(),
                remaining: (product.stock - in_cart).max(0),
                in_cart,
            });
        }
        return Err(StockError::Insufficient {
            product: product.name.clone(),
            available: product.stock,
        });
    }

    Ok(())
}

/// Check whether a line can be set to exactly `new_quantity`.
pub fn validate_quantity_update(product: &Product, new_quantity: i64) -> Result<(), StockError> {
    if new_quantity <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }
    if new_quantity > product.stock {
        return Err(StockError::Insufficient {
            product: product.name.clone(),
            available: product.stock.max(0),
        });
    }
    Ok(())
}
