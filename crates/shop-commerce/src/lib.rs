//! Storefront domain types for the shopfront client.
//!
//! - **Catalog**: product snapshots and category references
//! - **Cart**: line items, derived totals, stock rules
//!
//! # Example
//!
//! ```rust
//! use shop_commerce::prelude::*;
//!
//! let lamp = Product::new("p1", "Desk Lamp", Money::new(2599, Currency::USD), 3);
//!
//! let mut cart = Cart::new();
//! cart.add(lamp.clone(), 2).unwrap();
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(cart.total_price().display(), "$51.98");
//!
//! // Only one left after the two already in the cart.
//! assert!(cart.add(lamp, 2).is_err());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;

pub use cart::{Cart, CartItem, StockError};
pub use catalog::{CategoryRef, Product};
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{CategoryRef, Product};

    pub use crate::cart::{
        validate_quantity_update, validate_stock_availability, Cart, CartItem, StockError,
    };
}
