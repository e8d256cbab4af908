//! Shopping cart module.
//!
//! Contains the cart container, its line items, and the stock rules every
//! quantity change has to pass.

mod cart;
mod stock;

pub use cart::{Cart, CartItem};
pub use stock::{validate_quantity_update, validate_stock_availability, StockError};
