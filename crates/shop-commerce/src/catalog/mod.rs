//! Product catalog snapshots.

mod category;
mod product;

pub use category::CategoryRef;
pub use product::Product;
