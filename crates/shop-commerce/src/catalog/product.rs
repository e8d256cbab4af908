//! Product snapshots.

use crate::catalog::CategoryRef;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product as last seen from the remote catalog.
///
/// The cart holds copies of these captured at add-to-cart time, so `stock`
/// is a point-in-time reading and may be stale by the time it is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Identifier assigned by the remote API.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Full description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Money,
    /// Purchasable units at the time of the snapshot.
    pub stock: i64,
    /// Owning category.
    #[serde(default)]
    pub category: CategoryRef,
    /// Image URL or path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Featured on the home page.
    #[serde(default)]
    pub featured: bool,
}

impl Product {
    /// Create an uncategorized product with no description or image.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            stock,
            category: CategoryRef::default(),
            image: None,
            featured: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: CategoryRef) -> Self {
        self.category = category;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    /// No units left according to this snapshot.
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }
}
