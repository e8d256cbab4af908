//! Category references carried on product snapshots.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

const UNCATEGORIZED: &str = "uncategorized";

/// The category a product belongs to, as denormalized by the API.
///
/// Listing endpoints populate the name; single-product endpoints sometimes
/// send only the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Category identifier.
    pub id: CategoryId,
    /// Display name, when the API populated it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CategoryRef {
    /// Reference a category by id only.
    pub fn new(id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Reference a category with its display name.
    pub fn named(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Label for display, falling back to the raw id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

impl Default for CategoryRef {
    fn default() -> Self {
        Self::new(UNCATEGORIZED)
    }
}
