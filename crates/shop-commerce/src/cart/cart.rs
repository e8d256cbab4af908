//! Cart and line item types.

use std::collections::HashSet;

use crate::cart::{validate_quantity_update, validate_stock_availability, StockError};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A shopping cart held on the client.
///
/// Fields are private: `total_items` and `total_price` are recomputed from
/// `items` on every mutation, and every mutation either applies completely
/// or leaves the cart as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CartSnapshot", into = "CartSnapshot")]
pub struct Cart {
    items: Vec<CartItem>,
    total_items: i64,
    total_price: Money,
}

impl Cart {
    /// Create an empty cart in the default currency.
    pub fn new() -> Self {
        Self::with_currency(Currency::default())
    }

    /// Create an empty cart in the given currency.
    pub fn with_currency(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_price: Money::zero(currency),
        }
    }

    /// Line items in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of all line quantities.
    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    /// Sum of price times quantity over all lines.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Get the currency every line is priced in.
    pub fn currency(&self) -> Currency {
        self.total_price.currency
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Get the line for a product.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product.id == product_id)
    }

    /// Quantity currently held for a product, zero if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> i64 {
        self.get(product_id).map(|i| i.quantity).unwrap_or(0)
    }

    /// Distinct product ids in line order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|i| i.product.id.clone()).collect()
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line is incremented and its snapshot replaced by
    /// `product`; otherwise a new line is appended. Stock is checked against
    /// the quantity already held.
    pub fn add(&mut self, product: Product, quantity: i64) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(StockError::NonPositiveQuantity.into());
        }
        if product.price.is_negative() {
            return Err(CommerceError::InvalidPrice(product.name.clone()));
        }

        // An empty cart takes the currency of whatever goes in first.
        let currency = if self.items.is_empty() {
            product.price.currency
        } else {
            self.currency()
        };
        if product.price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }

        let in_cart = self.quantity_of(&product.id);
        validate_stock_availability(&product, quantity, in_cart)?;

        let mut items = self.items.clone();
        match items.iter_mut().find(|i| i.product.id == product.id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CommerceError::Overflow)?;
                existing.product = product;
            }
            None => items.push(CartItem { product, quantity }),
        }

        self.commit(items, currency)
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product.id != product_id);
        self.recount();
        self.items.len() < len_before
    }

    /// Set a line to exactly `quantity` units.
    ///
    /// A quantity of zero or less removes the line. Returns whether the cart
    /// changed; an absent product is not an error.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove(product_id));
        }

        let Some(position) = self.items.iter().position(|i| &i.product.id == product_id) else {
            return Ok(false);
        };

        let mut items = self.items.clone();
        let item = &mut items[position];
        validate_quantity_update(&item.product, quantity)?;
        item.quantity = quantity;

        let currency = self.currency();
        self.commit(items, currency)?;
        Ok(true)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        *self = Self::with_currency(self.currency());
    }

    /// Remove the lines of all listed products, keeping the order of the
    /// rest. Returns how many lines were removed.
    pub fn remove_products(&mut self, product_ids: &HashSet<ProductId>) -> usize {
        let len_before = self.items.len();
        self.items.retain(|i| !product_ids.contains(&i.product.id));
        self.recount();
        len_before - self.items.len()
    }

    /// Replace a line's snapshot with fresher product data, leaving its
    /// quantity alone. Returns whether the product was in the cart.
    pub fn refresh_product(&mut self, product: Product) -> Result<bool, CommerceError> {
        let Some(position) = self.items.iter().position(|i| i.product.id == product.id) else {
            return Ok(false);
        };
        let currency = self.currency();
        if product.price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: product.price.currency.code().to_string(),
            });
        }
        if product.price.is_negative() {
            return Err(CommerceError::InvalidPrice(product.name.clone()));
        }

        let mut items = self.items.clone();
        items[position].product = product;
        self.commit(items, currency)?;
        Ok(true)
    }

    fn commit(&mut self, items: Vec<CartItem>, currency: Currency) -> Result<(), CommerceError> {
        let (total_items, total_price) = totals(&items, currency)?;
        self.items = items;
        self.total_items = total_items;
        self.total_price = total_price;
        Ok(())
    }

    /// Recompute totals after removing lines. A subset of a cart whose
    /// totals fit can never overflow.
    fn recount(&mut self) {
        let currency = self.currency();
        if let Ok((total_items, total_price)) = totals(&self.items, currency) {
            self.total_items = total_items;
            self.total_price = total_price;
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// A product and how many units of it are in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Product snapshot captured when the line was last added or refreshed.
    pub product: Product,
    /// Always at least 1.
    pub quantity: i64,
}

impl CartItem {
    /// Unit price times quantity; `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.product.price.checked_mul(self.quantity)
    }
}

fn totals(items: &[CartItem], currency: Currency) -> Result<(i64, Money), CommerceError> {
    let mut total_items: i64 = 0;
    let mut total_price = Money::zero(currency);

    for item in items {
        if item.product.price.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: item.product.price.currency.code().to_string(),
            });
        }
        total_items = total_items
            .checked_add(item.quantity)
            .ok_or(CommerceError::Overflow)?;
        let line = item.line_total().ok_or(CommerceError::Overflow)?;
        total_price = total_price
            .checked_add(&line)
            .ok_or(CommerceError::Overflow)?;
    }

    Ok((total_items, total_price))
}

/// Wire shape of a persisted cart.
///
/// Persisted totals are written for readers of the raw value but ignored on
/// the way back in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartSnapshot {
    #[serde(default)]
    items: Vec<CartItem>,
    #[serde(default)]
    total_items: i64,
    #[serde(default)]
    total_price: Option<Money>,
}

impl From<Cart> for CartSnapshot {
    fn from(cart: Cart) -> Self {
        Self {
            items: cart.items,
            total_items: cart.total_items,
            total_price: Some(cart.total_price),
        }
    }
}

impl TryFrom<CartSnapshot> for Cart {
    type Error = CommerceError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        let currency = snapshot
            .total_price
            .map(|m| m.currency)
            .or_else(|| snapshot.items.first().map(|i| i.product.price.currency))
            .unwrap_or_default();

        let mut items: Vec<CartItem> = Vec::with_capacity(snapshot.items.len());
        for item in snapshot.items.into_iter().filter(|i| i.quantity >= 1) {
            match items.iter_mut().find(|i| i.product.id == item.product.id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(item.quantity)
                        .ok_or(CommerceError::Overflow)?;
                }
                None => items.push(item),
            }
        }

        let mut cart = Cart::with_currency(currency);
        cart.commit(items, currency)?;
        Ok(cart)
    }
}
