use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity key for a cart line.
///
/// Two lines are the same line when product, size and color all match;
/// adding an existing key increments quantity instead of appending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: Uuid,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// One distinct (product, size, color) entry with a quantity.
///
/// `line_subtotal` is always `unit_price * quantity` and is recomputed on
/// every mutation, never stored independently of its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub line_subtotal: Decimal,
}

impl CartLine {
    /// Builds a line with a quantity of at least 1 and a derived subtotal.
    pub fn new(
        product_id: Uuid,
        name: impl Into<String>,
        unit_price: Decimal,
        image: impl Into<String>,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    ) -> Self {
        let quantity = quantity.max(1);
        Self {
            product_id,
            name: name.into(),
            unit_price,
            image: image.into(),
            quantity,
            size,
            color,
            line_subtotal: unit_price * Decimal::from(quantity),
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }

    /// Replaces the quantity and recomputes the subtotal.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.line_subtotal = self.unit_price * Decimal::from(quantity);
    }
}

/// Ordered sequence of cart lines, unique by [`LineKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.key() == *key)
    }

    /// Adds a line, merging with an existing line of the same key by
    /// incrementing its quantity.
    pub fn add(&mut self, line: CartLine) {
        let key = line.key();
        match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(existing) => {
                let merged = existing.quantity + line.quantity;
                existing.set_quantity(merged);
            }
            None => self.lines.push(line),
        }
    }

    /// Sets the quantity of a line. A quantity of zero or less removes the
    /// line; an absent key is a no-op.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: i32) {
        if quantity <= 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == *key) {
            line.set_quantity(quantity as u32);
        }
    }

    /// Removes a line. Removing a non-existent line is a no-op.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|line| line.key() != *key);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of line subtotals across all lines.
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(|line| line.line_subtotal).sum()
    }
}
