//! Cart line items as seen by the load partitioner.

/// One cart line, already converted to kilograms and centimetres.
///
/// Quantity multiplies the stackable weight and height but not the width or
/// length, which are governed by the largest single package.
///
/// # Examples
/// ```
/// use courier_core::CartItem;
///
/// let item = CartItem::new(1.5, 20.0, 30.0, 4.0).with_quantity(3);
/// assert_eq!(item.total_weight(), 4.5);
/// assert_eq!(item.stacked_height(), 12.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartItem {
    /// Weight of one unit in kilograms.
    pub weight_kg: f64,
    /// Width of one unit in centimetres.
    pub width_cm: f64,
    /// Length of one unit in centimetres.
    pub length_cm: f64,
    /// Height of one unit in centimetres.
    pub height_cm: f64,
    /// Number of units; at least one.
    #[cfg_attr(feature = "serde", serde(default = "default_quantity"))]
    pub quantity: u32,
}

#[cfg(feature = "serde")]
const fn default_quantity() -> u32 {
    1
}

impl CartItem {
    /// Create a single-unit item.
    #[must_use]
    pub const fn new(weight_kg: f64, width_cm: f64, length_cm: f64, height_cm: f64) -> Self {
        Self {
            weight_kg,
            width_cm,
            length_cm,
            height_cm,
            quantity: 1,
        }
    }

    /// Create a single-unit item with only a weight.
    #[must_use]
    pub const fn with_weight(weight_kg: f64) -> Self {
        Self::new(weight_kg, 0.0, 0.0, 0.0)
    }

    /// Set the quantity; zero is raised to one.
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = if quantity == 0 { 1 } else { quantity };
        self
    }

    /// Weight of the whole line.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weight_kg * f64::from(self.quantity.max(1))
    }

    /// Height of the whole line with units stacked.
    #[must_use]
    pub fn stacked_height(&self) -> f64 {
        self.height_cm * f64::from(self.quantity.max(1))
    }
}
