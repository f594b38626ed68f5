//! Split a cart into driver loads under weight and dimension caps.
//!
//! Weight and height are stackable, so a load tracks their running sums.
//! Width and length are governed by the largest single package, so a load
//! tracks their running maxima. Items are visited once, in cart order; when an
//! item would breach any cap the current load is sealed and a fresh load is
//! seeded with that item. This is a greedy pass, not a bin-packing optimum.
//!
//! # Examples
//! ```
//! use courier_core::{CartItem, LoadCaps, LoadPartitioner};
//!
//! let caps = LoadCaps { max_weight: Some(5.0), ..LoadCaps::default() };
//! let cart = [2.0, 2.0, 2.0].map(CartItem::with_weight);
//! let plan = LoadPartitioner::new(caps, true).partition(&cart)?;
//! assert_eq!(plan.driver_count(), 2);
//! # Ok::<(), courier_core::PartitionError>(())
//! ```

use thiserror::Error;

use crate::CartItem;

/// Per-load caps; `None` disables a cap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadCaps {
    /// Maximum summed weight in kilograms.
    pub max_weight: Option<f64>,
    /// Maximum single-package width in centimetres.
    pub max_width: Option<f64>,
    /// Maximum single-package length in centimetres.
    pub max_length: Option<f64>,
    /// Maximum stacked height in centimetres.
    pub max_height: Option<f64>,
}

/// Measured quantity a cap applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dimension {
    /// Summed weight.
    Weight,
    /// Largest width.
    Width,
    /// Largest length.
    Length,
    /// Stacked height.
    Height,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weight => "weight",
            Self::Width => "width",
            Self::Length => "length",
            Self::Height => "height",
        })
    }
}

/// Reasons a cart cannot be assigned to drivers.
#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PartitionError {
    /// One cart line alone exceeds a cap and can never ship.
    #[error("item {item_index} {dimension} {value} exceeds the cap of {cap}")]
    CapExceeded {
        /// Position of the item in the cart.
        item_index: usize,
        /// Breached dimension.
        dimension: Dimension,
        /// Measured value for the item.
        value: f64,
        /// Configured cap.
        cap: f64,
    },
    /// The cart needs more than one driver but splitting is disabled.
    #[error("item {item_index} would exceed the load {dimension} cap and multiple drivers are disabled")]
    MultipleDriversDisallowed {
        /// Position of the item that triggered the split.
        item_index: usize,
        /// Dimension that would be breached.
        dimension: Dimension,
    },
}

/// Accumulating group of cart items carried by one driver.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverLoad {
    items: Vec<usize>,
    weight: f64,
    height: f64,
    width: f64,
    length: f64,
}

impl DriverLoad {
    fn seeded(index: usize, item: &CartItem) -> Self {
        let mut load = Self::default();
        load.push(index, item);
        load
    }

    fn push(&mut self, index: usize, item: &CartItem) {
        self.items.push(index);
        self.weight += item.total_weight();
        self.height += item.stacked_height();
        self.width = self.width.max(item.width_cm);
        self.length = self.length.max(item.length_cm);
    }

    /// Check whether `item` fits alongside the current contents.
    ///
    /// Returns the first breached dimension in weight, width, length, height
    /// order.
    fn admit(&self, item: &CartItem, caps: &LoadCaps) -> Result<(), Dimension> {
        let checks = [
            (Dimension::Weight, self.weight + item.total_weight(), caps.max_weight),
            (Dimension::Width, self.width.max(item.width_cm), caps.max_width),
            (Dimension::Length, self.length.max(item.length_cm), caps.max_length),
            (Dimension::Height, self.height + item.stacked_height(), caps.max_height),
        ];
        match checks
            .into_iter()
            .find(|(_, value, cap)| cap.is_some_and(|c| *value > c))
        {
            Some((dimension, _, _)) => Err(dimension),
            None => Ok(()),
        }
    }

    /// Cart positions of the items in this load.
    #[must_use]
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Summed weight in kilograms.
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Stacked height in centimetres.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Largest width in centimetres.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Largest length in centimetres.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }
}

/// Loads produced by one partitioning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadPlan {
    loads: Vec<DriverLoad>,
}

impl LoadPlan {
    /// Number of drivers needed; at least one.
    #[must_use]
    pub fn driver_count(&self) -> u32 {
        u32::try_from(self.loads.len()).unwrap_or(u32::MAX).max(1)
    }

    /// The sealed loads in creation order.
    #[must_use]
    pub fn loads(&self) -> &[DriverLoad] {
        &self.loads
    }
}

/// Greedy single-pass partitioner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadPartitioner {
    caps: LoadCaps,
    allow_multiple_drivers: bool,
}

impl LoadPartitioner {
    /// Create a partitioner for `caps`.
    #[must_use]
    pub const fn new(caps: LoadCaps, allow_multiple_drivers: bool) -> Self {
        Self {
            caps,
            allow_multiple_drivers,
        }
    }

    /// Assign `cart` to driver loads.
    ///
    /// An empty cart yields a single empty load; callers are expected to
    /// reject empty carts before pricing.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionError::CapExceeded`] when any single item breaches a
    /// cap, and [`PartitionError::MultipleDriversDisallowed`] when a split is
    /// needed but disabled.
    pub fn partition(&self, cart: &[CartItem]) -> Result<LoadPlan, PartitionError> {
        for (index, item) in cart.iter().enumerate() {
            self.check_single(index, item)?;
        }

        let mut loads = Vec::new();
        let mut current = DriverLoad::default();
        for (index, item) in cart.iter().enumerate() {
            match current.admit(item, &self.caps) {
                Ok(()) => current.push(index, item),
                Err(dimension) if !self.allow_multiple_drivers => {
                    return Err(PartitionError::MultipleDriversDisallowed {
                        item_index: index,
                        dimension,
                    });
                }
                Err(dimension) => {
                    log::debug!("item {index} breaches load {dimension}; starting a new load");
                    loads.push(std::mem::replace(
                        &mut current,
                        DriverLoad::seeded(index, item),
                    ));
                }
            }
        }
        loads.push(current);
        Ok(LoadPlan { loads })
    }

    fn check_single(&self, index: usize, item: &CartItem) -> Result<(), PartitionError> {
        let checks = [
            (Dimension::Weight, item.total_weight(), self.caps.max_weight),
            (Dimension::Width, item.width_cm, self.caps.max_width),
            (Dimension::Length, item.length_cm, self.caps.max_length),
            (Dimension::Height, item.stacked_height(), self.caps.max_height),
        ];
        for (dimension, value, cap) in checks {
            if let Some(cap) = cap.filter(|c| value > *c) {
                return Err(PartitionError::CapExceeded {
                    item_index: index,
                    dimension,
                    value,
                    cap,
                });
            }
        }
        Ok(())
    }
}
