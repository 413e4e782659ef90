//! Growable property storage owned by an [`Item`](crate::Item).
//!
//! Capacity grows in fixed steps of [`GROW_STEP`] slots rather than doubling.
//! Lookups are linear scans, which is the right trade-off for the handful of
//! properties a metrics record carries.
//!
//! Removal through `remove` and `filter` is a swap-remove: the last entry
//! is moved into the vacated slot. This is O(1) but **does not preserve the
//! relative order** of the remaining entries. `filter_not` is the exception:
//! it compacts in one left-to-right pass and survivors keep their order.
//!
//! [`PropertyStore::find_or_allocate`] hands out a mutable borrow. Growth may
//! move every entry, so that borrow cannot be held across another call on the
//! store; the borrow checker enforces it.

use std::collections::HashSet;

use tracing::warn;

use crate::error::{MetricsError, Result};
use crate::property::Property;

/// Number of slots added each time the store runs out of room.
pub const GROW_STEP: usize = 10;

#[derive(Debug, Default)]
pub struct PropertyStore {
    props: Vec<Property>,
    /// Logical capacity, always a sum of growth increments.
    capacity: usize,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with room for at least `capacity` properties.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut store = Self::new();
        if capacity > 0 {
            store.grow(capacity)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.props.iter()
    }

    /// Iterates over properties that carry a usable (non-empty) name.
    pub fn iter_named(&self) -> impl Iterator<Item = &Property> {
        self.props.iter().filter(|p| !p.name().is_empty())
    }

    pub fn get(&self, index: usize) -> Option<&Property> {
        self.props.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Property> {
        self.props.get_mut(index)
    }

    /// Index of the first property named `name`.
    pub fn find_index(&self, name: &str) -> Option<usize> {
        self.props.iter().position(|p| p.is_named(name))
    }

    pub fn find(&self, name: &str) -> Option<&Property> {
        self.find_index(name).map(|i| &self.props[i])
    }

    /// Returns the property named `name`, appending a `None`-valued one if it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `ResourceExhausted` if growing
    /// the store fails.
    pub fn find_or_allocate(&mut self, name: &str) -> Result<&mut Property> {
        if name.is_empty() {
            return Err(MetricsError::InvalidArgument(
                "property name must not be empty".to_string(),
            ));
        }
        if let Some(i) = self.find_index(name) {
            return Ok(&mut self.props[i]);
        }
        if self.props.len() == self.capacity {
            self.grow(GROW_STEP)?;
        }
        self.props.push(Property::named(name));
        let last = self.props.len() - 1;
        Ok(&mut self.props[last])
    }

    /// Swap-removes the property named `name`. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.find_index(name) {
            Some(i) => {
                self.props.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Removes every listed property that is present. Returns how many were removed.
    pub fn filter<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        names.iter().filter(|n| self.remove(n.as_ref())).count()
    }

    /// Removes every property whose name is **not** listed, in one
    /// left-to-right compaction pass. Survivors keep their relative order.
    /// Returns how many were removed.
    pub fn filter_not<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let keep: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        let before = self.props.len();
        self.props.retain(|p| keep.contains(p.name()));
        before - self.props.len()
    }

    /// Drops every property, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.props.clear();
    }

    /// Adds `increment` slots of capacity (or [`GROW_STEP`] when zero).
    ///
    /// Existing entries are kept intact but may move in memory.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` if the allocation fails.
    pub fn grow(&mut self, increment: usize) -> Result<()> {
        let increment = if increment == 0 { GROW_STEP } else { increment };
        let new_capacity = self.capacity.checked_add(increment).ok_or_else(|| {
            MetricsError::ResourceExhausted("property store capacity overflow".to_string())
        })?;
        let additional = new_capacity - self.props.len();
        if let Err(e) = self.props.try_reserve_exact(additional) {
            warn!(capacity = new_capacity, "property store growth failed: {}", e);
            return Err(MetricsError::ResourceExhausted(e.to_string()));
        }
        self.capacity = new_capacity;
        Ok(())
    }
}

/// A copy owns an independent allocation sized to the source's count; every
/// string payload is cloned.
impl Clone for PropertyStore {
    fn clone(&self) -> Self {
        Self {
            props: self.props.clone(),
            capacity: self.props.len(),
        }
    }
}

/// Two stores are equal when they hold the same properties in the same
/// order; spare capacity is not part of the comparison.
impl PartialEq for PropertyStore {
    fn eq(&self, other: &Self) -> bool {
        self.props == other.props
    }
}
