//! Bounded reactive properties.
//!
//! A `PropertySet` holds named `f32` values that clamp themselves into a
//! declared range on every write and invoke registered callbacks, in
//! registration order, whenever a write changes the stored value. Writes
//! that clamp to the currently stored value (exact float equality) are
//! no-ops: no callback fires.

use alloc::boxed::Box;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Callback invoked with `(old, new)` after a property value changed.
pub type ChangeCallback = Box<dyn FnMut(f32, f32) + Send>;

/// Errors raised by property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// The named property was never registered.
    UnknownProperty(&'static str),
}

/// A recorded value change, handed back by [`PropertySet::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Change {
    pub old: f32,
    pub new: f32,
}

/// Clamp `value` into `[min, max]`.
///
/// Total over all `f32` inputs: NaN fails the `value >= min` comparison
/// and therefore clamps to `min`, i.e. NaN is treated as below the range
/// minimum. `min <= max` is the caller's responsibility.
pub fn clamp(
    value: f32,
    min: f32,
    max: f32,
) -> f32 {
    if value >= min {
        if value > max {
            max
        } else {
            value
        }
    } else {
        min
    }
}

/// A named float value constrained to a closed interval.
///
/// The stored value always lies within `[min, max]` after any successful
/// write; out-of-range writes are clamped, never rejected.
pub struct BoundedProperty {
    value: f32,
    min: f32,
    max: f32,
    callbacks: Vec<ChangeCallback>,
}

impl BoundedProperty {
    /// Create a property with the given range, clamping the initial value.
    pub fn new(
        initial: f32,
        min: f32,
        max: f32,
    ) -> Self {
        Self {
            value: clamp(initial, min, max),
            min,
            max,
            callbacks: Vec::new(),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Clamp `new_value` into range and store it.
    ///
    /// Returns `None` without invoking callbacks when the clamped value
    /// equals the stored one; otherwise stores it, runs every callback in
    /// registration order with `(old, new)`, and returns the change.
    pub fn set(
        &mut self,
        new_value: f32,
    ) -> Option<Change> {
        let new = clamp(new_value, self.min, self.max);
        let old = self.value;
        if new == old {
            return None;
        }
        self.value = new;
        for callback in &mut self.callbacks {
            callback(old, new);
        }
        Some(Change { old, new })
    }

    /// Register a change callback, appended after existing ones.
    pub fn on_change(
        &mut self,
        callback: impl FnMut(f32, f32) + Send + 'static,
    ) {
        self.callbacks.push(Box::new(callback));
    }
}

/// A table of named bounded properties.
#[derive(Default)]
pub struct PropertySet {
    properties: HashMap<&'static str, BoundedProperty>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
        }
    }

    /// Register `name` with an initial value and valid range.
    ///
    /// Re-registering a name replaces the property and drops its callbacks.
    pub fn register(
        &mut self,
        name: &'static str,
        initial: f32,
        min: f32,
        max: f32,
    ) {
        self.properties
            .insert(name, BoundedProperty::new(initial, min, max));
    }

    /// Read the current value of `name`.
    pub fn get(
        &self,
        name: &'static str,
    ) -> Result<f32, PropertyError> {
        self.properties
            .get(name)
            .map(BoundedProperty::value)
            .ok_or(PropertyError::UnknownProperty(name))
    }

    /// Write `new_value` to `name`, clamping into the property's range.
    ///
    /// The name is validated before any mutation. See
    /// [`BoundedProperty::set`] for the no-op suppression and callback
    /// rules.
    pub fn set(
        &mut self,
        name: &'static str,
        new_value: f32,
    ) -> Result<Option<Change>, PropertyError> {
        self.properties
            .get_mut(name)
            .map(|property| property.set(new_value))
            .ok_or(PropertyError::UnknownProperty(name))
    }

    /// Register a change callback on `name`.
    pub fn on_change(
        &mut self,
        name: &'static str,
        callback: impl FnMut(f32, f32) + Send + 'static,
    ) -> Result<(), PropertyError> {
        self.properties
            .get_mut(name)
            .map(|property| property.on_change(callback))
            .ok_or(PropertyError::UnknownProperty(name))
    }
}
