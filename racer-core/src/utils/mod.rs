//! Utility re-exports for the RC-car control core.
//!
//! This module re-exports the reactive property set and the vehicle
//! controllers:
//!
//! - `reactive`: clamped float properties with change callbacks
//! - `controllers`: the vehicle model, the actuator-sink seam, and the
//!   PCA9685 servo-board driver

pub mod controllers;
pub mod reactive;

pub use controllers::i2c::{DeviceError, ServoBoard};
pub use controllers::racecar::{Axis, AxisInit, ChassisPreset, Racecar, RacecarInit};
pub use controllers::{ActuatorSink, ControlError};
pub use reactive::properties::{clamp, BoundedProperty, Change, PropertyError, PropertySet};
