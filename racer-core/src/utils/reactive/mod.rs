//! Reactive value mechanism used by the vehicle model.
//!
//! - `properties`: named, range-clamped float properties with
//!   synchronous change callbacks

pub mod properties;
