//! Controllers for the RC-car control core.
//!
//! - `racecar`: the reactive steering/throttle vehicle model
//! - `i2c`: PCA9685 servo-board actuator sink over a shared I2C bus

pub mod i2c;
pub mod racecar;

use crate::utils::reactive::properties::PropertyError;

/// Abstract actuator output, one addressable channel per axis.
///
/// `value` is a normalized command in `[-1, 1]`. Implementations are
/// write-only and must tolerate one call per control-loop tick.
pub trait ActuatorSink {
    type Error: core::fmt::Debug;

    /// Drive the actuator on `channel` to the normalized `value`.
    fn write(
        &mut self,
        channel: u8,
        value: f32,
    ) -> Result<(), Self::Error>;
}

/// Errors surfaced by the vehicle model.
///
/// All variants are terminal for the triggering call; the embedding
/// control loop decides whether to halt, hold, or resend next tick.
#[derive(Debug)]
pub enum ControlError<E: core::fmt::Debug> {
    /// A property name was never registered.
    Property(PropertyError),
    /// Requested endpoints were inverted (`min > max` after clamping).
    InvalidEndpoints { min: f32, max: f32 },
    /// The actuator sink rejected the write. The logical command value
    /// has already been stored and callbacks have run; the physical
    /// actuator state is unknown until a later write or `resync`.
    Sink(E),
}

impl<E: core::fmt::Debug> From<PropertyError> for ControlError<E> {
    fn from(err: PropertyError) -> Self {
        ControlError::Property(err)
    }
}
