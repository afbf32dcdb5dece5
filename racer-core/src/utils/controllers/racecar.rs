//! Reactive steering/throttle vehicle model.
//!
//! A `Racecar` owns a set of bounded properties (the steering and throttle
//! commands plus per-axis travel endpoints) and an actuator sink. Every
//! accepted command write runs a per-axis transform and drives exactly one
//! sink write on that axis's channel:
//!
//! ```text
//! raw = if c <= 0 { -lo * c * gain + offset } else { hi * c * gain + offset }
//! out = clamp(raw, lo, hi)
//! ```
//!
//! A negative command scales toward the negative endpoint magnitude, a
//! positive one toward the positive endpoint magnitude, mapping the full
//! `[-1, 1]` input range onto the configured `[lo, hi]` physical range.
//! The final clamp guards against gain values that would push past the
//! configured travel limits.

use serde::{Deserialize, Serialize};

use crate::utils::controllers::{ActuatorSink, ControlError};
use crate::utils::reactive::properties::{clamp, PropertyError, PropertySet};

/// Steering command property name.
pub const STEERING: &str = "steering";
/// Throttle command property name.
pub const THROTTLE: &str = "throttle";
/// Steering negative travel limit property name.
pub const STEERING_MIN_ENDPOINT: &str = "steering_min_endpoint";
/// Steering positive travel limit property name.
pub const STEERING_MAX_ENDPOINT: &str = "steering_max_endpoint";
/// Throttle negative travel limit property name.
pub const THROTTLE_MIN_ENDPOINT: &str = "throttle_min_endpoint";
/// Throttle positive travel limit property name.
pub const THROTTLE_MAX_ENDPOINT: &str = "throttle_max_endpoint";

/// Command and endpoint properties share one safety range.
const COMMAND_RANGE: (f32, f32) = (-1.0, 1.0);

/// One controlled degree of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Steering,
    Throttle,
}

/// Named gain/offset bundles standing in for known chassis builds.
///
/// A preset is a convenience layer over the general transform, not a
/// separate code path: it only overrides the per-axis constants at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChassisPreset {
    /// Use the init struct's constants as given.
    None,
    /// Inverted steering linkage with a +0.2 throttle bias.
    ChassisA,
    /// Stock steering linkage with a -0.2 throttle bias.
    ChassisB,
}

/// Per-axis transform constants and routing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisInit {
    /// Static scale applied to the command. Unrestricted range.
    pub gain: f32,
    /// Static shift applied after the scale. Unrestricted range.
    pub offset: f32,
    /// Initial `(min, max)` travel limits, each clamped to `[-1, 1]`.
    pub endpoints: (f32, f32),
    /// Actuator channel on the servo board. Immutable after build.
    pub channel: u8,
}

/// Construction-time configuration for a [`Racecar`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RacecarInit {
    /// I2C address of the servo board shared by both axes.
    pub bus_address: u8,
    pub steering: AxisInit,
    pub throttle: AxisInit,
    /// Override gain/offset pairs with a named chassis bundle.
    pub preset: ChassisPreset,
    /// Re-drive the sink from the cached command after endpoint or
    /// gain/offset changes. The legacy behavior (recompute only on
    /// command writes) is selectable by clearing this.
    pub recompute_on_reconfigure: bool,
}

impl Default for RacecarInit {
    fn default() -> Self {
        Self {
            bus_address: 0x40,
            steering: AxisInit {
                gain: -0.65,
                offset: 0.0,
                endpoints: COMMAND_RANGE,
                channel: 0,
            },
            throttle: AxisInit {
                gain: 0.5,
                offset: 0.0,
                endpoints: COMMAND_RANGE,
                channel: 1,
            },
            preset: ChassisPreset::None,
            recompute_on_reconfigure: true,
        }
    }
}

impl RacecarInit {
    /// Default configuration with a chassis preset applied.
    pub fn with_preset(preset: ChassisPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Resolve the preset into concrete per-axis constants.
    fn resolved(&self) -> (AxisInit, AxisInit) {
        let mut steering = self.steering;
        let mut throttle = self.throttle;
        match self.preset {
            ChassisPreset::None => {}
            ChassisPreset::ChassisA => {
                steering.gain = 0.65;
                steering.offset = 0.2;
                throttle.gain = -0.5;
                throttle.offset = 0.2;
            }
            ChassisPreset::ChassisB => {
                steering.gain = -0.65;
                steering.offset = 0.0;
                throttle.gain = 0.5;
                throttle.offset = -0.2;
            }
        }
        (steering, throttle)
    }

    /// Build a [`Racecar`] over the given actuator sink.
    ///
    /// Fails with `InvalidEndpoints` if either axis's initial endpoints
    /// are inverted after clamping.
    pub fn build<S: ActuatorSink>(
        &self,
        sink: S,
    ) -> Result<Racecar<S>, ControlError<S::Error>> {
        let (steering, throttle) = self.resolved();

        let mut properties = PropertySet::new();
        let (min, max) = COMMAND_RANGE;
        properties.register(STEERING, 0.0, min, max);
        properties.register(THROTTLE, 0.0, min, max);

        let steering_axis = AxisConfig::register(
            &mut properties,
            &steering,
            STEERING,
            STEERING_MIN_ENDPOINT,
            STEERING_MAX_ENDPOINT,
        )?;
        let throttle_axis = AxisConfig::register(
            &mut properties,
            &throttle,
            THROTTLE,
            THROTTLE_MIN_ENDPOINT,
            THROTTLE_MAX_ENDPOINT,
        )?;

        Ok(Racecar {
            properties,
            steering: steering_axis,
            throttle: throttle_axis,
            bus_address: self.bus_address,
            recompute_on_reconfigure: self.recompute_on_reconfigure,
            sink,
        })
    }
}

/// Resolved per-axis state held by the vehicle.
#[derive(Debug, Clone, Copy)]
struct AxisConfig {
    gain: f32,
    offset: f32,
    channel: u8,
    command: &'static str,
    min_endpoint: &'static str,
    max_endpoint: &'static str,
}

impl AxisConfig {
    /// Validate the initial endpoints and register them as properties.
    fn register<E: core::fmt::Debug>(
        properties: &mut PropertySet,
        init: &AxisInit,
        command: &'static str,
        min_endpoint: &'static str,
        max_endpoint: &'static str,
    ) -> Result<Self, ControlError<E>> {
        let (range_min, range_max) = COMMAND_RANGE;
        let (min, max) = init.endpoints;
        let min = clamp(min, range_min, range_max);
        let max = clamp(max, range_min, range_max);
        if min > max {
            return Err(ControlError::InvalidEndpoints { min, max });
        }
        properties.register(min_endpoint, min, range_min, range_max);
        properties.register(max_endpoint, max, range_min, range_max);

        Ok(Self {
            gain: init.gain,
            offset: init.offset,
            channel: init.channel,
            command,
            min_endpoint,
            max_endpoint,
        })
    }
}

/// Reactive vehicle model over an actuator sink.
///
/// Setters run to completion synchronously: clamp, compare, callback
/// chain, transform, sink write. There is no internal locking; callers
/// driving a `Racecar` from several threads must serialize externally.
pub struct Racecar<S> {
    properties: PropertySet,
    steering: AxisConfig,
    throttle: AxisConfig,
    bus_address: u8,
    recompute_on_reconfigure: bool,
    sink: S,
}

impl<S, E> Racecar<S>
where
    S: ActuatorSink<Error = E>,
    E: core::fmt::Debug,
{
    /// I2C address of the servo board, as configured at build time.
    pub fn bus_address(&self) -> u8 {
        self.bus_address
    }

    /// Current steering command.
    pub fn steering(&self) -> f32 {
        // Registered at build time, lookup cannot fail.
        self.properties.get(STEERING).unwrap_or(0.0)
    }

    /// Current throttle command.
    pub fn throttle(&self) -> f32 {
        self.properties.get(THROTTLE).unwrap_or(0.0)
    }

    /// Current `(min, max)` travel limits for `axis`.
    pub fn endpoints(
        &self,
        axis: Axis,
    ) -> (f32, f32) {
        let config = self.axis_config(axis);
        (
            self.properties.get(config.min_endpoint).unwrap_or(0.0),
            self.properties.get(config.max_endpoint).unwrap_or(0.0),
        )
    }

    /// Current `(gain, offset)` pair for `axis`.
    pub fn gain_offset(
        &self,
        axis: Axis,
    ) -> (f32, f32) {
        let config = self.axis_config(axis);
        (config.gain, config.offset)
    }

    /// Read any registered property by name.
    pub fn get(
        &self,
        name: &'static str,
    ) -> Result<f32, PropertyError> {
        self.properties.get(name)
    }

    /// Register a change callback on any property by name.
    ///
    /// Callbacks run synchronously inside the triggering setter, in
    /// registration order, before the sink write.
    pub fn observe(
        &mut self,
        name: &'static str,
        callback: impl FnMut(f32, f32) + Send + 'static,
    ) -> Result<(), PropertyError> {
        self.properties.on_change(name, callback)
    }

    /// Set the steering command, clamped to `[-1, 1]`.
    pub fn set_steering(
        &mut self,
        command: f32,
    ) -> Result<(), ControlError<E>> {
        self.set_command(Axis::Steering, command)
    }

    /// Set the throttle command, clamped to `[-1, 1]`.
    pub fn set_throttle(
        &mut self,
        command: f32,
    ) -> Result<(), ControlError<E>> {
        self.set_command(Axis::Throttle, command)
    }

    /// Set the travel limits for the steering axis.
    pub fn set_steering_endpoints(
        &mut self,
        min: f32,
        max: f32,
    ) -> Result<(), ControlError<E>> {
        self.set_endpoints(Axis::Steering, min, max)
    }

    /// Set the travel limits for the throttle axis.
    pub fn set_throttle_endpoints(
        &mut self,
        min: f32,
        max: f32,
    ) -> Result<(), ControlError<E>> {
        self.set_endpoints(Axis::Throttle, min, max)
    }

    /// Write a normalized command to one axis.
    ///
    /// A write whose clamped value equals the stored one is a no-op: no
    /// callback fires and the sink is not touched. Otherwise the value is
    /// stored, callbacks run, and exactly one sink write follows.
    pub fn set_command(
        &mut self,
        axis: Axis,
        command: f32,
    ) -> Result<(), ControlError<E>> {
        let name = self.axis_config(axis).command;
        if self.properties.set(name, command)?.is_some() {
            self.apply(axis)?;
        }
        Ok(())
    }

    /// Reconfigure the travel limits for one axis.
    ///
    /// Both requested values are clamped to `[-1, 1]` independently;
    /// inverted limits (`min > max` after clamping) are rejected before
    /// any property is touched. When `recompute_on_reconfigure` is set
    /// and a limit actually changed, the transform is re-run from the
    /// cached command and the sink re-driven, so callers need not resend
    /// the command.
    pub fn set_endpoints(
        &mut self,
        axis: Axis,
        min: f32,
        max: f32,
    ) -> Result<(), ControlError<E>> {
        let (range_min, range_max) = COMMAND_RANGE;
        let min = clamp(min, range_min, range_max);
        let max = clamp(max, range_min, range_max);
        if min > max {
            return Err(ControlError::InvalidEndpoints { min, max });
        }

        let config = *self.axis_config(axis);
        let min_changed = self.properties.set(config.min_endpoint, min)?.is_some();
        let max_changed = self.properties.set(config.max_endpoint, max)?.is_some();
        if self.recompute_on_reconfigure && (min_changed || max_changed) {
            self.apply(axis)?;
        }
        Ok(())
    }

    /// Reconfigure the static transform constants for one axis.
    ///
    /// Like endpoint changes, re-drives the sink from the cached command
    /// when `recompute_on_reconfigure` is set and a constant changed.
    pub fn set_gain_offset(
        &mut self,
        axis: Axis,
        gain: f32,
        offset: f32,
    ) -> Result<(), ControlError<E>> {
        let config = self.axis_config_mut(axis);
        let changed = config.gain != gain || config.offset != offset;
        config.gain = gain;
        config.offset = offset;
        if self.recompute_on_reconfigure && changed {
            self.apply(axis)?;
        }
        Ok(())
    }

    /// Re-run the transform and sink write for both axes.
    ///
    /// Restores logical/physical consistency after a sink failure: the
    /// command properties keep their last accepted values, so resending
    /// them once the sink recovers is all that is needed.
    pub fn resync(&mut self) -> Result<(), ControlError<E>> {
        self.apply(Axis::Steering)?;
        self.apply(Axis::Throttle)?;
        Ok(())
    }

    /// Release the actuator sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn axis_config(
        &self,
        axis: Axis,
    ) -> &AxisConfig {
        match axis {
            Axis::Steering => &self.steering,
            Axis::Throttle => &self.throttle,
        }
    }

    fn axis_config_mut(
        &mut self,
        axis: Axis,
    ) -> &mut AxisConfig {
        match axis {
            Axis::Steering => &mut self.steering,
            Axis::Throttle => &mut self.throttle,
        }
    }

    /// Transform the cached command for `axis` and drive the sink.
    fn apply(
        &mut self,
        axis: Axis,
    ) -> Result<(), ControlError<E>> {
        let config = *self.axis_config(axis);
        let command = self.properties.get(config.command)?;
        let lo = self.properties.get(config.min_endpoint)?;
        let hi = self.properties.get(config.max_endpoint)?;

        let raw = if command <= 0.0 {
            -lo * command * config.gain + config.offset
        } else {
            hi * command * config.gain + config.offset
        };
        let output = clamp(raw, lo, hi);

        tracing::trace!(
            ?axis,
            channel = config.channel,
            command,
            output,
            "actuator target"
        );
        self.sink
            .write(config.channel, output)
            .map_err(ControlError::Sink)
    }
}
