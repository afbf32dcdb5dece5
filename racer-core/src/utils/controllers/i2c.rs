//! PCA9685 servo-board actuator sink over a shared I2C bus.
//!
//! The steering servo and the throttle ESC both hang off one 16-channel
//! PCA9685 PWM board (0x40 by default). Normalized commands in `[-1, 1]`
//! are mapped to continuous-servo pulses of 750–2250 µs inside a 50 Hz
//! frame.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use crate::utils::controllers::ActuatorSink;
use crate::utils::reactive::properties::clamp;

/// 25 MHz / (4096 * 50 Hz) - 1, the prescale for a 20 ms servo frame.
const PRESCALE_50HZ: u8 = 121;
/// Servo frame length in microseconds at 50 Hz.
const FRAME_US: f32 = 20_000.0;
/// PWM counter resolution of the PCA9685.
const RESOLUTION: f32 = 4096.0;
/// Continuous-servo neutral pulse width in microseconds.
const CENTER_PULSE_US: f32 = 1500.0;
/// Pulse swing for a full-scale command in microseconds.
const RANGE_PULSE_US: f32 = 750.0;

/// Errors that can occur when driving the servo board.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    Pwm(PwmError<E>),
    NotInitialized,
    InvalidChannel(u8),
}

/// Driver for the PCA9685 servo board on a shared I2C bus.
pub struct ServoBoard<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    pwm: Option<Pca9685<RefCellDevice<'a, I2C>>>,
    address: u8,
}

impl<'a, I2C, E> ServoBoard<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Create a driver for the board at `address`. No bus traffic yet.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        address: u8,
    ) -> Self {
        ServoBoard {
            i2c: i2c_bus,
            pwm: None,
            address,
        }
    }

    /// Initialize the PCA9685 and configure it for a 50 Hz servo frame.
    pub fn init(&mut self) -> Result<(), DeviceError<E>> {
        let mut pwm = Pca9685::new(RefCellDevice::new(self.i2c), PwmAddress::from(self.address))
            .map_err(DeviceError::Pwm)?;
        pwm.enable().map_err(DeviceError::Pwm)?;
        tracing::info!("PWM enabled");
        pwm.set_prescale(PRESCALE_50HZ).map_err(DeviceError::Pwm)?;
        tracing::info!("PWM prescale set to 50Hz");

        self.pwm = Some(pwm);
        Ok(())
    }

    /// Scan the I2C bus for devices and log any found addresses.
    pub fn scan_bus(&self) {
        let mut bus = self.i2c.borrow_mut();
        for addr in 0x03..0x78 {
            if bus.write(addr, &[]).is_ok() {
                tracing::warn!("I2C device found at 0x{:02X}", addr);
            }
        }
    }

    /// Re-enable the PWM outputs after a `disable`.
    pub fn enable(&mut self) -> Result<(), DeviceError<E>> {
        let pwm = self.pwm.as_mut().ok_or(DeviceError::NotInitialized)?;
        pwm.enable().map_err(DeviceError::Pwm)
    }

    /// Put the board to sleep, releasing the servos.
    pub fn disable(&mut self) -> Result<(), DeviceError<E>> {
        let pwm = self.pwm.as_mut().ok_or(DeviceError::NotInitialized)?;
        pwm.disable().map_err(DeviceError::Pwm)
    }
}

/// Map a channel index onto the PCA9685 output set.
fn output_channel(index: u8) -> Option<Channel> {
    let channel = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };
    Some(channel)
}

impl<'a, I2C, E> ActuatorSink for ServoBoard<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    type Error = DeviceError<E>;

    /// Drive `channel` with the pulse width for the normalized `value`.
    fn write(
        &mut self,
        channel: u8,
        value: f32,
    ) -> Result<(), Self::Error> {
        let channel = output_channel(channel).ok_or(DeviceError::InvalidChannel(channel))?;
        let pwm = self.pwm.as_mut().ok_or(DeviceError::NotInitialized)?;

        let pulse_us = CENTER_PULSE_US + clamp(value, -1.0, 1.0) * RANGE_PULSE_US;
        let off_ticks = (pulse_us * RESOLUTION / FRAME_US) as u16;
        pwm.set_channel_on_off(channel, 0, off_ticks)
            .map_err(DeviceError::Pwm)
    }
}
