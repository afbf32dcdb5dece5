use core::cell::RefCell;

use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};
use racer_core::utils::controllers::i2c::{DeviceError, ServoBoard};
use racer_core::utils::ActuatorSink;

/// Default I2C address of the servo board.
pub const PWM_ADDRESS: u8 = 0x40;

/// Create a write transaction for the given I2C address and data payload.
pub fn write(
    addr: u8,
    data: Vec<u8>,
) -> I2cTrans {
    I2cTrans::write(addr, data)
}

/// Transactions issued by `init`: enable, then prescale under sleep.
fn init_expectations() -> Vec<I2cTrans> {
    vec![
        write(PWM_ADDRESS, vec![0x00, 0x01]),
        write(PWM_ADDRESS, vec![0x00, 0x11]),
        write(PWM_ADDRESS, vec![0xFE, 121]),
        write(PWM_ADDRESS, vec![0x00, 0x01]),
    ]
}

#[test]
fn test_init_configures_a_50hz_frame() {
    let mock = I2cMock::new(&init_expectations());
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    board.init().unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_write_maps_commands_to_servo_pulses() {
    // Neutral is 1500 us -> 307 ticks, full forward 2250 us -> 460 ticks.
    // The first channel write also switches on register auto-increment.
    let mut expectations = init_expectations();
    expectations.extend([
        write(PWM_ADDRESS, vec![0x00, 0x21]),
        write(PWM_ADDRESS, vec![0x06, 0x00, 0x00, 0x33, 0x01]),
        write(PWM_ADDRESS, vec![0x0A, 0x00, 0x00, 0xCC, 0x01]),
    ]);

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    board.init().unwrap();
    board.write(0, 0.0).unwrap();
    board.write(1, 1.0).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_write_clamps_out_of_range_commands() {
    // -5.0 clamps to -1.0: full reverse, 750 us -> 153 ticks (0x99).
    let mut expectations = init_expectations();
    expectations.extend([
        write(PWM_ADDRESS, vec![0x00, 0x21]),
        write(PWM_ADDRESS, vec![0x06, 0x00, 0x00, 0x99, 0x00]),
    ]);

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    board.init().unwrap();
    board.write(0, -5.0).unwrap();
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_write_before_init_fails() {
    let mock = I2cMock::new(&[]);
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    assert!(matches!(
        board.write(0, 0.0),
        Err(DeviceError::NotInitialized)
    ));
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_write_rejects_unknown_channels() {
    let mock = I2cMock::new(&init_expectations());
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    board.init().unwrap();
    assert!(matches!(
        board.write(16, 0.0),
        Err(DeviceError::InvalidChannel(16))
    ));
    i2c_bus.borrow_mut().done();
}

#[test]
fn test_disable_releases_the_servos() {
    let mut expectations = init_expectations();
    // Sleep bit set on disable.
    expectations.push(write(PWM_ADDRESS, vec![0x00, 0x11]));

    let mock = I2cMock::new(&expectations);
    let i2c_bus = RefCell::new(mock);
    let mut board = ServoBoard::new(&i2c_bus, PWM_ADDRESS);
    board.init().unwrap();
    board.disable().unwrap();
    i2c_bus.borrow_mut().done();
}
