use clap::Parser;
use racer_core::utils::controllers::racecar::{STEERING, THROTTLE};
use racer_core::utils::{ActuatorSink, Axis, ChassisPreset, RacecarInit};
use std::convert::Infallible;
use tracing::info;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Chassis preset to apply (none, chassis_a, chassis_b)
    #[clap(long, default_value = "none")]
    preset: String,
    /// Sweep steps per axis
    #[clap(long, default_value_t = 8)]
    steps: u32,
    /// Print the resolved configuration as JSON and exit
    #[clap(long)]
    dump_config: bool,
}

/// Sink that logs actuator targets instead of touching hardware.
struct ConsoleSink;

impl ActuatorSink for ConsoleSink {
    type Error = Infallible;

    fn write(
        &mut self,
        channel: u8,
        value: f32,
    ) -> Result<(), Self::Error> {
        info!("actuator[{channel}] <- {value:+.3}");
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let preset = match opts.preset.as_str() {
        "none" => ChassisPreset::None,
        "chassis_a" => ChassisPreset::ChassisA,
        "chassis_b" => ChassisPreset::ChassisB,
        other => {
            eprintln!("unknown preset: {other}");
            std::process::exit(2);
        }
    };

    let init = RacecarInit::with_preset(preset);
    if opts.dump_config {
        println!("{}", serde_json::to_string_pretty(&init).unwrap());
        return;
    }

    let mut car = init.build(ConsoleSink).unwrap();
    car.observe(STEERING, |old, new| info!("steering {old:+.3} -> {new:+.3}"))
        .unwrap();
    car.observe(THROTTLE, |old, new| info!("throttle {old:+.3} -> {new:+.3}"))
        .unwrap();

    info!("sweeping steering across [-1, 1]");
    let steps = opts.steps.max(1);
    for i in 0..=steps {
        let command = -1.0 + 2.0 * i as f32 / steps as f32;
        car.set_steering(command).unwrap();
    }

    info!("ramping throttle");
    for i in 0..=steps {
        let command = i as f32 / steps as f32;
        car.set_throttle(command).unwrap();
    }

    info!("narrowing steering travel, sink is re-driven from the cached command");
    car.set_steering_endpoints(-0.3, 0.3).unwrap();
    car.set_gain_offset(Axis::Throttle, 0.25, 0.0).unwrap();

    car.set_steering(0.0).unwrap();
    car.set_throttle(0.0).unwrap();
}
