use clap::Parser;
use std::process::ExitCode;
use sweep_driver::{
    DeviceSession, DriverConfig, SweepError, DEFAULT_BAUD_RATE, DEFAULT_SCAN_TIMEOUT_MS,
};

/// Reads scans from a Sweep LiDAR.
#[derive(Parser)]
#[command(disable_version_flag = true)]
struct Args {
    /// The device path to a serial port
    port: String,
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud_rate: u32,
    /// Number of scans to read
    #[arg(short = 'n', long, default_value_t = 4)]
    count: usize,
    #[arg(long, default_value_t = DEFAULT_SCAN_TIMEOUT_MS)]
    timeout_ms: u64,
    /// Motor speed in Hz to set before scanning
    #[arg(long)]
    motor_speed: Option<i32>,
    /// Print scans as JSON lines
    #[arg(long)]
    json: bool,
    /// Skip the device reset before exiting
    #[arg(long)]
    no_reset: bool,
}

fn run(args: &Args) -> Result<(), SweepError> {
    let config = DriverConfig::new(args.port.as_str()).with_baud_rate(args.baud_rate);
    let sweep = DeviceSession::construct(config)?;

    if let Some(speed) = args.motor_speed {
        sweep.set_motor_speed(speed)?;
    }
    log::info!(
        "Motor speed {} Hz, sample rate {} samples/s",
        sweep.get_motor_speed()?,
        sweep.get_sample_rate()?
    );

    sweep.start_scanning()?;
    for (n, scan) in sweep.scans(args.timeout_ms).take(args.count).enumerate() {
        let scan = scan?;
        if args.json {
            println!("{}", serde_json::to_string(&scan).map_err(std::io::Error::from)?);
        } else {
            println!("scan {}: {} samples", n, scan.len());
            for sample in &scan {
                println!("  {:8.2} deg  {:6} mm", sample.angle_degree(), sample.distance);
            }
        }
    }
    sweep.stop_scanning()?;

    if !args.no_reset {
        sweep.reset()?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
