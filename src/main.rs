//! Polls an ICP-10111 on a Linux I2C bus and prints a table of readings.
//!
//! ```text
//! $ icp10111 --bus /dev/i2c-1 --count 3
//! Sample | Pressure (hPa) | Temperature (°C)
//! -------|----------------|------------------
//!      1 |       1013.25 |           21.40
//!      2 |         Error |           Error
//!      3 |       1013.27 |           21.41
//! ```

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use icp10111::{DEFAULT_ADDRESS, ICP10111};
use linux_embedded_hal::{Delay, I2cdev};

#[derive(Debug, Parser)]
#[command(about = "Continuously read pressure and temperature from an ICP-10111")]
struct Args {
    /// I2C bus device node.
    #[arg(long, default_value = "/dev/i2c-1")]
    bus: PathBuf,
    /// 7-bit peripheral address, decimal or 0x-prefixed hex.
    #[arg(long, default_value_t = DEFAULT_ADDRESS, value_parser = parse_address)]
    address: u8,
    /// Pause between samples, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    /// Stop after this many samples (runs forever if omitted).
    #[arg(long)]
    count: Option<u64>,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    match parsed {
        Ok(addr) if (0x03..=0x77).contains(&addr) => Ok(addr),
        Ok(addr) => Err(format!("0x{:02X} is not a usable 7-bit address", addr)),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_module("icp10111", log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let args = Args::parse();

    print_sensor_info(&args);

    let dev = I2cdev::new(&args.bus)
        .with_context(|| format!("failed to open I2C device {}", args.bus.display()))?;
    let mut sensor = ICP10111::with_address(dev, Delay, args.address);
    log::info!(
        "I2C initialized on {}, address 0x{:02X}",
        args.bus.display(),
        sensor.address()
    );

    println!("Starting continuous measurement...");
    println!("Press Ctrl+C to stop\n");
    println!("{}", HEADER);
    println!("{}", SEPARATOR);

    let mut sample = 0u64;
    while args.count.map_or(true, |n| sample < n) {
        sample += 1;

        let (pressure, temperature) = sensor.sample();
        if sample == 1 && pressure.is_none() {
            log::warn!(
                "first sample failed; the address is only claimed on the first transfer, \
                 check that 0x{:02X} is present and not bound to a kernel driver",
                sensor.address()
            );
        }
        println!("{}", format_row(sample, pressure, temperature));

        if args.count.map_or(true, |n| sample < n) {
            thread::sleep(Duration::from_millis(args.interval_ms));
        }
    }

    Ok(())
}

const HEADER: &str = "Sample | Pressure (hPa) | Temperature (°C)";
const SEPARATOR: &str = "-------|----------------|------------------";

fn print_sensor_info(args: &Args) {
    println!("========================================");
    println!("  ICP-10111 Barometric Pressure Sensor");
    println!("========================================");
    println!("I2C Address: 0x{:02X}", args.address);
    println!("I2C Bus: {}", args.bus.display());
    println!("Pressure Range: 300-1250 hPa");
    println!("Accuracy: ±0.4 hPa @ 25°C");
    println!("========================================\n");
}

/// One table row; `None` cells print as `Error`.
fn format_row(sample: u64, pressure: Option<f32>, temperature: Option<f32>) -> String {
    format!(
        "{:6} | {} | {}",
        sample,
        cell(pressure, 13),
        cell(temperature, 15)
    )
}

fn cell(value: Option<f32>, width: usize) -> String {
    match value {
        Some(v) => format!("{:>width$.2}", v, width = width),
        None => format!("{:>width$}", "Error", width = width),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_both_readings() {
        assert_eq!(
            format_row(1, Some(1013.25), Some(21.4)),
            "     1 |       1013.25 |           21.40"
        );
    }

    #[test]
    fn row_with_failed_temperature() {
        assert_eq!(
            format_row(12, Some(998.5), None),
            "    12 |        998.50 |           Error"
        );
    }

    #[test]
    fn row_with_failed_pressure() {
        assert_eq!(
            format_row(3, None, None),
            "     3 |         Error |           Error"
        );
    }

    #[test]
    fn negative_temperature() {
        assert_eq!(cell(Some(-40.0), 15), "         -40.00");
    }

    #[test]
    fn address_parsing() {
        assert_eq!(parse_address("0x63"), Ok(0x63));
        assert_eq!(parse_address("0X48"), Ok(0x48));
        assert_eq!(parse_address("99"), Ok(99));
        assert!(parse_address("0x78").is_err());
        assert!(parse_address("0x00").is_err());
        assert!(parse_address("sixty").is_err());
    }

    #[test]
    fn default_args() {
        let args = Args::parse_from(["icp10111"]);
        assert_eq!(args.bus, PathBuf::from("/dev/i2c-1"));
        assert_eq!(args.address, DEFAULT_ADDRESS);
        assert_eq!(args.interval_ms, 1000);
        assert_eq!(args.count, None);
    }

    #[test]
    fn args_from_command_line() {
        let args = Args::parse_from([
            "icp10111",
            "--bus",
            "/dev/i2c-3",
            "--address",
            "0x48",
            "--interval-ms",
            "250",
            "--count",
            "5",
        ]);
        assert_eq!(args.bus, PathBuf::from("/dev/i2c-3"));
        assert_eq!(args.address, 0x48);
        assert_eq!(args.interval_ms, 250);
        assert_eq!(args.count, Some(5));
    }
}
