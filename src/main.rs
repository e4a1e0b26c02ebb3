//! Solar Scout binary: field telemetry collector for solar-panel siting.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use solar_scout::{
    CollectorLoop, DefaultSensorDriver, DeliveryConfig, InfluxClient, RetryingDelivery,
    RunningExtrema, SensorReader, SystemHostProbe, TelemetryDisplay, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_CYCLE_DELAY_SECS, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS,
};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "solar_scout")]
#[command(about = "Solar panel siting telemetry collector")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    long_about = "Samples an INA219 power sensor, enriches each sample with host telemetry, \
                  and forwards the points to InfluxDB with bounded retries."
)]
struct Cli {
    /// Location tag attached to every emitted point (e.g. south-fence)
    location: String,

    /// Render each sample to the attached I2C character display
    #[arg(long)]
    display: bool,

    /// Seconds between acquisition cycles
    #[arg(long, default_value_t = DEFAULT_CYCLE_DELAY_SECS)]
    delay: u64,

    /// Path to the InfluxDB credentials file
    #[arg(long, default_value = DEFAULT_CREDENTIALS_PATH)]
    credentials: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    info!("solar_scout v{} starting", env!("CARGO_PKG_VERSION"));
    log_host_summary();

    let config = DeliveryConfig::load(&cli.credentials)
        .context("cannot start without InfluxDB credentials")?;
    info!(
        "writing to {} (bucket {}, org {})",
        config.url, config.bucket, config.org
    );

    let display = build_display(cli.display)?;
    let probe = SystemHostProbe::new();
    let reader = SensorReader::new(DefaultSensorDriver::new(), probe.clone());
    let delivery = RetryingDelivery::new(
        InfluxClient::new(config),
        probe,
        DEFAULT_RETRY_ATTEMPTS,
        Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
    );

    let started = chrono::Utc::now();
    let mut collector = CollectorLoop::new(
        reader,
        delivery,
        cli.location,
        Duration::from_secs(cli.delay),
        display,
    );
    let extrema = collector.run().await;

    print_summary(&extrema, started);
    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug { Level::DEBUG } else { Level::INFO };

    // RUST_LOG overrides the flag-selected level when set.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn log_host_summary() {
    use sysinfo::System;

    info!(
        "host {} ({} {}, kernel {})",
        System::host_name().unwrap_or_else(|| "unknown".to_string()),
        System::name().unwrap_or_else(|| "unknown".to_string()),
        System::os_version().unwrap_or_else(|| "unknown".to_string()),
        System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
    );
}

#[cfg(feature = "hardware")]
fn build_display(enabled: bool) -> anyhow::Result<Option<Box<dyn TelemetryDisplay>>> {
    if !enabled {
        return Ok(None);
    }
    let lcd = solar_scout::I2cLcd::new().context("failed to initialize the I2C display")?;
    Ok(Some(Box::new(lcd)))
}

#[cfg(not(feature = "hardware"))]
fn build_display(enabled: bool) -> anyhow::Result<Option<Box<dyn TelemetryDisplay>>> {
    if enabled {
        anyhow::bail!("--display requires building with the `hardware` feature");
    }
    Ok(None)
}

fn print_summary(extrema: &RunningExtrema, started: chrono::DateTime<chrono::Utc>) {
    let ended = chrono::Utc::now();
    println!();
    println!(
        "Run summary ({} to {})",
        started.format("%Y-%m-%d %H:%M:%S UTC"),
        ended.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Max Voltage:     {:.3} V", extrema.voltage);
    println!("  Max Shunt:       {:.3} mV", extrema.shunt_voltage);
    println!("  Max Current:     {:.3} mA", extrema.current);
    println!("  Max Power:       {:.3} mW", extrema.power);
    println!("  Max Temperature: {:.1} C", extrema.temperature);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_location() {
        assert!(Cli::try_parse_from(["solar_scout"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["solar_scout", "south-fence"]).unwrap();
        assert_eq!(cli.location, "south-fence");
        assert!(!cli.display);
        assert_eq!(cli.delay, DEFAULT_CYCLE_DELAY_SECS);
        assert_eq!(cli.credentials, DEFAULT_CREDENTIALS_PATH);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "solar_scout",
            "north-shed",
            "--display",
            "--delay",
            "10",
            "--credentials",
            "/etc/solar/.influxdb",
        ])
        .unwrap();
        assert_eq!(cli.location, "north-shed");
        assert!(cli.display);
        assert_eq!(cli.delay, 10);
        assert_eq!(cli.credentials, "/etc/solar/.influxdb");
    }
}
