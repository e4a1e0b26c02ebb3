//! Best-effort host telemetry probes.
//!
//! CPU temperature and wireless signal strength enrich each sample but must
//! never block electrical measurement delivery, so both reads are
//! infallible: any command or parse failure degrades to a sentinel value
//! (`0.0` degrees, `0` dBm) instead of propagating an error.

use std::process::Command;

use tracing::warn;

/// Host telemetry source.
///
/// Implemented by [`SystemHostProbe`] for real hardware and by test doubles
/// in the collector tests.
pub trait HostProbe {
    /// CPU temperature in degrees Celsius; `0.0` when unavailable.
    fn read_temperature(&self) -> f64;

    /// Wireless signal strength in dBm; `0` when unavailable.
    fn read_signal_strength(&self) -> i32;
}

/// Probe backed by the host's diagnostic commands: `vcgencmd measure_temp`
/// for the SoC temperature and `iw <iface> station dump` for the wifi link.
#[derive(Debug, Clone)]
pub struct SystemHostProbe {
    wireless_interface: String,
}

impl SystemHostProbe {
    pub fn new() -> Self {
        Self::with_interface("wlan0")
    }

    /// Probe a wireless interface other than the default `wlan0`.
    pub fn with_interface(interface: impl Into<String>) -> Self {
        Self {
            wireless_interface: interface.into(),
        }
    }
}

impl Default for SystemHostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SystemHostProbe {
    fn read_temperature(&self) -> f64 {
        match read_vcgencmd_temperature() {
            Some(degrees) => degrees,
            None => {
                warn!("failed to read CPU temperature, substituting 0.0");
                0.0
            }
        }
    }

    fn read_signal_strength(&self) -> i32 {
        read_station_signal(&self.wireless_interface).unwrap_or(0)
    }
}

fn read_vcgencmd_temperature() -> Option<f64> {
    let output = Command::new("vcgencmd").arg("measure_temp").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_vcgencmd_temperature(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the numeric portion of `temp=48.3'C`.
fn parse_vcgencmd_temperature(output: &str) -> Option<f64> {
    output
        .trim()
        .strip_prefix("temp=")
        .and_then(|s| s.strip_suffix("'C"))
        .and_then(|s| s.parse::<f64>().ok())
}

fn read_station_signal(interface: &str) -> Option<i32> {
    let output = Command::new("iw")
        .args([interface, "station", "dump"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_station_signal(&String::from_utf8_lossy(&output.stdout))
}

/// Extract the dBm integer from the first `signal:` line of a station dump.
///
/// A dump with no associated station has no `signal:` line at all, which is
/// treated the same as a missing command.
fn parse_station_signal(dump: &str) -> Option<i32> {
    for line in dump.lines() {
        if let Some(rest) = line.trim_start().strip_prefix("signal:") {
            return rest
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<i32>().ok());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vcgencmd_output() {
        assert_eq!(parse_vcgencmd_temperature("temp=48.3'C\n"), Some(48.3));
        assert_eq!(parse_vcgencmd_temperature("temp=60.0'C"), Some(60.0));
    }

    #[test]
    fn test_parse_vcgencmd_garbage() {
        assert_eq!(parse_vcgencmd_temperature(""), None);
        assert_eq!(parse_vcgencmd_temperature("temp=?'C"), None);
        assert_eq!(parse_vcgencmd_temperature("VCHI initialization failed"), None);
    }

    #[test]
    fn test_parse_station_dump() {
        let dump = "\
Station aa:bb:cc:dd:ee:ff (on wlan0)
\tinactive time:\t50 ms
\trx bytes:\t12345
\tsignal:  \t-42 [-44, -48] dBm
\tsignal avg:\t-43 dBm
\ttx bitrate:\t72.2 MBit/s
";
        assert_eq!(parse_station_signal(dump), Some(-42));
    }

    #[test]
    fn test_parse_station_dump_without_signal_line() {
        assert_eq!(parse_station_signal("Station aa:bb (on wlan0)\n"), None);
        assert_eq!(parse_station_signal(""), None);
    }

    #[test]
    fn test_signal_strength_degrades_to_zero() {
        // No such interface exists, whether or not `iw` is installed.
        let probe = SystemHostProbe::with_interface("nonexistent987");
        assert_eq!(probe.read_signal_strength(), 0);
    }
}
