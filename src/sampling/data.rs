//! Data structures for telemetry samples and running extrema.

use serde::{Deserialize, Serialize};

/// One complete telemetry sample, produced once per acquisition cycle.
///
/// A `Sample` only exists if the electrical measurement succeeded; the host
/// telemetry fields degrade to sentinel values instead of blocking
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Bus voltage in volts
    pub voltage: f64,
    /// Shunt voltage in millivolts
    pub shunt_voltage: f64,
    /// Bus current in milliamps
    pub current: f64,
    /// Power in milliwatts
    pub power: f64,
    /// Host CPU temperature in degrees Celsius; `0.0` when unavailable
    pub temperature: f64,
    /// Wireless signal strength in dBm; `0` when unavailable
    pub signal_strength: i32,
}

/// Maximum observed value per measured quantity over the process lifetime.
///
/// Read once at shutdown for the summary report; never persisted across
/// runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RunningExtrema {
    /// Highest bus voltage seen, in volts
    pub voltage: f64,
    /// Highest shunt voltage seen, in millivolts
    pub shunt_voltage: f64,
    /// Highest bus current seen, in milliamps
    pub current: f64,
    /// Highest power seen, in milliwatts
    pub power: f64,
    /// Highest CPU temperature seen, in degrees Celsius
    pub temperature: f64,
}

/// Tracks running maxima across successful samples.
///
/// Owned by the collector loop and updated after every successful
/// acquisition. Single caller, sequential loop; no locking.
#[derive(Debug, Default)]
pub struct ExtremaTracker {
    extrema: RunningExtrema,
}

impl ExtremaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample, replacing each stored maximum the sample strictly
    /// exceeds.
    pub fn update(&mut self, sample: &Sample) {
        let extrema = &mut self.extrema;
        if sample.voltage > extrema.voltage {
            extrema.voltage = sample.voltage;
        }
        if sample.shunt_voltage > extrema.shunt_voltage {
            extrema.shunt_voltage = sample.shunt_voltage;
        }
        if sample.current > extrema.current {
            extrema.current = sample.current;
        }
        if sample.power > extrema.power {
            extrema.power = sample.power;
        }
        if sample.temperature > extrema.temperature {
            extrema.temperature = sample.temperature;
        }
    }

    /// Current maxima, for the shutdown report.
    pub fn snapshot(&self) -> RunningExtrema {
        self.extrema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(voltage: f64, shunt: f64, current: f64, power: f64, temp: f64) -> Sample {
        Sample {
            voltage,
            shunt_voltage: shunt,
            current,
            power,
            temperature: temp,
            signal_strength: -50,
        }
    }

    #[test]
    fn test_extrema_start_at_zero() {
        let tracker = ExtremaTracker::new();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.voltage, 0.0);
        assert_eq!(snapshot.shunt_voltage, 0.0);
        assert_eq!(snapshot.current, 0.0);
        assert_eq!(snapshot.power, 0.0);
        assert_eq!(snapshot.temperature, 0.0);
    }

    #[test]
    fn test_extrema_track_per_field_maximum() {
        let mut tracker = ExtremaTracker::new();
        tracker.update(&sample(5.0, 1.0, 200.0, 1000.0, 40.0));
        tracker.update(&sample(6.2, 0.5, 150.0, 900.0, 45.5));
        tracker.update(&sample(4.1, 1.8, 310.0, 1250.0, 38.0));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.voltage, 6.2);
        assert_eq!(snapshot.shunt_voltage, 1.8);
        assert_eq!(snapshot.current, 310.0);
        assert_eq!(snapshot.power, 1250.0);
        assert_eq!(snapshot.temperature, 45.5);
    }

    #[test]
    fn test_extrema_monotonically_non_decreasing() {
        let mut tracker = ExtremaTracker::new();
        let inputs = [
            sample(3.0, 0.2, 100.0, 300.0, 30.0),
            sample(6.0, 0.9, 250.0, 1500.0, 42.0),
            sample(1.0, 0.1, 50.0, 50.0, 20.0),
        ];

        let mut previous = tracker.snapshot();
        for input in &inputs {
            tracker.update(input);
            let current = tracker.snapshot();
            assert!(current.voltage >= previous.voltage);
            assert!(current.shunt_voltage >= previous.shunt_voltage);
            assert!(current.current >= previous.current);
            assert!(current.power >= previous.power);
            assert!(current.temperature >= previous.temperature);
            previous = current;
        }
    }

    #[test]
    fn test_equal_value_does_not_replace() {
        // Strictly-greater comparison: ties leave the stored maximum alone.
        let mut tracker = ExtremaTracker::new();
        tracker.update(&sample(5.0, 1.0, 200.0, 1000.0, 40.0));
        tracker.update(&sample(5.0, 1.0, 200.0, 1000.0, 40.0));
        assert_eq!(tracker.snapshot().voltage, 5.0);
    }

    #[test]
    fn test_sample_serialization_round_trip() {
        let original = sample(12.5, 1.2, 300.0, 3600.0, 25.0);
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }
}
