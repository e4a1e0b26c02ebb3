//! # Solar Scout
//!
//! Unattended telemetry collector for comparing solar-panel placement
//! locations. Samples an INA219 high-side power sensor over I2C, enriches
//! each sample with host telemetry (CPU temperature, wireless signal
//! strength), and forwards the points to InfluxDB with bounded retries.
//! Built for a battery-powered Raspberry Pi Zero left outside at a
//! candidate site, on a wifi link that cannot be trusted.
//!
//! ## Pipeline
//!
//! ```text
//! INA219 --> Sample --> ExtremaTracker --> RetryingDelivery --> InfluxDB
//!              |        (running maxima)   (bounded retries)
//!              +--> character display (optional)
//! ```
//!
//! Acquisition failures skip the cycle, host-telemetry failures degrade to
//! sentinel values, and delivery failures are retried a bounded number of
//! times before the cycle's data is declared lost. Only startup validation
//! (credentials, CLI) can terminate the process.

pub mod collector;
pub mod delivery;
pub mod display;
pub mod error;
pub mod sampling;

// Re-export public API
pub use collector::CollectorLoop;
pub use delivery::{
    client::{DeliveryError, InfluxClient, PointWriter},
    config::{DeliveryConfig, DEFAULT_CREDENTIALS_PATH},
    point::{sample_points, Point},
    retry::{DeliveryOutcome, RetryingDelivery},
};
pub use display::TelemetryDisplay;
pub use error::{CollectorError, Result};
pub use sampling::{
    data::{ExtremaTracker, RunningExtrema, Sample},
    host::{HostProbe, SystemHostProbe},
    sensor::{
        AcquisitionError, DefaultSensorDriver, ElectricalReading, SensorDriver, SensorReader,
    },
};

#[cfg(feature = "hardware")]
pub use display::I2cLcd;

/// The default number of seconds between acquisition cycles
pub const DEFAULT_CYCLE_DELAY_SECS: u64 = 30;

/// The default number of delivery attempts per cycle
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;

/// The default number of seconds between delivery attempts
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;
