//! Sample acquisition and the telemetry data model.
//!
//! This module owns the per-cycle pipeline up to the point a [`Sample`]
//! exists: the INA219 bus driver seam, the best-effort host telemetry
//! probes, and the running-extrema bookkeeping the shutdown report is
//! built from.

pub mod data;
pub mod host;
pub mod sensor;

// Re-export commonly used items
pub use data::{ExtremaTracker, RunningExtrema, Sample};
pub use host::{HostProbe, SystemHostProbe};
pub use sensor::{AcquisitionError, SensorReader};
