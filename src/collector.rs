//! The acquisition/delivery loop.
//!
//! One logical task, strictly sequential: acquire, track extrema, deliver
//! with bounded retries, optionally render, sleep, repeat. An operator
//! interrupt is observed at the inter-cycle sleep and triggers the designed
//! shutdown path: clear the display, hand back the extrema snapshot.

use std::time::Duration;

use tracing::{info, warn};

use crate::delivery::client::PointWriter;
use crate::delivery::retry::{DeliveryOutcome, RetryingDelivery};
use crate::display::TelemetryDisplay;
use crate::sampling::data::{ExtremaTracker, RunningExtrema};
use crate::sampling::host::HostProbe;
use crate::sampling::sensor::{SensorDriver, SensorReader};

/// Orchestrates the sample-acquire -> validate -> retry-forward pipeline on
/// a fixed cadence.
pub struct CollectorLoop<D, P, W> {
    reader: SensorReader<D, P>,
    delivery: RetryingDelivery<W, P>,
    tracker: ExtremaTracker,
    display: Option<Box<dyn TelemetryDisplay>>,
    location: String,
    cycle_delay: Duration,
}

impl<D, P, W> CollectorLoop<D, P, W>
where
    D: SensorDriver,
    P: HostProbe,
    W: PointWriter,
{
    pub fn new(
        reader: SensorReader<D, P>,
        delivery: RetryingDelivery<W, P>,
        location: impl Into<String>,
        cycle_delay: Duration,
        display: Option<Box<dyn TelemetryDisplay>>,
    ) -> Self {
        Self {
            reader,
            delivery,
            tracker: ExtremaTracker::new(),
            display,
            location: location.into(),
            cycle_delay,
        }
    }

    /// Run one acquisition/delivery cycle. The inter-cycle sleep belongs to
    /// [`run`](Self::run), not to the cycle itself.
    ///
    /// Acquisition failure skips delivery and display for this cycle and
    /// leaves the extrema untouched; delivery loss has already been reported
    /// by the retry layer.
    pub async fn run_cycle(&mut self) {
        let sample = match self.reader.acquire() {
            Ok(sample) => sample,
            Err(err) => {
                warn!("skipping cycle, sample acquisition failed: {}", err);
                return;
            }
        };

        info!(
            "bus {:.3} V, shunt {:.3} mV, current {:.3} mA, power {:.3} mW, cpu {:.1} C, signal {} dBm",
            sample.voltage,
            sample.shunt_voltage,
            sample.current,
            sample.power,
            sample.temperature,
            sample.signal_strength
        );

        self.tracker.update(&sample);

        match self.delivery.deliver(&self.location, &sample).await {
            DeliveryOutcome::Delivered { attempts } if attempts > 1 => {
                info!("delivered after {} attempts", attempts);
            }
            DeliveryOutcome::Delivered { .. } => {}
            // Loss was reported by the delivery layer; the loop carries on.
            DeliveryOutcome::Lost { .. } => {}
        }

        if let Some(display) = self.display.as_mut() {
            if let Err(err) = display.render(&sample) {
                warn!("display render failed: {}", err);
            }
        }
    }

    /// Run cycles until an operator interrupt, then shut down cleanly and
    /// return the extrema snapshot for the final report.
    pub async fn run(&mut self) -> RunningExtrema {
        info!(
            "collecting for location `{}` every {}s",
            self.location,
            self.cycle_delay.as_secs()
        );
        loop {
            self.run_cycle().await;
            tokio::select! {
                _ = tokio::time::sleep(self.cycle_delay) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received, shutting down");
                    break;
                }
            }
        }
        self.shutdown()
    }

    /// Current extrema without shutting down.
    pub fn extrema(&self) -> RunningExtrema {
        self.tracker.snapshot()
    }

    fn shutdown(&mut self) -> RunningExtrema {
        if let Some(display) = self.display.as_mut() {
            if let Err(err) = display.clear() {
                warn!("failed to clear display: {}", err);
            }
        }
        self.tracker.snapshot()
    }
}
