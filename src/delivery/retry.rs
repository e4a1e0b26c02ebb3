//! Bounded retry-with-delay delivery.

use std::time::Duration;

use tracing::warn;

use crate::delivery::client::PointWriter;
use crate::delivery::point::sample_points;
use crate::sampling::data::Sample;
use crate::sampling::host::HostProbe;

/// Terminal outcome of one bounded delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The batch was accepted on the recorded attempt.
    Delivered { attempts: u32 },
    /// Every attempt failed; this cycle's data is gone.
    Lost { attempts: u32 },
}

/// Delivers sample batches with bounded retries and a fixed inter-attempt
/// delay.
///
/// Two states: attempting (counter below the budget) and terminal
/// ([`DeliveryOutcome`]). Success stops immediately with no trailing delay;
/// exhaustion is reported as loss, never raised. The delay is a full
/// blocking suspension; nothing else runs concurrently.
pub struct RetryingDelivery<W, P> {
    writer: W,
    probe: P,
    max_attempts: u32,
    delay: Duration,
}

impl<W: PointWriter, P: HostProbe> RetryingDelivery<W, P> {
    pub fn new(writer: W, probe: P, max_attempts: u32, delay: Duration) -> Self {
        Self {
            writer,
            probe,
            max_attempts,
            delay,
        }
    }

    /// Deliver the sample's points, retrying until accepted or the attempt
    /// budget is exhausted.
    pub async fn deliver(&self, location: &str, sample: &Sample) -> DeliveryOutcome {
        let points = sample_points(location, sample);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let err = match self.writer.write(&points).await {
                Ok(()) => return DeliveryOutcome::Delivered { attempts },
                Err(err) => err,
            };

            // Signal strength is sampled fresh on every failed attempt; a
            // weak link is the usual culprit behind a failed write.
            let signal = self.probe.read_signal_strength();
            if attempts >= self.max_attempts {
                warn!(
                    "write failed, attempt {} of {} ({} dBm): {}",
                    attempts, self.max_attempts, signal, err
                );
                warn!("data lost after {} attempts", attempts);
                return DeliveryOutcome::Lost { attempts };
            }
            warn!(
                "write failed, attempt {} of {}, waiting {}s ({} dBm): {}",
                attempts,
                self.max_attempts,
                self.delay.as_secs(),
                signal,
                err
            );
            tokio::time::sleep(self.delay).await;
        }
    }
}
