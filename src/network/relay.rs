use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::common::value::SlotId;
use crate::consensus::Envelope;

use super::node::NodeHandle;

/// The simulated unreliable network. Every engine emits into the shared
/// unbounded stream; the single consumer drains it and fans each message out
/// to every node except its originator, each delivery preceded by an
/// independent random delay below the configured bound. Per-message delays
/// can reorder delivery, which models real network jitter; the engines must
/// tolerate it.
pub struct Relay {
    emissions: UnboundedReceiver<Envelope>,
    max_delay_ms: u64,
    rng: StdRng,
}

impl Relay {
    /// Returns the emission sender to clone into every engine and the
    /// consumer half. A bound of 0 delivers synchronously, for fast
    /// deterministic testing.
    pub fn channel(max_delay_ms: u64, seed: u64) -> (UnboundedSender<Envelope>, Relay) {
        let (tx, rx) = mpsc::unbounded_channel();
        let relay = Relay {
            emissions: rx,
            max_delay_ms,
            rng: StdRng::seed_from_u64(seed),
        };
        (tx, relay)
    }

    /// Next in-flight message for the slot under evaluation. Messages about
    /// strictly older slots are discarded here; that is the garbage
    /// collection for finished rounds, not an error. Returns `None` once
    /// every emission sender is gone.
    pub async fn next(&mut self, current: SlotId) -> Option<Envelope> {
        loop {
            let envelope = self.emissions.recv().await?;
            if envelope.slot < current {
                debug!(stale = %envelope, current, "discarding message for old slot");
                continue;
            }
            return Some(envelope);
        }
    }

    /// Hands the message to every node other than its originator.
    pub async fn fan_out(&mut self, envelope: &Envelope, nodes: &[NodeHandle]) {
        for node in nodes {
            if node.id() == &envelope.from {
                continue;
            }
            if self.max_delay_ms == 0 {
                node.deliver(envelope.clone()).await;
                continue;
            }
            let delay = Duration::from_millis(self.rng.gen_range(0..self.max_delay_ms));
            let node = node.clone();
            let envelope = envelope.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                node.deliver(envelope).await;
            });
        }
    }
}
