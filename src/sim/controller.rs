use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::common::value::{SlotId, Value, ValueSet};
use crate::common::NodeId;
use crate::consensus::{Envelope, Topic, TrustRegistry, TrustReport};
use crate::error::SimError;
use crate::network::{NodeHandle, Relay};

use super::injector::{Budgets, InjectionPolicy};
use super::topology::Topology;

/// Latest known protocol status per configured node. A recorded
/// externalization is final for its slot and is never overwritten.
#[derive(Debug, Default)]
pub struct RoundStatuses {
    latest: BTreeMap<NodeId, Option<Envelope>>,
}

impl RoundStatuses {
    pub fn new(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        RoundStatuses {
            latest: nodes.into_iter().map(|id| (id, None)).collect(),
        }
    }

    pub fn record(&mut self, envelope: &Envelope) {
        let Some(status) = self.latest.get_mut(&envelope.from) else {
            // Not a configured node; nothing to track.
            return;
        };
        if let Some(existing) = status {
            if existing.topic.is_externalize() && existing.slot == envelope.slot {
                return;
            }
        }
        *status = Some(envelope.clone());
    }

    /// True only when every configured node's latest status is an
    /// externalization.
    pub fn all_externalized(&self) -> bool {
        self.latest
            .values()
            .all(|status| matches!(status, Some(env) if env.topic.is_externalize()))
    }

    /// The value carried by any recorded externalization.
    pub fn agreed_value(&self) -> Option<Value> {
        self.latest.values().flatten().find_map(|env| match &env.topic {
            Topic::Externalize { value } => Some(value.clone()),
            Topic::Nominate { .. } => None,
        })
    }
}

/// Outcome of a completed round.
#[derive(Debug)]
pub struct RoundOutcome {
    pub slot: SlotId,
    pub value: Value,
    pub elapsed: Duration,
    /// Which value each node was told to nominate, in identity order.
    pub nominations: BTreeMap<NodeId, Value>,
    /// Copied-out trust reports, at most one per configured node.
    pub trust: BTreeMap<NodeId, TrustReport>,
}

/// Drives one round at a time: injects nominations, pumps the relay, and
/// stops once every node has externalized. There is no timeout; under a
/// fault model that prevents agreement this waits forever, which is the
/// accepted trade-off for a closed simulation.
pub struct RoundController {
    nodes: Vec<NodeHandle>,
    relay: Relay,
    policy: InjectionPolicy,
    trust: TrustRegistry,
    report_cap: usize,
}

impl RoundController {
    /// Validates the population against the budgets, then spawns one engine
    /// task per configured identity. The validation failing means no task
    /// was started.
    pub fn build(
        topology: Topology,
        budgets: Budgets,
        seed: u64,
        max_delay_ms: u64,
    ) -> Result<RoundController, SimError> {
        topology.check_population(&budgets)?;

        let trust = TrustRegistry::default();
        let (emissions, relay) = Relay::channel(max_delay_ms, seed.wrapping_add(1));
        let nodes: Vec<NodeHandle> = topology
            .nodes
            .into_iter()
            .map(|identity| NodeHandle::spawn(identity, emissions.clone(), trust.clone()))
            .collect();
        let report_cap = nodes.len();

        Ok(RoundController {
            nodes,
            relay,
            policy: InjectionPolicy::new(budgets, seed),
            trust,
            report_cap,
        })
    }

    pub async fn run_slot(&mut self, slot: SlotId) -> Result<RoundOutcome, SimError> {
        let started = Instant::now();
        let mut statuses = RoundStatuses::new(self.nodes.iter().map(|n| n.id().clone()));
        let mut nominations = BTreeMap::new();

        // Nomination phase: sequential, in sorted identity order.
        for node in &self.nodes {
            let value = self.policy.next_nomination()?;
            info!(node = %node.id(), slot, %value, "nominating");
            nominations.insert(node.id().clone(), value.clone());
            node.submit_nomination(slot, ValueSet::from([value])).await;
        }

        // Collecting phase: single consumer of the shared emission stream.
        loop {
            let envelope = self.relay.next(slot).await.ok_or(SimError::RelayClosed)?;
            debug!(message = %envelope, "observed");
            statuses.record(&envelope);

            if statuses.all_externalized() {
                let value = statuses.agreed_value().unwrap_or_default();
                let elapsed = started.elapsed();
                info!(slot, %value, ?elapsed, "all nodes externalized");

                let trust = self.trust.snapshot().await;
                for (id, report) in trust.iter().take(self.report_cap) {
                    info!(node = %id, value = %report.value, quorum = ?report.heard, "trust");
                }
                return Ok(RoundOutcome {
                    slot,
                    value,
                    elapsed,
                    nominations,
                    trust,
                });
            }

            self.relay.fan_out(&envelope, &self.nodes).await;
        }
    }
}
