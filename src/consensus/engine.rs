use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::mpsc::{Receiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::common::value::{SlotId, Value, ValueSet};
use crate::common::NodeId;

use super::message::{Envelope, Topic};
use super::quorum::QSet;
use super::trust::{TrustRegistry, TrustReport};

/*
    A minimal federated-voting engine. Each node gossips the union of the
    candidate values it has seen for the current slot. Once the set of peers
    it has heard from (itself included) satisfies its quorum slice, it folds
    the candidates into a single value and externalizes it. An externalized
    slot is final; later input for that slot is ignored. The engine tolerates
    duplicate and reordered delivery because every step is idempotent over
    the heard/candidate sets.
*/

/// What the harness can feed a node through its inbound conduit.
#[derive(Clone, Debug)]
pub enum Input {
    /// Initial candidate injection for a slot.
    Nominate { slot: SlotId, candidates: ValueSet },
    /// A relayed protocol message from another node.
    Protocol(Envelope),
}

pub struct Engine {
    pub id: NodeId,
    pub qset: QSet,
    /// Silent slice members tolerated before the node flags itself as
    /// failure-prone in the logs.
    fp: usize,
    /// Minimum distinct participants heard from before externalizing.
    fq: usize,
    slot: SlotId,
    candidates: ValueSet,
    heard: BTreeMap<NodeId, ValueSet>,
    decided: BTreeMap<SlotId, Value>,
    inbox: Receiver<Input>,
    outbox: UnboundedSender<Envelope>,
    trust: TrustRegistry,
}

impl Engine {
    pub fn new(
        id: NodeId,
        qset: QSet,
        fp: usize,
        fq: usize,
        inbox: Receiver<Input>,
        outbox: UnboundedSender<Envelope>,
        trust: TrustRegistry,
    ) -> Self {
        Engine {
            id,
            qset,
            fp,
            fq,
            slot: 0,
            candidates: ValueSet::new(),
            heard: BTreeMap::new(),
            decided: BTreeMap::new(),
            inbox,
            outbox,
            trust,
        }
    }

    /// Runs until the inbound conduit closes, which only happens at process
    /// or simulation teardown.
    pub async fn run(mut self) {
        debug!(node = %self.id, "engine started");
        while let Some(input) = self.inbox.recv().await {
            match input {
                Input::Nominate { slot, candidates } => self.nominate(slot, candidates).await,
                Input::Protocol(envelope) => self.handle(envelope).await,
            }
        }
        debug!(node = %self.id, "engine stopped");
    }

    async fn nominate(&mut self, slot: SlotId, candidates: ValueSet) {
        if self.decided.contains_key(&slot) {
            return;
        }
        self.advance(slot);
        self.candidates
            .extend(candidates.into_iter().filter(|v| !v.is_nil()));
        self.heard.insert(self.id.clone(), self.candidates.clone());
        self.broadcast_candidates();
        self.try_externalize().await;
    }

    async fn handle(&mut self, envelope: Envelope) {
        if envelope.slot < self.slot {
            // Old slot, superseded state.
            return;
        }
        self.advance(envelope.slot);
        if self.decided.contains_key(&envelope.slot) {
            return;
        }

        let values = match envelope.topic {
            Topic::Nominate { candidates } => candidates,
            Topic::Externalize { value } => ValueSet::from([value]),
        };
        self.heard.insert(envelope.from, values.clone());

        let before = self.candidates.len();
        self.candidates.extend(values);
        if self.candidates.len() > before {
            // The union grew, let the others know.
            self.broadcast_candidates();
        }
        self.try_externalize().await;
    }

    /// Moves to a newer slot, discarding per-slot working state.
    fn advance(&mut self, slot: SlotId) {
        if slot > self.slot {
            self.slot = slot;
            self.candidates.clear();
            self.heard.clear();
        }
    }

    async fn try_externalize(&mut self) {
        if self.decided.contains_key(&self.slot) || self.candidates.is_empty() {
            return;
        }

        let heard: BTreeSet<NodeId> = self.heard.keys().cloned().collect();
        if heard.len() < self.fq || !self.qset.satisfied(&heard) {
            let silent = self
                .qset
                .members()
                .iter()
                .filter(|member| !heard.contains(member))
                .count();
            if silent > self.fp {
                debug!(node = %self.id, silent, "failure prone, waiting on quorum slice");
            }
            return;
        }

        let mut candidates = self.candidates.iter();
        let first = candidates.next().cloned().unwrap_or_default();
        let value = candidates.fold(first, |acc, v| acc.combine(v, self.slot));

        self.decided.insert(self.slot, value.clone());
        self.trust
            .record(
                self.id.clone(),
                TrustReport {
                    heard: heard.clone(),
                    value: value.clone(),
                },
            )
            .await;
        info!(
            node = %self.id,
            slot = self.slot,
            %value,
            digest = ?&value.digest()[..4],
            "externalized"
        );
        self.emit(Topic::Externalize { value });
    }

    fn broadcast_candidates(&self) {
        self.emit(Topic::Nominate {
            candidates: self.candidates.clone(),
        });
    }

    fn emit(&self, topic: Topic) {
        let envelope = Envelope {
            slot: self.slot,
            from: self.id.clone(),
            topic,
        };
        if self.outbox.send(envelope).is_err() {
            warn!(node = %self.id, "emission stream closed, message dropped");
        }
    }
}
