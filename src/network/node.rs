use tokio::sync::mpsc::{self, Sender, UnboundedSender};
use tracing::warn;

use crate::common::value::{SlotId, ValueSet};
use crate::common::NodeId;
use crate::consensus::{Engine, Envelope, Input, TrustRegistry};
use crate::sim::NodeIdentity;

/// Inbound conduit depth per node. Engines never block on emission (the
/// relay side is unbounded), so this only has to absorb delivery bursts.
const INBOX_CAPACITY: usize = 1024;

/// Runtime pairing of a configured identity with a live engine task and its
/// inbound conduit. One per identity, created at startup, torn down at
/// process exit.
#[derive(Clone)]
pub struct NodeHandle {
    pub identity: NodeIdentity,
    inbox: Sender<Input>,
}

impl NodeHandle {
    /// Constructs the engine for `identity`, hands it the shared emission
    /// stream, and starts its run loop as an independent task.
    pub fn spawn(
        identity: NodeIdentity,
        emissions: UnboundedSender<Envelope>,
        trust: TrustRegistry,
    ) -> Self {
        let (inbox, engine_rx) = mpsc::channel(INBOX_CAPACITY);
        let engine = Engine::new(
            identity.id.clone(),
            identity.qset.clone(),
            identity.fp,
            identity.fq,
            engine_rx,
            emissions,
            trust,
        );
        tokio::spawn(engine.run());
        NodeHandle { identity, inbox }
    }

    #[cfg(test)]
    pub(crate) fn detached(identity: NodeIdentity, inbox: Sender<Input>) -> Self {
        NodeHandle { identity, inbox }
    }

    pub fn id(&self) -> &NodeId {
        &self.identity.id
    }

    pub async fn submit_nomination(&self, slot: SlotId, candidates: ValueSet) {
        if self
            .inbox
            .send(Input::Nominate { slot, candidates })
            .await
            .is_err()
        {
            warn!(node = %self.id(), "nomination dropped, engine is gone");
        }
    }

    pub async fn deliver(&self, envelope: Envelope) {
        if self.inbox.send(Input::Protocol(envelope)).await.is_err() {
            warn!(node = %self.id(), "delivery dropped, engine is gone");
        }
    }
}
