use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::common::value::Value;
use crate::common::NodeId;

/// What a node ended up trusting when it externalized: the peers it heard
/// from and the value it decided.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrustReport {
    pub heard: BTreeSet<NodeId>,
    pub value: Value,
}

/// Shared registry of per-node trust reports, written by engine tasks at
/// externalization. Readers only ever get a cloned snapshot, never the live
/// map.
#[derive(Clone, Default)]
pub struct TrustRegistry {
    inner: Arc<RwLock<BTreeMap<NodeId, TrustReport>>>,
}

impl TrustRegistry {
    pub async fn record(&self, node: NodeId, report: TrustReport) {
        self.inner.write().await.insert(node, report);
    }

    pub async fn snapshot(&self) -> BTreeMap<NodeId, TrustReport> {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let registry = TrustRegistry::default();
        registry
            .record(
                NodeId::new("a"),
                TrustReport {
                    heard: BTreeSet::from([NodeId::new("a"), NodeId::new("b")]),
                    value: Value::benign(),
                },
            )
            .await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);

        // A later write must not show up in the copy already taken.
        registry
            .record(
                NodeId::new("b"),
                TrustReport {
                    heard: BTreeSet::from([NodeId::new("b")]),
                    value: Value::benign(),
                },
            )
            .await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.snapshot().await.len(), 2);
    }
}
