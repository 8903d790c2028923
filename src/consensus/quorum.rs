use std::collections::BTreeSet;

use serde::Deserialize;

use crate::common::NodeId;

/// A quorum-slice definition: the node trusts a statement once `t` of its
/// members vouch for it. Members are either plain node identifiers or nested
/// slices, so arbitrary threshold structures can be declared in the topology
/// file, e.g. `Q = { t = 2, m = [{ n = "Car-Kobe" }, { q = { t = 1, m = [...] } }] }`.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct QSet {
    pub t: usize,
    #[serde(default)]
    pub m: Vec<QSetMember>,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(untagged)]
pub enum QSetMember {
    Node { n: NodeId },
    Inner { q: QSet },
}

impl QSet {
    /// Whether the set of nodes heard from satisfies this slice.
    pub fn satisfied(&self, heard: &BTreeSet<NodeId>) -> bool {
        let mut hits = 0;
        for member in &self.m {
            let hit = match member {
                QSetMember::Node { n } => heard.contains(n),
                QSetMember::Inner { q } => q.satisfied(heard),
            };
            if hit {
                hits += 1;
            }
        }
        hits >= self.t
    }

    /// All node identifiers reachable through this slice, nested members
    /// included.
    pub fn members(&self) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        for member in &self.m {
            match member {
                QSetMember::Node { n } => {
                    out.insert(n.clone());
                }
                QSetMember::Inner { q } => {
                    out.extend(q.members());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heard(ids: &[&str]) -> BTreeSet<NodeId> {
        ids.iter().map(|id| NodeId::new(*id)).collect()
    }

    fn flat(t: usize, ids: &[&str]) -> QSet {
        QSet {
            t,
            m: ids
                .iter()
                .map(|id| QSetMember::Node {
                    n: NodeId::new(*id),
                })
                .collect(),
        }
    }

    #[test]
    fn test_flat_slice_threshold() {
        let q = flat(2, &["a", "b", "c"]);
        assert!(!q.satisfied(&heard(&["a"])));
        assert!(q.satisfied(&heard(&["a", "c"])));
        assert!(q.satisfied(&heard(&["a", "b", "c"])));
    }

    #[test]
    fn test_nested_slice_counts_as_one_member() {
        let q = QSet {
            t: 2,
            m: vec![
                QSetMember::Node {
                    n: NodeId::new("a"),
                },
                QSetMember::Inner {
                    q: flat(1, &["b", "c"]),
                },
            ],
        };
        assert!(!q.satisfied(&heard(&["b", "c"])));
        assert!(q.satisfied(&heard(&["a", "c"])));
    }

    #[test]
    fn test_members_flattens_nested_slices() {
        let q = QSet {
            t: 1,
            m: vec![
                QSetMember::Node {
                    n: NodeId::new("a"),
                },
                QSetMember::Inner {
                    q: flat(1, &["b", "c"]),
                },
            ],
        };
        assert_eq!(q.members(), heard(&["a", "b", "c"]));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let parsed: QSet = toml::from_str(
            r#"
            t = 2
            m = [ { n = "Car-Peja" }, { n = "Car-Kobe" }, { q = { t = 1, m = [ { n = "Car-Federer" } ] } } ]
            "#,
        )
        .unwrap();
        assert_eq!(parsed.t, 2);
        assert_eq!(parsed.m.len(), 3);
        assert!(parsed.satisfied(&heard(&["Car-Kobe", "Car-Federer"])));
    }
}
