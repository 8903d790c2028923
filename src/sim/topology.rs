use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::NodeId;
use crate::consensus::QSet;
use crate::error::SimError;

use super::injector::Budgets;

/// One topology file entry: the node's quorum-slice definition and its two
/// engine tuning parameters.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeConf {
    #[serde(rename = "Q")]
    pub q: QSet,
    #[serde(rename = "FP")]
    pub fp: usize,
    #[serde(rename = "FQ")]
    pub fq: usize,
}

/// A configured participant. Built once at startup, immutable for the
/// process lifetime.
#[derive(Clone, Debug)]
pub struct NodeIdentity {
    pub id: NodeId,
    pub qset: QSet,
    pub fp: usize,
    pub fq: usize,
}

/// The node population, in sorted identity order so that nomination
/// assignment is reproducible across runs.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    pub nodes: Vec<NodeIdentity>,
}

impl Topology {
    pub fn load(path: &Path) -> Result<Topology, SimError> {
        let raw = fs::read_to_string(path).map_err(|source| SimError::ReadTopology {
            path: path.to_path_buf(),
            source,
        })?;
        Topology::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Topology, SimError> {
        // BTreeMap keeps the declaration keys sorted.
        let entries: BTreeMap<String, NodeConf> = toml::from_str(raw)?;
        let nodes = entries
            .into_iter()
            .map(|(id, conf)| NodeIdentity {
                id: NodeId::new(id),
                qset: conf.q,
                fp: conf.fp,
                fq: conf.fq,
            })
            .collect();
        Ok(Topology { nodes })
    }

    /// The configured population must match the injection budgets exactly.
    /// Checked before any node task is spawned.
    pub fn check_population(&self, budgets: &Budgets) -> Result<(), SimError> {
        if self.nodes.len() != budgets.honest + budgets.adversarial {
            return Err(SimError::PopulationMismatch {
                nodes: self.nodes.len(),
                honest: budgets.honest,
                adversarial: budgets.adversarial,
            });
        }
        Ok(())
    }
}
