use std::fmt;

use crate::common::value::{SlotId, Value, ValueSet};
use crate::common::NodeId;

/// A protocol message as seen by the harness: which slot it belongs to, who
/// emitted it, and a topic the harness can inspect without understanding the
/// engine's internals.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Envelope {
    pub slot: SlotId,
    pub from: NodeId,
    pub topic: Topic,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Topic {
    /// The sender proposes these candidate values for the slot.
    Nominate { candidates: ValueSet },
    /// The sender has irrevocably decided this value for the slot.
    Externalize { value: Value },
}

impl Topic {
    pub fn is_externalize(&self) -> bool {
        matches!(self, Topic::Externalize { .. })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.topic {
            Topic::Nominate { candidates } => {
                write!(f, "(V={} I={}: NOM X=[", self.from, self.slot)?;
                for (i, value) in candidates.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "])")
            }
            Topic::Externalize { value } => {
                write!(f, "(V={} I={}: EXT C={value})", self.from, self.slot)
            }
        }
    }
}
