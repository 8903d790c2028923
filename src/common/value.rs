use std::collections::BTreeSet;
use std::fmt;

use sha2::{Digest as ShaDigest, Sha256};

/// One round of the protocol, identified by an increasing index.
pub type SlotId = u64;

/// The fixed catalog of road conditions a vehicle can report. Index 0 is the
/// benign condition; everything else is an adversarial claim.
pub const ROAD_CONDITIONS: [&str; 5] = [
    "smooth",
    "accident, need help",
    "Fogged, be careful",
    "traffcjam",
    "Road Construction",
];

/// An opaque, totally-ordered candidate value carried by protocol messages.
/// Constructed once per nomination and immutable after; merges produce new
/// values, never in-place mutation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Value(String);

pub type ValueSet = BTreeSet<Value>;

impl Value {
    pub fn new(condition: impl Into<String>) -> Self {
        Value(condition.into())
    }

    /// The distinguished empty value.
    pub fn nil() -> Self {
        Value(String::new())
    }

    /// The condition honest nodes nominate.
    pub fn benign() -> Self {
        Value::new(ROAD_CONDITIONS[0])
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge two values for the given slot: even slots keep the
    /// ordering-maximum, odd slots the ordering-minimum. The asymmetry breaks
    /// ties deterministically across successive slots. Always returns one of
    /// the two inputs.
    pub fn combine(&self, other: &Value, slot: SlotId) -> Value {
        if slot % 2 == 0 {
            if self > other {
                return self.clone();
            }
        } else if self < other {
            return self.clone();
        }
        other.clone()
    }

    /// Stable byte representation, used for hashing and transmission. Not
    /// required to be reversible.
    pub fn encode(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    /// SHA-256 fingerprint of the encoded value.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.encode());
        hasher.finalize().into()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_returns_one_of_inputs() {
        for a in ROAD_CONDITIONS {
            for b in ROAD_CONDITIONS {
                for slot in [0, 1, 2, 3] {
                    let a = Value::new(a);
                    let b = Value::new(b);
                    let merged = a.combine(&b, slot);
                    assert!(merged == a || merged == b);
                }
            }
        }
    }

    #[test]
    fn test_combine_even_slot_keeps_maximum() {
        let a = Value::new("smooth");
        let b = Value::new("Road Construction");
        let max = a.clone().max(b.clone());
        assert_eq!(a.combine(&b, 0), max);
        assert_eq!(b.combine(&a, 2), max);
    }

    #[test]
    fn test_combine_odd_slot_keeps_minimum() {
        let a = Value::new("smooth");
        let b = Value::new("Road Construction");
        let min = a.clone().min(b.clone());
        assert_eq!(a.combine(&b, 1), min);
        assert_eq!(b.combine(&a, 3), min);
    }

    #[test]
    fn test_combine_is_idempotent_on_equal_values() {
        for condition in ROAD_CONDITIONS {
            let v = Value::new(condition);
            assert_eq!(v.combine(&v, 0), v);
            assert_eq!(v.combine(&v, 1), v);
        }
    }

    #[test]
    fn test_is_nil_only_for_empty_sentinel() {
        assert!(Value::nil().is_nil());
        assert!(!Value::benign().is_nil());
        for condition in ROAD_CONDITIONS {
            assert!(!Value::new(condition).is_nil());
        }
    }

    #[test]
    fn test_encode_is_stable() {
        let v = Value::new("traffcjam");
        assert_eq!(v.encode(), v.encode());
        assert_eq!(v.encode(), b"traffcjam".to_vec());
        assert_eq!(v.digest(), v.digest());
    }
}
