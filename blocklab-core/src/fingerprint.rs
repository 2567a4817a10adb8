//! Sequence fingerprinting: content identity of a block list.
//!
//! The hash covers instance ids, kinds, names, parameters and order. Front
//! ends compare it against the fingerprint of the last saved snapshot to show
//! an unsaved-changes marker.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::BlockInstance;

/// BLAKE3 hash (hex) of the canonical JSON of a block list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceHash(pub String);

impl SequenceHash {
    pub fn of(blocks: &[BlockInstance]) -> Self {
        // Parameters are BTreeMaps, so key order is deterministic.
        let json = serde_json::to_vec(blocks).expect("block list must serialize");
        Self(blake3::hash(&json).to_hex().to_string())
    }

    /// First `n` hex characters, for file names and status lines.
    pub fn short(&self, n: usize) -> &str {
        &self.0[..n.min(self.0.len())]
    }
}

impl fmt::Display for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::{InstanceId, ParamValue};

    fn sample() -> Vec<BlockInstance> {
        let c = Catalog::standard();
        vec![
            BlockInstance::from_template(c.get("sma").unwrap(), InstanceId::new("sma-1")),
            BlockInstance::from_template(c.get("buy").unwrap(), InstanceId::new("buy-2")),
        ]
    }

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(SequenceHash::of(&sample()), SequenceHash::of(&sample()));
        assert_eq!(SequenceHash::of(&sample()).0.len(), 64);
    }

    #[test]
    fn order_matters() {
        let mut reversed = sample();
        reversed.reverse();
        assert_ne!(SequenceHash::of(&sample()), SequenceHash::of(&reversed));
    }

    #[test]
    fn parameters_matter() {
        let mut changed = sample();
        changed[0]
            .parameters
            .insert("period".into(), ParamValue::Number(50.0));
        assert_ne!(SequenceHash::of(&sample()), SequenceHash::of(&changed));
    }

    #[test]
    fn short_prefix() {
        let h = SequenceHash::of(&sample());
        assert_eq!(h.short(8).len(), 8);
        assert!(h.0.starts_with(h.short(8)));
    }
}
