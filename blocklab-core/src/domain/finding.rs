use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::ids::InstanceId;

/// One validation message, optionally attached to a block instance.
///
/// `instance_id == None` is a sequence-level finding. On the wire that is the
/// empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
    #[serde(
        serialize_with = "serialize_target",
        deserialize_with = "deserialize_target"
    )]
    pub instance_id: Option<InstanceId>,
    pub message: String,
}

impl ValidationFinding {
    pub fn sequence(message: impl Into<String>) -> Self {
        Self {
            instance_id: None,
            message: message.into(),
        }
    }

    pub fn block(instance_id: &InstanceId, message: impl Into<String>) -> Self {
        Self {
            instance_id: Some(instance_id.clone()),
            message: message.into(),
        }
    }

    pub fn is_sequence_level(&self) -> bool {
        self.instance_id.is_none()
    }

    pub fn concerns(&self, id: &InstanceId) -> bool {
        self.instance_id.as_ref() == Some(id)
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.instance_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => write!(f, "[strategy] {}", self.message),
        }
    }
}

fn serialize_target<S: Serializer>(id: &Option<InstanceId>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(id.as_ref().map(InstanceId::as_str).unwrap_or(""))
}

fn deserialize_target<'de, D: Deserializer<'de>>(d: D) -> Result<Option<InstanceId>, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(if raw.is_empty() {
        None
    } else {
        Some(InstanceId(raw))
    })
}
