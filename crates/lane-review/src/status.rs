//! Parsed output of `bit status --json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LaneError, Result};

/// The parts of the workspace status the workflow looks at.
///
/// Component entries are kept opaque; only their presence matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceStatus {
    /// Components not yet tracked by any scope
    #[serde(default, deserialize_with = "null_as_empty")]
    pub new_components: Vec<Value>,

    /// Tracked components with local modifications
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modified_components: Vec<Value>,
}

impl WorkspaceStatus {
    /// Parse the raw stdout of the status command.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw.trim()).map_err(LaneError::MalformedStatus)
    }

    /// Whether anything needs a review lane.
    pub fn has_changes(&self) -> bool {
        !self.new_components.is_empty() || !self.modified_components.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
