use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// How a version was created. Entries written without a type are manual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    #[default]
    Manual,
    Auto,
}

impl fmt::Display for VersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        })
    }
}

/// One entry of the history index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: Uuid,
    pub file_name: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub version_file: String,
    #[serde(rename = "type", default)]
    pub kind: VersionType,
}

impl Version {
    pub fn is_auto(&self) -> bool {
        self.kind == VersionType::Auto
    }
}

/// Parse the index file.
///
/// Anything that is not a JSON array counts as an empty index. Entries that
/// do not parse are dropped individually.
pub fn parse_index(bytes: &[u8]) -> Vec<Version> {
    let entries: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(%err, "history index is unreadable, starting from an empty index");
            return Vec::new();
        },
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(position, entry)| match serde_json::from_value(entry) {
            Ok(version) => Some(version),
            Err(err) => {
                warn!(position, %err, "dropping unreadable history entry");
                None
            },
        })
        .collect()
}

pub fn encode_index(index: &[Version]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(index)
}
