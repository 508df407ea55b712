use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a record. JSON sources use both strings and numbers, both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct RecordId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for RecordId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => RecordId(s),
            RawId::Number(n) => RecordId(n.to_string()),
        }
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

impl From<usize> for RecordId {
    fn from(n: usize) -> Self {
        RecordId(n.to_string())
    }
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything the table can show. Fields are addressed by accessor names, unknown
/// accessors return `None`.
pub trait Record: Clone + Send + Sync {
    fn id(&self) -> RecordId;
    fn field(&self, accessor: &str) -> Option<String>;
}
