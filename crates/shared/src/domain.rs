use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned (or caller-requested) identifier of a shortened URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortKey(pub String);

impl ShortKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShortKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ShortKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
