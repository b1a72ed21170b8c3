use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub id: String,
    pub name: String,
}

/// A direction of travel as named by the API, e.g. "Northbound".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Direction(pub String);

impl Direction {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Direction {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Direction {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
