use serde::Serialize;

/// Something a bulletin is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Affected {
    Stop(String),
    Route(String),
}

impl Affected {
    pub fn kind(&self) -> &'static str {
        match self {
            Affected::Stop(_) => "stop",
            Affected::Route(_) => "route",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Affected::Stop(id) | Affected::Route(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceBulletin {
    pub title: String,
    pub details_full: String,
    pub details_short: String,
    pub priority: String,
    /// Empty when the bulletin applies to the whole system.
    pub affects: Vec<Affected>,
}

impl ServiceBulletin {
    pub fn applies_to_all(&self) -> bool {
        self.affects.is_empty()
    }
}
