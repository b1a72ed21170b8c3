use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
}
