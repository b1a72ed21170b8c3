use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    Stop,
    Waypoint,
}

impl PointType {
    /// Maps the API's `typ` code (`S` or `W`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(PointType::Stop),
            "W" => Some(PointType::Waypoint),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternPoint {
    pub sequence: u32,
    pub point_type: PointType,
    pub latitude: String,
    pub longitude: String,
    /// Only set for [`PointType::Stop`] points.
    pub stop_id: Option<String>,
    pub stop_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub id: String,
    /// Length in feet, truncated from the API's float.
    pub length: i64,
    pub route_direction: String,
    pub points: BTreeMap<u32, PatternPoint>,
}

impl Pattern {
    pub fn stops(&self) -> impl Iterator<Item = &PatternPoint> {
        self.points
            .values()
            .filter(|point| point.point_type == PointType::Stop)
    }
}
