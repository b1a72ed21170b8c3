use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionType {
    Arrival,
    Departure,
}

impl PredictionType {
    /// Maps the API's `typ` code (`A` or `D`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(PredictionType::Arrival),
            "D" => Some(PredictionType::Departure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub last_update: NaiveDateTime,
    pub prediction_type: PredictionType,
    pub stop_id: String,
    pub stop_name: String,
    pub distance_to_destination: i64,
    pub vehicle_id: String,
    pub route_id: String,
    pub direction: String,
    pub destination: String,
    pub predicted_time: NaiveDateTime,
    pub delayed: bool,
}
