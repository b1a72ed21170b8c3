use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: String,
    pub last_update: NaiveDateTime,
    // Coordinates stay as the API's text to keep its exact precision.
    pub latitude: String,
    pub longitude: String,
    pub heading: i32,
    pub pattern_id: String,
    pub route_id: String,
    pub destination: String,
    pub distance_into_route: f64,
    pub delayed: bool,
}

/// Granularity of the `tmstmp` values returned by `getvehicles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeResolution {
    #[default]
    Seconds,
    Minutes,
}

impl TimeResolution {
    pub fn param(self) -> &'static str {
        match self {
            TimeResolution::Seconds => "s",
            TimeResolution::Minutes => "m",
        }
    }

    pub fn timestamp_format(self) -> &'static str {
        match self {
            TimeResolution::Seconds => "%Y%m%d %H:%M:%S",
            TimeResolution::Minutes => "%Y%m%d %H:%M",
        }
    }
}
