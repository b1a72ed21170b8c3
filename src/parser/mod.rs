//! Schema-driven extraction of BusTracker XML responses.
//!
//! Each record type declares a [`FieldTable`] naming its child tags and
//! whether each is required, optional, or drops the record when absent.

pub mod bulletin;
pub mod fields;
pub mod pattern;
pub mod prediction;
pub mod response;
pub mod route;
pub mod stop;
pub mod time;
pub mod vehicle;

pub use bulletin::parse_service_bulletins;
pub use fields::{FieldTable, Fields, Presence};
pub use pattern::{parse_patterns, parse_single_pattern};
pub use prediction::parse_predictions;
pub use route::{parse_directions, parse_routes};
pub use stop::parse_stops;
pub use time::parse_time;
pub use vehicle::{parse_vehicle_map, parse_vehicles};
