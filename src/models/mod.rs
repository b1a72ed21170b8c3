pub mod api_error;
pub mod bulletin;
pub mod pattern;
pub mod prediction;
pub mod route;
pub mod stop;
pub mod vehicle;

pub use api_error::ApiErrorMessage;
pub use bulletin::{Affected, ServiceBulletin};
pub use pattern::{Pattern, PatternPoint, PointType};
pub use prediction::{Prediction, PredictionType};
pub use route::{Direction, Route};
pub use stop::Stop;
pub use vehicle::{TimeResolution, Vehicle};
