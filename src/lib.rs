//! # BusTracker client
//!
//! A blocking client for the CTA BusTracker XML API: system time, vehicle
//! positions, routes, directions, stops, patterns, predictions and service
//! bulletins, each parsed into a plain record.
//!
//! ```rust,no_run
//! use bustracker::BusTracker;
//!
//! fn main() -> Result<(), bustracker::Error> {
//!     let client = BusTracker::new("your_api_key")?;
//!
//!     println!("System time: {}", client.get_time()?);
//!     for vehicle in client.get_vehicles([1870])? {
//!         println!("{} heading to {}", vehicle.id, vehicle.destination);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Transient network failures are retried with exponential backoff
//! (see [`ClientConfig`]); everything else is returned as an [`Error`].

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod parser;
pub mod retry;

pub use client::BusTracker;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{HttpTransport, Transport};
pub use models::{
    Affected, ApiErrorMessage, Direction, Pattern, PatternPoint, PointType, Prediction,
    PredictionType, Route, ServiceBulletin, Stop, TimeResolution, Vehicle,
};
pub use retry::RetryPolicy;
