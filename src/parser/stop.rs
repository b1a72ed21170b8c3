use std::collections::HashMap;

use tracing::debug;

use super::fields::{Fields, FieldTable, Presence};
use super::response::parse_records;
use crate::error::Result;
use crate::models::Stop;

// The API sometimes returns stops without coordinates; those are dropped
// before the required fields are looked at.
const STOP_FIELDS: FieldTable = &[
    ("stpid", Presence::Required),
    ("stpnm", Presence::Required),
    ("lat", Presence::SkipRecord),
    ("lon", Presence::SkipRecord),
];

/// `getstops`: stops keyed by stop id.
pub fn parse_stops(body: &str) -> Result<HashMap<String, Stop>> {
    let stops = parse_records(body, "stop", |node| {
        let Some(fields) = Fields::extract(node, "stop", STOP_FIELDS)? else {
            debug!(
                "Skipping stop without coordinates: {:?}",
                node.children()
                    .find(|c| c.has_tag_name("stpid"))
                    .and_then(|c| c.text())
            );
            return Ok(None);
        };

        Ok(Some(Stop {
            id: fields.text("stpid")?,
            name: fields.text("stpnm")?,
            latitude: fields.text("lat")?,
            longitude: fields.text("lon")?,
        }))
    })?;

    Ok(stops
        .into_iter()
        .map(|stop| (stop.id.clone(), stop))
        .collect())
}
