use roxmltree::Node;
use std::collections::HashMap;

use super::fields::{Fields, FieldTable, Presence};
use super::response::parse_records;
use crate::error::Result;
use crate::models::Vehicle;

pub const VEHICLE_TAG: &str = "vehicle";

const VEHICLE_FIELDS: FieldTable = &[
    ("vid", Presence::Required),
    ("tmstmp", Presence::Required),
    ("lat", Presence::Required),
    ("lon", Presence::Required),
    ("hdg", Presence::Required),
    ("pid", Presence::Required),
    ("rt", Presence::Required),
    ("des", Presence::Required),
    ("pdist", Presence::Required),
    ("dly", Presence::Optional),
];

pub fn parse_vehicle(node: Node<'_, '_>, timestamp_format: &str) -> Result<Option<Vehicle>> {
    let Some(fields) = Fields::extract(node, VEHICLE_TAG, VEHICLE_FIELDS)? else {
        return Ok(None);
    };

    Ok(Some(Vehicle {
        id: fields.text("vid")?,
        last_update: fields.timestamp("tmstmp", timestamp_format)?,
        latitude: fields.text("lat")?,
        longitude: fields.text("lon")?,
        heading: fields.parse("hdg")?,
        pattern_id: fields.text("pid")?,
        route_id: fields.text("rt")?,
        destination: fields.text("des")?,
        distance_into_route: fields.parse("pdist")?,
        delayed: fields.flag("dly"),
    }))
}

pub fn parse_vehicles(body: &str, timestamp_format: &str) -> Result<Vec<Vehicle>> {
    parse_records(body, VEHICLE_TAG, |node| parse_vehicle(node, timestamp_format))
}

/// Vehicles keyed by id; a repeated id keeps the last record.
pub fn parse_vehicle_map(body: &str, timestamp_format: &str) -> Result<HashMap<String, Vehicle>> {
    Ok(parse_vehicles(body, timestamp_format)?
        .into_iter()
        .map(|vehicle| (vehicle.id.clone(), vehicle))
        .collect())
}
