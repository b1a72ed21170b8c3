use std::collections::HashMap;

use super::fields::{Fields, FieldTable, Presence};
use super::response::parse_records;
use crate::error::{Error, Result};
use crate::models::{Direction, Route};

const ROUTE_FIELDS: FieldTable = &[("rt", Presence::Required), ("rtnm", Presence::Required)];

/// `getroutes`: routes keyed by route id.
pub fn parse_routes(body: &str) -> Result<HashMap<String, Route>> {
    let routes = parse_records(body, "route", |node| {
        let Some(fields) = Fields::extract(node, "route", ROUTE_FIELDS)? else {
            return Ok(None);
        };
        Ok(Some(Route {
            id: fields.text("rt")?,
            name: fields.text("rtnm")?,
        }))
    })?;

    Ok(routes
        .into_iter()
        .map(|route| (route.id.clone(), route))
        .collect())
}

/// `getdirections`: each `dir` tag's text, in document order.
pub fn parse_directions(body: &str) -> Result<Vec<Direction>> {
    parse_records(body, "dir", |node| {
        let text = node.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(Error::MissingField {
                record: "dir",
                field: "dir",
            });
        }
        Ok(Some(Direction(text.to_string())))
    })
}
