use chrono::NaiveDateTime;

use super::response::parse_records;
use crate::error::{Error, Result};

pub const TIME_FORMAT: &str = "%Y%m%d %H:%M:%S";

/// `gettime`: the single `tm` tag of the response.
pub fn parse_time(body: &str) -> Result<NaiveDateTime> {
    let times = parse_records(body, "tm", |node| {
        let value = node.text().unwrap_or_default().trim();
        NaiveDateTime::parse_from_str(value, TIME_FORMAT)
            .map(Some)
            .map_err(|e| Error::InvalidField {
                record: "bustime-response",
                field: "tm",
                value: value.to_string(),
                reason: e.to_string(),
            })
    })?;

    times.into_iter().next().ok_or(Error::MissingField {
        record: "bustime-response",
        field: "tm",
    })
}
