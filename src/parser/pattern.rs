use roxmltree::{Document, Node};
use std::collections::{BTreeMap, HashMap};

use super::fields::{Fields, FieldTable, Presence};
use super::response::{check_api_errors, parse_records, records};
use crate::error::{Error, Result};
use crate::models::{Pattern, PatternPoint, PointType};

const PATTERN_TAG: &str = "ptr";
const POINT_TAG: &str = "pt";

const PATTERN_FIELDS: FieldTable = &[
    ("pid", Presence::Required),
    ("ln", Presence::Required),
    ("rtdir", Presence::Required),
];

// stpid/stpnm are only guaranteed on stop points; see `parse_point`.
const POINT_FIELDS: FieldTable = &[
    ("seq", Presence::Required),
    ("typ", Presence::Required),
    ("lat", Presence::Required),
    ("lon", Presence::Required),
    ("stpid", Presence::Optional),
    ("stpnm", Presence::Optional),
];

fn parse_point(node: Node<'_, '_>) -> Result<Option<PatternPoint>> {
    let Some(fields) = Fields::extract(node, POINT_TAG, POINT_FIELDS)? else {
        return Ok(None);
    };

    let code = fields.required("typ")?;
    let point_type =
        PointType::from_code(code).ok_or_else(|| fields.invalid("typ", code, "expected S or W"))?;

    let (stop_id, stop_name) = match point_type {
        PointType::Stop => (Some(fields.text("stpid")?), Some(fields.text("stpnm")?)),
        PointType::Waypoint => (None, None),
    };

    Ok(Some(PatternPoint {
        sequence: fields.parse("seq")?,
        point_type,
        latitude: fields.text("lat")?,
        longitude: fields.text("lon")?,
        stop_id,
        stop_name,
    }))
}

fn parse_pattern(node: Node<'_, '_>) -> Result<Option<Pattern>> {
    let Some(fields) = Fields::extract(node, PATTERN_TAG, PATTERN_FIELDS)? else {
        return Ok(None);
    };

    let mut points = BTreeMap::new();
    for pt in node.children().filter(|c| c.has_tag_name(POINT_TAG)) {
        if let Some(point) = parse_point(pt)? {
            points.insert(point.sequence, point);
        }
    }

    let length: f64 = fields.parse("ln")?;
    if !length.is_finite() {
        let value = fields.required("ln")?;
        return Err(fields.invalid("ln", value, "expected a finite number"));
    }

    Ok(Some(Pattern {
        id: fields.text("pid")?,
        length: length.trunc() as i64,
        route_direction: fields.text("rtdir")?,
        points,
    }))
}

/// `getpatterns?pid=`: exactly one `ptr` is expected.
pub fn parse_single_pattern(body: &str, pattern_id: &str) -> Result<Pattern> {
    let doc = Document::parse(body)?;
    let nodes: Vec<_> = records(&doc, PATTERN_TAG).collect();
    check_api_errors(&doc, nodes.len())?;

    match nodes.as_slice() {
        [] => Err(Error::PatternNotFound {
            pattern_id: pattern_id.to_string(),
        }),
        [node] => parse_pattern(*node)?.ok_or_else(|| Error::PatternNotFound {
            pattern_id: pattern_id.to_string(),
        }),
        _ => Err(Error::AmbiguousPattern {
            pattern_id: pattern_id.to_string(),
            count: nodes.len(),
        }),
    }
}

/// `getpatterns?rt=`: patterns keyed by pattern id.
pub fn parse_patterns(body: &str) -> Result<HashMap<String, Pattern>> {
    let patterns = parse_records(body, PATTERN_TAG, parse_pattern)?;

    Ok(patterns
        .into_iter()
        .map(|pattern| (pattern.id.clone(), pattern))
        .collect())
}
