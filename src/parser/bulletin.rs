use roxmltree::Node;

use super::fields::{Fields, FieldTable, Presence};
use super::response::parse_records;
use crate::error::Result;
use crate::models::{Affected, ServiceBulletin};

const BULLETIN_FIELDS: FieldTable = &[
    ("sbj", Presence::Required),
    ("dtl", Presence::Required),
    ("brf", Presence::Required),
    ("prty", Presence::Required),
];

const SERVICE_TAG: &str = "srvc";

/// Stops and routes named under the bulletin's `srvc` tags, in document order.
fn affected(node: Node<'_, '_>) -> Vec<Affected> {
    node.children()
        .filter(|child| child.has_tag_name(SERVICE_TAG))
        .flat_map(|srvc| srvc.children().filter(|c| c.is_element()))
        .filter_map(|child| {
            let id = child.text().unwrap_or_default().trim().to_string();
            match child.tag_name().name() {
                "stpid" => Some(Affected::Stop(id)),
                "rt" => Some(Affected::Route(id)),
                _ => None,
            }
        })
        .collect()
}

fn parse_bulletin(node: Node<'_, '_>) -> Result<Option<ServiceBulletin>> {
    let Some(fields) = Fields::extract(node, "sb", BULLETIN_FIELDS)? else {
        return Ok(None);
    };

    Ok(Some(ServiceBulletin {
        title: fields.text("sbj")?,
        details_full: fields.text("dtl")?,
        details_short: fields.text("brf")?,
        priority: fields.text("prty")?,
        affects: affected(node),
    }))
}

/// `getservicebulletins`, by route or by stop.
pub fn parse_service_bulletins(body: &str) -> Result<Vec<ServiceBulletin>> {
    parse_records(body, "sb", parse_bulletin)
}
