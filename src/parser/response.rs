use roxmltree::{Document, Node};
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::ApiErrorMessage;

const ERROR_TAG: &str = "error";
const ERROR_MESSAGE_TAG: &str = "msg";

/// Every element named `tag`, in document order.
pub fn records<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants().filter(move |node| node.has_tag_name(tag))
}

/// `<error>` payloads embedded in the response wrapper.
pub fn api_errors(doc: &Document<'_>) -> Vec<ApiErrorMessage> {
    records(doc, ERROR_TAG)
        .map(|node| {
            let mut message = None;
            let mut details = Vec::new();

            for child in node.children().filter(|c| c.is_element()) {
                let text = child.text().unwrap_or_default().trim().to_string();
                if child.has_tag_name(ERROR_MESSAGE_TAG) && message.is_none() {
                    message = Some(text);
                } else {
                    details.push((child.tag_name().name().to_string(), text));
                }
            }

            ApiErrorMessage {
                message: message.unwrap_or_else(|| "unspecified error".to_string()),
                details,
            }
        })
        .collect()
}

/// Fails with [`Error::Api`] when the response carries errors and no records.
///
/// Errors alongside records (e.g. one unknown id in a list) are only logged.
pub fn check_api_errors(doc: &Document<'_>, record_count: usize) -> Result<()> {
    let errors = api_errors(doc);
    if errors.is_empty() {
        return Ok(());
    }

    if record_count == 0 {
        return Err(Error::Api(errors));
    }

    for error in &errors {
        warn!("BusTracker reported a partial error: {}", error);
    }
    Ok(())
}

/// Parses every `tag` element with `parse`, dropping records it maps to `None`.
pub fn parse_records<T, F>(body: &str, tag: &str, mut parse: F) -> Result<Vec<T>>
where
    F: FnMut(Node<'_, '_>) -> Result<Option<T>>,
{
    let doc = Document::parse(body)?;
    let nodes: Vec<Node<'_, '_>> = records(&doc, tag).collect();
    check_api_errors(&doc, nodes.len())?;

    nodes
        .into_iter()
        .filter_map(|node| parse(node).transpose())
        .collect()
}
