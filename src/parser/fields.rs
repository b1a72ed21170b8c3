use chrono::NaiveDateTime;
use roxmltree::Node;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, Result};

/// What to do when a field's tag is absent from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The API guarantees the tag; absence is a parse error.
    Required,
    /// The tag may be missing; accessors see `None`.
    Optional,
    /// The API sometimes omits the tag; the whole record is dropped.
    SkipRecord,
}

/// Field policy for one record type: child tag name and its presence rule.
pub type FieldTable = &'static [(&'static str, Presence)];

/// Text of the direct children of a record node, checked against a [`FieldTable`].
#[derive(Debug)]
pub struct Fields<'a> {
    record: &'static str,
    values: Vec<(&'static str, &'a str)>,
}

impl<'a> Fields<'a> {
    /// Returns `Ok(None)` when a [`Presence::SkipRecord`] field is missing.
    ///
    /// Skip-record fields are checked first, so an incomplete record is
    /// dropped even if a required field is missing too.
    pub fn extract<'input>(
        node: Node<'a, 'input>,
        record: &'static str,
        table: FieldTable,
    ) -> Result<Option<Self>> {
        let incomplete = table.iter().any(|&(field, presence)| {
            presence == Presence::SkipRecord && child_text(node, field).is_none()
        });
        if incomplete {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(table.len());

        for &(field, presence) in table {
            match child_text(node, field) {
                Some(text) => values.push((field, text)),
                None => match presence {
                    Presence::Required => return Err(Error::MissingField { record, field }),
                    Presence::SkipRecord => return Ok(None),
                    Presence::Optional => {}
                },
            }
        }

        Ok(Some(Self { record, values }))
    }

    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn optional(&self, field: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }

    pub fn required(&self, field: &'static str) -> Result<&'a str> {
        self.optional(field).ok_or(Error::MissingField {
            record: self.record,
            field,
        })
    }

    pub fn text(&self, field: &'static str) -> Result<String> {
        self.required(field).map(str::to_string)
    }

    pub fn parse<T>(&self, field: &'static str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.required(field)?;
        value
            .parse()
            .map_err(|e: T::Err| self.invalid(field, value, e))
    }

    pub fn timestamp(&self, field: &'static str, format: &str) -> Result<NaiveDateTime> {
        let value = self.required(field)?;
        NaiveDateTime::parse_from_str(value, format)
            .map_err(|e| self.invalid(field, value, format!("{} (expected {})", e, format)))
    }

    /// True only if the tag is present and its text is exactly `true`.
    pub fn flag(&self, field: &str) -> bool {
        self.optional(field) == Some("true")
    }

    pub fn invalid(&self, field: &'static str, value: &str, reason: impl Display) -> Error {
        Error::InvalidField {
            record: self.record,
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Trimmed text of the first direct child element named `tag`; empty elements yield `""`.
pub fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .map(|child| child.text().unwrap_or_default().trim())
}
