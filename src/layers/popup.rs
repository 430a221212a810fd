use std::fmt;

use serde_json::Value;

use crate::data::feature_collection::Properties;

/// Placeholder shown for every field a feature does not carry.
pub const MISSING: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    Text,
    Link,
}

/// One popup row: where to look for the value and how to show it.
///
/// `keys` are tried in order; the first one holding a usable scalar wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub keys: &'static [&'static str],
    pub kind: FieldKind,
}

const fn field(label: &'static str, keys: &'static [&'static str], kind: FieldKind) -> FieldSpec {
    FieldSpec { label, keys, kind }
}

pub const PARK_FIELDS: &[FieldSpec] = &[
    field("Name", &["Name", "name"], FieldKind::Title),
    field("Address", &["ADDRESS"], FieldKind::Text),
    field("Amenities", &["AMENITIES"], FieldKind::Text),
    field("Hours", &["HOURS"], FieldKind::Text),
    field("Description", &["DESCRIPTION"], FieldKind::Text),
    field("More info", &["EXT_LINK"], FieldKind::Link),
    field("Acres", &["ACRES"], FieldKind::Text),
    field("Latitude", &["LATITUDE"], FieldKind::Text),
    field("Longitude", &["LONGITUDE"], FieldKind::Text),
];

pub const TRAIL_FIELDS: &[FieldSpec] = &[
    field("Name", &["NAME"], FieldKind::Title),
    field("Type", &["TRAIL_TYPE"], FieldKind::Text),
    field("Length (mi)", &["LENGTH_MI"], FieldKind::Text),
    field("ADA accessible", &["ADA"], FieldKind::Text),
    field("More info", &["EXT_LINK"], FieldKind::Link),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupValue {
    Text(String),
    Link(String),
    Missing,
}

impl PopupValue {
    pub fn as_text(&self) -> &str {
        match self {
            PopupValue::Text(text) | PopupValue::Link(text) => text,
            PopupValue::Missing => MISSING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRow {
    pub label: &'static str,
    pub value: PopupValue,
}

/// Fixed-shape popup content for one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRecord {
    pub title: PopupValue,
    pub rows: Vec<PopupRow>,
}

impl PopupRecord {
    /// Applies `fields` to a property bag. Every field yields exactly one entry,
    /// so all popups of a layer share the same layout.
    pub fn build(fields: &[FieldSpec], properties: &Properties) -> Self {
        let mut title = PopupValue::Missing;
        let mut rows = Vec::with_capacity(fields.len());

        for spec in fields {
            let value = match first_present(spec.keys, properties) {
                None => PopupValue::Missing,
                Some(text) if spec.kind == FieldKind::Link => PopupValue::Link(text),
                Some(text) => PopupValue::Text(text),
            };
            match spec.kind {
                FieldKind::Title => title = value,
                _ => rows.push(PopupRow {
                    label: spec.label,
                    value,
                }),
            }
        }

        Self { title, rows }
    }

    pub fn value(&self, label: &str) -> Option<&PopupValue> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| &row.value)
    }
}

impl fmt::Display for PopupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title.as_text())?;
        for row in &self.rows {
            write!(f, "\n{}: {}", row.label, row.value.as_text())?;
        }
        Ok(())
    }
}

fn first_present(keys: &[&str], properties: &Properties) -> Option<String> {
    keys.iter()
        .find_map(|key| properties.get(*key).and_then(scalar_text))
}

/// Text of a usable scalar. Null, blank strings and nested values don't count.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Bool(false) => Some("No".to_string()),
        _ => None,
    }
}
