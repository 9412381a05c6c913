use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::{FileRef, ValueExt};

#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub target: FileRef,
    pub property_path: String,
    pub value: Value,
    /// Non-null for reference overrides, which rebind an asset field after the
    /// graph is built instead of patching the record.
    pub object_reference: Option<FileRef>,
}

impl Override {
    pub fn value(target: FileRef, property_path: impl Into<String>, value: Value) -> Self {
        Self {
            target,
            property_path: property_path.into(),
            value,
            object_reference: None,
        }
    }

    pub fn reference(target: FileRef, property_path: impl Into<String>, reference: FileRef) -> Self {
        Self {
            target,
            property_path: property_path.into(),
            value: Value::Null,
            object_reference: Some(reference),
        }
    }

    pub fn from_value(entry: &Value) -> Result<Self, String> {
        let target = entry
            .field("target")
            .and_then(ValueExt::as_file_ref)
            .ok_or_else(|| "override has no target reference".to_string())?;
        let property_path = entry
            .field("propertyPath")
            .and_then(ValueExt::as_text)
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| format!("override of {target} has no property path"))?;
        let object_reference = entry
            .field("objectReference")
            .and_then(ValueExt::as_file_ref)
            .filter(|reference| !reference.is_null());

        Ok(Self {
            target,
            property_path,
            value: entry.field("value").cloned().unwrap_or(Value::Null),
            object_reference,
        })
    }

    pub fn is_reference(&self) -> bool {
        self.object_reference.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    /// `Array.data[N]`
    Index(usize),
    /// `Array.size`
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyPathError {
    #[error("property path is empty")]
    Empty,
    #[error("malformed path segment '{segment}'")]
    MalformedSegment { segment: String },
    #[error("'{segment}' cannot be entered: the value there is not a mapping or sequence")]
    NotAContainer { segment: String },
    #[error("index {index} is out of range for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Array.size must be the last segment")]
    SizeNotLast,
    #[error("sequence size must be a non-negative integer, got {value}")]
    InvalidSize { value: String },
}

pub fn parse_property_path(path: &str) -> Result<Vec<PathSegment>, PropertyPathError> {
    if path.trim().is_empty() {
        return Err(PropertyPathError::Empty);
    }
    let mut segments = Vec::new();
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        if part.is_empty() {
            return Err(PropertyPathError::MalformedSegment {
                segment: path.to_string(),
            });
        }
        if part != "Array" {
            segments.push(PathSegment::Key(part.to_string()));
            continue;
        }
        let Some(next) = parts.next() else {
            return Err(PropertyPathError::MalformedSegment {
                segment: part.to_string(),
            });
        };
        if next == "size" {
            if parts.peek().is_some() {
                return Err(PropertyPathError::SizeNotLast);
            }
            segments.push(PathSegment::Size);
            continue;
        }
        let index = next
            .strip_prefix("data[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|digits| digits.parse::<usize>().ok())
            .ok_or_else(|| PropertyPathError::MalformedSegment {
                segment: next.to_string(),
            })?;
        segments.push(PathSegment::Index(index));
    }
    Ok(segments)
}

/// Writes `value` at `path` inside a record's fields. Missing mapping keys
/// along the way are inserted; the fields are untouched when the path cannot
/// be followed.
pub fn write_property(
    fields: &mut Map<String, Value>,
    path: &str,
    value: Value,
) -> Result<(), PropertyPathError> {
    let segments = parse_property_path(path)?;
    let mut patched = Value::Object(fields.clone());
    write_at(&mut patched, &segments, value)?;
    if let Value::Object(map) = patched {
        *fields = map;
    }
    Ok(())
}

fn write_at(target: &mut Value, segments: &[PathSegment], value: Value) -> Result<(), PropertyPathError> {
    let Some((segment, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };

    match segment {
        PathSegment::Key(key) => {
            let Value::Object(map) = target else {
                return Err(PropertyPathError::NotAContainer {
                    segment: key.clone(),
                });
            };
            if rest.is_empty() {
                map.insert(key.clone(), value);
                return Ok(());
            }
            let slot = map.entry(key.clone()).or_insert_with(|| match rest[0] {
                PathSegment::Key(_) => Value::Object(Map::new()),
                PathSegment::Index(_) | PathSegment::Size => Value::Array(Vec::new()),
            });
            write_at(slot, rest, value)
        }
        PathSegment::Index(index) => {
            let Value::Array(items) = target else {
                return Err(PropertyPathError::NotAContainer {
                    segment: format!("data[{index}]"),
                });
            };
            let len = items.len();
            let slot = items
                .get_mut(*index)
                .ok_or(PropertyPathError::IndexOutOfRange { index: *index, len })?;
            write_at(slot, rest, value)
        }
        PathSegment::Size => {
            let Value::Array(items) = target else {
                return Err(PropertyPathError::NotAContainer {
                    segment: "size".to_string(),
                });
            };
            let size = value
                .as_int_lenient()
                .and_then(|size| usize::try_from(size).ok())
                .ok_or_else(|| PropertyPathError::InvalidSize {
                    value: value.to_string(),
                })?;
            items.resize(size, Value::Null);
            Ok(())
        }
    }
}
