use std::fmt;

use serde_json::Value;

use crate::math::Color;

/// Identity of the engine's built-in primitive meshes.
pub const BUILTIN_MESH_GUID: &str = "0000000000000000e000000000000000";
/// Identity of the engine's built-in resources (default material, skybox).
pub const BUILTIN_RESOURCE_GUID: &str = "0000000000000000f000000000000000";

/// Record identifier, unique within one document. Zero means "no reference".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub i64);

impl LocalId {
    pub const NONE: Self = Self(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for LocalId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(String);

impl Guid {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn builtin_meshes() -> Self {
        Self::new(BUILTIN_MESH_GUID)
    }

    pub fn builtin_resources() -> Self {
        Self::new(BUILTIN_RESOURCE_GUID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{fileID, guid}` cross-reference. Without a guid it points into the
/// document that contains it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileRef {
    pub local_id: LocalId,
    pub guid: Option<Guid>,
}

impl FileRef {
    pub fn local(local_id: impl Into<LocalId>) -> Self {
        Self {
            local_id: local_id.into(),
            guid: None,
        }
    }

    pub fn external(guid: Guid, local_id: impl Into<LocalId>) -> Self {
        Self {
            local_id: local_id.into(),
            guid: Some(guid),
        }
    }

    pub fn is_null(&self) -> bool {
        self.local_id.is_none()
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.guid {
            Some(guid) => write!(f, "{}:{}", guid, self.local_id),
            None => write!(f, "{}", self.local_id),
        }
    }
}

/// Typed accessors over record values. Numbers are read leniently because
/// override values frequently arrive as strings.
pub trait ValueExt {
    fn field(&self, key: &str) -> Option<&Value>;
    fn as_number_lenient(&self) -> Option<f64>;
    fn as_int_lenient(&self) -> Option<i64>;
    fn as_flag(&self) -> Option<bool>;
    fn as_text(&self) -> Option<String>;
    fn as_color(&self) -> Option<Color>;
    fn as_file_ref(&self) -> Option<FileRef>;
}

impl ValueExt for Value {
    fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn as_number_lenient(&self) -> Option<f64> {
        match self {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn as_int_lenient(&self) -> Option<i64> {
        match self {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_u64().and_then(|value| i64::try_from(value).ok()))
                .or_else(|| number.as_f64().map(|value| value as i64)),
            Value::String(text) => {
                let trimmed = text.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|value| value as i64))
            }
            Value::Bool(flag) => Some(i64::from(*flag)),
            _ => None,
        }
    }

    fn as_flag(&self) -> Option<bool> {
        self.as_int_lenient().map(|value| value != 0)
    }

    fn as_text(&self) -> Option<String> {
        match self {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn as_color(&self) -> Option<Color> {
        Some(Color::new(
            component(self, "r")?,
            component(self, "g")?,
            component(self, "b")?,
            self.field("a")
                .and_then(ValueExt::as_number_lenient)
                .map_or(1.0, |value| value as f32),
        ))
    }

    fn as_file_ref(&self) -> Option<FileRef> {
        let local_id = LocalId(self.field("fileID")?.as_int_lenient()?);
        let guid = self
            .field("guid")
            .and_then(ValueExt::as_text)
            .filter(|text| !text.trim().is_empty())
            .map(Guid::new);
        Some(FileRef { local_id, guid })
    }
}

fn component(value: &Value, key: &str) -> Option<f32> {
    value
        .field(key)
        .and_then(ValueExt::as_number_lenient)
        .map(|number| number as f32)
}
