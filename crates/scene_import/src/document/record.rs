use serde_json::{Map, Value};

use crate::math::{Quat, Vec2, Vec3};

use super::value::{FileRef, LocalId, ValueExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Camera,
    Light,
    MeshRenderer,
    MeshFilter,
    BoxCollider,
    SphereCollider,
    Rigidbody,
    MonoBehaviour,
    Script,
}

impl ComponentKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "Camera" => Self::Camera,
            "Light" => Self::Light,
            "MeshRenderer" => Self::MeshRenderer,
            "MeshFilter" => Self::MeshFilter,
            "BoxCollider" => Self::BoxCollider,
            "SphereCollider" => Self::SphereCollider,
            "Rigidbody" => Self::Rigidbody,
            "MonoBehaviour" => Self::MonoBehaviour,
            "Script" => Self::Script,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Entity,
    Transform,
    RectTransform,
    /// `Prefab` record with `m_IsPrefabParent: 1`; names the template root.
    PrefabRoot,
    /// `Prefab` record pointing at another template plus its overrides.
    PrefabInstance,
    Component(ComponentKind),
    Unrecognized,
}

impl RecordKind {
    pub fn is_transform(self) -> bool {
        matches!(self, Self::Transform | Self::RectTransform)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub type_tag: String,
    pub class_id: u32,
    pub local_id: LocalId,
    /// Header carried the `stripped` marker: the record is a stub for an
    /// object living inside a prefab instance.
    pub stripped: bool,
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(type_tag: impl Into<String>, local_id: impl Into<LocalId>) -> Self {
        Self {
            type_tag: type_tag.into(),
            class_id: 0,
            local_id: local_id.into(),
            stripped: false,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn kind(&self) -> RecordKind {
        match self.type_tag.as_str() {
            "GameObject" => RecordKind::Entity,
            "Transform" => RecordKind::Transform,
            "RectTransform" => RecordKind::RectTransform,
            "Prefab" if self.flag("m_IsPrefabParent").unwrap_or(false) => RecordKind::PrefabRoot,
            "Prefab" | "PrefabInstance" => RecordKind::PrefabInstance,
            tag => ComponentKind::from_tag(tag)
                .map(RecordKind::Component)
                .unwrap_or(RecordKind::Unrecognized),
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Missing or malformed references read as null.
    pub fn reference(&self, key: &str) -> FileRef {
        self.field(key)
            .and_then(ValueExt::as_file_ref)
            .unwrap_or_default()
    }

    pub fn references(&self, key: &str) -> Vec<FileRef> {
        self.field(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ValueExt::as_file_ref).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.field("m_Name")
            .and_then(ValueExt::as_text)
            .unwrap_or_default()
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.field(key).and_then(ValueExt::as_text)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.field(key).and_then(ValueExt::as_flag)
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.field(key)
            .and_then(ValueExt::as_number_lenient)
            .map(|value| value as f32)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(ValueExt::as_int_lenient)
    }

    /// Each missing or unreadable axis takes its value from `fallback`.
    /// Overrides often write a single axis into a record that never declared
    /// the vector.
    pub fn vec2_or(&self, key: &str, fallback: Vec2) -> Vec2 {
        Vec2::new(
            self.axis(key, "x", fallback.x),
            self.axis(key, "y", fallback.y),
        )
    }

    pub fn vec3_or(&self, key: &str, fallback: Vec3) -> Vec3 {
        Vec3::new(
            self.axis(key, "x", fallback.x),
            self.axis(key, "y", fallback.y),
            self.axis(key, "z", fallback.z),
        )
    }

    pub fn quat_or(&self, key: &str, fallback: Quat) -> Quat {
        Quat::new(
            self.axis(key, "x", fallback.x),
            self.axis(key, "y", fallback.y),
            self.axis(key, "z", fallback.z),
            self.axis(key, "w", fallback.w),
        )
    }

    fn axis(&self, key: &str, axis: &str, fallback: f32) -> f32 {
        self.field(key)
            .and_then(|value| value.field(axis))
            .and_then(ValueExt::as_number_lenient)
            .map_or(fallback, |number| number as f32)
    }

    /// Entries of `m_Component`. Newer files write `- component: {fileID}`,
    /// older ones key the entry by class id (`- 4: {fileID}`); either way the
    /// reference is the entry's first value.
    pub fn component_refs(&self) -> Vec<FileRef> {
        self.field("m_Component")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_object()?.values().next()?.as_file_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn owning_entity(&self) -> FileRef {
        self.reference("m_GameObject")
    }

    pub fn owning_prefab_instance(&self) -> FileRef {
        self.first_reference(&["m_PrefabInternal", "m_PrefabInstance"])
    }

    pub fn inside_prefab_target(&self) -> FileRef {
        self.first_reference(&["m_PrefabParentObject", "m_CorrespondingSourceObject"])
    }

    pub fn template_reference(&self) -> FileRef {
        self.first_reference(&["m_ParentPrefab", "m_SourcePrefab"])
    }

    pub fn modification(&self, key: &str) -> Option<&Value> {
        self.field("m_Modification").and_then(|value| value.field(key))
    }

    fn first_reference(&self, keys: &[&str]) -> FileRef {
        keys.iter()
            .map(|key| self.reference(key))
            .find(|reference| !reference.is_null())
            .unwrap_or_default()
    }
}
