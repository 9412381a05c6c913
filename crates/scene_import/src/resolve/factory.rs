use std::collections::HashMap;
use std::fmt;

use serde_json::Map;

use crate::assets::{builtin_mesh_name, LookupError, MeshLookup, DEFAULT_MATERIAL_ID};
use crate::document::{ComponentKind, FileRef, Guid, Record, RecordKind, ValueExt};
use crate::graph::{
    BoxCollider, Camera, ClearFlags, Component, Light, LightType, MaterialRef, MeshFilter,
    MeshHandle, MeshRenderer, Rigidbody, ScriptBehaviour, SphereCollider, Text,
};
use crate::math::Color;

use super::diagnostics::{Diagnostics, IssueCode};

/// Script identity of the built-in UI text behaviour.
pub const UI_TEXT_SCRIPT_GUID: &str = "f70555f144d8491a825f0804e09c671c";
pub const UI_TEXT_SCRIPT_ID: i64 = 708705254;

/// Engine bookkeeping fields left out of scripted behaviour properties.
const BOOKKEEPING_FIELDS: [&str; 12] = [
    "m_ObjectHideFlags",
    "m_PrefabParentObject",
    "m_PrefabInternal",
    "m_CorrespondingSourceObject",
    "m_PrefabInstance",
    "m_PrefabAsset",
    "m_GameObject",
    "m_Enabled",
    "m_EditorHideFlags",
    "m_Script",
    "m_Name",
    "m_EditorClassIdentifier",
];

pub type ScriptHandler = fn(&Record) -> Option<Component>;

/// Factories for scripted component kinds, keyed by script guid (behaviour
/// records) or script name (`Script` records). Filled before resolving.
#[derive(Clone, Default)]
pub struct ScriptRegistry {
    handlers: HashMap<String, ScriptHandler>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces and returns any handler already registered under `key`.
    pub fn register(&mut self, key: impl AsRef<str>, handler: ScriptHandler) -> Option<ScriptHandler> {
        self.handlers.insert(registry_key(key.as_ref()), handler)
    }

    pub fn with(mut self, key: impl AsRef<str>, handler: ScriptHandler) -> Self {
        self.register(key, handler);
        self
    }

    pub fn handler(&self, key: &str) -> Option<ScriptHandler> {
        self.handlers.get(&registry_key(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.handlers.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("ScriptRegistry").field("keys", &keys).finish()
    }
}

fn registry_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

pub fn generic_behaviour(record: &Record) -> Option<Component> {
    let script = record
        .text("ScriptName")
        .or_else(|| record.reference("m_Script").guid.map(|guid| guid.to_string()))
        .unwrap_or_else(|| record.type_tag.clone());
    let properties = record
        .fields
        .iter()
        .filter(|(key, _)| !BOOKKEEPING_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Map<_, _>>();
    Some(Component::Script(ScriptBehaviour { script, properties }))
}

pub struct ComponentFactory<'a> {
    meshes: &'a dyn MeshLookup,
    scripts: &'a ScriptRegistry,
}

impl<'a> ComponentFactory<'a> {
    pub fn new(meshes: &'a dyn MeshLookup, scripts: &'a ScriptRegistry) -> Self {
        Self { meshes, scripts }
    }

    pub fn build(&self, record: &Record, diagnostics: &mut Diagnostics) -> Option<Component> {
        let kind = match record.kind() {
            RecordKind::Component(kind) => kind,
            RecordKind::Unrecognized => {
                diagnostics.report(
                    IssueCode::UnknownComponentType,
                    record.local_id,
                    format!("no component kind for type tag '{}'", record.type_tag),
                );
                return None;
            }
            other => {
                diagnostics.report(
                    IssueCode::UnsupportedComponent,
                    record.local_id,
                    format!("{other:?} record listed as a component"),
                );
                return None;
            }
        };

        match kind {
            ComponentKind::Camera => Some(Component::Camera(camera(record))),
            ComponentKind::Light => Some(Component::Light(light(record))),
            ComponentKind::MeshRenderer => {
                Some(Component::MeshRenderer(mesh_renderer(record, diagnostics)))
            }
            ComponentKind::MeshFilter => Some(Component::MeshFilter(self.mesh_filter(record, diagnostics))),
            ComponentKind::BoxCollider => Some(Component::BoxCollider(box_collider(record))),
            ComponentKind::SphereCollider => {
                Some(Component::SphereCollider(sphere_collider(record)))
            }
            ComponentKind::Rigidbody => Some(Component::Rigidbody(rigidbody(record))),
            ComponentKind::MonoBehaviour => self.behaviour(record, diagnostics),
            ComponentKind::Script => {
                let Some(name) = record.text("ScriptName") else {
                    diagnostics.report(
                        IssueCode::UnknownScript,
                        record.local_id,
                        "script record has no ScriptName",
                    );
                    return None;
                };
                self.scripted(&name, record, diagnostics)
            }
        }
    }

    fn mesh_filter(&self, record: &Record, diagnostics: &mut Diagnostics) -> MeshFilter {
        let reference = record.reference("m_Mesh");
        if reference.is_null() {
            return MeshFilter::default();
        }
        match resolve_mesh(self.meshes, &reference) {
            Ok(mesh) => MeshFilter { mesh: Some(mesh) },
            Err(error) => {
                diagnostics.report(IssueCode::MeshLookupFailed, record.local_id, error.to_string());
                MeshFilter::default()
            }
        }
    }

    fn behaviour(&self, record: &Record, diagnostics: &mut Diagnostics) -> Option<Component> {
        let script = record.reference("m_Script");
        let Some(guid) = script.guid.as_ref() else {
            diagnostics.report(
                IssueCode::UnknownScript,
                record.local_id,
                "behaviour has no script identity",
            );
            return None;
        };
        if guid.as_str() == UI_TEXT_SCRIPT_GUID && script.local_id.0 == UI_TEXT_SCRIPT_ID {
            return Some(Component::Text(text(record)));
        }
        self.scripted(guid.as_str(), record, diagnostics)
    }

    fn scripted(
        &self,
        key: &str,
        record: &Record,
        diagnostics: &mut Diagnostics,
    ) -> Option<Component> {
        match self.scripts.handler(key) {
            Some(handler) => handler(record),
            None => {
                diagnostics.report(
                    IssueCode::UnknownScript,
                    record.local_id,
                    format!("no handler registered for script '{key}'"),
                );
                None
            }
        }
    }
}

/// Built-in primitives come from the fixed table; everything else goes
/// through the importer lookup.
pub(crate) fn resolve_mesh(
    meshes: &dyn MeshLookup,
    reference: &FileRef,
) -> Result<MeshHandle, LookupError> {
    let Some(asset) = reference.guid.as_ref() else {
        return Err(LookupError::NoAssetIdentity {
            local_id: reference.local_id,
        });
    };
    if *asset == Guid::builtin_meshes() {
        return builtin_mesh_name(reference.local_id)
            .map(|name| MeshHandle {
                source: asset.clone(),
                local_id: reference.local_id,
                name: name.to_string(),
            })
            .ok_or_else(|| LookupError::UnknownMeshId {
                asset: asset.clone(),
                local_id: reference.local_id,
            });
    }
    meshes.resolve_by_id(asset, reference.local_id)
}

fn mesh_renderer(record: &Record, diagnostics: &mut Diagnostics) -> MeshRenderer {
    let enabled = record.flag("m_Enabled").unwrap_or(true);
    let materials = record.references("m_Materials");
    let material = match materials.as_slice() {
        [] => Some(MaterialRef::Default),
        [only] if only.is_null() => None,
        [only]
            if only.guid == Some(Guid::builtin_resources())
                && only.local_id == DEFAULT_MATERIAL_ID =>
        {
            Some(MaterialRef::Default)
        }
        [only] => Some(MaterialRef::Asset(only.clone())),
        several => {
            diagnostics.report(
                IssueCode::MultipleMaterials,
                record.local_id,
                format!("{} materials listed, only one is supported", several.len()),
            );
            None
        }
    };
    MeshRenderer { enabled, material }
}

fn camera(record: &Record) -> Camera {
    let defaults = Camera::default();
    Camera {
        clear_flags: record
            .int("m_ClearFlags")
            .map_or(defaults.clear_flags, ClearFlags::from_code),
        background: record
            .field("m_BackGroundColor")
            .and_then(ValueExt::as_color)
            .unwrap_or(defaults.background),
        field_of_view: record.number("field of view").unwrap_or(defaults.field_of_view),
        near_clip: record.number("near clip plane").unwrap_or(defaults.near_clip),
        far_clip: record.number("far clip plane").unwrap_or(defaults.far_clip),
        orthographic: record.flag("orthographic").unwrap_or(defaults.orthographic),
        orthographic_size: record
            .number("orthographic size")
            .unwrap_or(defaults.orthographic_size),
        depth: record.number("m_Depth").unwrap_or(defaults.depth),
    }
}

fn light(record: &Record) -> Light {
    let defaults = Light::default();
    Light {
        light_type: record.int("m_Type").map_or(defaults.light_type, LightType::from_code),
        color: record
            .field("m_Color")
            .and_then(ValueExt::as_color)
            .unwrap_or(defaults.color),
        intensity: record.number("m_Intensity").unwrap_or(defaults.intensity),
        range: record.number("m_Range").unwrap_or(defaults.range),
        spot_angle: record.number("m_SpotAngle").unwrap_or(defaults.spot_angle),
    }
}

fn box_collider(record: &Record) -> BoxCollider {
    let defaults = BoxCollider::default();
    BoxCollider {
        is_trigger: record.flag("m_IsTrigger").unwrap_or(defaults.is_trigger),
        center: record.vec3_or("m_Center", defaults.center),
        size: record.vec3_or("m_Size", defaults.size),
    }
}

fn sphere_collider(record: &Record) -> SphereCollider {
    let defaults = SphereCollider::default();
    SphereCollider {
        is_trigger: record.flag("m_IsTrigger").unwrap_or(defaults.is_trigger),
        center: record.vec3_or("m_Center", defaults.center),
        radius: record.number("m_Radius").unwrap_or(defaults.radius),
    }
}

fn rigidbody(record: &Record) -> Rigidbody {
    let defaults = Rigidbody::default();
    Rigidbody {
        mass: record.number("m_Mass").unwrap_or(defaults.mass),
        drag: record.number("m_Drag").unwrap_or(defaults.drag),
        angular_drag: record.number("m_AngularDrag").unwrap_or(defaults.angular_drag),
        use_gravity: record.flag("m_UseGravity").unwrap_or(defaults.use_gravity),
        is_kinematic: record.flag("m_IsKinematic").unwrap_or(defaults.is_kinematic),
    }
}

fn text(record: &Record) -> Text {
    Text {
        text: record.text("m_Text").unwrap_or_default(),
        font_size: record
            .field("m_FontData")
            .and_then(|font| font.field("m_FontSize"))
            .and_then(ValueExt::as_int_lenient)
            .unwrap_or(14),
        color: record
            .field("m_Color")
            .and_then(ValueExt::as_color)
            .unwrap_or(Color::BLACK),
    }
}
