use serde_json::{Map, Value};

use crate::document::{FileRef, Guid, LocalId};
use crate::math::{Color, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Camera(Camera),
    Light(Light),
    MeshRenderer(MeshRenderer),
    MeshFilter(MeshFilter),
    BoxCollider(BoxCollider),
    SphereCollider(SphereCollider),
    Rigidbody(Rigidbody),
    Text(Text),
    Script(ScriptBehaviour),
}

impl Component {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Camera(_) => "Camera",
            Self::Light(_) => "Light",
            Self::MeshRenderer(_) => "MeshRenderer",
            Self::MeshFilter(_) => "MeshFilter",
            Self::BoxCollider(_) => "BoxCollider",
            Self::SphereCollider(_) => "SphereCollider",
            Self::Rigidbody(_) => "Rigidbody",
            Self::Text(_) => "Text",
            Self::Script(_) => "Script",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Script(behaviour) => behaviour.script.clone(),
            other => other.kind_name().to_string(),
        }
    }

    pub fn as_mesh_filter_mut(&mut self) -> Option<&mut MeshFilter> {
        match self {
            Self::MeshFilter(filter) => Some(filter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearFlags {
    Skybox,
    SolidColor,
    DepthOnly,
    Nothing,
}

impl ClearFlags {
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::SolidColor,
            3 => Self::DepthOnly,
            4 => Self::Nothing,
            _ => Self::Skybox,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub clear_flags: ClearFlags,
    pub background: Color,
    pub field_of_view: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    pub orthographic: bool,
    pub orthographic_size: f32,
    pub depth: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            clear_flags: ClearFlags::Skybox,
            background: Color::new(0.192, 0.302, 0.475, 0.0),
            field_of_view: 60.0,
            near_clip: 0.3,
            far_clip: 1000.0,
            orthographic: false,
            orthographic_size: 5.0,
            depth: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Spot,
    Directional,
    Point,
    Area,
}

impl LightType {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Spot,
            2 => Self::Point,
            3 => Self::Area,
            _ => Self::Directional,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub light_type: LightType,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
    pub spot_angle: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            color: Color::WHITE,
            intensity: 1.0,
            range: 10.0,
            spot_angle: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialRef {
    Default,
    Asset(FileRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    pub enabled: bool,
    pub material: Option<MaterialRef>,
}

/// Identity of a mesh inside a template or the built-in scope. Geometry is
/// never loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshHandle {
    pub source: Guid,
    pub local_id: LocalId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshFilter {
    pub mesh: Option<MeshHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxCollider {
    pub is_trigger: bool,
    pub center: Vec3,
    pub size: Vec3,
}

impl Default for BoxCollider {
    fn default() -> Self {
        Self {
            is_trigger: false,
            center: Vec3::ZERO,
            size: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SphereCollider {
    pub is_trigger: bool,
    pub center: Vec3,
    pub radius: f32,
}

impl Default for SphereCollider {
    fn default() -> Self {
        Self {
            is_trigger: false,
            center: Vec3::ZERO,
            radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rigidbody {
    pub mass: f32,
    pub drag: f32,
    pub angular_drag: f32,
    pub use_gravity: bool,
    pub is_kinematic: bool,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            drag: 0.0,
            angular_drag: 0.05,
            use_gravity: true,
            is_kinematic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub text: String,
    pub font_size: i64,
    pub color: Color,
}

/// Behaviour produced by a registered script handler. `properties` keeps the
/// record's serialized fields minus the engine bookkeeping ones.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptBehaviour {
    pub script: String,
    pub properties: Map<String, Value>,
}
