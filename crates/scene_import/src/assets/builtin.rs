use crate::document::LocalId;

/// Primitive meshes addressable through the built-in mesh identity.
const BUILTIN_MESHES: [(i64, &str); 7] = [
    (10202, "Cube"),
    (10206, "Cylinder"),
    (10207, "Sphere"),
    (10208, "Capsule"),
    (10209, "Plane"),
    (10210, "Quad"),
    (10250, "SkyboxSphere"),
];

pub const DEFAULT_MATERIAL_ID: LocalId = LocalId(10303);

pub fn builtin_mesh_name(local_id: LocalId) -> Option<&'static str> {
    BUILTIN_MESHES
        .iter()
        .find(|(id, _)| *id == local_id.0)
        .map(|(_, name)| *name)
}

pub fn builtin_mesh_id(name: &str) -> Option<LocalId> {
    BUILTIN_MESHES
        .iter()
        .find(|(_, known)| *known == name)
        .map(|(id, _)| LocalId(*id))
}
