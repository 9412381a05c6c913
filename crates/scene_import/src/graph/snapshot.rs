use serde::Serialize;

use super::world::{EntityId, SceneGraph};

/// Serializable view of an entity subtree, used for structural comparison of
/// instances and for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rect_transform: bool,
    pub components: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntitySnapshot>,
}

impl SceneGraph {
    pub fn snapshot(&self, id: EntityId) -> Option<EntitySnapshot> {
        let entity = self.entity(id)?;
        let transform = entity.transform();
        Some(EntitySnapshot {
            name: entity.name.clone(),
            active: entity.active,
            local_id: entity.local_id().map(|local_id| local_id.0),
            position: transform.local_position.to_array(),
            rotation: transform.local_rotation.to_array(),
            scale: transform.local_scale.to_array(),
            rect_transform: transform.rect.is_some(),
            components: self
                .components_of(id)
                .map(|(_, component)| component.label())
                .collect(),
            children: transform
                .children()
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    pub fn snapshot_roots(&self) -> Vec<EntitySnapshot> {
        self.roots()
            .iter()
            .filter_map(|root| self.snapshot(*root))
            .collect()
    }
}
