use thiserror::Error;

use crate::document::LocalId;
use crate::math::{Quat, Vec2, Vec3};

use super::component::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("entity {0:?} does not exist")]
    UnknownEntity(EntityId),
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: EntityId, parent: EntityId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectLayout {
    pub anchor_min: Vec2,
    pub anchor_max: Vec2,
    pub anchored_position: Vec2,
    pub size_delta: Vec2,
    pub pivot: Vec2,
}

impl Default for RectLayout {
    fn default() -> Self {
        Self {
            anchor_min: Vec2::splat(0.5),
            anchor_max: Vec2::splat(0.5),
            anchored_position: Vec2::ZERO,
            size_delta: Vec2::splat(100.0),
            pivot: Vec2::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
    pub rect: Option<RectLayout>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            rect: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Transform {
    pub fn rect(layout: RectLayout) -> Self {
        Self {
            rect: Some(layout),
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    pub name: String,
    pub active: bool,
    transform: Transform,
    components: Vec<ComponentId>,
    local_id: Option<LocalId>,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Local values only; hierarchy links change through [`SceneGraph::set_parent`].
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    pub fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }
}

#[derive(Debug, Clone)]
pub struct AttachedComponent {
    owner: EntityId,
    pub component: Component,
    local_id: Option<LocalId>,
}

impl AttachedComponent {
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn local_id(&self) -> Option<LocalId> {
        self.local_id
    }
}

/// Marks the arena lengths so a failed resolve call can drop what it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphCheckpoint {
    entities: usize,
    components: usize,
}

/// Arena owning every entity and component of one resolved scene. Ids are
/// arena indices; children are linked by id.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    entities: Vec<Entity>,
    components: Vec<AttachedComponent>,
    roots: Vec<EntityId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: impl Into<String>, active: bool, transform: Transform) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        let transform = Transform {
            parent: None,
            children: Vec::new(),
            ..transform
        };
        self.entities.push(Entity {
            id,
            name: name.into(),
            active,
            transform,
            components: Vec::new(),
            local_id: None,
        });
        self.roots.push(id);
        id
    }

    pub fn add_component(
        &mut self,
        owner: EntityId,
        component: Component,
    ) -> Result<ComponentId, HierarchyError> {
        let id = ComponentId(self.components.len() as u32);
        let entity = self
            .entities
            .get_mut(owner.0 as usize)
            .ok_or(HierarchyError::UnknownEntity(owner))?;
        entity.components.push(id);
        self.components.push(AttachedComponent {
            owner,
            component,
            local_id: None,
        });
        Ok(id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0 as usize)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn component(&self, id: ComponentId) -> Option<&AttachedComponent> {
        self.components.get(id.0 as usize)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut AttachedComponent> {
        self.components.get_mut(id.0 as usize)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn components_of(&self, entity: EntityId) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.entity(entity)
            .map(|entity| entity.components.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|id| Some((*id, &self.component(*id)?.component)))
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entity(id).and_then(|entity| entity.transform.parent)
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entity(id)
            .map(|entity| entity.transform.children.as_slice())
            .unwrap_or_default()
    }

    /// Reparents in local space: local position, rotation and scale are kept
    /// as they are. The child is detached from its previous parent (or the
    /// root list) and appended as the last child of `parent`.
    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
    ) -> Result<(), HierarchyError> {
        if self.entity(child).is_none() {
            return Err(HierarchyError::UnknownEntity(child));
        }
        if let Some(parent) = parent {
            if self.entity(parent).is_none() {
                return Err(HierarchyError::UnknownEntity(parent));
            }
            if self.is_self_or_ancestor(child, parent) {
                return Err(HierarchyError::Cycle { child, parent });
            }
        }

        self.detach(child);
        match parent {
            Some(parent) => {
                self.entities[parent.0 as usize].transform.children.push(child);
                self.entities[child.0 as usize].transform.parent = Some(parent);
            }
            None => self.roots.push(child),
        }
        Ok(())
    }

    pub fn sibling_index(&self, id: EntityId) -> Option<usize> {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|sibling| *sibling == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|entity| entity.name == name)
            .map(Entity::id)
    }

    pub fn find_child(&self, parent: EntityId, name: &str) -> Option<EntityId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.entity(*child).is_some_and(|entity| entity.name == name))
    }

    /// Records the originating local id unless an earlier pass already did.
    pub fn stamp_entity(&mut self, id: EntityId, local_id: LocalId) -> bool {
        match self.entity_mut(id) {
            Some(entity) if entity.local_id.is_none() => {
                entity.local_id = Some(local_id);
                true
            }
            _ => false,
        }
    }

    pub fn stamp_component(&mut self, id: ComponentId, local_id: LocalId) -> bool {
        match self.component_mut(id) {
            Some(component) if component.local_id.is_none() => {
                component.local_id = Some(local_id);
                true
            }
            _ => false,
        }
    }

    pub fn checkpoint(&self) -> GraphCheckpoint {
        GraphCheckpoint {
            entities: self.entities.len(),
            components: self.components.len(),
        }
    }

    /// Drops every entity and component created after `checkpoint`. Older
    /// entities that had been parented under a dropped one become roots again.
    pub fn rollback(&mut self, checkpoint: GraphCheckpoint) {
        let cutoff = checkpoint.entities;
        if cutoff < self.entities.len() {
            self.entities.truncate(cutoff);
            self.roots.retain(|id| (id.0 as usize) < cutoff);
            let mut orphans = Vec::new();
            for entity in &mut self.entities {
                entity.transform.children.retain(|id| (id.0 as usize) < cutoff);
                if entity
                    .transform
                    .parent
                    .is_some_and(|parent| parent.0 as usize >= cutoff)
                {
                    entity.transform.parent = None;
                    orphans.push(entity.id);
                }
            }
            self.roots.extend(orphans);
        }

        let component_cutoff = checkpoint.components;
        if component_cutoff < self.components.len() {
            self.components.truncate(component_cutoff);
            for entity in &mut self.entities {
                entity
                    .components
                    .retain(|id| (id.0 as usize) < component_cutoff);
            }
        }
    }

    fn is_self_or_ancestor(&self, candidate: EntityId, start: EntityId) -> bool {
        let mut cursor = Some(start);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn detach(&mut self, child: EntityId) {
        match self.entities[child.0 as usize].transform.parent.take() {
            Some(old_parent) => self.entities[old_parent.0 as usize]
                .transform
                .children
                .retain(|id| *id != child),
            None => self.roots.retain(|id| *id != child),
        }
    }
}
