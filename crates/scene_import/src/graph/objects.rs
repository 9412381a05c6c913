use std::collections::BTreeMap;

use crate::document::LocalId;

use super::world::{ComponentId, EntityId};

/// Object a record resolved to. Transforms are addressed through their entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Entity(EntityId),
    Transform(EntityId),
    Component(ComponentId),
}

impl ObjectRef {
    /// Entity that owns the object, when it is an entity or transform.
    pub fn entity(self) -> Option<EntityId> {
        match self {
            Self::Entity(id) | Self::Transform(id) => Some(id),
            Self::Component(_) => None,
        }
    }
}

/// Local id → object, filled during one resolve pass and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    objects: BTreeMap<LocalId, ObjectRef>,
}

impl ResolutionMap {
    pub fn get(&self, local_id: LocalId) -> Option<ObjectRef> {
        self.objects.get(&local_id).copied()
    }

    pub fn entity(&self, local_id: LocalId) -> Option<EntityId> {
        match self.get(local_id)? {
            ObjectRef::Entity(id) => Some(id),
            _ => None,
        }
    }

    pub fn transform(&self, local_id: LocalId) -> Option<EntityId> {
        match self.get(local_id)? {
            ObjectRef::Transform(id) => Some(id),
            _ => None,
        }
    }

    pub fn component(&self, local_id: LocalId) -> Option<ComponentId> {
        match self.get(local_id)? {
            ObjectRef::Component(id) => Some(id),
            _ => None,
        }
    }

    pub fn contains(&self, local_id: LocalId) -> bool {
        self.objects.contains_key(&local_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LocalId, ObjectRef)> + '_ {
        self.objects.iter().map(|(id, object)| (*id, *object))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn insert(&mut self, local_id: LocalId, object: ObjectRef) {
        self.objects.insert(local_id, object);
    }
}
