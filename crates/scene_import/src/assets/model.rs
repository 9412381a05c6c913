use tracing::debug;

use crate::document::{Guid, LocalId, RecycleEntry};
use crate::graph::{
    Component, EntityId, MaterialRef, MeshFilter, MeshHandle, MeshRenderer, ObjectRef,
    ResolutionMap, SceneGraph, Transform,
};
use crate::resolve::{
    stamp_objects, Diagnostics, IssueCode, Override, PrefabInstance, ResolveContext,
    ResolveError, Template,
};

const CLASS_ENTITY: u32 = 1;
const CLASS_TRANSFORM: u32 = 4;
const CLASS_RENDERER: u32 = 23;
const CLASS_MESH_FILTER: u32 = 33;
const CLASS_MESH: u32 = 43;

const ROOT_NODE_NAME: &str = "//RootNode";
const DEFAULT_ROOT_ID: LocalId = LocalId(100_000);

/// Model file known only through its recycle-name table. Instancing yields
/// the node hierarchy with mesh handles; geometry is never read.
#[derive(Debug, Clone)]
pub struct ModelTemplate {
    identity: Guid,
    name: String,
    entries: Vec<RecycleEntry>,
}

impl ModelTemplate {
    pub fn new(identity: Guid, name: impl Into<String>, entries: Vec<RecycleEntry>) -> Self {
        Self {
            identity,
            name: name.into(),
            entries,
        }
    }

    pub fn entries(&self) -> &[RecycleEntry] {
        &self.entries
    }

    pub fn mesh_by_id(&self, local_id: LocalId) -> Option<MeshHandle> {
        self.entries
            .iter()
            .find(|entry| entry.class_id == CLASS_MESH && entry.local_id == local_id)
            .map(|entry| self.handle(entry))
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshHandle> {
        self.entry(CLASS_MESH, name).map(|entry| self.handle(entry))
    }

    fn handle(&self, entry: &RecycleEntry) -> MeshHandle {
        MeshHandle {
            source: self.identity.clone(),
            local_id: entry.local_id,
            name: entry.name.clone(),
        }
    }

    fn entry(&self, class_id: u32, name: &str) -> Option<&RecycleEntry> {
        self.entries
            .iter()
            .find(|entry| entry.class_id == class_id && entry.name == name)
    }

    fn root_node(&self) -> Option<&RecycleEntry> {
        let nodes = || self.entries.iter().filter(|entry| entry.class_id == CLASS_ENTITY);
        nodes()
            .find(|entry| entry.name == ROOT_NODE_NAME)
            .or_else(|| nodes().find(|entry| entry.local_id == DEFAULT_ROOT_ID))
            .or_else(|| nodes().next())
    }

    fn build_node(
        &self,
        graph: &mut SceneGraph,
        objects: &mut ResolutionMap,
        entity_name: &str,
        node: Option<&RecycleEntry>,
    ) -> EntityId {
        let entity = graph.spawn(entity_name, true, Transform::default());
        let Some(node) = node else {
            return entity;
        };
        objects.insert(node.local_id, ObjectRef::Entity(entity));
        if let Some(transform) = self.entry(CLASS_TRANSFORM, &node.name) {
            objects.insert(transform.local_id, ObjectRef::Transform(entity));
        }
        let Some(mesh) = self.mesh_by_name(&node.name) else {
            return entity;
        };

        let filter = Component::MeshFilter(MeshFilter { mesh: Some(mesh) });
        if let Ok(id) = graph.add_component(entity, filter) {
            if let Some(entry) = self.entry(CLASS_MESH_FILTER, &node.name) {
                objects.insert(entry.local_id, ObjectRef::Component(id));
            }
        }
        let renderer = Component::MeshRenderer(MeshRenderer {
            enabled: true,
            material: Some(MaterialRef::Default),
        });
        if let Ok(id) = graph.add_component(entity, renderer) {
            if let Some(entry) = self.entry(CLASS_RENDERER, &node.name) {
                objects.insert(entry.local_id, ObjectRef::Component(id));
            }
        }
        entity
    }
}

impl Template for ModelTemplate {
    fn identity(&self) -> &Guid {
        &self.identity
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn instance_into(
        &self,
        graph: &mut SceneGraph,
        overrides: &[Override],
        _ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PrefabInstance, ResolveError> {
        if let Some(first) = overrides.first() {
            diagnostics.report(
                IssueCode::IgnoredModelOverride,
                first.target.local_id,
                format!(
                    "{} override(s) on model {} ignored",
                    overrides.len(),
                    self.name
                ),
            );
        }

        let mut objects = ResolutionMap::default();
        let root_node = self.root_node();
        let root = self.build_node(graph, &mut objects, &self.name, root_node);
        let children = self.entries.iter().filter(|entry| {
            entry.class_id == CLASS_ENTITY
                && root_node.map_or(true, |root| root.local_id != entry.local_id)
        });
        for node in children {
            let child = self.build_node(graph, &mut objects, &node.name, Some(node));
            if let Err(error) = graph.set_parent(child, Some(root)) {
                diagnostics.report(IssueCode::InvalidHierarchy, node.local_id, error.to_string());
            }
        }

        stamp_objects(graph, &objects);
        debug!(
            template = %self.identity,
            name = %self.name,
            nodes = objects.len(),
            "model_instance_resolved"
        );

        Ok(PrefabInstance {
            template: self.identity.clone(),
            root,
            objects,
            nested: Default::default(),
        })
    }
}
