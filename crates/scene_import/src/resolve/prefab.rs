use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::document::{
    meta_path_for, Document, DocumentError, Guid, LocalId, MetaError, MetaFile, RecordKind,
};
use crate::graph::{Component, EntityId, ObjectRef, ResolutionMap, SceneGraph};

use super::context::{enter_template, leave_template, ResolveContext};
use super::diagnostics::{Diagnostics, IssueCode};
use super::error::ResolveError;
use super::factory::resolve_mesh;
use super::overrides::{write_property, Override};
use super::scene::resolve_records;

/// Anything a prefab-instance record can point at.
pub trait Template: Send + Sync {
    fn identity(&self) -> &Guid;

    fn name(&self) -> &str;

    /// Builds a fresh copy of the template into `graph`. On error nothing the
    /// call created is left in `graph`.
    fn instance_into(
        &self,
        graph: &mut SceneGraph,
        overrides: &[Override],
        ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PrefabInstance, ResolveError>;
}

/// Result of instancing a template: the root entity plus the map from the
/// template's local ids to the objects created for them.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefabInstance {
    pub template: Guid,
    pub root: EntityId,
    pub objects: ResolutionMap,
    /// Instances created for prefab-instance records inside the template,
    /// keyed by those records' local ids.
    pub nested: BTreeMap<LocalId, PrefabInstance>,
}

impl PrefabInstance {
    pub fn find_object(&self, local_id: LocalId) -> Option<ObjectRef> {
        self.objects.get(local_id).or_else(|| {
            self.nested
                .values()
                .find_map(|nested| nested.find_object(local_id))
        })
    }

    /// Looks `local_id` up only in instances of `template`, searching this
    /// instance and then its nested ones depth-first. Local ids repeat across
    /// templates, so a guid-qualified reference must not match another map.
    pub fn find_in_template(&self, template: &Guid, local_id: LocalId) -> Option<ObjectRef> {
        if self.template == *template {
            if let Some(found) = self.objects.get(local_id) {
                return Some(found);
            }
        }
        self.nested
            .values()
            .find_map(|nested| nested.find_in_template(template, local_id))
    }
}

#[derive(Debug, Error)]
pub enum PrefabLoadError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Meta(#[from] MetaError),
}

/// A parsed prefab template and its identity. Read-only once built; every
/// instance works on its own copy of the records.
#[derive(Debug, Clone)]
pub struct PrefabResolver {
    identity: Guid,
    name: String,
    document: Document,
}

#[derive(Debug)]
pub struct InstantiatedPrefab {
    pub graph: SceneGraph,
    pub instance: PrefabInstance,
    pub diagnostics: Diagnostics,
}

impl PrefabResolver {
    pub fn new(identity: Guid, name: impl Into<String>, document: Document) -> Self {
        Self {
            identity,
            name: name.into(),
            document,
        }
    }

    /// Loads `path` and takes the identity from its `.meta` companion.
    pub fn load(path: &Path) -> Result<Self, PrefabLoadError> {
        let document = Document::load(path)?;
        let meta = MetaFile::load(&meta_path_for(path))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(meta.guid(), name, document))
    }

    pub fn identity(&self) -> &Guid {
        &self.identity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn instance(
        &self,
        graph: &mut SceneGraph,
        overrides: &[Override],
        ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PrefabInstance, ResolveError> {
        enter_template(diagnostics, &self.identity)?;
        let checkpoint = graph.checkpoint();
        let result = self.instance_unchecked(graph, overrides, ctx, diagnostics);
        leave_template(diagnostics);
        if result.is_err() {
            graph.rollback(checkpoint);
        }
        result
    }

    pub fn instantiate(
        &self,
        overrides: &[Override],
        ctx: &ResolveContext<'_>,
    ) -> Result<InstantiatedPrefab, ResolveError> {
        let mut graph = SceneGraph::new();
        let mut diagnostics = Diagnostics::new();
        let instance = self.instance(&mut graph, overrides, ctx, &mut diagnostics)?;
        Ok(InstantiatedPrefab {
            graph,
            instance,
            diagnostics,
        })
    }

    fn instance_unchecked(
        &self,
        graph: &mut SceneGraph,
        overrides: &[Override],
        ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PrefabInstance, ResolveError> {
        for entry in overrides {
            if entry.target.guid.as_ref() != Some(&self.identity) {
                return Err(ResolveError::OverrideTargetMismatch {
                    expected: self.identity.clone(),
                    found: entry
                        .target
                        .guid
                        .as_ref()
                        .map_or_else(|| "(none)".to_string(), Guid::to_string),
                    property_path: entry.property_path.clone(),
                });
            }
        }

        let roots = self
            .document
            .records()
            .iter()
            .filter(|record| record.kind() == RecordKind::PrefabRoot)
            .collect::<Vec<_>>();
        let root_declaration = match roots.as_slice() {
            [] => {
                return Err(ResolveError::MissingPrefabRoot {
                    template: self.identity.clone(),
                })
            }
            [only] => *only,
            several => {
                return Err(ResolveError::DuplicatePrefabRoot {
                    template: self.identity.clone(),
                    count: several.len(),
                })
            }
        };
        let root_id = root_declaration.reference("m_RootGameObject").local_id;

        let mut document = self.document.clone();
        for entry in overrides.iter().filter(|entry| !entry.is_reference()) {
            let Some(record) = document.get_mut(entry.target.local_id) else {
                diagnostics.report(
                    IssueCode::MissingRecord,
                    entry.target.local_id,
                    format!("override of '{}' targets a missing record", entry.property_path),
                );
                continue;
            };
            if let Err(error) = write_property(&mut record.fields, &entry.property_path, entry.value.clone()) {
                diagnostics.report(
                    IssueCode::MalformedOverride,
                    entry.target.local_id,
                    format!("'{}': {error}", entry.property_path),
                );
            }
        }

        let resolved = resolve_records(&document, graph, ctx, diagnostics)?;
        let root = resolved
            .objects
            .entity(root_id)
            .ok_or_else(|| ResolveError::UnresolvedPrefabRoot {
                template: self.identity.clone(),
                root: root_id,
            })?;

        for entry in overrides.iter().filter(|entry| entry.is_reference()) {
            apply_reference_override(entry, &resolved.objects, graph, ctx, diagnostics);
        }

        stamp_objects(graph, &resolved.objects);
        debug!(
            template = %self.identity,
            name = %self.name,
            root = root.0,
            objects = resolved.objects.len(),
            nested = resolved.instances.len(),
            "prefab_instance_resolved"
        );

        Ok(PrefabInstance {
            template: self.identity.clone(),
            root,
            objects: resolved.objects,
            nested: resolved.instances,
        })
    }
}

impl Template for PrefabResolver {
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
        ctx: &ResolveContext<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<PrefabInstance, ResolveError> {
        self.instance(graph, overrides, ctx, diagnostics)
    }
}

/// Only mesh rebinding is supported: `m_Mesh` on a mesh filter. A failed
/// lookup leaves the filter's mesh as it was.
fn apply_reference_override(
    entry: &Override,
    objects: &ResolutionMap,
    graph: &mut SceneGraph,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
) {
    let Some(reference) = entry.object_reference.as_ref() else {
        return;
    };
    let target = entry.target.local_id;
    let filter_id = objects.component(target).filter(|id| {
        matches!(
            graph.component(*id).map(|attached| &attached.component),
            Some(Component::MeshFilter(_))
        )
    });
    let filter_id = match filter_id {
        Some(id) if entry.property_path == "m_Mesh" => id,
        _ => {
            diagnostics.report(
                IssueCode::UnsupportedOverride,
                target,
                format!("reference override of '{}' is not supported", entry.property_path),
            );
            return;
        }
    };

    match resolve_mesh(ctx.assets, reference) {
        Ok(mesh) => {
            if let Some(filter) = graph
                .component_mut(filter_id)
                .and_then(|attached| attached.component.as_mesh_filter_mut())
            {
                filter.mesh = Some(mesh);
            }
        }
        Err(error) => diagnostics.report(IssueCode::MeshLookupFailed, target, error.to_string()),
    }
}

/// Entities and components keep the first local id they were stamped with,
/// so objects created by a nested instance keep their originating id.
pub(crate) fn stamp_objects(graph: &mut SceneGraph, objects: &ResolutionMap) {
    for (local_id, object) in objects.iter() {
        match object {
            ObjectRef::Entity(id) => {
                graph.stamp_entity(id, local_id);
            }
            ObjectRef::Component(id) => {
                graph.stamp_component(id, local_id);
            }
            ObjectRef::Transform(_) => {}
        }
    }
}
