use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

use crate::document::{Document, LocalId, Record, RecordKind, ValueExt};
use crate::graph::{EntityId, ObjectRef, ResolutionMap, SceneGraph};

use super::builder::GraphBuilder;
use super::context::ResolveContext;
use super::diagnostics::{Diagnostics, IssueCode};
use super::error::ResolveError;
use super::overrides::Override;
use super::prefab::{stamp_objects, PrefabInstance};

#[derive(Debug)]
pub struct Scene {
    pub graph: SceneGraph,
    pub objects: ResolutionMap,
    pub instances: BTreeMap<LocalId, PrefabInstance>,
    pub diagnostics: Diagnostics,
}

impl Scene {
    pub fn roots(&self) -> &[EntityId] {
        self.graph.roots()
    }
}

pub struct SceneResolver<'a> {
    ctx: ResolveContext<'a>,
}

impl<'a> SceneResolver<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(&self, document: &Document) -> Result<Scene, ResolveError> {
        let mut graph = SceneGraph::new();
        let mut diagnostics = Diagnostics::new();
        let resolved = resolve_records(document, &mut graph, &self.ctx, &mut diagnostics)?;

        report_root_order(document, &graph, &resolved.objects, &mut diagnostics);
        stamp_objects(&mut graph, &resolved.objects);
        info!(
            records = document.len(),
            entities = graph.entity_count(),
            components = graph.component_count(),
            instances = resolved.instances.len(),
            issues = diagnostics.len(),
            "scene_resolved"
        );

        Ok(Scene {
            graph,
            objects: resolved.objects,
            instances: resolved.instances,
            diagnostics,
        })
    }
}

pub(crate) struct ResolvedRecords {
    pub objects: ResolutionMap,
    pub instances: BTreeMap<LocalId, PrefabInstance>,
}

/// Resolves one document into `graph`: prefab instances first, then the
/// document's own entities, stub binding, child lists and parent stitching.
/// Shared by scenes and by templates that contain prefab instances.
pub(crate) fn resolve_records(
    document: &Document,
    graph: &mut SceneGraph,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<ResolvedRecords, ResolveError> {
    let mut instances = BTreeMap::new();
    let mut prebound = ResolutionMap::default();
    for record in document.records() {
        if record.kind() != RecordKind::PrefabInstance {
            continue;
        }
        let instance = instance_record(record, graph, ctx, diagnostics)?;
        prebound.insert(record.local_id, ObjectRef::Entity(instance.root));
        instances.insert(record.local_id, instance);
    }

    let factory = ctx.factory();
    let mut builder = GraphBuilder::with_objects(document, prebound).instantiate_entities(
        graph,
        &factory,
        diagnostics,
        |record| owning_instance(document, record).is_none(),
    );

    for record in document.records() {
        let kind = record.kind();
        if kind.is_transform()
            || matches!(kind, RecordKind::PrefabRoot | RecordKind::PrefabInstance)
            || builder.objects().contains(record.local_id)
        {
            continue;
        }
        match find_stub_target(record, &instances) {
            Some(object) => builder.bind(record.local_id, object),
            None if record.stripped || owning_instance(document, record).is_some() => {
                diagnostics.report(
                    IssueCode::UnresolvedReference,
                    record.local_id,
                    format!("{} stub has no counterpart in its prefab instance", record.type_tag),
                );
            }
            None => {}
        }
    }

    let objects = builder
        .link_hierarchy(graph, diagnostics, |record, _| {
            find_stub_target(record, &instances)
        })
        .into_objects();

    stitch_fathers(document, graph, &objects, diagnostics);
    stitch_instance_parents(document, graph, &objects, &instances, diagnostics);

    Ok(ResolvedRecords { objects, instances })
}

fn instance_record(
    record: &Record,
    graph: &mut SceneGraph,
    ctx: &ResolveContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<PrefabInstance, ResolveError> {
    let template_ref = record.template_reference();
    let identity = if template_ref.is_null() {
        None
    } else {
        template_ref.guid
    };
    let Some(identity) = identity else {
        return Err(ResolveError::MissingTemplateIdentity {
            local_id: record.local_id,
        });
    };
    let template = ctx.assets.template(record.local_id, &identity)?;

    let mut overrides = Vec::new();
    let entries = record
        .modification("m_Modifications")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for entry in entries {
        match Override::from_value(entry) {
            Ok(parsed) => overrides.push(parsed),
            Err(message) => diagnostics.report(IssueCode::MalformedOverride, record.local_id, message),
        }
    }

    template.instance_into(graph, &overrides, ctx, diagnostics)
}

fn owning_instance(document: &Document, record: &Record) -> Option<LocalId> {
    let owner = record.owning_prefab_instance();
    if owner.is_null() || owner.guid.is_some() {
        return None;
    }
    document
        .get(owner.local_id)
        .filter(|candidate| candidate.kind() == RecordKind::PrefabInstance)
        .map(|candidate| candidate.local_id)
}

/// Object inside the owning instance that a stub stands for, rebound to the
/// stub's own kind.
fn find_stub_target(
    record: &Record,
    instances: &BTreeMap<LocalId, PrefabInstance>,
) -> Option<ObjectRef> {
    let instance = instances.get(&record.owning_prefab_instance().local_id)?;
    let target = record.inside_prefab_target();
    if target.is_null() {
        return None;
    }
    let found = match target.guid.as_ref() {
        Some(template) => instance.find_in_template(template, target.local_id)?,
        None => instance.find_object(target.local_id)?,
    };
    match record.kind() {
        RecordKind::Entity => found.entity().map(ObjectRef::Entity),
        kind if kind.is_transform() => found.entity().map(ObjectRef::Transform),
        _ => matches!(found, ObjectRef::Component(_)).then_some(found),
    }
}

fn stitch_fathers(
    document: &Document,
    graph: &mut SceneGraph,
    objects: &ResolutionMap,
    diagnostics: &mut Diagnostics,
) {
    for record in document.records() {
        if !record.kind().is_transform() || record.stripped {
            continue;
        }
        let father = record.reference("m_Father");
        if father.is_null() || owning_instance(document, record).is_some() {
            continue;
        }
        let Some(child) = objects.transform(record.local_id) else {
            continue;
        };
        if graph.parent(child).is_some() {
            continue;
        }
        set_parent_or_report(graph, objects, child, father.local_id, record.local_id, diagnostics);
    }
}

/// `m_TransformParent` places an instance root under a scene transform. The
/// first writer wins: roots that already have a parent are left alone.
fn stitch_instance_parents(
    document: &Document,
    graph: &mut SceneGraph,
    objects: &ResolutionMap,
    instances: &BTreeMap<LocalId, PrefabInstance>,
    diagnostics: &mut Diagnostics,
) {
    for record in document.records() {
        let Some(instance) = instances.get(&record.local_id) else {
            continue;
        };
        let parent = record
            .modification("m_TransformParent")
            .and_then(ValueExt::as_file_ref)
            .unwrap_or_default();
        if parent.is_null() || graph.parent(instance.root).is_some() {
            continue;
        }
        set_parent_or_report(
            graph,
            objects,
            instance.root,
            parent.local_id,
            record.local_id,
            diagnostics,
        );
    }
}

fn set_parent_or_report(
    graph: &mut SceneGraph,
    objects: &ResolutionMap,
    child: EntityId,
    parent_id: LocalId,
    reported_at: LocalId,
    diagnostics: &mut Diagnostics,
) {
    let Some(parent) = objects.transform(parent_id) else {
        diagnostics.report(
            IssueCode::UnresolvedReference,
            reported_at,
            format!("parent transform {parent_id} is not bound"),
        );
        return;
    };
    if let Err(error) = graph.set_parent(child, Some(parent)) {
        diagnostics.report(IssueCode::InvalidHierarchy, reported_at, error.to_string());
    }
}

/// Declared child order is kept as is; `m_RootOrder` is only checked.
fn report_root_order(
    document: &Document,
    graph: &SceneGraph,
    objects: &ResolutionMap,
    diagnostics: &mut Diagnostics,
) {
    for record in document.records() {
        if !record.kind().is_transform() || record.stripped {
            continue;
        }
        let (Some(expected), Some(entity)) =
            (record.int("m_RootOrder"), objects.transform(record.local_id))
        else {
            continue;
        };
        let Some(actual) = graph.sibling_index(entity) else {
            continue;
        };
        if usize::try_from(expected).ok() != Some(actual) {
            diagnostics.report(
                IssueCode::RootOrderMismatch,
                record.local_id,
                format!("m_RootOrder is {expected} but the sibling index is {actual}"),
            );
        }
    }
}
