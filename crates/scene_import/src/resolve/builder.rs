use std::marker::PhantomData;

use crate::document::{Document, LocalId, Record, RecordKind};
use crate::graph::{ObjectRef, RectLayout, ResolutionMap, SceneGraph, Transform};
use crate::math::{Quat, Vec2, Vec3};

use super::diagnostics::{Diagnostics, IssueCode};
use super::factory::ComponentFactory;

#[derive(Debug)]
pub struct Unbuilt;
#[derive(Debug)]
pub struct EntitiesBuilt;
/// Child lists applied; the map is final.
#[derive(Debug)]
pub struct Linked;

/// Two-phase construction of a document's object graph. Entities come first
/// so that child lists may reference records declared later in the file.
#[derive(Debug)]
pub struct GraphBuilder<'d, S> {
    document: &'d Document,
    objects: ResolutionMap,
    _state: PhantomData<S>,
}

impl<'d, S> GraphBuilder<'d, S> {
    pub fn objects(&self) -> &ResolutionMap {
        &self.objects
    }

    fn advance<T>(self) -> GraphBuilder<'d, T> {
        GraphBuilder {
            document: self.document,
            objects: self.objects,
            _state: PhantomData,
        }
    }
}

impl<'d> GraphBuilder<'d, Unbuilt> {
    pub fn new(document: &'d Document) -> Self {
        Self::with_objects(document, ResolutionMap::default())
    }

    /// Starts from objects bound before the build, such as prefab instance roots.
    pub fn with_objects(document: &'d Document, objects: ResolutionMap) -> Self {
        Self {
            document,
            objects,
            _state: PhantomData,
        }
    }

    /// Builds every entity record accepted by `include`, in document order.
    pub fn instantiate_entities(
        mut self,
        graph: &mut SceneGraph,
        factory: &ComponentFactory<'_>,
        diagnostics: &mut Diagnostics,
        include: impl Fn(&Record) -> bool,
    ) -> GraphBuilder<'d, EntitiesBuilt> {
        let document = self.document;
        for record in document.records() {
            if record.kind() != RecordKind::Entity || record.stripped || !include(record) {
                continue;
            }
            self.instantiate_entity(record, graph, factory, diagnostics);
        }
        self.advance()
    }

    fn instantiate_entity(
        &mut self,
        record: &Record,
        graph: &mut SceneGraph,
        factory: &ComponentFactory<'_>,
        diagnostics: &mut Diagnostics,
    ) {
        let component_refs = record.component_refs();
        let transform_record = component_refs
            .first()
            .and_then(|reference| self.document.get(reference.local_id))
            .filter(|candidate| candidate.kind().is_transform());
        let Some(transform_record) = transform_record else {
            diagnostics.report(
                IssueCode::MissingTransform,
                record.local_id,
                format!("entity '{}' does not list a transform first", record.name()),
            );
            return;
        };

        let entity = graph.spawn(
            record.name(),
            record.flag("m_IsActive").unwrap_or(true),
            transform_from_record(transform_record),
        );
        self.objects.insert(record.local_id, ObjectRef::Entity(entity));
        self.objects
            .insert(transform_record.local_id, ObjectRef::Transform(entity));

        for reference in component_refs.iter().skip(1) {
            let Some(component_record) = self.document.get(reference.local_id) else {
                diagnostics.report(
                    IssueCode::MissingRecord,
                    reference.local_id,
                    format!("component of entity '{}' is not in the document", record.name()),
                );
                continue;
            };
            let Some(component) = factory.build(component_record, diagnostics) else {
                continue;
            };
            match graph.add_component(entity, component) {
                Ok(id) => self
                    .objects
                    .insert(component_record.local_id, ObjectRef::Component(id)),
                Err(error) => diagnostics.report(
                    IssueCode::InvalidHierarchy,
                    component_record.local_id,
                    error.to_string(),
                ),
            }
        }
    }
}

impl<'d> GraphBuilder<'d, EntitiesBuilt> {
    /// Binds an object created elsewhere (a stub's counterpart inside a
    /// prefab instance) at this document's local id.
    pub fn bind(&mut self, local_id: LocalId, object: ObjectRef) {
        self.objects.insert(local_id, object);
    }

    /// Binds the remaining transform records to their owners, then applies
    /// every declared child list in declared order. Transform records with
    /// no built owner are offered to `resolve_unowned`.
    pub fn link_hierarchy(
        mut self,
        graph: &mut SceneGraph,
        diagnostics: &mut Diagnostics,
        mut resolve_unowned: impl FnMut(&Record, &mut Diagnostics) -> Option<ObjectRef>,
    ) -> GraphBuilder<'d, Linked> {
        let document = self.document;
        for record in document.records() {
            if !record.kind().is_transform() || self.objects.contains(record.local_id) {
                continue;
            }
            let owner = record.owning_entity();
            let bound = match self.objects.entity(owner.local_id) {
                Some(entity) if !owner.is_null() => Some(ObjectRef::Transform(entity)),
                _ => resolve_unowned(record, diagnostics),
            };
            match bound {
                Some(object) => self.objects.insert(record.local_id, object),
                None => diagnostics.report(
                    IssueCode::UnresolvedReference,
                    record.local_id,
                    "transform has no built owner",
                ),
            }
        }

        for record in document.records() {
            if !record.kind().is_transform() {
                continue;
            }
            let children = record.references("m_Children");
            if children.is_empty() {
                continue;
            }
            let Some(parent) = self.objects.transform(record.local_id) else {
                continue;
            };
            for child in children {
                let Some(child_entity) = self.objects.transform(child.local_id) else {
                    diagnostics.report(
                        IssueCode::UnresolvedReference,
                        child.local_id,
                        format!("child of transform {} is not bound", record.local_id),
                    );
                    continue;
                };
                if let Err(error) = graph.set_parent(child_entity, Some(parent)) {
                    diagnostics.report(IssueCode::InvalidHierarchy, child.local_id, error.to_string());
                }
            }
        }
        self.advance()
    }
}

impl GraphBuilder<'_, Linked> {
    pub fn into_objects(self) -> ResolutionMap {
        self.objects
    }
}

pub fn build_graph(
    document: &Document,
    graph: &mut SceneGraph,
    factory: &ComponentFactory<'_>,
    diagnostics: &mut Diagnostics,
) -> ResolutionMap {
    GraphBuilder::new(document)
        .instantiate_entities(graph, factory, diagnostics, |_| true)
        .link_hierarchy(graph, diagnostics, |_, _| None)
        .into_objects()
}

pub(crate) fn transform_from_record(record: &Record) -> Transform {
    let mut transform = match record.kind() {
        RecordKind::RectTransform => Transform::rect(RectLayout {
            anchor_min: record.vec2_or("m_AnchorMin", Vec2::splat(0.5)),
            anchor_max: record.vec2_or("m_AnchorMax", Vec2::splat(0.5)),
            anchored_position: record.vec2_or("m_AnchoredPosition", Vec2::ZERO),
            size_delta: record.vec2_or("m_SizeDelta", Vec2::splat(100.0)),
            pivot: record.vec2_or("m_Pivot", Vec2::splat(0.5)),
        }),
        _ => Transform::default(),
    };
    transform.local_rotation = record.quat_or("m_LocalRotation", Quat::IDENTITY);
    transform.local_position = record.vec3_or("m_LocalPosition", Vec3::ZERO);
    transform.local_scale = record.vec3_or("m_LocalScale", Vec3::ONE);
    transform
}
