use serde_json::json;

use super::*;
use crate::assets::{AssetDatabase, ModelTemplate};
use crate::document::{Document, FileRef, Guid, LocalId, RecycleEntry};
use crate::graph::{Component, SceneGraph, Transform};

const CRATE: &str = "c4a7e0f1b2d3c4a5e6f708192a3b4c5d";
const SHELF: &str = "5e1f0000aaaabbbbccccddddeeeeffff";
const ROOM: &str = "700d0000111122223333444455556666";
const MODEL: &str = "0de10000abcdabcdabcdabcdabcdabcd";

const CRATE_PREFAB: &str = r#"%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1001 &100100000
Prefab:
  m_ObjectHideFlags: 1
  m_RootGameObject: {fileID: 100000}
  m_IsPrefabParent: 1
--- !u!1 &100000
GameObject:
  m_Name: Crate
  m_IsActive: 1
  m_Component:
  - component: {fileID: 400000}
  - component: {fileID: 3300000}
  - component: {fileID: 2300000}
  m_PrefabInternal: {fileID: 100100000}
--- !u!4 &400000
Transform:
  m_GameObject: {fileID: 100000}
  m_LocalPosition: {x: 0, y: 0, z: 0}
  m_LocalScale: {x: 1, y: 1, z: 1}
  m_Children:
  - {fileID: 400004}
  - {fileID: 400002}
  m_Father: {fileID: 0}
--- !u!33 &3300000
MeshFilter:
  m_GameObject: {fileID: 100000}
  m_Mesh: {fileID: 10202, guid: 0000000000000000e000000000000000, type: 0}
--- !u!23 &2300000
MeshRenderer:
  m_GameObject: {fileID: 100000}
  m_Enabled: 1
  m_Materials:
  - {fileID: 10303, guid: 0000000000000000f000000000000000, type: 0}
--- !u!1 &100002
GameObject:
  m_Name: Lid
  m_Component:
  - component: {fileID: 400002}
--- !u!4 &400002
Transform:
  m_GameObject: {fileID: 100002}
  m_LocalPosition: {x: 0, y: 0.5, z: 0}
  m_Father: {fileID: 400000}
--- !u!1 &100004
GameObject:
  m_Name: Label
  m_Component:
  - component: {fileID: 400004}
--- !u!4 &400004
Transform:
  m_GameObject: {fileID: 100004}
  m_Father: {fileID: 400000}
"#;

const SHELF_PREFAB: &str = r#"--- !u!1001 &100100000
Prefab:
  m_RootGameObject: {fileID: 1000}
  m_IsPrefabParent: 1
--- !u!1 &1000
GameObject:
  m_Name: Shelf
  m_Component:
  - component: {fileID: 4000}
--- !u!4 &4000
Transform:
  m_GameObject: {fileID: 1000}
  m_Children:
  - {fileID: 4001}
--- !u!1001 &5000
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 4000}
    m_Modifications:
    - target: {fileID: 400000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
      propertyPath: m_LocalPosition.y
      value: 1.5
      objectReference: {fileID: 0}
  m_ParentPrefab: {fileID: 100100000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_IsPrefabParent: 0
--- !u!4 &4001 stripped
Transform:
  m_PrefabParentObject: {fileID: 400000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_PrefabInternal: {fileID: 5000}
"#;

const ROOM_PREFAB: &str = r#"--- !u!1001 &100100000
Prefab:
  m_RootGameObject: {fileID: 1}
  m_IsPrefabParent: 1
--- !u!1 &1
GameObject:
  m_Name: Room
  m_Component:
  - component: {fileID: 4}
--- !u!4 &4
Transform:
  m_GameObject: {fileID: 1}
  m_Children: []
--- !u!1001 &9000
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 4}
    m_Modifications: []
  m_ParentPrefab: {fileID: 100100000, guid: 5e1f0000aaaabbbbccccddddeeeeffff, type: 2}
  m_IsPrefabParent: 0
"#;

fn prefab(guid: &str, name: &str, text: &str) -> PrefabResolver {
    PrefabResolver::new(Guid::new(guid), name, Document::parse(text).expect("parse prefab"))
}

fn database() -> AssetDatabase {
    let mut assets = AssetDatabase::new();
    assets
        .register_prefab(prefab(CRATE, "Crate", CRATE_PREFAB))
        .expect("register crate");
    assets
        .register_prefab(prefab(SHELF, "Shelf", SHELF_PREFAB))
        .expect("register shelf");
    assets
        .register_prefab(prefab(ROOM, "Room", ROOM_PREFAB))
        .expect("register room");
    assets
}

fn crate_of(assets: &AssetDatabase) -> &PrefabResolver {
    assets.prefab(&Guid::new(CRATE)).expect("crate prefab")
}

fn names(graph: &SceneGraph, ids: &[crate::graph::EntityId]) -> Vec<String> {
    ids.iter()
        .map(|id| graph.entity(*id).expect("entity").name.clone())
        .collect()
}

#[test]
fn instances_without_overrides_are_identical_and_independent() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let template = crate_of(&assets);
    let mut graph = SceneGraph::new();
    let mut diagnostics = Diagnostics::new();

    let first = template
        .instance(&mut graph, &[], &ctx, &mut diagnostics)
        .expect("first instance");
    let second = template
        .instance(&mut graph, &[], &ctx, &mut diagnostics)
        .expect("second instance");

    assert_ne!(first.root, second.root);
    assert_eq!(graph.snapshot(first.root), graph.snapshot(second.root));
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.issues());

    let before = graph.snapshot(second.root);
    graph.entity_mut(first.root).expect("first root").name = "Renamed".to_string();
    let lid = first.objects.entity(LocalId(100_002)).expect("lid");
    graph.entity_mut(lid).expect("lid").transform_mut().local_position.y = 9.0;
    assert_eq!(graph.snapshot(second.root), before);
}

#[test]
fn value_override_patches_only_its_instance() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let template = crate_of(&assets);
    let overrides = [Override::value(
        FileRef::external(Guid::new(CRATE), 400_000),
        "m_LocalPosition.x",
        json!(3),
    )];

    let moved = template.instantiate(&overrides, &ctx).expect("moved");
    let position = moved
        .graph
        .entity(moved.instance.root)
        .expect("root")
        .transform()
        .local_position;
    assert_eq!((position.x, position.y, position.z), (3.0, 0.0, 0.0));

    let plain = template.instantiate(&[], &ctx).expect("plain");
    let position = plain
        .graph
        .entity(plain.instance.root)
        .expect("root")
        .transform()
        .local_position;
    assert_eq!(position.x, 0.0);
}

#[test]
fn single_axis_override_on_undeclared_vector_keeps_other_axes() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    // The Label transform declares no position and no scale.
    let overrides = [
        Override::value(
            FileRef::external(Guid::new(CRATE), 400_004),
            "m_LocalPosition.x",
            json!(3),
        ),
        Override::value(
            FileRef::external(Guid::new(CRATE), 400_004),
            "m_LocalScale.y",
            json!("2"),
        ),
    ];

    let built = crate_of(&assets).instantiate(&overrides, &ctx).expect("instance");
    let label = built.instance.objects.entity(LocalId(100_004)).expect("label");
    let transform = built.graph.entity(label).expect("label").transform();
    let position = transform.local_position;
    let scale = transform.local_scale;
    assert_eq!((position.x, position.y, position.z), (3.0, 0.0, 0.0));
    assert_eq!((scale.x, scale.y, scale.z), (1.0, 2.0, 1.0));
    assert!(built.diagnostics.is_empty());
}

#[test]
fn children_keep_declared_order() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let built = crate_of(&assets).instantiate(&[], &ctx).expect("instance");

    let children = built.graph.children(built.instance.root);
    assert_eq!(names(&built.graph, children), vec!["Label", "Lid"]);
    assert_eq!(built.graph.roots(), &[built.instance.root]);
}

#[test]
fn mesh_reference_override_rebinds_the_filter() {
    let mut assets = database();
    assets
        .register_model(ModelTemplate::new(
            Guid::new(MODEL),
            "Props",
            vec![
                RecycleEntry {
                    class_id: 43,
                    local_id: LocalId(4_300_000),
                    name: "Barrel".to_string(),
                },
                RecycleEntry {
                    class_id: 43,
                    local_id: LocalId(4_300_002),
                    name: "Crate".to_string(),
                },
            ],
        ))
        .expect("register model");
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let template = crate_of(&assets);

    let rebind = |reference_id: i64| {
        let overrides = [Override::reference(
            FileRef::external(Guid::new(CRATE), 3_300_000),
            "m_Mesh",
            FileRef::external(Guid::new(MODEL), reference_id),
        )];
        let built = template.instantiate(&overrides, &ctx).expect("instance");
        let filter = built
            .instance
            .objects
            .component(LocalId(3_300_000))
            .expect("filter");
        let mesh = match &built.graph.component(filter).expect("filter").component {
            Component::MeshFilter(filter) => filter.mesh.as_ref().map(|mesh| mesh.name.clone()),
            other => panic!("unexpected component {other:?}"),
        };
        (mesh, built.diagnostics)
    };

    let (mesh, diagnostics) = rebind(4_300_000);
    assert_eq!(mesh.as_deref(), Some("Barrel"));
    assert!(diagnostics.is_empty());

    // The entity is named "Crate" and so is a model mesh; an unknown id must
    // not pick that mesh up.
    let (mesh, diagnostics) = rebind(4_300_099);
    assert_eq!(mesh.as_deref(), Some("Cube"));
    assert_eq!(diagnostics.count(IssueCode::MeshLookupFailed), 1);
}

#[test]
fn unsupported_reference_override_is_reported() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let overrides = [Override::reference(
        FileRef::external(Guid::new(CRATE), 2_300_000),
        "m_Materials.Array.data[0]",
        FileRef::external(Guid::new(MODEL), 2_100_000),
    )];

    let built = crate_of(&assets)
        .instantiate(&overrides, &ctx)
        .expect("instance");
    assert!(built.diagnostics.has(IssueCode::UnsupportedOverride));
}

#[test]
fn template_without_root_declaration_is_fatal() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let without_root = CRATE_PREFAB.replace("m_IsPrefabParent: 1", "m_IsPrefabParent: 0");
    let broken = prefab("aaaa0000000000000000000000000001", "Broken", &without_root);

    let mut graph = SceneGraph::new();
    let existing = graph.spawn("Existing", true, Transform::default());
    let mut diagnostics = Diagnostics::new();
    let err = broken
        .instance(&mut graph, &[], &ctx, &mut diagnostics)
        .expect_err("no root");
    assert!(matches!(err, ResolveError::MissingPrefabRoot { .. }));
    assert_eq!(graph.entity_count(), 1);
    assert_eq!(graph.roots(), &[existing]);
}

#[test]
fn template_with_two_root_declarations_is_fatal() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let doubled = format!(
        "{CRATE_PREFAB}--- !u!1001 &100100002\nPrefab:\n  m_RootGameObject: {{fileID: 100002}}\n  m_IsPrefabParent: 1\n"
    );
    let broken = prefab("aaaa0000000000000000000000000002", "Broken", &doubled);

    let err = broken.instantiate(&[], &ctx).expect_err("two roots");
    assert_eq!(
        err,
        ResolveError::DuplicatePrefabRoot {
            template: Guid::new("aaaa0000000000000000000000000002"),
            count: 2,
        }
    );
}

#[test]
fn failure_after_partial_build_leaves_graph_untouched() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let dangling_root = CRATE_PREFAB.replace("m_RootGameObject: {fileID: 100000}", "m_RootGameObject: {fileID: 999}");
    let broken = prefab("aaaa0000000000000000000000000003", "Broken", &dangling_root);

    let mut graph = SceneGraph::new();
    let existing = graph.spawn("Existing", true, Transform::default());
    let mut diagnostics = Diagnostics::new();
    let err = broken
        .instance(&mut graph, &[], &ctx, &mut diagnostics)
        .expect_err("root not built");
    assert!(matches!(
        err,
        ResolveError::UnresolvedPrefabRoot {
            root: LocalId(999),
            ..
        }
    ));
    assert_eq!(graph.entity_count(), 1);
    assert_eq!(graph.component_count(), 0);
    assert_eq!(graph.roots(), &[existing]);
}

#[test]
fn nested_instance_failure_rolls_back_the_outer_instance() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let text = format!(
        "{ROOM_PREFAB}--- !u!1001 &9001\nPrefab:\n  m_ParentPrefab: {{fileID: 100100000, guid: bbbb0000000000000000000000000009, type: 2}}\n  m_IsPrefabParent: 0\n"
    );
    let outer = prefab("aaaa0000000000000000000000000004", "Outer", &text);

    let mut graph = SceneGraph::new();
    let mut diagnostics = Diagnostics::new();
    let err = outer
        .instance(&mut graph, &[], &ctx, &mut diagnostics)
        .expect_err("unknown nested template");
    assert!(matches!(
        err,
        ResolveError::UnknownTemplate {
            local_id: LocalId(9001),
            ..
        }
    ));
    assert_eq!(graph.entity_count(), 0);
    assert!(graph.roots().is_empty());
}

#[test]
fn nested_objects_are_found_two_levels_down() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let room = assets.prefab(&Guid::new(ROOM)).expect("room");

    let built = room.instantiate(&[], &ctx).expect("room instance");
    assert!(built.diagnostics.is_empty(), "{:?}", built.diagnostics.issues());
    let graph = &built.graph;

    let lid = built
        .instance
        .find_object(LocalId(100_002))
        .and_then(|object| object.entity())
        .expect("lid");
    assert_eq!(graph.entity(lid).expect("lid").name, "Lid");

    let crate_root = graph.parent(lid).expect("crate root");
    let shelf_root = graph.parent(crate_root).expect("shelf root");
    assert_eq!(graph.parent(shelf_root), Some(built.instance.root));
    assert_eq!(
        names(graph, &[crate_root, shelf_root, built.instance.root]),
        vec!["Crate", "Shelf", "Room"]
    );

    let shelf = built.instance.nested.get(&LocalId(9000)).expect("shelf");
    let inner = shelf.nested.get(&LocalId(5000)).expect("crate");
    assert_eq!(inner.root, crate_root);
    assert_eq!(inner.template, Guid::new(CRATE));
    let position = graph.entity(crate_root).expect("crate").transform().local_position;
    assert_eq!(position.y, 1.5);
}

#[test]
fn override_aimed_at_another_template_is_fatal() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let overrides = [Override::value(
        FileRef::external(Guid::new(SHELF), 400_000),
        "m_LocalPosition.x",
        json!(1),
    )];

    let err = crate_of(&assets)
        .instantiate(&overrides, &ctx)
        .expect_err("mismatch");
    assert!(matches!(
        err,
        ResolveError::OverrideTargetMismatch { ref found, .. } if found == SHELF
    ));
}

#[test]
fn recursive_template_is_fatal() {
    const LOOP: &str = "100b0000aaaaaaaaaaaaaaaaaaaaaaaa";
    let text = r#"--- !u!1001 &100100000
Prefab:
  m_RootGameObject: {fileID: 1}
  m_IsPrefabParent: 1
--- !u!1 &1
GameObject:
  m_Name: Loop
  m_Component:
  - component: {fileID: 4}
--- !u!4 &4
Transform:
  m_GameObject: {fileID: 1}
--- !u!1001 &7
Prefab:
  m_ParentPrefab: {fileID: 100100000, guid: 100b0000aaaaaaaaaaaaaaaaaaaaaaaa, type: 2}
  m_IsPrefabParent: 0
"#;
    let mut assets = AssetDatabase::new();
    assets
        .register_prefab(prefab(LOOP, "Loop", text))
        .expect("register loop");
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);

    let err = assets
        .prefab(&Guid::new(LOOP))
        .expect("loop")
        .instantiate(&[], &ctx)
        .expect_err("recursion");
    assert_eq!(
        err,
        ResolveError::RecursiveTemplate {
            template: Guid::new(LOOP),
            chain: vec![Guid::new(LOOP), Guid::new(LOOP)],
        }
    );
}

#[test]
fn instances_resolve_concurrently_from_shared_templates() {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let ctx = ResolveContext::new(&assets, &scripts);
    let room = assets.prefab(&Guid::new(ROOM)).expect("room");

    let snapshots = std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let built = room.instantiate(&[], &ctx).expect("instance");
                    built.graph.snapshot_roots()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .collect::<Vec<_>>()
    });

    assert_eq!(snapshots.len(), 4);
    assert!(snapshots.windows(2).all(|pair| pair[0] == pair[1]));
}

const SCENE: &str = r#"%YAML 1.1
--- !u!1 &100
GameObject:
  m_Name: World
  m_Component:
  - component: {fileID: 101}
  - component: {fileID: 102}
--- !u!4 &101
Transform:
  m_GameObject: {fileID: 100}
  m_Children:
  - {fileID: 202}
  m_RootOrder: 0
--- !u!198 &102
ParticleSystem:
  m_GameObject: {fileID: 100}
--- !u!1 &110
GameObject:
  m_Name: Shelf Holder
  m_Component:
  - component: {fileID: 111}
--- !u!4 &111
Transform:
  m_GameObject: {fileID: 110}
  m_RootOrder: 1
--- !u!1001 &200
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 111}
    m_Modifications:
    - target: {fileID: 100000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
      propertyPath: m_Name
      value: Scene Crate
      objectReference: {fileID: 0}
  m_ParentPrefab: {fileID: 100100000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_IsPrefabParent: 0
--- !u!1 &201 stripped
GameObject:
  m_PrefabParentObject: {fileID: 100000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_PrefabInternal: {fileID: 200}
--- !u!4 &202 stripped
Transform:
  m_PrefabParentObject: {fileID: 400000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_PrefabInternal: {fileID: 200}
--- !u!1001 &300
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 111}
    m_Modifications: []
  m_ParentPrefab: {fileID: 100100000, guid: 5e1f0000aaaabbbbccccddddeeeeffff, type: 2}
  m_IsPrefabParent: 0
"#;

fn resolve_scene(text: &str) -> Result<Scene, ResolveError> {
    let assets = database();
    let scripts = ScriptRegistry::new();
    let document = Document::parse(text).expect("parse scene");
    SceneResolver::new(ResolveContext::new(&assets, &scripts)).resolve(&document)
}

#[test]
fn scene_stubs_bind_to_instance_objects() {
    let scene = resolve_scene(SCENE).expect("scene");
    let instance = scene.instances.get(&LocalId(200)).expect("crate instance");

    assert_eq!(scene.objects.entity(LocalId(201)), Some(instance.root));
    assert_eq!(scene.objects.transform(LocalId(202)), Some(instance.root));
    assert_eq!(
        scene.graph.entity(instance.root).expect("root").name,
        "Scene Crate"
    );
}

#[test]
fn child_list_wins_over_transform_parent() {
    let scene = resolve_scene(SCENE).expect("scene");
    let world = scene.objects.entity(LocalId(100)).expect("world");
    let holder = scene.objects.entity(LocalId(110)).expect("holder");
    let crate_root = scene.instances[&LocalId(200)].root;
    let shelf_root = scene.instances[&LocalId(300)].root;

    assert_eq!(scene.graph.parent(crate_root), Some(world));
    assert_eq!(scene.graph.parent(shelf_root), Some(holder));
    assert_eq!(scene.roots(), &[world, holder]);
}

#[test]
fn unknown_component_is_reported_and_entity_kept() {
    let scene = resolve_scene(SCENE).expect("scene");
    let world = scene.objects.entity(LocalId(100)).expect("world");

    assert_eq!(scene.diagnostics.count(IssueCode::UnknownComponentType), 1);
    assert_eq!(scene.graph.components_of(world).count(), 0);
    assert!(!scene.diagnostics.has(IssueCode::RootOrderMismatch));
}

#[test]
fn unknown_template_in_scene_is_fatal() {
    let text = "--- !u!1001 &5\nPrefab:\n  m_ParentPrefab: {fileID: 100100000, guid: ffff0000000000000000000000000000, type: 2}\n  m_IsPrefabParent: 0\n";
    let err = resolve_scene(text).expect_err("unknown template");
    assert_eq!(
        err,
        ResolveError::UnknownTemplate {
            local_id: LocalId(5),
            template: Guid::new("ffff0000000000000000000000000000"),
        }
    );
}

#[test]
fn instance_without_template_identity_is_fatal() {
    let text = "--- !u!1001 &5\nPrefab:\n  m_ParentPrefab: {fileID: 0}\n  m_IsPrefabParent: 0\n";
    let err = resolve_scene(text).expect_err("no identity");
    assert_eq!(
        err,
        ResolveError::MissingTemplateIdentity {
            local_id: LocalId(5)
        }
    );
}

const PALLET: &str = "9a11e700cccccccccccccccccccccccc";

// Shares local ids 100000 and 400000 with the crate it nests.
const PALLET_PREFAB: &str = r#"--- !u!1001 &100100000
Prefab:
  m_RootGameObject: {fileID: 100000}
  m_IsPrefabParent: 1
--- !u!1 &100000
GameObject:
  m_Name: Pallet
  m_Component:
  - component: {fileID: 400000}
--- !u!4 &400000
Transform:
  m_GameObject: {fileID: 100000}
--- !u!1001 &5000
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 400000}
    m_Modifications: []
  m_ParentPrefab: {fileID: 100100000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_IsPrefabParent: 0
"#;

#[test]
fn scene_stub_binds_by_template_when_local_ids_repeat() {
    let mut assets = database();
    assets
        .register_prefab(prefab(PALLET, "Pallet", PALLET_PREFAB))
        .expect("register pallet");
    let scripts = ScriptRegistry::new();
    let text = r#"--- !u!1 &100
GameObject:
  m_Name: World
  m_Component:
  - component: {fileID: 101}
--- !u!4 &101
Transform:
  m_GameObject: {fileID: 100}
  m_Children:
  - {fileID: 301}
--- !u!1001 &300
Prefab:
  m_Modification:
    m_TransformParent: {fileID: 0}
    m_Modifications: []
  m_ParentPrefab: {fileID: 100100000, guid: 9a11e700cccccccccccccccccccccccc, type: 2}
  m_IsPrefabParent: 0
--- !u!4 &301 stripped
Transform:
  m_PrefabParentObject: {fileID: 400000, guid: c4a7e0f1b2d3c4a5e6f708192a3b4c5d, type: 2}
  m_PrefabInternal: {fileID: 300}
--- !u!1 &302 stripped
GameObject:
  m_PrefabParentObject: {fileID: 100000, guid: 9a11e700cccccccccccccccccccccccc, type: 2}
  m_PrefabInternal: {fileID: 300}
"#;
    let document = Document::parse(text).expect("parse scene");
    let scene = SceneResolver::new(ResolveContext::new(&assets, &scripts))
        .resolve(&document)
        .expect("scene");

    let pallet = &scene.instances[&LocalId(300)];
    let nested_crate = pallet.nested.get(&LocalId(5000)).expect("nested crate");
    let bound = scene.objects.transform(LocalId(301)).expect("stub transform");
    assert_eq!(bound, nested_crate.root);
    assert_eq!(scene.graph.entity(bound).expect("crate").name, "Crate");
    assert_eq!(scene.objects.entity(LocalId(302)), Some(pallet.root));

    let world = scene.graph.find_by_name("World").expect("world");
    assert_eq!(scene.graph.parent(bound), Some(world));
    assert!(scene.diagnostics.is_empty(), "{:?}", scene.diagnostics.issues());
}
