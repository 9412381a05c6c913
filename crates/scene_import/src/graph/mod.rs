mod component;
mod objects;
mod snapshot;
mod world;

pub use component::{
    BoxCollider, Camera, ClearFlags, Component, Light, LightType, MaterialRef, MeshFilter,
    MeshHandle, MeshRenderer, Rigidbody, ScriptBehaviour, SphereCollider, Text,
};
pub use objects::{ObjectRef, ResolutionMap};
pub use snapshot::EntitySnapshot;
pub use world::{
    AttachedComponent, ComponentId, Entity, EntityId, GraphCheckpoint, HierarchyError,
    RectLayout, SceneGraph, Transform,
};
