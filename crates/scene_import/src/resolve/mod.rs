mod builder;
mod context;
mod diagnostics;
mod error;
mod factory;
mod overrides;
mod prefab;
mod scene;

#[cfg(test)]
mod tests;

pub use builder::{build_graph, EntitiesBuilt, GraphBuilder, Linked, Unbuilt};
pub use context::ResolveContext;
pub use diagnostics::{Diagnostics, Issue, IssueCode};
pub use error::ResolveError;
pub use factory::{
    generic_behaviour, ComponentFactory, ScriptHandler, ScriptRegistry, UI_TEXT_SCRIPT_GUID,
    UI_TEXT_SCRIPT_ID,
};
pub use overrides::{parse_property_path, write_property, Override, PathSegment, PropertyPathError};
pub use prefab::{InstantiatedPrefab, PrefabInstance, PrefabLoadError, PrefabResolver, Template};
pub use scene::{Scene, SceneResolver};

pub(crate) use prefab::stamp_objects;
