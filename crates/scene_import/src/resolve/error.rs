use thiserror::Error;

use crate::document::{Guid, LocalId};

/// Conditions that abort a resolve call. Nothing the failed call created is
/// left in the target graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("template {template} declares no prefab root")]
    MissingPrefabRoot { template: Guid },
    #[error("template {template} declares {count} prefab roots, expected exactly one")]
    DuplicatePrefabRoot { template: Guid, count: usize },
    #[error("prefab root {root} of template {template} does not resolve to an entity")]
    UnresolvedPrefabRoot { template: Guid, root: LocalId },
    #[error(
        "override of '{property_path}' targets template {found}, but is applied to template {expected}"
    )]
    OverrideTargetMismatch {
        expected: Guid,
        found: String,
        property_path: String,
    },
    #[error("prefab instance {local_id} references unknown template {template}")]
    UnknownTemplate { local_id: LocalId, template: Guid },
    #[error("prefab instance {local_id} references {template}, a {kind} asset that cannot be instanced")]
    UnsupportedTemplate {
        local_id: LocalId,
        template: Guid,
        kind: &'static str,
    },
    #[error("prefab instance {local_id} has no template identity")]
    MissingTemplateIdentity { local_id: LocalId },
    #[error("template {template} instantiates itself (chain: {})", join_chain(.chain))]
    RecursiveTemplate { template: Guid, chain: Vec<Guid> },
}

fn join_chain(chain: &[Guid]) -> String {
    chain
        .iter()
        .map(Guid::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
