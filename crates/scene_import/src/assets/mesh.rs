use thiserror::Error;

use crate::document::{Guid, LocalId};
use crate::graph::MeshHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("mesh reference {local_id} does not name an asset")]
    NoAssetIdentity { local_id: LocalId },
    #[error("no asset is registered with identity {0}")]
    UnknownAsset(Guid),
    #[error("asset {asset} is a {kind} and holds no meshes")]
    NotAMeshSource { asset: Guid, kind: &'static str },
    #[error("asset {asset} has no mesh with local id {local_id}")]
    UnknownMeshId { asset: Guid, local_id: LocalId },
    #[error("asset {asset} has no mesh named '{name}'")]
    UnknownMeshName { asset: Guid, name: String },
}

/// Read-only mesh importer lookup used by the component factory and by
/// reference overrides.
pub trait MeshLookup {
    fn resolve_by_id(&self, asset: &Guid, local_id: LocalId) -> Result<MeshHandle, LookupError>;
    fn resolve_by_name(&self, asset: &Guid, name: &str) -> Result<MeshHandle, LookupError>;
}
