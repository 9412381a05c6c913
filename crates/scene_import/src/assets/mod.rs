mod builtin;
mod database;
mod mesh;
mod model;

pub use builtin::{builtin_mesh_id, builtin_mesh_name, DEFAULT_MATERIAL_ID};
pub use database::{AssetDatabase, AssetEntry, AssetScanError};
pub use mesh::{LookupError, MeshLookup};
pub use model::ModelTemplate;
