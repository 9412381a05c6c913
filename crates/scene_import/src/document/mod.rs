mod index;
mod meta;
mod record;
mod value;

pub use index::{Document, DocumentError};
pub use meta::{meta_path_for, MetaError, MetaFile, ModelImporterMeta, RecycleEntry};
pub use record::{ComponentKind, Record, RecordKind};
pub use value::{FileRef, Guid, LocalId, ValueExt, BUILTIN_MESH_GUID, BUILTIN_RESOURCE_GUID};
