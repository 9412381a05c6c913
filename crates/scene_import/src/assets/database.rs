use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::document::{meta_path_for, Guid, LocalId, MetaError, MetaFile};
use crate::graph::MeshHandle;
use crate::resolve::{PrefabLoadError, PrefabResolver, ResolveError, Template};
use crate::ProjectPaths;

use super::builtin::{builtin_mesh_id, builtin_mesh_name};
use super::mesh::{LookupError, MeshLookup};
use super::model::ModelTemplate;

const MODEL_EXTENSIONS: [&str; 5] = ["fbx", "obj", "dae", "blend", "3ds"];

#[derive(Debug, Error)]
pub enum AssetScanError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read directory entry in {path}: {source}")]
    ReadDirEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Meta(#[from] MetaError),
    #[error("failed to load prefab {path}: {source}")]
    Prefab {
        path: PathBuf,
        #[source]
        source: PrefabLoadError,
    },
    #[error("identity {identity} of {path} is already registered for {existing}")]
    DuplicateIdentity {
        identity: Guid,
        path: PathBuf,
        existing: String,
    },
}

#[derive(Debug)]
pub enum AssetEntry {
    Prefab(PrefabResolver),
    Model(ModelTemplate),
    Material,
    BuiltinMeshes,
    BuiltinResources,
    Other { importer: Option<String> },
}

impl AssetEntry {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Prefab(_) => "prefab",
            Self::Model(_) => "model",
            Self::Material => "material",
            Self::BuiltinMeshes => "built-in mesh",
            Self::BuiltinResources => "built-in resource",
            Self::Other { .. } => "other",
        }
    }

    pub fn as_template(&self) -> Option<&dyn Template> {
        match self {
            Self::Prefab(prefab) => Some(prefab),
            Self::Model(model) => Some(model),
            _ => None,
        }
    }
}

/// Identity → asset registry for one project. Read-only once scanned.
#[derive(Debug)]
pub struct AssetDatabase {
    entries: BTreeMap<Guid, AssetEntry>,
    paths: BTreeMap<Guid, PathBuf>,
    guids: BTreeMap<PathBuf, Guid>,
}

impl Default for AssetDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDatabase {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(Guid::builtin_meshes(), AssetEntry::BuiltinMeshes);
        entries.insert(Guid::builtin_resources(), AssetEntry::BuiltinResources);
        Self {
            entries,
            paths: BTreeMap::new(),
            guids: BTreeMap::new(),
        }
    }

    /// Registers every file under the project's asset directory that has a
    /// `.meta` companion, in sorted path order.
    pub fn scan(paths: &ProjectPaths) -> Result<Self, AssetScanError> {
        let mut database = Self::new();
        let mut files = Vec::new();
        collect_recursive(&paths.assets_dir, &mut files)?;
        files.sort();

        for path in files {
            if has_extension(&path, &["meta"]) {
                continue;
            }
            let meta_path = meta_path_for(&path);
            if !meta_path.is_file() {
                debug!(path = %path.display(), "asset_without_meta_skipped");
                continue;
            }
            let meta = MetaFile::load(&meta_path)?;
            let entry = if has_extension(&path, &["prefab"]) {
                let prefab = PrefabResolver::load(&path).map_err(|source| AssetScanError::Prefab {
                    path: path.clone(),
                    source,
                })?;
                AssetEntry::Prefab(prefab)
            } else if has_extension(&path, &MODEL_EXTENSIONS) {
                let entries = meta
                    .model_importer
                    .as_ref()
                    .map(|importer| importer.recycle_entries())
                    .unwrap_or_default();
                AssetEntry::Model(ModelTemplate::new(meta.guid(), file_stem(&path), entries))
            } else if has_extension(&path, &["mat"]) {
                AssetEntry::Material
            } else {
                AssetEntry::Other {
                    importer: meta.importer().map(str::to_string),
                }
            };
            database.insert(meta.guid(), entry, Some(path))?;
        }

        info!(
            assets_dir = %paths.assets_dir.display(),
            assets = database.paths.len(),
            templates = database
                .entries
                .values()
                .filter(|entry| entry.as_template().is_some())
                .count(),
            "asset_scan_complete"
        );
        Ok(database)
    }

    pub fn register_prefab(&mut self, prefab: PrefabResolver) -> Result<(), AssetScanError> {
        let identity = prefab.identity().clone();
        self.insert(identity, AssetEntry::Prefab(prefab), None)
    }

    pub fn register_model(&mut self, model: ModelTemplate) -> Result<(), AssetScanError> {
        let identity = model.identity().clone();
        self.insert(identity, AssetEntry::Model(model), None)
    }

    pub fn entry(&self, identity: &Guid) -> Option<&AssetEntry> {
        self.entries.get(identity)
    }

    pub fn prefab(&self, identity: &Guid) -> Option<&PrefabResolver> {
        match self.entry(identity)? {
            AssetEntry::Prefab(prefab) => Some(prefab),
            _ => None,
        }
    }

    pub fn template(&self, local_id: LocalId, identity: &Guid) -> Result<&dyn Template, ResolveError> {
        let entry = self
            .entry(identity)
            .ok_or_else(|| ResolveError::UnknownTemplate {
                local_id,
                template: identity.clone(),
            })?;
        entry
            .as_template()
            .ok_or_else(|| ResolveError::UnsupportedTemplate {
                local_id,
                template: identity.clone(),
                kind: entry.kind_name(),
            })
    }

    pub fn guid_of(&self, path: &Path) -> Option<&Guid> {
        self.guids.get(path)
    }

    pub fn path_of(&self, identity: &Guid) -> Option<&Path> {
        self.paths.get(identity).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(
        &mut self,
        identity: Guid,
        entry: AssetEntry,
        path: Option<PathBuf>,
    ) -> Result<(), AssetScanError> {
        if let Some(existing) = self.entries.get(&identity) {
            let existing = self
                .paths
                .get(&identity)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| existing.kind_name().to_string());
            return Err(AssetScanError::DuplicateIdentity {
                path: path.unwrap_or_default(),
                identity,
                existing,
            });
        }
        if let Some(path) = path {
            self.guids.insert(path.clone(), identity.clone());
            self.paths.insert(identity.clone(), path);
        }
        self.entries.insert(identity, entry);
        Ok(())
    }
}

impl MeshLookup for AssetDatabase {
    fn resolve_by_id(&self, asset: &Guid, local_id: LocalId) -> Result<MeshHandle, LookupError> {
        match self.entry(asset) {
            None => Err(LookupError::UnknownAsset(asset.clone())),
            Some(AssetEntry::BuiltinMeshes) => builtin_mesh_name(local_id)
                .map(|name| MeshHandle {
                    source: asset.clone(),
                    local_id,
                    name: name.to_string(),
                })
                .ok_or_else(|| LookupError::UnknownMeshId {
                    asset: asset.clone(),
                    local_id,
                }),
            Some(AssetEntry::Model(model)) => {
                model
                    .mesh_by_id(local_id)
                    .ok_or_else(|| LookupError::UnknownMeshId {
                        asset: asset.clone(),
                        local_id,
                    })
            }
            Some(other) => Err(LookupError::NotAMeshSource {
                asset: asset.clone(),
                kind: other.kind_name(),
            }),
        }
    }

    fn resolve_by_name(&self, asset: &Guid, name: &str) -> Result<MeshHandle, LookupError> {
        let unknown = || LookupError::UnknownMeshName {
            asset: asset.clone(),
            name: name.to_string(),
        };
        match self.entry(asset) {
            None => Err(LookupError::UnknownAsset(asset.clone())),
            Some(AssetEntry::BuiltinMeshes) => builtin_mesh_id(name)
                .map(|local_id| MeshHandle {
                    source: asset.clone(),
                    local_id,
                    name: name.to_string(),
                })
                .ok_or_else(unknown),
            Some(AssetEntry::Model(model)) => model.mesh_by_name(name).ok_or_else(unknown),
            Some(other) => Err(LookupError::NotAMeshSource {
                asset: asset.clone(),
                kind: other.kind_name(),
            }),
        }
    }
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), AssetScanError> {
    let entries = fs::read_dir(current).map_err(|source| AssetScanError::ReadDir {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| AssetScanError::ReadDirEntry {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extensions
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
