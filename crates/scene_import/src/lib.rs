//! Reads a project's scene and prefab documents and resolves them into
//! scene graphs, instancing prefab templates with their overrides applied.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod assets;
pub mod document;
pub mod graph;
pub mod math;
pub mod resolve;

pub use assets::{AssetDatabase, AssetScanError, LookupError, MeshLookup, ModelTemplate};
pub use document::{Document, DocumentError, FileRef, Guid, LocalId, MetaFile, Record};
pub use graph::{EntityId, EntitySnapshot, SceneGraph};
pub use resolve::{
    Diagnostics, Issue, IssueCode, Override, PrefabInstance, PrefabResolver, ResolveContext,
    ResolveError, Scene, SceneResolver, ScriptRegistry, Template,
};

pub const ROOT_ENV_VAR: &str = "SCENE_IMPORT_ROOT";
const ASSETS_DIR: &str = "Assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

impl ProjectPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let assets_dir = root.join(ASSETS_DIR);
        Self { root, assets_dir }
    }
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("{path} is not a project root: it has no {ASSETS_DIR}/ directory")]
    InvalidRoot { path: PathBuf },
    #[error(
        "Could not detect a project root by walking upward from {start_dir}\n\
Expected a directory containing {ASSETS_DIR}/.\n\
Pass --root or set {env_var}, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/project\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

/// Picks the project root: `explicit` first, then `SCENE_IMPORT_ROOT`, then
/// the nearest ancestor of the current directory holding an `Assets/` folder.
pub fn resolve_project_paths(explicit: Option<&Path>) -> Result<ProjectPaths, ProjectError> {
    if let Some(path) = explicit {
        return checked_root(path).map(ProjectPaths::from_root);
    }
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => checked_root(Path::new(&value)).map(ProjectPaths::from_root),
        Err(env::VarError::NotPresent) => {
            let cwd = env::current_dir().map_err(ProjectError::CurrentDir)?;
            cwd.ancestors()
                .find(|candidate| is_project_marker(candidate))
                .map(|root| ProjectPaths::from_root(normalize_path(root)))
                .ok_or_else(|| ProjectError::RootNotFound {
                    start_dir: normalize_path(&cwd),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(ProjectError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn checked_root(path: &Path) -> Result<PathBuf, ProjectError> {
    let normalized = normalize_path(path);
    if is_project_marker(&normalized) {
        Ok(normalized)
    } else {
        Err(ProjectError::InvalidRoot { path: normalized })
    }
}

fn is_project_marker(path: &Path) -> bool {
    path.join(ASSETS_DIR).is_dir()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
