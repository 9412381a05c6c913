use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use serde::Deserialize;
use thiserror::Error;

use super::index::quote_guid_scalars;
use super::value::{Guid, LocalId};

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("failed to read identity file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse identity file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("identity file {path} has an empty guid")]
    EmptyGuid { path: PathBuf },
}

/// `.meta` companion of an asset: its stable identity plus importer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaFile {
    #[serde(rename = "fileFormatVersion", default)]
    pub file_format_version: Option<u32>,
    guid: String,
    #[serde(rename = "ModelImporter", default)]
    pub model_importer: Option<ModelImporterMeta>,
    #[serde(flatten)]
    other: BTreeMap<String, IgnoredAny>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelImporterMeta {
    #[serde(rename = "fileIDToRecycleName", default)]
    file_id_to_recycle_name: BTreeMap<i64, String>,
    #[serde(rename = "internalIDToNameTable", default)]
    internal_id_to_name_table: Vec<NameTableEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct NameTableEntry {
    first: BTreeMap<i64, i64>,
    second: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycleEntry {
    pub class_id: u32,
    pub local_id: LocalId,
    pub name: String,
}

impl ModelImporterMeta {
    /// Named objects sorted by local id. Older files write a flat
    /// `fileIDToRecycleName` map whose ids encode the class as `id / 100000`;
    /// newer ones list `{first: {class: id}, second: name}` pairs.
    pub fn recycle_entries(&self) -> Vec<RecycleEntry> {
        let mut entries = self
            .file_id_to_recycle_name
            .iter()
            .map(|(id, name)| RecycleEntry {
                class_id: u32::try_from(id / 100_000).unwrap_or(0),
                local_id: LocalId(*id),
                name: name.clone(),
            })
            .collect::<Vec<_>>();
        for entry in &self.internal_id_to_name_table {
            for (class_id, id) in &entry.first {
                if entries.iter().any(|known| known.local_id.0 == *id) {
                    continue;
                }
                entries.push(RecycleEntry {
                    class_id: u32::try_from(*class_id).unwrap_or(0),
                    local_id: LocalId(*id),
                    name: entry.second.clone(),
                });
            }
        }
        entries.sort_by_key(|entry| entry.local_id);
        entries
    }
}

impl MetaFile {
    pub fn load(path: &Path) -> Result<Self, MetaError> {
        let raw = fs::read_to_string(path).map_err(|source| MetaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, MetaError> {
        let quoted = raw
            .lines()
            .map(|line| quote_guid_scalars(line).into_owned())
            .collect::<Vec<_>>()
            .join("\n");
        let deserializer = serde_yaml::Deserializer::from_str(&quoted);
        let meta: Self = serde_path_to_error::deserialize(deserializer).map_err(|error| {
            let field = error.path().to_string();
            MetaError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        })?;
        if meta.guid.trim().is_empty() {
            return Err(MetaError::EmptyGuid {
                path: path.to_path_buf(),
            });
        }
        Ok(meta)
    }

    pub fn guid(&self) -> Guid {
        Guid::new(&self.guid)
    }

    pub fn importer(&self) -> Option<&str> {
        if self.model_importer.is_some() {
            return Some("ModelImporter");
        }
        self.other
            .keys()
            .map(String::as_str)
            .find(|key| key.ends_with("Importer"))
    }
}

/// Companion path for an asset: `Cube.prefab` → `Cube.prefab.meta`.
pub fn meta_path_for(asset: &Path) -> PathBuf {
    let mut raw = asset.as_os_str().to_os_string();
    raw.push(".meta");
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_meta_exposes_recycle_names() {
        let raw = "fileFormatVersion: 2\nguid: 0A1B2C3D4E5F60718293a4b5c6d7e8f9\ntimeCreated: 1500000000\nModelImporter:\n  serializedVersion: 19\n  fileIDToRecycleName:\n    100000: Body\n    400000: Body\n    4300000: Body\n";
        let meta = MetaFile::parse(raw, Path::new("Robot.fbx.meta")).expect("meta");
        assert_eq!(meta.guid(), Guid::new("0a1b2c3d4e5f60718293a4b5c6d7e8f9"));
        assert_eq!(meta.importer(), Some("ModelImporter"));
        let entries = meta.model_importer.expect("importer").recycle_entries();
        let classes = entries.iter().map(|entry| entry.class_id).collect::<Vec<_>>();
        assert_eq!(classes, vec![1, 4, 43]);
        assert!(entries.iter().all(|entry| entry.name == "Body"));
    }

    #[test]
    fn name_table_entries_are_merged() {
        let raw = "guid: 11112222333344445555666677778888\nModelImporter:\n  internalIDToNameTable:\n  - first:\n      43: -2087453485\n    second: Wheel\n";
        let meta = MetaFile::parse(raw, Path::new("Car.fbx.meta")).expect("meta");
        let entries = meta.model_importer.expect("importer").recycle_entries();
        assert_eq!(
            entries,
            vec![RecycleEntry {
                class_id: 43,
                local_id: LocalId(-2_087_453_485),
                name: "Wheel".to_string(),
            }]
        );
    }

    #[test]
    fn numeric_looking_guid_stays_text() {
        let raw = "guid: 12345678901234567890123456789012\nNativeFormatImporter:\n  mainObjectFileID: 100100000\n";
        let meta = MetaFile::parse(raw, Path::new("A.prefab.meta")).expect("meta");
        assert_eq!(meta.guid().as_str(), "12345678901234567890123456789012");
        assert_eq!(meta.importer(), Some("NativeFormatImporter"));
    }

    #[test]
    fn parse_error_names_the_field() {
        let raw = "guid: abc\nModelImporter:\n  fileIDToRecycleName: [1, 2]\n";
        let err = MetaFile::parse(raw, Path::new("Bad.fbx.meta")).expect_err("bad meta");
        match err {
            MetaError::Parse { field, .. } => {
                assert!(field.contains("ModelImporter"), "field path was {field}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn meta_path_appends_suffix() {
        assert_eq!(
            meta_path_for(Path::new("Assets/Cube.prefab")),
            PathBuf::from("Assets/Cube.prefab.meta")
        );
    }
}
