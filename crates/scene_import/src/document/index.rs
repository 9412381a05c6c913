use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::record::Record;
use super::value::LocalId;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record header on line {line}: '{header}'")]
    Header { line: usize, header: String },
    #[error("malformed YAML in record {local_id} (header on line {line}): {source}")]
    Yaml {
        local_id: LocalId,
        line: usize,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("record {local_id} (header on line {line}) does not declare a type tag")]
    MissingTypeTag { local_id: LocalId, line: usize },
    #[error("local id {local_id} is declared more than once")]
    DuplicateLocalId { local_id: LocalId },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    records: Vec<Record>,
    positions: HashMap<LocalId, usize>,
}

impl Document {
    pub fn from_records(records: Vec<Record>) -> Result<Self, DocumentError> {
        let mut positions = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if positions.insert(record.local_id, position).is_some() {
                return Err(DocumentError::DuplicateLocalId {
                    local_id: record.local_id,
                });
            }
        }
        Ok(Self { records, positions })
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let raw = fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    /// Parses the multi-document text format. Every block starts with a
    /// `--- !u!<class> &<local id> [stripped]` header; the class tag and
    /// anchor are not valid YAML for a generic reader, so they are lifted out
    /// of the text before the body is handed to the YAML parser.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut records = Vec::new();
        let mut current: Option<PendingBlock> = None;

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if let Some(rest) = line.strip_prefix("--- ") {
                if let Some(block) = current.take() {
                    records.push(block.finish()?);
                }
                current = Some(PendingBlock {
                    header: parse_header(rest, line_number)?,
                    line: line_number,
                    body: String::new(),
                });
                continue;
            }
            match current.as_mut() {
                Some(block) => {
                    block.body.push_str(&quote_guid_scalars(line));
                    block.body.push('\n');
                }
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('%') {
                        return Err(DocumentError::Header {
                            line: line_number,
                            header: trimmed.to_string(),
                        });
                    }
                }
            }
        }
        if let Some(block) = current.take() {
            records.push(block.finish()?);
        }

        Self::from_records(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, local_id: LocalId) -> Option<&Record> {
        self.positions
            .get(&local_id)
            .and_then(|position| self.records.get(*position))
    }

    pub(crate) fn get_mut(&mut self, local_id: LocalId) -> Option<&mut Record> {
        let position = *self.positions.get(&local_id)?;
        self.records.get_mut(position)
    }

    pub fn position(&self, local_id: LocalId) -> Option<usize> {
        self.positions.get(&local_id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    class_id: u32,
    local_id: LocalId,
    stripped: bool,
}

struct PendingBlock {
    header: BlockHeader,
    line: usize,
    body: String,
}

impl PendingBlock {
    fn finish(self) -> Result<Record, DocumentError> {
        let local_id = self.header.local_id;
        let missing_tag = || DocumentError::MissingTypeTag {
            local_id,
            line: self.line,
        };

        if self.body.trim().is_empty() {
            return Err(missing_tag());
        }
        let parsed =
            serde_yaml::from_str::<Value>(&self.body).map_err(|source| DocumentError::Yaml {
                local_id,
                line: self.line,
                source,
            })?;
        let Value::Object(top_level) = parsed else {
            return Err(missing_tag());
        };
        if top_level.len() > 1 {
            debug!(
                local_id = local_id.0,
                key_count = top_level.len(),
                "record_extra_top_level_keys_ignored"
            );
        }
        let Some((type_tag, body)) = top_level.into_iter().next() else {
            return Err(missing_tag());
        };
        let fields = match body {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };

        Ok(Record {
            type_tag,
            class_id: self.header.class_id,
            local_id,
            stripped: self.header.stripped,
            fields,
        })
    }
}

fn parse_header(rest: &str, line: usize) -> Result<BlockHeader, DocumentError> {
    let malformed = || DocumentError::Header {
        line,
        header: format!("--- {rest}"),
    };
    let mut tokens = rest.split_whitespace();
    let class_id = tokens
        .next()
        .and_then(|token| token.strip_prefix("!u!"))
        .and_then(|digits| digits.parse::<u32>().ok())
        .ok_or_else(malformed)?;
    let local_id = tokens
        .next()
        .and_then(|token| token.strip_prefix('&'))
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(malformed)?;
    let stripped = match tokens.next() {
        None => false,
        Some("stripped") => true,
        Some(_) => return Err(malformed()),
    };
    if tokens.next().is_some() {
        return Err(malformed());
    }

    Ok(BlockHeader {
        class_id,
        local_id: LocalId(local_id),
        stripped,
    })
}

/// Guids such as `0000000000000000e000000000000000` read as floats under the
/// YAML core schema, so every `guid:` scalar is quoted before parsing.
pub(crate) fn quote_guid_scalars(line: &str) -> Cow<'_, str> {
    const KEY: &str = "guid: ";
    if !line.contains(KEY) {
        return Cow::Borrowed(line);
    }

    let mut quoted = String::with_capacity(line.len() + 8);
    let mut rest = line;
    while let Some(position) = rest.find(KEY) {
        let (head, tail) = rest.split_at(position + KEY.len());
        quoted.push_str(head);
        let end = tail
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(tail.len());
        if end > 0 {
            quoted.push('"');
            quoted.push_str(&tail[..end]);
            quoted.push('"');
        }
        rest = &tail[end..];
    }
    quoted.push_str(rest);
    Cow::Owned(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Guid, RecordKind};
    use crate::math::Vec3;

    const SAMPLE: &str = r#"%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1 &100
GameObject:
  m_Name: Cube
  m_IsActive: 1
  m_Component:
  - component: {fileID: 400}
  - component: {fileID: 3300}
--- !u!4 &400
Transform:
  m_GameObject: {fileID: 100}
  m_LocalPosition: {x: 1, y: 2, z: 3}
  m_Children: []
--- !u!33 &3300
MeshFilter:
  m_GameObject: {fileID: 100}
  m_Mesh: {fileID: 10202, guid: 0000000000000000e000000000000000, type: 0}
--- !u!4 &900 stripped
Transform:
  m_PrefabParentObject: {fileID: 4000, guid: 9d6d3eb0aeb78472982f0dee59c87319, type: 2}
  m_PrefabInternal: {fileID: 1700}
"#;

    #[test]
    fn records_keep_file_order_and_index() {
        let document = Document::parse(SAMPLE).expect("parse");
        let ids = document
            .records()
            .iter()
            .map(|record| record.local_id.0)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![100, 400, 3300, 900]);
        assert_eq!(document.position(LocalId(3300)), Some(2));
        assert_eq!(
            document.get(LocalId(400)).map(Record::kind),
            Some(RecordKind::Transform)
        );
    }

    #[test]
    fn header_class_and_stripped_marker_are_kept() {
        let document = Document::parse(SAMPLE).expect("parse");
        let stub = document.get(LocalId(900)).expect("stub");
        assert!(stub.stripped);
        assert_eq!(stub.class_id, 4);
        assert!(!document.get(LocalId(400)).expect("transform").stripped);
    }

    #[test]
    fn float_like_guids_stay_text() {
        let document = Document::parse(SAMPLE).expect("parse");
        let mesh = document.get(LocalId(3300)).expect("filter").reference("m_Mesh");
        assert_eq!(mesh.guid, Some(Guid::builtin_meshes()));
        assert_eq!(mesh.local_id, LocalId(10202));
    }

    #[test]
    fn field_values_are_reachable() {
        let document = Document::parse(SAMPLE).expect("parse");
        let transform = document.get(LocalId(400)).expect("transform");
        let position = transform.vec3_or("m_LocalPosition", Vec3::ZERO);
        assert!((position.z - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn duplicate_local_ids_are_rejected() {
        let text = "--- !u!1 &5\nGameObject:\n  m_Name: A\n--- !u!1 &5\nGameObject:\n  m_Name: B\n";
        let err = Document::parse(text).expect_err("duplicate");
        assert!(matches!(
            err,
            DocumentError::DuplicateLocalId {
                local_id: LocalId(5)
            }
        ));
    }

    #[test]
    fn malformed_header_reports_line() {
        let text = "--- !u!1 &5\nGameObject:\n  m_Name: A\n--- !x!1 5\nGameObject: {}\n";
        let err = Document::parse(text).expect_err("header");
        assert!(matches!(err, DocumentError::Header { line: 4, .. }));
    }

    #[test]
    fn empty_block_has_no_type_tag() {
        let err = Document::parse("--- !u!1 &5\n\n").expect_err("empty");
        assert!(matches!(err, DocumentError::MissingTypeTag { .. }));
    }

    #[test]
    fn first_top_level_key_is_the_type_tag() {
        let text = "--- !u!114 &8\nMonoBehaviour:\n  m_Enabled: 1\nExtra:\n  a: 1\n";
        let document = Document::parse(text).expect("parse");
        assert_eq!(document.records()[0].type_tag, "MonoBehaviour");
    }

    #[test]
    fn guid_quoting_leaves_quoted_values_alone() {
        assert_eq!(
            quote_guid_scalars("  m_Script: {fileID: 1, guid: \"abc\", type: 3}"),
            "  m_Script: {fileID: 1, guid: \"abc\", type: 3}"
        );
        assert_eq!(
            quote_guid_scalars("guid: 0123e5"),
            "guid: \"0123e5\""
        );
    }
}
