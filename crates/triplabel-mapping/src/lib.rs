//! Label mappings for triplabel
//!
//! Loads the `entities.json` / `relations.json` lookup tables that turn opaque
//! knowledge-graph IDs into display labels:
//!
//! ```text
//! { "Q60": { "label": "New York City" }, "Q1": {} }
//!        │
//!        ▼
//! Q60 → New/York/City
//! Q1  → Q1
//! ```
//!
//! - Every top-level key is an ID; its value is a descriptor object.
//! - The descriptor's `"label"` string is used when present, the ID otherwise.
//! - Labels are normalized once here (whitespace → `/`) so they can be written
//!   into tab-separated files without further escaping.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Replacement for every whitespace character inside a label.
pub const LABEL_SEPARATOR: char = '/';

/// Descriptor field holding the display label.
pub const LABEL_FIELD: &str = "label";

// ============================================================================
// Kinds
// ============================================================================

/// Which side of a triple a mapping resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Entity,
    Relation,
}

impl MappingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MappingKind::Entity => "entity",
            MappingKind::Relation => "relation",
        }
    }

    /// Plural noun used in progress messages ("loaded 12 entities").
    pub fn plural(self) -> &'static str {
        match self {
            MappingKind::Entity => "entities",
            MappingKind::Relation => "relations",
        }
    }

    /// `"entity"` for a count of one, `"entities"` otherwise.
    pub fn noun(self, count: usize) -> &'static str {
        if count == 1 {
            self.as_str()
        } else {
            self.plural()
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A mapping document that parsed as JSON but does not have the
/// `{ id: { "label": string? } }` shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("top-level value must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("descriptor for `{id}` must be a JSON object, found {found}")]
    DescriptorNotObject { id: String, found: &'static str },
    #[error("`label` of `{id}` must be a string, found {found}")]
    LabelNotString { id: String, found: &'static str },
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("{kind} mapping file {} does not exist", .path.display())]
    NotFound { kind: MappingKind, path: PathBuf },

    #[error("{kind} mapping file {} is not valid JSON", .path.display())]
    InvalidJson {
        kind: MappingKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} mapping file {} has an unexpected shape", .path.display())]
    InvalidShape {
        kind: MappingKind,
        path: PathBuf,
        #[source]
        source: ShapeError,
    },

    #[error("failed to read {kind} mapping file {}", .path.display())]
    Io {
        kind: MappingKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MappingError {
    /// The mapping file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            MappingError::NotFound { path, .. }
            | MappingError::InvalidJson { path, .. }
            | MappingError::InvalidShape { path, .. }
            | MappingError::Io { path, .. } => path,
        }
    }
}

// ============================================================================
// Mapping
// ============================================================================

/// Read-only ID → label table for one [`MappingKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    kind: MappingKind,
    labels: HashMap<String, String>,
}

impl LabelMapping {
    pub fn new(kind: MappingKind) -> Self {
        Self {
            kind,
            labels: HashMap::new(),
        }
    }

    /// Build a mapping from raw `(id, label)` pairs, normalizing each label.
    pub fn from_pairs<I, K, V>(kind: MappingKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let labels = pairs
            .into_iter()
            .map(|(id, label)| (id.into(), normalize_label(label.as_ref())))
            .collect();
        Self { kind, labels }
    }

    pub fn kind(&self) -> MappingKind {
        self.kind
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.labels.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Replace every whitespace character with [`LABEL_SEPARATOR`].
///
/// Runs are not collapsed: `"a  b"` becomes `"a//b"`. Idempotent.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_whitespace() { LABEL_SEPARATOR } else { c })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract a mapping from an already-parsed JSON document.
pub fn mapping_from_value(value: &Value, kind: MappingKind) -> Result<LabelMapping, ShapeError> {
    let Value::Object(entries) = value else {
        return Err(ShapeError::NotAnObject {
            found: json_type_name(value),
        });
    };

    let mut labels = HashMap::with_capacity(entries.len());
    for (id, descriptor) in entries {
        let Value::Object(fields) = descriptor else {
            return Err(ShapeError::DescriptorNotObject {
                id: id.clone(),
                found: json_type_name(descriptor),
            });
        };
        let label = match fields.get(LABEL_FIELD) {
            None => id.as_str(),
            Some(Value::String(label)) => label.as_str(),
            Some(other) => {
                return Err(ShapeError::LabelNotString {
                    id: id.clone(),
                    found: json_type_name(other),
                })
            }
        };
        labels.insert(id.clone(), normalize_label(label));
    }

    Ok(LabelMapping { kind, labels })
}

/// Parse a mapping from JSON text. `path` is only used for error reporting.
pub fn parse_label_mapping(
    text: &str,
    kind: MappingKind,
    path: &Path,
) -> Result<LabelMapping, MappingError> {
    let value: Value = serde_json::from_str(text).map_err(|source| MappingError::InvalidJson {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    mapping_from_value(&value, kind).map_err(|source| MappingError::InvalidShape {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Load an entity or relation mapping from a JSON file.
pub fn load_label_mapping(path: &Path, kind: MappingKind) -> Result<LabelMapping, MappingError> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            MappingError::NotFound {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            MappingError::Io {
                kind,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mapping = parse_label_mapping(&text, kind, path)?;
    tracing::debug!(
        path = %path.display(),
        kind = %kind,
        entries = mapping.len(),
        "loaded label mapping"
    );
    Ok(mapping)
}
