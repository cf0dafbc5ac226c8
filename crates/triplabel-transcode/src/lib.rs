//! Triple relabeling for triplabel
//!
//! Streams a tab-separated triple file (`head \t relation \t tail`, one per
//! line) and writes the same triples with every ID replaced by its label.
//!
//! - Head and tail resolve through the entity mapping, the middle field
//!   through the relation mapping.
//! - Unmapped IDs are written as-is and collected into per-file sets.
//! - Lines that do not split into exactly three fields are skipped and
//!   reported; they never abort the run.
//! - Every resolved field is normalized again on the way out, so raw IDs that
//!   contain whitespace still produce a valid three-column row.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use triplabel_mapping::{normalize_label, LabelMapping, MappingKind};

/// Field separator of triple files.
pub const FIELD_SEPARATOR: char = '\t';

/// Malformed lines kept verbatim in [`TranscodeStats`]; the rest are only counted.
pub const MALFORMED_EXAMPLE_LIMIT: usize = 5;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("triple file {} does not exist", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to open triple file {}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output file {}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {} at line {line}", .path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Triples
// ============================================================================

/// One `(head, relation, tail)` row, borrowed from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple<'a> {
    pub head: &'a str,
    pub relation: &'a str,
    pub tail: &'a str,
}

/// Split an already-trimmed line into a triple.
///
/// Returns `None` unless the line has exactly three tab-separated fields.
/// Empty fields are allowed (`"a\t\tc"` is a triple with an empty relation).
pub fn parse_triple_line(line: &str) -> Option<Triple<'_>> {
    let mut fields = line.split(FIELD_SEPARATOR);
    let head = fields.next()?;
    let relation = fields.next()?;
    let tail = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Triple {
        head,
        relation,
        tail,
    })
}

/// A skipped input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    /// 1-based, counting blank lines.
    pub line_number: usize,
    /// Number of tab-separated fields found.
    pub fields: usize,
    /// The trimmed line.
    pub content: String,
}

// ============================================================================
// Reports
// ============================================================================

/// What a single transcode pass saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscodeStats {
    pub processed: usize,
    pub malformed: usize,
    /// The first [`MALFORMED_EXAMPLE_LIMIT`] malformed lines.
    pub malformed_examples: Vec<MalformedLine>,
    pub missing_entities: BTreeSet<String>,
    pub missing_relations: BTreeSet<String>,
}

impl TranscodeStats {
    pub fn missing(&self, kind: MappingKind) -> &BTreeSet<String> {
        match kind {
            MappingKind::Entity => &self.missing_entities,
            MappingKind::Relation => &self.missing_relations,
        }
    }

    /// Up to `limit` unmapped IDs of `kind`, in sorted order.
    pub fn missing_examples(&self, kind: MappingKind, limit: usize) -> Vec<&str> {
        self.missing(kind)
            .iter()
            .take(limit)
            .map(String::as_str)
            .collect()
    }
}

/// [`TranscodeStats`] for one input/output file pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscodeReport {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub stats: TranscodeStats,
}

// ============================================================================
// Transcoding
// ============================================================================

fn resolve_label(mapping: &LabelMapping, id: &str, missing: &mut BTreeSet<String>) -> String {
    let label = match mapping.get(id) {
        Some(label) => label,
        None => {
            if !missing.contains(id) {
                missing.insert(id.to_string());
            }
            id
        }
    };
    // Mapped labels are already normalized; fallback IDs are not.
    normalize_label(label)
}

/// Relabel every triple read from `reader` into `writer`.
///
/// `on_malformed` runs as soon as a malformed line is read, before any later
/// line can fail. `input` and `output` are only used to name the streams in
/// errors.
pub fn transcode<R, W, F>(
    reader: R,
    mut writer: W,
    entities: &LabelMapping,
    relations: &LabelMapping,
    input: &Path,
    output: &Path,
    mut on_malformed: F,
) -> Result<TranscodeStats, TranscodeError>
where
    R: BufRead,
    W: Write,
    F: FnMut(&MalformedLine),
{
    debug_assert_eq!(entities.kind(), MappingKind::Entity);
    debug_assert_eq!(relations.kind(), MappingKind::Relation);

    let write_err = |source| TranscodeError::Write {
        path: output.to_path_buf(),
        source,
    };

    let mut stats = TranscodeStats::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.map_err(|source| TranscodeError::Read {
            path: input.to_path_buf(),
            line: line_number,
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(triple) = parse_triple_line(line) else {
            let malformed = MalformedLine {
                line_number,
                fields: line.split(FIELD_SEPARATOR).count(),
                content: line.to_string(),
            };
            tracing::debug!(
                input = %input.display(),
                line = line_number,
                fields = malformed.fields,
                "skipping malformed triple line"
            );
            on_malformed(&malformed);
            stats.malformed += 1;
            if stats.malformed_examples.len() < MALFORMED_EXAMPLE_LIMIT {
                stats.malformed_examples.push(malformed);
            }
            continue;
        };

        let head = resolve_label(entities, triple.head, &mut stats.missing_entities);
        let relation = resolve_label(relations, triple.relation, &mut stats.missing_relations);
        let tail = resolve_label(entities, triple.tail, &mut stats.missing_entities);

        writeln!(
            writer,
            "{head}{FIELD_SEPARATOR}{relation}{FIELD_SEPARATOR}{tail}"
        )
        .map_err(write_err)?;
        stats.processed += 1;
    }
    writer.flush().map_err(write_err)?;

    Ok(stats)
}

/// Relabel the triple file at `input` into a new file at `output`.
///
/// The input is opened first, so a missing input never creates `output`.
/// On failure any rows already written stay on disk.
pub fn transcode_file<F>(
    input: &Path,
    output: &Path,
    entities: &LabelMapping,
    relations: &LabelMapping,
    on_malformed: F,
) -> Result<TranscodeReport, TranscodeError>
where
    F: FnMut(&MalformedLine),
{
    let _span = tracing::info_span!("transcode", input = %input.display()).entered();

    let in_file = File::open(input).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            TranscodeError::InputNotFound {
                path: input.to_path_buf(),
            }
        } else {
            TranscodeError::OpenInput {
                path: input.to_path_buf(),
                source,
            }
        }
    })?;

    let create_err = |source| TranscodeError::CreateOutput {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(create_err)?;
    }
    let out_file = File::create(output).map_err(create_err)?;

    let stats = transcode(
        BufReader::new(in_file),
        BufWriter::new(out_file),
        entities,
        relations,
        input,
        output,
        on_malformed,
    )?;

    tracing::debug!(
        output = %output.display(),
        processed = stats.processed,
        malformed = stats.malformed,
        missing_entities = stats.missing_entities.len(),
        missing_relations = stats.missing_relations.len(),
        "transcoded triple file"
    );

    Ok(TranscodeReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        stats,
    })
}
