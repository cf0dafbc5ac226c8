//! Console progress lines and the optional JSON run report.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use triplabel_mapping::{LabelMapping, MappingKind};
use triplabel_transcode::{MalformedLine, TranscodeReport};

fn count_noun(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 {
        one
    } else {
        many
    }
}

pub fn print_loaded(path: &Path, mapping: &LabelMapping) {
    println!(
        "{} {} mapping {}: {} {}",
        "Loaded".green().bold(),
        mapping.kind(),
        path.display(),
        mapping.len(),
        mapping.kind().noun(mapping.len())
    );
}

/// Printed while the file is still being read.
pub fn print_malformed(input: &Path, bad: &MalformedLine) {
    println!(
        "{} triple file {} line {} is malformed ({} fields), skipped: {}",
        "warning:".yellow().bold(),
        input.display(),
        bad.line_number,
        bad.fields,
        bad.content
    );
}

pub fn print_transcoded(report: &TranscodeReport, missing_examples: usize) {
    let stats = &report.stats;
    println!(
        "{} {}: {} {} → {}",
        "Processed".green().bold(),
        report.input.display(),
        stats.processed,
        count_noun(stats.processed, "triple", "triples"),
        report.output.display()
    );
    if stats.malformed > 0 {
        println!(
            "  {} {} malformed {} skipped",
            "→".yellow(),
            stats.malformed,
            count_noun(stats.malformed, "line", "lines")
        );
    }
    for kind in [MappingKind::Entity, MappingKind::Relation] {
        let missing = stats.missing(kind);
        if missing.is_empty() {
            continue;
        }
        println!(
            "  {} {} {} without a mapping (e.g. {:?})",
            "→".yellow(),
            missing.len(),
            kind.noun(missing.len()),
            stats.missing_examples(kind, missing_examples)
        );
    }
}

#[derive(Debug, Serialize)]
pub struct MappingSummary {
    pub path: PathBuf,
    pub entries: usize,
}

impl MappingSummary {
    pub fn new(path: &Path, mapping: &LabelMapping) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: mapping.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub entities: MappingSummary,
    pub relations: MappingSummary,
    pub files: Vec<TranscodeReport>,
}

impl RunReport {
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write run report {}", path.display()))?;
        println!("  {} {}", "→".cyan(), path.display());
        Ok(())
    }
}
