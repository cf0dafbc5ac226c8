//! Run configuration: built-in defaults, an optional JSON file, then flags.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SPLITS: [&str; 3] = ["train", "valid", "test"];
pub const DEFAULT_SUFFIX: &str = "_mapped";
pub const DEFAULT_MISSING_EXAMPLES: usize = 5;

/// One triple file and where its relabeled copy goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPair {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl SplitPair {
    /// `train` + `_mapped` → `train.txt` / `train_mapped.txt`.
    pub fn named(name: &str, suffix: &str) -> Self {
        Self {
            input: PathBuf::from(format!("{name}.txt")),
            output: PathBuf::from(format!("{name}{suffix}.txt")),
        }
    }
}

fn parse_pair(raw: &str) -> Result<SplitPair, String> {
    let (input, output) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected IN=OUT, got `{raw}`"))?;
    if input.is_empty() || output.is_empty() {
        return Err(format!("expected IN=OUT with both paths set, got `{raw}`"));
    }
    Ok(SplitPair {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Base directory for every relative path below.
    pub data_dir: PathBuf,
    pub entities: PathBuf,
    pub relations: PathBuf,
    pub splits: Vec<SplitPair>,
    /// How many unmapped IDs to show per file and kind.
    pub missing_examples: usize,
    /// Optional JSON run report.
    pub report: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            entities: PathBuf::from("entities.json"),
            relations: PathBuf::from("relations.json"),
            splits: DEFAULT_SPLITS
                .iter()
                .map(|name| SplitPair::named(name, DEFAULT_SUFFIX))
                .collect(),
            missing_examples: DEFAULT_MISSING_EXAMPLES,
            report: None,
        }
    }
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Resolve `path` against `data_dir` unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.splits.is_empty() {
            bail!("no triple files configured");
        }
        for split in &self.splits {
            if self.resolve(&split.input) == self.resolve(&split.output) {
                return Err(anyhow!(
                    "output {} would overwrite its own input",
                    self.resolve(&split.output).display()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file (same fields as the built-in defaults).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base directory for relative input/output paths.
    #[arg(short = 'd', long)]
    pub data_dir: Option<PathBuf>,

    /// Entity mapping JSON (default: entities.json).
    #[arg(long)]
    pub entities: Option<PathBuf>,

    /// Relation mapping JSON (default: relations.json).
    #[arg(long)]
    pub relations: Option<PathBuf>,

    /// Split name to relabel, `NAME.txt` → `NAME<suffix>.txt` (repeatable).
    #[arg(long = "split", value_name = "NAME")]
    pub splits: Vec<String>,

    /// Explicit `input=output` file pair (repeatable).
    #[arg(long = "pair", value_name = "IN=OUT", value_parser = parse_pair)]
    pub pairs: Vec<SplitPair>,

    /// Output suffix used with `--split`.
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// Unmapped IDs to show per file.
    #[arg(long)]
    pub missing_examples: Option<usize>,

    /// Write a JSON run report here.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ConfigArgs {
    /// Layer these flags over the config file (or the defaults).
    pub fn into_run_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(entities) = self.entities {
            config.entities = entities;
        }
        if let Some(relations) = self.relations {
            config.relations = relations;
        }
        if !self.splits.is_empty() || !self.pairs.is_empty() {
            config.splits = self
                .splits
                .iter()
                .map(|name| SplitPair::named(name, &self.suffix))
                .chain(self.pairs)
                .collect();
        }
        if let Some(n) = self.missing_examples {
            config.missing_examples = n;
        }
        if self.report.is_some() {
            config.report = self.report;
        }

        config.validate()?;
        Ok(config)
    }
}
