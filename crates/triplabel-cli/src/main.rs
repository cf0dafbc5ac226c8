//! triplabel CLI
//!
//! Relabels knowledge-graph triple files:
//! - loads `entities.json` and `relations.json` (ID → `{ "label": ... }`)
//! - rewrites each `head \t relation \t tail` file with labels in place of IDs
//! - reports malformed lines and IDs missing from either mapping
//!
//! Progress, warnings and the fatal error line all go to stdout; tracing
//! logs go to stderr. Any fatal error (missing file, invalid JSON, I/O
//! failure) stops the run with exit code 1.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use triplabel_mapping::{load_label_mapping, MappingKind};
use triplabel_transcode::transcode_file;

mod config;
mod report;

use config::ConfigArgs;
use report::{MappingSummary, RunReport};

#[derive(Parser)]
#[command(name = "triplabel")]
#[command(
    author,
    version,
    about = "Replace entity/relation IDs in triple files with their labels"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// More log output on stderr (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.into_run_config()?;
    tracing::info!(?config, "starting run");

    let entities_path = config.resolve(&config.entities);
    let entities = load_label_mapping(&entities_path, MappingKind::Entity)?;
    report::print_loaded(&entities_path, &entities);

    let relations_path = config.resolve(&config.relations);
    let relations = load_label_mapping(&relations_path, MappingKind::Relation)?;
    report::print_loaded(&relations_path, &relations);

    let mut files = Vec::with_capacity(config.splits.len());
    for split in &config.splits {
        let input = config.resolve(&split.input);
        let output = config.resolve(&split.output);
        let transcoded = transcode_file(&input, &output, &entities, &relations, |bad| {
            report::print_malformed(&input, bad)
        })?;
        report::print_transcoded(&transcoded, config.missing_examples);
        files.push(transcoded);
    }

    if let Some(path) = &config.report {
        let run_report = RunReport {
            entities: MappingSummary::new(&entities_path, &entities),
            relations: MappingSummary::new(&relations_path, &relations),
            files,
        };
        run_report.write(&config.resolve(path))?;
    }

    println!("\n{}", "All files processed.".green().bold());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
