use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use viscensus::config::Config;
use viscensus::record::VisualizationRecord;
use viscensus::report::{diff_counts, exceeds_legacy_limit, legacy_counts_by_app, legacy_total};
use viscensus::sink::{JsonFileSink, RecordSink, read_records};
use viscensus::walker::CorpusWalker;

#[derive(Parser)]
#[command(name = "viscensus", version, about = "Census of Kibana visualizations")]
struct Cli {
    /// Configuration file (JSON).
    #[arg(long, short, default_value = "")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect visualization records and write them to the output file.
    Collect {
        #[command(flatten)]
        source: SourceArgs,

        /// Result file to write.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Fail when the legacy visualization count exceeds the limit.
    CheckLegacy {
        #[command(flatten)]
        source: SourceArgs,

        /// Read records from a result file instead of collecting.
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Compare per-app legacy counts of two result files.
    Diff {
        #[arg(long)]
        before: PathBuf,

        #[arg(long)]
        after: PathBuf,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Integrations checkout root.
    #[arg(long)]
    integrations: Option<PathBuf>,

    /// Beats checkout root.
    #[arg(long)]
    beats: Option<PathBuf>,

    /// Skip git provenance lookups.
    #[arg(long)]
    no_provenance: bool,

    /// Worker threads (0 = auto).
    #[arg(long)]
    workers: Option<usize>,
}

impl SourceArgs {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.integrations {
            config.integrations_dir = dir;
        }
        if let Some(dir) = self.beats {
            config.beats_dir = Some(dir);
        }
        if self.no_provenance {
            config.provenance = false;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Command::Collect { source, output } => {
            source.apply(&mut config);
            if let Some(output) = output {
                config.output_path = output;
            }
            let records = collect(config.clone())?;
            JsonFileSink::new(&config.output_path).write(&records)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckLegacy {
            source,
            input,
            limit,
        } => {
            source.apply(&mut config);
            let limit = limit.unwrap_or(config.legacy_limit);
            let records = match input {
                Some(path) => read_records(&path)?,
                None => collect(config)?,
            };

            let total = legacy_total(&records);
            if exceeds_legacy_limit(&records, limit) {
                warn!("{total} legacy visualizations exceed the limit of {limit}");
                for (app, count) in legacy_counts_by_app(&records) {
                    println!("{app}\t{count}");
                }
                return Ok(ExitCode::FAILURE);
            }
            info!("{total} legacy visualizations, limit {limit}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Diff { before, after } => {
            let before = legacy_counts_by_app(&read_records(&before)?);
            let after = legacy_counts_by_app(&read_records(&after)?);
            let diffs = diff_counts(&before, &after);
            println!(
                "{}",
                serde_json::to_string_pretty(&diffs).context("failed to serialize diff")?
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn collect(config: Config) -> Result<Vec<VisualizationRecord>> {
    config.validate()?;
    let walker = CorpusWalker::from_config(config)?;
    Ok(walker.census())
}
