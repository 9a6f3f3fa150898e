pub mod output;

use crate::bio::{load_sequence, Chunker};
use crate::core::config::{load_config, save_config, to_toml, Config};
use crate::core::pipeline::{Pipeline, RunSummary};
use crate::output::{output_file_name, write_summary, ResultWriter, SummaryDocument};
use crate::remote::{NcbiJobClient, PollPolicy};
use crate::BlastScanError;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "blastscan",
    version,
    about = "Screen a sequence against NCBI BLAST in fixed-size chunks",
    long_about = "blastscan splits a query sequence into chunks, submits each chunk to the \
                  NCBI BLAST URL API, waits for the job, and records for every 20-residue \
                  unit whether its chunk produced a near-identical, high-scoring hit."
)]
pub struct Cli {
    /// Query sequence file (FASTA-style, single record)
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Residues per submitted chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Residues kept from the input before chunking
    #[arg(long = "max-length")]
    pub max_length: Option<usize>,

    /// BLAST database to search
    #[arg(long)]
    pub database: Option<String>,

    /// BLAST program to run
    #[arg(long)]
    pub program: Option<String>,

    /// BLAST URL API endpoint
    #[arg(long, env = "BLASTSCAN_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Seconds between status checks while a job is waiting
    #[arg(long, value_name = "SECS")]
    pub poll_interval: Option<u64>,

    /// Give up on a job after this many status checks
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Directory for the results file
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also write a JSON summary with per-chunk scores
    #[arg(long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// Keep every raw XML report in this directory
    #[arg(long, value_name = "DIR")]
    pub keep_reports: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Suppress progress and the closing summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides.
    pub fn effective_config(&self) -> Result<Config, BlastScanError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if let Some(chunk_size) = self.chunk_size {
            config.sequence.chunk_size = chunk_size;
        }
        if let Some(max_length) = self.max_length {
            config.sequence.max_sequence_length = max_length;
        }
        if let Some(database) = &self.database {
            config.remote.database = database.clone();
        }
        if let Some(program) = &self.program {
            config.remote.program = program.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.remote.endpoint = endpoint.clone();
        }
        if let Some(interval) = self.poll_interval {
            config.polling.interval_secs = interval;
        }
        if let Some(max_polls) = self.max_polls {
            config.polling.max_polls = max_polls;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let started = Local::now();

    if cli.print_config || cli.save_config.is_some() {
        let config = cli.effective_config()?;
        if let Some(path) = &cli.save_config {
            save_config(path, &config)?;
            info!("Configuration written to {}", path.display());
        }
        if cli.print_config {
            print!("{}", to_toml(&config)?);
        }
        return Ok(());
    }

    let input = cli.input.as_ref().ok_or_else(|| {
        BlastScanError::InvalidInput(
            "No file path provided. Please pass the file path as an argument.".to_string(),
        )
    })?;
    let config = cli.effective_config()?;

    let sequence = load_sequence(input, config.sequence.max_sequence_length)?;
    info!("Loaded {} ({} residues)", sequence.header(), sequence.len());
    let chunker = Chunker::new(config.sequence.chunk_size)?;
    let client = NcbiJobClient::new(&config.remote)?;
    info!(
        "Searching {} with {} via {}",
        config.remote.database,
        config.remote.program,
        client.endpoint()
    );

    let mut pipeline = Pipeline::new(client, chunker, PollPolicy::from(&config.polling));
    if let Some(dir) = &cli.keep_reports {
        pipeline = pipeline.with_report_dir(dir.clone());
    }
    if !cli.quiet {
        pipeline = pipeline.with_progress(chunk_progress_bar());
    }

    let results = pipeline.run(&sequence);

    std::fs::create_dir_all(&config.output.directory)?;
    let output_path = config.output.directory.join(output_file_name(&started));
    let mut writer = ResultWriter::new(config.output.display_width)?;
    let rows = writer.write_file(&output_path, &results)?;

    if let Some(summary_path) = &cli.summary {
        let document = SummaryDocument::new(started, output_path.clone(), &results);
        write_summary(summary_path, &document)?;
    }

    if !cli.quiet {
        let summary = RunSummary::from_results(&results);
        output::run_summary(&summary, rows);
        for result in results.iter().filter(|r| r.is_skipped()) {
            output::warning(&format!("Failed to submit or resolve chunk {}", result.index));
        }
    }

    println!("{}", output_path.display());
    Ok(())
}

fn chunk_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
