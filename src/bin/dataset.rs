use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use happyhex_data::algorithm::NrSearchRank;
use happyhex_data::config::GeneratorConfig;
use happyhex_data::dataset::{Dataset, DatasetError};
use happyhex_data::generator::generate_training_data_with_progress;
use happyhex_data::record::Format;
use happyhex_data::sample::{self, TrainingSample};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "dataset",
    version,
    about = "Generate, convert and inspect HappyHex training datasets (.txt)"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FileFormat {
    /// `board | queue | options` training samples
    Happyhex,
    /// Plain comma-separated records
    Csv,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate samples by self-play and write them to a file
    Generate {
        /// Output .txt file
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,
        /// Number of samples to generate
        #[arg(short = 'n', long, default_value_t = 1000)]
        count: usize,
        /// JSON file with generator settings; flags below override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long)]
        radius: Option<usize>,
        #[arg(long)]
        queue_size: Option<usize>,
        #[arg(long)]
        significant_choices: Option<usize>,
        #[arg(long)]
        remove_head: Option<f64>,
        #[arg(long)]
        remove_tail: Option<f64>,
        #[arg(long)]
        move_dropout: Option<f64>,
        /// Per game: stop after this many turns
        #[arg(long)]
        max_turns: Option<u32>,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Keep the samples already in the output file and add to them
        #[arg(long)]
        append: bool,
        /// Suppress the progress bar
        #[arg(long)]
        quiet: bool,
    },
    /// Load a dataset file and write it back out in canonical form
    Convert {
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: PathBuf,
        #[arg(short = 'o', long = "out", value_name = "FILE")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = FileFormat::Happyhex)]
        format: FileFormat,
    },
    /// Check that every file parses; exits with status 2 if any does not
    Validate {
        /// A .txt file or a directory scanned recursively for .txt files
        #[arg(short = 'i', long = "input", value_name = "PATH")]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = FileFormat::Happyhex)]
        format: FileFormat,
    },
    /// Print per-file sample statistics
    Stats {
        /// A .txt file or a directory scanned recursively for .txt files
        #[arg(short = 'i', long = "input", value_name = "PATH")]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate {
            out,
            count,
            config,
            radius,
            queue_size,
            significant_choices,
            remove_head,
            remove_tail,
            move_dropout,
            max_turns,
            seed,
            append,
            quiet,
        } => {
            let mut cfg = match &config {
                Some(path) => GeneratorConfig::from_json_path(path)
                    .with_context(|| format!("reading config {}", path.display()))?,
                None => GeneratorConfig::default(),
            };
            if let Some(v) = radius { cfg.engine_radius = v; }
            if let Some(v) = queue_size { cfg.queue_size = v; }
            if let Some(v) = significant_choices { cfg.significant_choices = v; }
            if let Some(v) = remove_head { cfg.remove_head = v; }
            if let Some(v) = remove_tail { cfg.remove_tail = v; }
            if let Some(v) = move_dropout { cfg.move_dropout = v; }
            if max_turns.is_some() { cfg.max_turns = max_turns; }
            cfg.validate()?;

            let mut samples: Vec<TrainingSample> = if append && out.exists() {
                sample::load_training_data(&out).with_context(|| format!("loading {}", out.display()))?
            } else {
                Vec::new()
            };
            let existing = samples.len();

            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let pb = if quiet {
                ProgressBar::hidden()
            } else {
                let pb = ProgressBar::new(count as u64);
                pb.set_style(
                    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} samples | {msg}")?
                        .progress_chars("=>-"),
                );
                pb
            };
            let generated = generate_training_data_with_progress(count, NrSearchRank::new(), &cfg, &mut rng, |p| {
                pb.set_position(p.produced as u64);
                pb.set_message(format!("{} games", p.batches));
            })?;
            pb.finish_and_clear();

            samples.extend(generated);
            sample::save_training_dataset(&samples, &out)?;
            eprintln!(
                "Wrote {} samples ({} new) to {}",
                samples.len(),
                samples.len() - existing,
                out.display()
            );
        }
        Command::Convert { input, out, format } => {
            let rows = match format {
                FileFormat::Happyhex => {
                    let samples = sample::load_training_data(&input)?;
                    sample::save_training_dataset(&samples, &out)?;
                    samples.len()
                }
                FileFormat::Csv => {
                    let ds = Dataset::load(&input, Format::default())?;
                    ds.store(&out)?;
                    ds.len()
                }
            };
            eprintln!("Converted {} records: {} -> {}", rows, input.display(), out.display());
        }
        Command::Validate { input, format } => {
            let files = collect_txt_files(&input)?;
            let results: Vec<(PathBuf, Result<usize, DatasetError>)> = files
                .par_iter()
                .map(|p| (p.clone(), count_records(p, format)))
                .collect();
            let mut invalid = 0usize;
            for (path, res) in &results {
                match res {
                    Ok(n) => eprintln!("OK: {} ({} records)", path.display(), n),
                    Err(e) => {
                        invalid += 1;
                        eprintln!("INVALID: {} ({})", path.display(), e);
                    }
                }
            }
            tracing::info!(files = results.len(), invalid, "validation finished");
            if invalid > 0 {
                std::process::exit(2);
            }
        }
        Command::Stats { input } => {
            let files = collect_txt_files(&input)?;
            let loaded: Vec<(PathBuf, Vec<TrainingSample>)> = files
                .par_iter()
                .map(|p| sample::load_training_data(p).map(|s| (p.clone(), s)))
                .collect::<Result<_, _>>()?;
            let mut total = 0usize;
            for (path, samples) in &loaded {
                let n = samples.len();
                total += n;
                let radii: BTreeSet<usize> = samples.iter().map(|s| s.engine.radius()).collect();
                let mean = |f: fn(&TrainingSample) -> usize| {
                    if n == 0 { 0.0 } else { samples.iter().map(f).sum::<usize>() as f64 / n as f64 }
                };
                println!("file: {}", path.display());
                println!("samples: {}", n);
                println!("radius: {:?}", radii);
                println!("mean_queue: {:.3}", mean(|s| s.queue.len()));
                println!("mean_options: {:.3}", mean(|s| s.options.len()));
                println!("mean_occupied: {:.3}", mean(|s| s.engine.count_occupied()));
            }
            println!("files: {}", loaded.len());
            println!("total_samples: {}", total);
        }
    }
    Ok(())
}

fn count_records(path: &Path, format: FileFormat) -> Result<usize, DatasetError> {
    match format {
        FileFormat::Happyhex => sample::load_training_data(path).map(|s| s.len()),
        FileFormat::Csv => Dataset::load(path, Format::default()).map(|d| d.len()),
    }
}

/// `input` itself when it is a file, else every `*.txt` below it, sorted.
fn collect_txt_files(input: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = Vec::new();
    for e in walkdir::WalkDir::new(input).into_iter().filter_map(Result::ok) {
        if e.file_type().is_file() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    }
    files.sort();
    if files.is_empty() {
        anyhow::bail!("no .txt files found under {}", input.display());
    }
    Ok(files)
}
