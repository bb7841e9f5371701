//! Train the tracking-failure classifier from a CSV file of detections.
//!
//! Usage:
//!   cargo run --release --bin train_classifier -- <csv> [--out DIR] [--trees N] [--custom] [-v|-q]
//!
//! Without `--custom` the rows are split 80/20, the classifier is trained on
//! the train rows and scored on the held-out rows. With `--custom` it is
//! trained on every row. Both modes add the occlusion column first.

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use boxboost::data::io::load_csv;
use boxboost::model::write_json;
use boxboost::training::Verbosity;
use boxboost::{
    augment_with_occlusion, train_from_csv, train_on_table, ClassifierConfig, Parallelism, PipelineOptions,
    TrainingArtifacts,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    csv: PathBuf,
    out: Option<PathBuf>,
    trees: u32,
    custom: bool,
    verbosity: Verbosity,
}

fn print_help() {
    println!(
        "Train the tracking-failure classifier\n\n\
USAGE:\n  train_classifier <csv> [OPTIONS]\n\n\
OPTIONS:\n\
  --out <DIR>     Write model.json and training_features.json into DIR\n\
  --trees <N>     Number of boosting rounds (default: 100)\n\
  --custom        Train on every row without a held-out split\n\
  -v              Log every boosting round\n\
  -q              Only log warnings\n\
  --help          Show this message\n\n\
RUST_LOG overrides -v and -q."
    );
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut csv = None;
    let mut out = None;
    let mut trees = 100u32;
    let mut custom = false;
    let mut verbosity = Verbosity::Info;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--out" => out = Some(PathBuf::from(it.next().ok_or("--out requires a directory")?)),
            "--trees" => {
                let v = it.next().ok_or("--trees requires a value")?;
                trees = v.parse().map_err(|_| format!("invalid --trees value: {v}"))?;
            }
            "--custom" => custom = true,
            "-v" => verbosity = Verbosity::Debug,
            "-q" => verbosity = Verbosity::Warning,
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            other => {
                if csv.replace(PathBuf::from(other)).is_some() {
                    return Err("expected a single CSV path".into());
                }
            }
        }
    }

    let csv = csv.ok_or("missing CSV path (see --help)")?;
    Ok(Some(Args { csv, out, trees, custom, verbosity }))
}

fn init_logging(verbosity: Verbosity) {
    let default_level = match verbosity {
        Verbosity::Silent | Verbosity::Warning => "warn",
        Verbosity::Info => "info",
        Verbosity::Debug => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn save(artifacts: &TrainingArtifacts, dir: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    write_json(&artifacts.model, BufWriter::new(File::create(dir.join("model.json"))?))?;
    write_json(
        &artifacts.training_features,
        BufWriter::new(File::create(dir.join("training_features.json"))?),
    )?;
    tracing::info!(dir = %dir.display(), "wrote artifacts");
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = ClassifierConfig::builder()
        .n_trees(args.trees)
        .verbosity(args.verbosity)
        .build()?;

    let artifacts = if args.custom {
        let options = PipelineOptions::default();
        let table = load_csv(&args.csv, &options.csv)?;
        let table = augment_with_occlusion(&table, Parallelism::from_threads(config.thread_count()))?;
        train_on_table(&table, &config)?
    } else {
        let options = PipelineOptions { config, ..Default::default() };
        let outcome = train_from_csv(&args.csv, &options)?;
        println!("{}", outcome.report);
        outcome.artifacts
    };

    println!("Feature importance (split counts):");
    for (name, count) in artifacts.model.ranked_features() {
        println!("  {name:<32} {count}");
    }

    if let Some(dir) = &args.out {
        save(&artifacts, dir)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(args.verbosity);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
