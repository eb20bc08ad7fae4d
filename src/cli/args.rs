//! Command line argument parsing for the hashlearn CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Hashlearn - hashed-feature text classification and streaming regression
#[derive(Parser, Debug, Clone)]
#[command(name = "hashlearn")]
#[command(about = "Text classification and streaming regression over hashed sparse features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct HashlearnArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl HashlearnArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a Naive Bayes classifier on a labeled corpus directory
    Train(TrainArgs),

    /// Classify text files with a trained classifier
    Classify(ClassifyArgs),

    /// Train a linear regression on a stream of labeled records
    Stream(StreamArgs),
}

/// Arguments for training a classifier
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Corpus root laid out as <split>/<category>/<file> or <category>/<file>
    #[arg(value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Where to write the trained classifier
    #[arg(short, long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of hashed features
    #[arg(long, value_name = "N")]
    pub num_features: Option<usize>,

    /// Additive smoothing of the Naive Bayes model
    #[arg(long, value_name = "LAMBDA")]
    pub smoothing: Option<f64>,

    /// Terms seen fewer times than this in the training corpus are dropped
    #[arg(long, value_name = "COUNT")]
    pub min_term_count: Option<usize>,

    /// Share of documents held out when the corpus names no splits
    #[arg(long, value_name = "FRACTION")]
    pub test_fraction: Option<f64>,

    /// Seed of the random split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads
    #[arg(short = 'j', long, value_name = "THREADS")]
    pub parallelism: Option<usize>,
}

/// Arguments for classifying documents
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Trained classifier file
    #[arg(short, long, value_name = "FILE")]
    pub model: PathBuf,

    /// Text files to classify
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for streaming regression
#[derive(Parser, Debug, Clone)]
pub struct StreamArgs {
    /// Number of features of every record
    #[arg(short, long, value_name = "D", required_unless_present = "initial_model")]
    pub dimension: Option<usize>,

    /// Continue from a saved model instead of zero weights
    #[arg(long, value_name = "FILE", conflicts_with = "dimension")]
    pub initial_model: Option<PathBuf>,

    /// Record file (`label<TAB>x1,x2,...` per line); stdin when absent
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Streaming configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Batch window in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// SGD step size
    #[arg(long, value_name = "STEP")]
    pub step_size: Option<f64>,

    /// Gradient passes over each batch
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Learn an intercept
    #[arg(long)]
    pub intercept: bool,

    /// Where to write the final model
    #[arg(short = 'o', long, value_name = "FILE")]
    pub model_out: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
