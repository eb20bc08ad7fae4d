//! Command implementations for the hashlearn CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::time::Instant;

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{PipelineConfig, StreamingConfig};
use crate::corpus::{load_directory, read_text};
use crate::error::{HashlearnError, Result};
use crate::ml::linear::{LinearModel, StreamingLinearRegression};
use crate::pipeline::{BatchPipeline, Classifier};
use crate::stream::cancel::CancellationToken;
use crate::stream::runner::StreamingRunner;
use crate::stream::source::IntervalLineSource;

/// Execute a CLI command.
pub fn execute_command(args: HashlearnArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Classify(classify_args) => classify(classify_args.clone(), &args),
        Command::Stream(stream_args) => stream(stream_args.clone(), &args),
    }
}

/// Resolve the pipeline configuration of a training run.
fn pipeline_config(args: &TrainArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(num_features) = args.num_features {
        config.num_features = num_features;
    }
    if let Some(smoothing) = args.smoothing {
        config.smoothing = smoothing;
    }
    if let Some(min_term_count) = args.min_term_count {
        config.analysis.min_term_count = min_term_count;
    }
    if let Some(test_fraction) = args.test_fraction {
        config.test_fraction = test_fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(parallelism) = args.parallelism {
        config.parallelism = parallelism;
    }
    Ok(config)
}

/// Train a classifier on a corpus directory.
fn train(args: TrainArgs, cli_args: &HashlearnArgs) -> Result<()> {
    let config = pipeline_config(&args)?;
    let pipeline = BatchPipeline::new(config)?;

    let start_time = Instant::now();
    let documents = load_directory(&args.corpus_dir)?;
    if cli_args.verbosity() > 1 {
        println!(
            "Loaded {} documents from: {}",
            documents.len(),
            args.corpus_dir.display()
        );
    }

    let output = pipeline.run(documents)?;
    if let Some(path) = &args.model {
        output.classifier.bundle().save(path)?;
    }

    output_result(
        "Classifier trained",
        &TrainingResult {
            model_path: args.model.as_ref().map(|p| p.to_string_lossy().to_string()),
            duration_ms: start_time.elapsed().as_millis() as u64,
            report: output.report,
        },
        cli_args,
    )
}

/// Classify text files with a saved classifier.
fn classify(args: ClassifyArgs, cli_args: &HashlearnArgs) -> Result<()> {
    let classifier = Classifier::load(&args.model)?;

    let mut classifications = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let prediction = classifier.classify(&read_text(file)?)?;
        classifications.push(FileClassification {
            file: file.to_string_lossy().to_string(),
            category: prediction.category,
            probability: prediction.probability,
        });
    }

    output_result("", &ClassificationResults { classifications }, cli_args)
}

/// Resolve the streaming configuration of a run.
fn streaming_config(args: &StreamArgs) -> Result<StreamingConfig> {
    let mut config = match &args.config {
        Some(path) => StreamingConfig::from_file(path)?,
        None => StreamingConfig::default(),
    };
    if let Some(interval_ms) = args.interval_ms {
        config.batch_interval_ms = interval_ms;
    }
    if let Some(step_size) = args.step_size {
        config.step_size = step_size;
    }
    if let Some(iterations) = args.iterations {
        config.num_iterations = iterations;
    }
    if args.intercept {
        config.fit_intercept = true;
    }
    config.validate()?;
    Ok(config)
}

/// The Ctrl-C handler of a streaming run.
fn interrupt_handler(token: CancellationToken) -> impl FnMut() + Send + 'static {
    move || {
        info!("interrupted, stopping after the batch in flight");
        token.cancel();
    }
}

/// Train a linear regression on records read from a file or stdin.
fn stream(args: StreamArgs, cli_args: &HashlearnArgs) -> Result<()> {
    let config = streaming_config(&args)?;

    let regression = match (&args.initial_model, args.dimension) {
        (Some(path), _) => StreamingLinearRegression::from_model(LinearModel::load(path)?, &config)?,
        (None, Some(dimension)) => {
            StreamingLinearRegression::new(vec![0.0; dimension], &config)?
        }
        (None, None) => {
            return Err(HashlearnError::invalid_argument(
                "either a dimension or an initial model is required",
            ));
        }
    };

    let reader: Box<dyn BufRead + Send> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut source =
        IntervalLineSource::spawn(reader, config.batch_interval(), config.queue_capacity)?;

    let mut runner = StreamingRunner::new(regression);
    if let Err(e) = ctrlc::set_handler(interrupt_handler(runner.cancellation_token())) {
        warn!("could not install the interrupt handler: {e}");
    }

    let mut output_error = None;
    let summary = runner.run(&mut source, |report| {
        if output_error.is_none()
            && let Err(e) = output_result("", report, cli_args)
        {
            output_error = Some(e);
        }
    });
    if let Some(e) = output_error {
        return Err(e);
    }

    let model = runner.into_regression().into_model();
    if let Some(path) = &args.model_out {
        model.save(path)?;
    }

    output_result(
        "Streaming finished",
        &StreamResult {
            summary,
            weights: model.weights().to_vec(),
            intercept: model.intercept(),
            model_path: args.model_out.as_ref().map(|p| p.to_string_lossy().to_string()),
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::thread;

    use clap::Parser;

    use super::*;
    use crate::ml::dataset::LabeledVector;
    use crate::stream::source::channel_source;

    #[test]
    fn test_train_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pipeline.json");
        fs::write(&config_path, r#"{"num_features": 4096, "seed": 7}"#).unwrap();

        let args = HashlearnArgs::try_parse_from([
            "hashlearn",
            "train",
            "corpus",
            "--config",
            config_path.to_str().unwrap(),
            "--seed",
            "11",
            "--min-term-count",
            "3",
        ])
        .unwrap();
        let Command::Train(train_args) = args.command else {
            panic!("Expected Train command");
        };

        let config = pipeline_config(&train_args).unwrap();
        assert_eq!(config.num_features, 4096);
        assert_eq!(config.seed, 11);
        assert_eq!(config.analysis.min_term_count, 3);
    }

    #[test]
    fn test_streaming_config_rejects_zero_interval() {
        let args =
            HashlearnArgs::try_parse_from(["hashlearn", "stream", "-d", "2", "--interval-ms", "0"])
                .unwrap();
        let Command::Stream(stream_args) = args.command else {
            panic!("Expected Stream command");
        };
        assert!(streaming_config(&stream_args).is_err());
    }

    #[test]
    fn test_stream_command_writes_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.tsv");
        let model = dir.path().join("model.json");
        fs::write(&input, "1\t1,0\n").unwrap();

        let args = HashlearnArgs::try_parse_from([
            "hashlearn",
            "-q",
            "-f",
            "json",
            "stream",
            "-d",
            "2",
            "-i",
            input.to_str().unwrap(),
            "-o",
            model.to_str().unwrap(),
        ])
        .unwrap();
        execute_command(args).unwrap();

        let trained = LinearModel::load(&model).unwrap();
        assert_eq!(trained.weights(), &[0.1, 0.0]);
    }

    #[test]
    fn test_interrupt_stops_open_stream() {
        let regression =
            StreamingLinearRegression::new(vec![0.0, 0.0], &StreamingConfig::default()).unwrap();
        let mut runner = StreamingRunner::new(regression);
        let mut interrupt = interrupt_handler(runner.cancellation_token());

        let (sender, mut source) = channel_source(1);
        sender
            .send(vec![LabeledVector::from_dense(1.0, &[1.0, 0.0])])
            .unwrap();
        let run = thread::spawn(move || {
            let summary = runner.run(&mut source, |_| {});
            (summary, runner.into_regression().into_model())
        });

        // the sender stays open, so only the interrupt ends the run
        interrupt();
        let (summary, model) = run.join().unwrap();

        assert!(summary.cancelled);
        assert!(summary.batches_received <= 1);
        drop(sender);
        if summary.batches_applied == 1 {
            assert_eq!(model.weights(), &[0.1, 0.0]);
        }
    }
}
