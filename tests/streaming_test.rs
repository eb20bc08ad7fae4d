use std::io::Cursor;
use std::thread;
use std::time::Duration;

use hashlearn::config::StreamingConfig;
use hashlearn::error::HashlearnError;
use hashlearn::feature::sparse::SparseVector;
use hashlearn::ml::dataset::LabeledVector;
use hashlearn::ml::linear::{ModelState, StreamingLinearRegression};
use hashlearn::stream::runner::{BatchStatus, StreamingRunner};
use hashlearn::stream::source::{IntervalLineSource, channel_source};

fn regression(weights: Vec<f64>) -> StreamingLinearRegression {
    StreamingLinearRegression::new(weights, &StreamingConfig::default()).unwrap()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-12, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_single_observation_update() {
    let mut model = regression(vec![0.0, 0.0]);
    assert_eq!(model.state(), ModelState::Uninitialized);

    model.update(&[LabeledVector::from_dense(1.0, &[1.0, 0.0])]).unwrap();

    assert_close(model.model().weights(), &[0.1, 0.0]);
    assert_eq!(model.state(), ModelState::Trained);
}

#[test]
fn test_batch_order_matters() {
    let a = vec![LabeledVector::from_dense(1.0, &[1.0, 0.0])];
    let b = vec![LabeledVector::from_dense(2.0, &[1.0, 1.0])];

    let mut ab = regression(vec![0.0, 0.0]);
    ab.update(&a).unwrap();
    ab.update(&b).unwrap();

    let mut ba = regression(vec![0.0, 0.0]);
    ba.update(&b).unwrap();
    ba.update(&a).unwrap();

    // a then b: [0.1, 0] -> residual 1.9 -> [0.29, 0.19]
    assert_close(ab.model().weights(), &[0.29, 0.19]);
    // b then a: [0.2, 0.2] -> residual 0.8 -> [0.28, 0.2]
    assert_close(ba.model().weights(), &[0.28, 0.2]);
}

#[test]
fn test_dimension_mismatch_leaves_model_unchanged() {
    let mut model = regression(vec![0.5, 0.5]);
    let wrong = LabeledVector::new(1.0, SparseVector::from_dense(&[1.0, 2.0, 3.0]));

    let result = model.update(&[LabeledVector::from_dense(1.0, &[1.0, 0.0]), wrong]);

    assert!(matches!(result, Err(HashlearnError::DimensionMismatch(_))));
    assert_eq!(model.model().weights(), &[0.5, 0.5]);
    assert_eq!(model.batches_applied(), 0);
}

#[test]
fn test_runner_over_channel_publishes_snapshots() {
    let mut runner = StreamingRunner::new(regression(vec![0.0, 0.0]));
    let snapshots = runner.shared_model();
    let (sender, mut source) = channel_source(2);

    let producer = thread::spawn(move || {
        sender
            .send(vec![LabeledVector::from_dense(1.0, &[1.0, 0.0])])
            .unwrap();
        sender
            .send(vec![LabeledVector::new(
                1.0,
                SparseVector::from_dense(&[1.0]),
            )])
            .unwrap();
        sender.send(Vec::new()).unwrap();
    });

    let mut statuses = Vec::new();
    let summary = runner.run(&mut source, |report| statuses.push(report.status));
    producer.join().unwrap();

    assert_eq!(
        statuses,
        vec![BatchStatus::Applied, BatchStatus::Rejected, BatchStatus::Empty]
    );
    assert_eq!(summary.batches_received, 3);
    assert_eq!(summary.batches_applied, 1);
    assert_eq!(summary.batches_rejected, 1);
    assert_eq!(summary.observations_applied, 1);
    assert!(!summary.cancelled);
    assert_close(snapshots.snapshot().weights(), &[0.1, 0.0]);
}

#[test]
fn test_cancellation_stops_a_waiting_runner() {
    let mut runner = StreamingRunner::new(regression(vec![0.0]));
    let token = runner.cancellation_token();
    let (sender, mut source) = channel_source(1);

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let summary = runner.run(&mut source, |_| {});
    canceller.join().unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.batches_received, 0);
    drop(source);
    assert!(sender.send(Vec::new()).is_err());
}

#[test]
fn test_interval_source_feeds_runner() {
    let input = Cursor::new("1\t1,0\n0.5\t0,1\n");
    let mut source = IntervalLineSource::spawn(input, Duration::from_secs(60), 16).unwrap();
    let mut runner = StreamingRunner::new(regression(vec![0.0, 0.0]));

    let summary = runner.run(&mut source, |_| {});

    assert_eq!(summary.batches_applied, 1);
    assert_eq!(summary.observations_applied, 2);
    // each record steps with the step size divided by the batch size
    assert_close(runner.regression().model().weights(), &[0.05, 0.025]);
}

#[test]
fn test_malformed_window_is_skipped() {
    let input = Cursor::new("1\t1\n2\tnot-a-number\n");
    let mut source = IntervalLineSource::spawn(input, Duration::from_secs(60), 16).unwrap();
    let mut runner = StreamingRunner::new(regression(vec![0.0]));

    let summary = runner.run(&mut source, |report| {
        assert_eq!(report.status, BatchStatus::Rejected);
        assert!(report.error.as_deref().unwrap_or("").contains("line 2"));
    });

    assert_eq!(summary.batches_rejected, 1);
    assert_eq!(runner.regression().model().weights(), &[0.0]);
}
