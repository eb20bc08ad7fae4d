use hashlearn::ml::evaluation::{ConfusionMatrix, MulticlassMetrics, RegressionMetrics};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const LABELS: [&str; 4] = ["alt.atheism", "comp.graphics", "sci.space", "talk.politics"];

fn random_predictions(rng: &mut StdRng, n: usize) -> Vec<(&'static str, &'static str)> {
    (0..n)
        .map(|_| {
            let actual = LABELS[rng.random_range(0..LABELS.len())];
            let predicted = if rng.random_bool(0.6) {
                actual
            } else {
                LABELS[rng.random_range(0..LABELS.len())]
            };
            (predicted, actual)
        })
        .collect()
}

#[test]
fn test_metrics_stay_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in [1, 2, 5, 50, 500] {
        let predictions = random_predictions(&mut rng, n);
        let matrix = ConfusionMatrix::from_predictions(predictions.iter().copied());
        let metrics = MulticlassMetrics::new(&matrix);

        assert_eq!(metrics.total(), n as u64);
        for value in [
            metrics.accuracy(),
            metrics.weighted_precision(),
            metrics.weighted_recall(),
            metrics.weighted_f_measure(),
            metrics.f_measure_beta(0.5),
            metrics.f_measure_beta(2.0),
        ] {
            assert!(
                (0.0..=1.0 + 1e-12).contains(&value),
                "{value} outside [0, 1] for n = {n}"
            );
        }

        let correct = predictions.iter().filter(|(p, a)| p == a).count();
        assert!((metrics.accuracy() - correct as f64 / n as f64).abs() < 1e-12);
        // weighted recall over the true-label distribution equals accuracy
        assert!((metrics.weighted_recall() - metrics.accuracy()).abs() < 1e-12);
    }
}

#[test]
fn test_perfect_predictions() {
    let predictions: Vec<(&str, &str)> = LABELS.iter().map(|label| (*label, *label)).collect();
    let metrics = MulticlassMetrics::new(&ConfusionMatrix::from_predictions(predictions));

    assert_eq!(metrics.accuracy(), 1.0);
    assert_eq!(metrics.weighted_f_measure(), 1.0);
    assert!(metrics.per_class().iter().all(|class| class.f1 == 1.0));
}

#[test]
fn test_support_sums_to_total() {
    let mut rng = StdRng::seed_from_u64(11);
    let matrix = ConfusionMatrix::from_predictions(random_predictions(&mut rng, 200));
    let metrics = MulticlassMetrics::new(&matrix);

    let support: u64 = metrics.per_class().iter().map(|class| class.support).sum();
    assert_eq!(support, matrix.total());
}

#[test]
fn test_regression_metrics_relations() {
    let mut rng = StdRng::seed_from_u64(3);
    let pairs: Vec<(f64, f64)> = (0..100)
        .map(|_| (rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)))
        .collect();
    let metrics = RegressionMetrics::from_predictions(pairs.iter().copied());

    assert_eq!(metrics.count, 100);
    assert!(metrics.mean_absolute_error <= metrics.root_mean_squared_error + 1e-12);
    assert!(
        (metrics.root_mean_squared_error.powi(2) - metrics.mean_squared_error).abs() < 1e-9
    );
}
