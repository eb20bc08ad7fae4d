//! The batch document classification pipeline.
//!
//! ```text
//! documents ─▶ split ─▶ rare terms ┃ tokenize + hash ─▶ IDF ┃ TF-IDF ─▶ labels ─▶ Naive Bayes ─▶ evaluate
//!                           barrier 1 ┛                 barrier 2 ┛
//! ```
//!
//! Map stages run in parallel on a rayon pool sized by
//! [`PipelineConfig::parallelism`]. Two aggregations are barriers: the rare
//! term set is complete before any document is finally tokenized, and the
//! IDF weights are complete before any TF-IDF vector is built. A failing
//! stage aborts the run with a [`HashlearnError::Stage`] naming the stage and
//! the input it failed on; no partial model is returned.
//!
//! The result is a [`Classifier`], whose [`ClassifierBundle`] holds every
//! piece of state needed to classify new text, and a
//! [`ClassificationReport`] for the held-out documents.

use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::StandardAnalyzer;
use crate::analysis::token_filter::rare::{RareTermCollector, RareTerms};
use crate::config::{AnalysisConfig, PipelineConfig};
use crate::error::{HashlearnError, Result};
use crate::feature::hashing::HashingTf;
use crate::feature::idf::{IdfEstimator, IdfWeights};
use crate::feature::sparse::SparseVector;
use crate::ml::dataset::{LabeledDocument, LabeledVector, TEST_SPLIT, TRAIN_SPLIT, random_split};
use crate::ml::evaluation::{ClassMetrics, ConfusionMatrix, MulticlassMetrics};
use crate::ml::labels::LabelIndexer;
use crate::ml::naive_bayes::{NaiveBayes, NaiveBayesModel};

/// Everything needed to classify new text, as persisted after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierBundle {
    pub hashing: HashingTf,
    pub analysis: AnalysisConfig,
    pub rare_terms: RareTerms,
    pub idf: IdfWeights,
    pub labels: LabelIndexer,
    pub model: NaiveBayesModel,
}

impl ClassifierBundle {
    /// Write the bundle as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Read a bundle written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bundle: ClassifierBundle = serde_json::from_str(&fs::read_to_string(path)?)?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Check that the parts of the bundle fit together.
    pub fn validate(&self) -> Result<()> {
        if self.hashing.num_features() == 0 {
            return Err(HashlearnError::invalid_argument(
                "bundle has a feature space of dimension 0",
            ));
        }
        if self.hashing.num_features() != self.idf.dimension()
            || self.idf.dimension() != self.model.dimension()
        {
            return Err(HashlearnError::dimension_mismatch(format!(
                "bundle dimensions disagree: hashing {}, IDF {}, model {}",
                self.hashing.num_features(),
                self.idf.dimension(),
                self.model.dimension()
            )));
        }
        self.idf.check_shape()?;
        self.model.check_shape()?;
        for &label in self.model.labels() {
            if self.labels.decode(label).is_err() {
                return Err(HashlearnError::invalid_argument(format!(
                    "model class {label} has no category"
                )));
            }
        }
        Ok(())
    }
}

/// The predicted category of one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub class: usize,
    pub probability: f64,
}

/// A trained text classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    analyzer: StandardAnalyzer,
    bundle: ClassifierBundle,
}

impl Classifier {
    /// Rebuild the analysis chain of a bundle.
    pub fn from_bundle(bundle: ClassifierBundle) -> Result<Self> {
        bundle.validate()?;
        let analyzer = StandardAnalyzer::from_config(&bundle.analysis)?
            .with_rare_terms(bundle.rare_terms.clone());
        Ok(Classifier { analyzer, bundle })
    }

    /// Load a classifier from a bundle file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bundle(ClassifierBundle::load(path)?)
    }

    /// The persisted state.
    pub fn bundle(&self) -> &ClassifierBundle {
        &self.bundle
    }

    /// The analyzer, including the rare term filter.
    pub fn analyzer(&self) -> &StandardAnalyzer {
        &self.analyzer
    }

    /// Hash and weight a text.
    pub fn vectorize(&self, text: &str) -> Result<SparseVector> {
        let tf = self.bundle.hashing.transform_text(&self.analyzer, text);
        self.bundle.idf.transform(&tf)
    }

    /// Predict the category of a text.
    pub fn classify(&self, text: &str) -> Result<Classification> {
        let features = self.vectorize(text)?;
        let (class, probabilities) = self.bundle.model.predict_with_probabilities(&features)?;
        let label = self.bundle.model.labels()[class];

        Ok(Classification {
            category: self.bundle.labels.decode(label)?.to_string(),
            class,
            probability: probabilities[class],
        })
    }
}

/// One cell of a confusion matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    pub actual: String,
    pub predicted: String,
    pub count: u64,
}

/// Evaluation of a trained classifier on held-out documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub train_documents: usize,
    pub test_documents: usize,
    pub num_classes: usize,
    pub accuracy: f64,
    pub weighted_precision: f64,
    pub weighted_recall: f64,
    pub weighted_f_measure: f64,
    pub per_class: Vec<ClassMetrics<String>>,
    pub confusion: Vec<ConfusionEntry>,
}

impl ClassificationReport {
    fn new(
        train_documents: usize,
        num_classes: usize,
        matrix: &ConfusionMatrix<String>,
    ) -> Self {
        let metrics = MulticlassMetrics::new(matrix);
        ClassificationReport {
            train_documents,
            test_documents: matrix.total() as usize,
            num_classes,
            accuracy: metrics.accuracy(),
            weighted_precision: metrics.weighted_precision(),
            weighted_recall: metrics.weighted_recall(),
            weighted_f_measure: metrics.weighted_f_measure(),
            per_class: metrics.per_class(),
            confusion: matrix
                .entries()
                .map(|(actual, predicted, count)| ConfusionEntry {
                    actual: actual.clone(),
                    predicted: predicted.clone(),
                    count,
                })
                .collect(),
        }
    }
}

/// Output of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub classifier: Classifier,
    pub report: ClassificationReport,
}

fn corpus_input(documents: usize) -> String {
    format!("training corpus ({documents} documents)")
}

fn split_kind(name: &str) -> Option<bool> {
    let name = name.to_lowercase();
    if name.contains(TRAIN_SPLIT) {
        Some(true)
    } else if name.contains(TEST_SPLIT) {
        Some(false)
    } else {
        None
    }
}

/// Runs the batch path over a labeled corpus.
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    config: PipelineConfig,
}

impl BatchPipeline {
    /// Create a pipeline, validating its configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(BatchPipeline { config })
    }

    /// The configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Partition documents into training and evaluation sets.
    ///
    /// When every document names a recognizable train or test split and
    /// both sides are non-empty that partition is used. Otherwise the
    /// documents are shuffled with the configured seed and
    /// `test_fraction` of them are held out.
    pub fn split(
        &self,
        documents: Vec<LabeledDocument>,
    ) -> Result<(Vec<LabeledDocument>, Vec<LabeledDocument>)> {
        if documents.is_empty() {
            return Err(HashlearnError::stage(
                "split",
                "corpus",
                HashlearnError::empty_training_set("the corpus contains no documents"),
            ));
        }

        let kinds: Option<Vec<bool>> = documents
            .iter()
            .map(|doc| doc.split.as_deref().and_then(split_kind))
            .collect();

        let (train, test) = match kinds {
            Some(kinds) if kinds.iter().any(|k| *k) && kinds.iter().any(|k| !*k) => {
                let mut train = Vec::new();
                let mut test = Vec::new();
                for (doc, is_train) in documents.into_iter().zip(kinds) {
                    if is_train {
                        train.push(doc);
                    } else {
                        test.push(doc);
                    }
                }
                debug!("using the corpus split: {} train, {} test", train.len(), test.len());
                (train, test)
            }
            _ => {
                let (train, test) =
                    random_split(documents, self.config.test_fraction, self.config.seed);
                debug!(
                    "random split with seed {}: {} train, {} test",
                    self.config.seed,
                    train.len(),
                    test.len()
                );
                (train, test)
            }
        };

        if train.is_empty() {
            return Err(HashlearnError::stage(
                "split",
                "corpus",
                HashlearnError::empty_training_set("no documents left for training"),
            ));
        }
        Ok((train, test))
    }

    /// Train on the corpus and evaluate on its held-out part.
    pub fn run(&self, documents: Vec<LabeledDocument>) -> Result<PipelineOutput> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.parallelism)
            .build()
            .map_err(|e| HashlearnError::other(format!("failed to build thread pool: {e}")))?;

        pool.install(|| self.run_stages(documents))
    }

    fn run_stages(&self, documents: Vec<LabeledDocument>) -> Result<PipelineOutput> {
        let total = Instant::now();
        let (train, test) = self.split(documents)?;
        let corpus = corpus_input(train.len());

        // Barrier 1: the rare term set over the whole training corpus.
        let start = Instant::now();
        let base = StandardAnalyzer::from_config(&self.config.analysis)
            .map_err(|e| HashlearnError::stage("rare-terms", "analysis configuration", e))?;
        let texts: Vec<&str> = train.iter().map(|doc| doc.text()).collect();
        let rare_terms =
            RareTermCollector::from_corpus(&base, &texts, self.config.analysis.min_term_count);
        debug!("{} rare terms found in {:?}", rare_terms.len(), start.elapsed());
        let analyzer = base.with_rare_terms(rare_terms.clone());

        let start = Instant::now();
        let hashing = HashingTf::new(self.config.num_features)
            .map_err(|e| HashlearnError::stage("hashing", "configuration", e))?
            .with_binary(self.config.binary_tf);
        let term_frequencies: Vec<SparseVector> = texts
            .par_iter()
            .map(|text| hashing.transform_text(&analyzer, text))
            .collect();
        debug!("hashed {} documents in {:?}", term_frequencies.len(), start.elapsed());

        // Barrier 2: document frequencies over the whole training corpus.
        let idf = IdfEstimator::new()
            .with_min_doc_freq(self.config.min_doc_freq)
            .fit(&term_frequencies)
            .map_err(|e| HashlearnError::stage("idf", corpus.as_str(), e))?;

        let labels = LabelIndexer::fit(train.iter().map(|doc| doc.category.as_str()))
            .map_err(|e| HashlearnError::stage("labels", corpus.as_str(), e))?;

        let training: Vec<LabeledVector> = train
            .par_iter()
            .zip(term_frequencies.par_iter())
            .map(|(doc, tf)| {
                let features = idf
                    .transform(tf)
                    .map_err(|e| HashlearnError::stage("idf", doc.id(), e))?;
                let label = labels
                    .encode(&doc.category)
                    .map_err(|e| HashlearnError::stage("labels", doc.id(), e))?;
                Ok(LabeledVector::new(label, features))
            })
            .collect::<Result<_>>()?;

        let start = Instant::now();
        let model = NaiveBayes::new(self.config.smoothing)
            .and_then(|trainer| trainer.train(&training))
            .map_err(|e| HashlearnError::stage("naive-bayes", corpus.as_str(), e))?;
        debug!("Naive Bayes trained in {:?}", start.elapsed());

        let num_classes = labels.len();
        let classifier = Classifier {
            analyzer,
            bundle: ClassifierBundle {
                hashing,
                analysis: self.config.analysis.clone(),
                rare_terms,
                idf,
                labels,
                model,
            },
        };

        let predictions: Vec<(String, String)> = test
            .par_iter()
            .map(|doc| {
                classifier
                    .classify(doc.text())
                    .map(|prediction| (prediction.category, doc.category.clone()))
                    .map_err(|e| HashlearnError::stage("predict", doc.id(), e))
            })
            .collect::<Result<_>>()?;

        let matrix = ConfusionMatrix::from_predictions(predictions);
        let report = ClassificationReport::new(train.len(), num_classes, &matrix);
        info!(
            "trained on {} documents, evaluated on {}: accuracy {:.4}, weighted F {:.4} ({:?})",
            report.train_documents,
            report.test_documents,
            report.accuracy,
            report.weighted_f_measure,
            total.elapsed()
        );

        Ok(PipelineOutput { classifier, report })
    }
}
