//! Standard analyzer for document classification.
//!
//! # Pipeline
//!
//! 1. RegexTokenizer (split on runs of non-word characters)
//! 2. LowercaseFilter
//! 3. DigitFilter (drop tokens containing any digit)
//! 4. StopFilter (English list or a custom one)
//! 5. LengthFilter (at least 2 characters by default)
//! 6. RareTermFilter (only once a rare term set has been attached)
//!
//! The rare term set is corpus dependent, so the analyzer is used in two
//! phases: steps 1 to 5 feed a [`RareTermCollector`], then
//! [`StandardAnalyzer::with_rare_terms`] yields the final analyzer.
//!
//! # Examples
//!
//! ```
//! use hashlearn::analysis::analyzer::{Analyzer, StandardAnalyzer};
//! use hashlearn::analysis::token_filter::rare::RareTermCollector;
//!
//! let corpus = ["Goalie saves the puck", "puck drop", "goalie trade rumors"];
//! let analyzer = StandardAnalyzer::new();
//!
//! let rare = RareTermCollector::from_corpus(&analyzer, &corpus, 2);
//! let analyzer = analyzer.with_rare_terms(rare);
//!
//! assert_eq!(analyzer.terms("goalie PUCK 99"), vec!["goalie", "puck"]);
//! assert_eq!(analyzer.terms("rumors about the drop"), Vec::<String>::new());
//! ```
//!
//! [`RareTermCollector`]: crate::analysis::token_filter::rare::RareTermCollector

use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::rare::{RareTermFilter, RareTerms};
use crate::analysis::token_filter::{DigitFilter, LengthFilter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::RegexTokenizer;
use crate::config::AnalysisConfig;
use crate::error::Result;

/// The analyzer used for document classification.
#[derive(Clone)]
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
    rare_terms: Option<Arc<RareTerms>>,
}

impl StandardAnalyzer {
    /// Create a standard analyzer with default settings and no rare terms.
    pub fn new() -> Self {
        let inner = Self::base_pipeline(
            RegexTokenizer::default(),
            StopFilter::new(),
            LengthFilter::default(),
        );

        StandardAnalyzer {
            inner,
            rare_terms: None,
        }
    }

    /// Create a standard analyzer from configuration, without rare terms.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let tokenizer = RegexTokenizer::with_gaps(&config.token_pattern)?;
        let stop_filter = match &config.stop_words {
            Some(words) => StopFilter::from_words(words.iter().map(|w| w.to_lowercase())),
            None => StopFilter::new(),
        };
        let inner = Self::base_pipeline(
            tokenizer,
            stop_filter,
            LengthFilter::new(config.min_token_length),
        );

        Ok(StandardAnalyzer {
            inner,
            rare_terms: None,
        })
    }

    fn base_pipeline(
        tokenizer: RegexTokenizer,
        stop_filter: StopFilter,
        length_filter: LengthFilter,
    ) -> PipelineAnalyzer {
        PipelineAnalyzer::new(Arc::new(tokenizer))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(DigitFilter::new()))
            .add_filter(Arc::new(stop_filter))
            .add_filter(Arc::new(length_filter))
            .with_name("standard")
    }

    /// Return a copy of this analyzer that also drops the given rare terms.
    ///
    /// Attaching a new set replaces any previously attached one.
    pub fn with_rare_terms(&self, rare_terms: RareTerms) -> Self {
        let base = match &self.rare_terms {
            Some(_) => self.without_rare_terms(),
            None => self.clone(),
        };
        let rare_terms = Arc::new(rare_terms);
        let inner = base
            .inner
            .add_filter(Arc::new(RareTermFilter::from_shared(Arc::clone(&rare_terms))));

        StandardAnalyzer {
            inner,
            rare_terms: Some(rare_terms),
        }
    }

    fn without_rare_terms(&self) -> Self {
        let mut inner = self.inner.clone();
        if self.rare_terms.is_some() {
            let filters = inner.filters().len();
            let mut rebuilt = PipelineAnalyzer::new(Arc::clone(inner.tokenizer()))
                .with_name(inner.pipeline_name().to_string());
            for filter in &inner.filters()[..filters - 1] {
                rebuilt = rebuilt.add_filter(Arc::clone(filter));
            }
            inner = rebuilt;
        }
        StandardAnalyzer {
            inner,
            rare_terms: None,
        }
    }

    /// The attached rare term set, if any.
    pub fn rare_terms(&self) -> Option<&RareTerms> {
        self.rare_terms.as_deref()
    }

    /// Get the inner pipeline analyzer.
    pub fn inner(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> TokenStream {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("inner", &self.inner)
            .field("rare_terms", &self.rare_terms.as_ref().map(|r| r.len()))
            .finish()
    }
}
