//! Batch scoring — one anchored scorer per sentence on a rayon pool.
//!
//! Purpose
//! -------
//! Map "parse, then build posteriors" over a corpus. Sentences are
//! independent; the grammar, projection and parser are shared read-only.
//!
//! Key behaviors
//! -------------
//! - Work runs on a dedicated rayon pool sized by [`BatchOptions::threads`]
//!   (`0` = rayon's default). Results come back in input order.
//! - A sentence that fails (unparsable, parser error) does not abort the
//!   batch: its slot holds [`SentenceScorer::Identity`] and the error, and a
//!   `warn!` record names the sentence index.
//! - Optional per-sentence priors (e.g. the previous pass's scorers) are
//!   handed to both the parser and the posterior builder.
//! - Charts get the sentence's [`ChartParser::tokens`] attached before
//!   building, so an unparsable sentence is reported with its words.
use crate::chart::{
    core::{
        charts::{ChartView, ParseCharts},
        grammar::BaseGrammar,
        projection::LabelProjection,
        scorer::{IdentityScorer, SpanScorer},
    },
    errors::{ChartError, ChartResult},
    models::{anchored::AnchoredRuleScorer, posterior::build_anchored_scorer},
};
use log::warn;
use rayon::{ThreadPoolBuilder, prelude::*};

/// External parser producing inside/outside charts under an additive scorer.
pub trait ChartParser: Sync {
    type Sentence: Sync;
    type Chart: ChartView;

    /// Inside/outside charts of `sentence` computed under `scorer`, laid out
    /// as described in [`charts`](crate::chart::core::charts).
    ///
    /// # Errors
    /// [`ChartError::UnparsableSentence`] when no parse exists; any other
    /// [`ChartError`] for parser failures.
    fn parse(
        &self, sentence: &Self::Sentence, scorer: &dyn SpanScorer,
    ) -> ChartResult<ParseCharts<Self::Chart>>;

    /// Render `sentence` as one string per word, for error reports.
    fn tokens(&self, sentence: &Self::Sentence) -> Vec<String>;
}

/// Worker pool configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; `0` uses rayon's default.
    pub threads: usize,
}

impl BatchOptions {
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }
}

/// Scorer produced for one sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceScorer {
    Anchored(AnchoredRuleScorer),
    /// Substituted after a failure; scores everything `0`.
    Identity(IdentityScorer),
}

impl SentenceScorer {
    pub fn as_anchored(&self) -> Option<&AnchoredRuleScorer> {
        match self {
            SentenceScorer::Anchored(scorer) => Some(scorer),
            SentenceScorer::Identity(_) => None,
        }
    }
}

impl SpanScorer for SentenceScorer {
    fn lexical_score(&self, begin: usize, end: usize, label: usize) -> f64 {
        match self {
            SentenceScorer::Anchored(s) => s.lexical_score(begin, end, label),
            SentenceScorer::Identity(s) => s.lexical_score(begin, end, label),
        }
    }

    fn unary_score(&self, begin: usize, end: usize, parent: usize, child: usize) -> f64 {
        match self {
            SentenceScorer::Anchored(s) => s.unary_score(begin, end, parent, child),
            SentenceScorer::Identity(s) => s.unary_score(begin, end, parent, child),
        }
    }

    fn binary_score(
        &self, begin: usize, split: usize, end: usize, parent: usize, left: usize, right: usize,
    ) -> f64 {
        match self {
            SentenceScorer::Anchored(s) => s.binary_score(begin, split, end, parent, left, right),
            SentenceScorer::Identity(s) => s.binary_score(begin, split, end, parent, left, right),
        }
    }
}

/// Outcome for one sentence: always a usable scorer, plus the failure that
/// forced a substitution, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub scorer: SentenceScorer,
    pub failure: Option<ChartError>,
}

impl ScoredSentence {
    fn from_result(index: usize, result: ChartResult<AnchoredRuleScorer>) -> Self {
        match result {
            Ok(scorer) => Self { scorer: SentenceScorer::Anchored(scorer), failure: None },
            Err(err) => {
                warn!("Sentence {index}: {err}; substituting the identity scorer");
                Self { scorer: SentenceScorer::Identity(IdentityScorer), failure: Some(err) }
            }
        }
    }

    pub fn is_substituted(&self) -> bool {
        self.failure.is_some()
    }
}

/// Parse and score every sentence with no prior.
///
/// # Errors
/// [`ChartError::WorkerPool`] if the pool cannot be built. Per-sentence
/// failures are reported inside the returned items.
pub fn score_batch<P, G>(
    parser: &P, grammar: &G, projection: &LabelProjection, sentences: &[P::Sentence],
    options: &BatchOptions,
) -> ChartResult<Vec<ScoredSentence>>
where
    P: ChartParser,
    G: BaseGrammar + Sync + ?Sized,
{
    let priors = vec![IdentityScorer; sentences.len()];
    score_batch_with_priors(parser, grammar, projection, sentences, &priors, options)
}

/// Parse and score every sentence under its own prior scorer.
///
/// # Errors
/// - [`ChartError::PriorCountMismatch`] when `priors.len() != sentences.len()`.
/// - [`ChartError::WorkerPool`] if the pool cannot be built.
pub fn score_batch_with_priors<P, G, S>(
    parser: &P, grammar: &G, projection: &LabelProjection, sentences: &[P::Sentence],
    priors: &[S], options: &BatchOptions,
) -> ChartResult<Vec<ScoredSentence>>
where
    P: ChartParser,
    G: BaseGrammar + Sync + ?Sized,
    S: SpanScorer + Sync,
{
    if priors.len() != sentences.len() {
        return Err(ChartError::PriorCountMismatch {
            sentences: sentences.len(),
            priors: priors.len(),
        });
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()
        .map_err(|err| ChartError::WorkerPool { reason: err.to_string() })?;

    let results = pool.install(|| {
        sentences
            .par_iter()
            .zip(priors.par_iter())
            .enumerate()
            .map(|(index, (sentence, prior))| {
                let result = parser.parse(sentence, prior).and_then(|charts| {
                    let charts = charts.with_tokens(parser.tokens(sentence));
                    build_anchored_scorer(&charts, grammar, projection, prior)
                });
                ScoredSentence::from_result(index, result)
            })
            .collect()
    });
    Ok(results)
}
