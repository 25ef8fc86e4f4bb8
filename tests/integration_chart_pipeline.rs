//! Integration tests for the chart posterior pipeline.
//!
//! Purpose
//! -------
//! - Run a real (if tiny) inside-outside parser, build anchored scorers from
//!   its charts, and check the posteriors against hand-computed values.
//! - Exercise batch scoring end to end, including an unparsable sentence and
//!   a second pass that uses the first pass's scorers as priors.
//!
//! Coverage
//! --------
//! - `chart::core`: `RuleTable` (with and without real unary rules),
//!   two-layer `TriangularChart`, `ParseCharts::from_root`, `LabelProjection`.
//! - `chart::models`: `build_anchored_scorer`, `AnchoredRuleScorer`,
//!   `score_batch`, `score_batch_with_priors`.
//!
//! Exclusions
//! ----------
//! - Sentences longer than two words; the CKY fixture is exhaustive and the
//!   hand-computed expectations stay readable only for short inputs.
mod common;

use approx::assert_abs_diff_eq;
use common::CkyParser;
use loglinear_grammar::{
    chart::{
        core::{IdentityScorer, LabelProjection, RuleTable},
        errors::ChartError,
        models::{
            AnchoredRuleScorer, BatchOptions, ChartParser, SentenceScorer, build_anchored_scorer,
            score_batch, score_batch_with_priors,
        },
    },
    optimization::numerical_stability::log_add,
};

const S: usize = 0;
const A: usize = 1;
const B: usize = 2;
const C: usize = 3;

const LA: f64 = -1.2;
const LB: f64 = -0.4;
const LC: f64 = -2.0;
const LB_AMB: f64 = -0.9;
const LC_AMB: f64 = -1.6;
const RS: f64 = -0.25;
const RS2: f64 = -0.75;

/// `S → A B | A C`; word 0 is A, word 1 is B, word 2 is C, word 3 is B or C.
fn parser() -> CkyParser {
    let mut grammar = RuleTable::new(4);
    for tag in [A, B, C] {
        grammar.mark_preterminal(tag).expect("label in range");
    }
    grammar.add_binary(S, A, B, RS).expect("labels in range");
    grammar.add_binary(S, A, C, RS2).expect("labels in range");
    CkyParser { grammar: grammar.with_reflexive_unaries(), lexicon: lexicon(), root: S }
}

/// Word 0 is A, word 1 is B, word 2 is C, word 3 is B or C.
fn lexicon() -> Vec<Vec<(usize, f64)>> {
    vec![vec![(A, LA)], vec![(B, LB)], vec![(C, LC)], vec![(B, LB_AMB), (C, LC_AMB)]]
}

const ROOT: usize = 4;
const U: f64 = -0.35;
const RR: f64 = -1.1;

/// `parser()` plus a ROOT label: `ROOT →* S` (score U) and `ROOT → A C` (RR).
fn unary_parser() -> CkyParser {
    let mut grammar = RuleTable::new(5);
    for tag in [A, B, C] {
        grammar.mark_preterminal(tag).expect("label in range");
    }
    grammar.add_binary(S, A, B, RS).expect("labels in range");
    grammar.add_binary(S, A, C, RS2).expect("labels in range");
    grammar.add_binary(ROOT, A, C, RR).expect("labels in range");
    grammar.add_unary(ROOT, S, U).expect("labels in range");
    CkyParser { grammar: grammar.with_reflexive_unaries(), lexicon: lexicon(), root: ROOT }
}

fn lexical_mass(scorer: &AnchoredRuleScorer, position: usize) -> f64 {
    (0..scorer.num_labels()).map(|l| scorer.lexical_score(position, position + 1, l).exp()).sum()
}

fn unary_mass(scorer: &AnchoredRuleScorer, begin: usize, end: usize) -> f64 {
    let labels = scorer.num_labels();
    (0..labels)
        .flat_map(|p| (0..labels).map(move |c| (p, c)))
        .map(|(p, c)| scorer.unary_score(begin, end, p, c).exp())
        .sum()
}

fn binary_mass(scorer: &AnchoredRuleScorer, begin: usize, end: usize) -> f64 {
    let labels = scorer.num_labels();
    let mut mass = 0.0;
    for split in begin + 1..end {
        for p in 0..labels {
            for l in 0..labels {
                for r in 0..labels {
                    mass += scorer.binary_score(begin, split, end, p, l, r).exp();
                }
            }
        }
    }
    mass
}

#[test]
// Purpose
// -------
// For a sentence with exactly one parse, log Z is the sum of its rule
// scores and every posterior on the parse is 0.
//
// Given
// -----
// - "w0 w1", parsed only as S → A B.
//
// Expect
// ------
// - log Z = LA + LB + RS.
// - Lexical, binary and root unary posteriors of the parse are 0.
// - Items off the parse read as -∞.
fn unambiguous_sentence_has_zero_posteriors() {
    // Arrange
    let parser = parser();
    let charts = parser.parse(&vec![0, 1], &IdentityScorer).expect("parser runs");

    // Act
    let identity = LabelProjection::identity(4);
    let scorer = build_anchored_scorer(&charts, &parser.grammar, &identity, &IdentityScorer)
        .expect("sentence parses");

    // Assert
    assert_abs_diff_eq!(charts.log_prob, LA + LB + RS, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.lexical_score(0, 1, A), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.lexical_score(1, 2, B), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.binary_score(0, 1, 2, S, A, B), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.unary_score(0, 2, S, S), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.span_posterior(0, 2, S), 0.0, epsilon = 1e-12);

    assert_eq!(scorer.binary_score(0, 1, 2, S, A, C), f64::NEG_INFINITY);
    assert_eq!(scorer.lexical_score(0, 1, B), f64::NEG_INFINITY);
    assert_eq!(scorer.lexical_score(0, 2, A), f64::NEG_INFINITY);
    assert_eq!(scorer.unary_score(0, 1, S, S), f64::NEG_INFINITY);
    assert_eq!(scorer.binary_score(0, 1, 2, S, A, B + 10), f64::NEG_INFINITY);
    assert!(scorer.is_pruned(0, 1, S, -50.0));
}

#[test_log::test]
// Purpose
// -------
// Batch scoring isolates an unparsable sentence and keeps input order.
//
// Given
// -----
// - Sentences "w0 w1" (one parse), "w1 w0" (no parse), "w0 w3" (B or C
//   for the second word).
// - A projection merging B and C.
//
// Expect
// ------
// - Item 1 carries `UnparsableSentence` naming its words, and the identity
//   scorer.
// - Items 0 and 2 are scored; in item 2 the fine posteriors of B and C
//   match the two parse probabilities and the merged label has posterior 1.
fn batch_scoring_isolates_failures() {
    // Arrange
    let parser = parser();
    let sentences = vec![vec![0, 1], vec![1, 0], vec![0, 3]];
    let merged = LabelProjection::new(vec![0, 1, 2, 2], 3).expect("surjective");

    // Act
    let identity = LabelProjection::identity(4);
    let fine = score_batch(&parser, &parser.grammar, &identity, &sentences, &BatchOptions::new(2))
        .expect("pool builds");
    let coarse =
        score_batch(&parser, &parser.grammar, &merged, &sentences, &BatchOptions::default())
            .expect("pool builds");

    // Assert
    assert_eq!(fine.len(), 3);
    let Some(ChartError::UnparsableSentence { tokens, log_prob }) = &fine[1].failure else {
        panic!("expected an unparsable sentence, got {:?}", fine[1].failure);
    };
    assert_eq!(tokens, &["w1", "w0"]);
    assert_eq!(*log_prob, f64::NEG_INFINITY);
    assert_eq!(fine[1].scorer, SentenceScorer::Identity(IdentityScorer));
    assert!(!fine[0].is_substituted() && !fine[2].is_substituted());

    let log_z = log_add(LA + LB_AMB + RS, LA + LC_AMB + RS2);
    let amb = fine[2].scorer.as_anchored().expect("scored");
    assert_abs_diff_eq!(amb.lexical_score(1, 2, B), LA + LB_AMB + RS - log_z, epsilon = 1e-12);
    assert_abs_diff_eq!(amb.lexical_score(1, 2, C), LA + LC_AMB + RS2 - log_z, epsilon = 1e-12);
    assert_abs_diff_eq!(amb.lexical_score(0, 1, A), 0.0, epsilon = 1e-12);

    let merged_amb = coarse[2].scorer.as_anchored().expect("scored");
    assert_eq!(merged_amb.num_labels(), 3);
    assert_abs_diff_eq!(merged_amb.lexical_score(1, 2, 2), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(merged_amb.binary_score(0, 1, 2, S, A, 2), 0.0, epsilon = 1e-12);
    assert!(coarse[1].is_substituted());
}

#[test]
// Purpose
// -------
// Posteriors stay consistent when the grammar has a real unary rule next to
// the reflexive closure.
//
// Given
// -----
// - `unary_parser()` on "w0 w3", with three readings:
//   ROOT(S(A B)), ROOT(S(A C)) and ROOT(A C).
//
// Expect
// ------
// - Each posterior equals the summed probability of the readings using it.
// - On every span, the unary posteriors sum to at most 1, and to exactly 1
//   on the whole sentence and on each word.
// - Lexical and binary posteriors sum to 1 where every reading has them.
fn real_unary_rules_conserve_posterior_mass() {
    // Arrange
    let parser = unary_parser();
    let sentence = vec![0, 3];
    let readings = [LA + LB_AMB + RS + U, LA + LC_AMB + RS2 + U, LA + LC_AMB + RR];
    let log_z = readings.iter().copied().fold(f64::NEG_INFINITY, log_add);
    let [p1, p2, p3] = readings.map(|r| (r - log_z).exp());

    // Act
    let charts = parser.parse(&sentence, &IdentityScorer).expect("parser runs");
    let identity = LabelProjection::identity(5);
    let scorer = build_anchored_scorer(&charts, &parser.grammar, &identity, &IdentityScorer)
        .expect("sentence parses");

    // Assert
    assert_abs_diff_eq!(charts.log_prob, log_z, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.unary_score(0, 2, ROOT, S).exp(), p1 + p2, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.unary_score(0, 2, ROOT, ROOT).exp(), p3, epsilon = 1e-12);
    assert_eq!(scorer.unary_score(0, 2, S, S), f64::NEG_INFINITY);
    assert_abs_diff_eq!(scorer.binary_score(0, 1, 2, S, A, B).exp(), p1, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.binary_score(0, 1, 2, S, A, C).exp(), p2, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.binary_score(0, 1, 2, ROOT, A, C).exp(), p3, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.lexical_score(1, 2, B).exp(), p1, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.lexical_score(1, 2, C).exp(), p2 + p3, epsilon = 1e-12);
    assert_abs_diff_eq!(scorer.span_posterior(0, 2, ROOT), 0.0, epsilon = 1e-12);

    for (begin, end) in [(0, 1), (1, 2), (0, 2)] {
        assert_abs_diff_eq!(unary_mass(&scorer, begin, end), 1.0, epsilon = 1e-9);
    }
    assert_abs_diff_eq!(lexical_mass(&scorer, 0), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(lexical_mass(&scorer, 1), 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(binary_mass(&scorer, 0, 2), 1.0, epsilon = 1e-9);
}

#[test]
// Purpose
// -------
// A second pass can run under the first pass's scorers.
//
// Given
// -----
// - First-pass scorers for "w0 w1" and "w0 w3" used as priors, under the
//   plain grammar and under the grammar with a real unary rule.
//
// Expect
// ------
// - The unambiguous sentence keeps zero posteriors (its prior adds 0
//   along the only parse).
// - The ambiguous sentence's preferred reading gains mass.
// - Lexical mass at every word, and unary and binary mass on the whole
//   sentence, are still 1 after the second pass.
fn second_pass_composes_with_first_pass_posteriors() {
    for (parser, labels) in [(parser(), 4), (unary_parser(), 5)] {
        // Arrange
        let id = LabelProjection::identity(labels);
        let sentences = vec![vec![0, 1], vec![0, 3]];
        let options = BatchOptions::default();
        let first = score_batch(&parser, &parser.grammar, &id, &sentences, &options)
            .expect("pool builds");
        let priors: Vec<SentenceScorer> = first.iter().map(|item| item.scorer.clone()).collect();

        // Act
        let second =
            score_batch_with_priors(&parser, &parser.grammar, &id, &sentences, &priors, &options)
                .expect("pool builds");

        // Assert
        assert!(second.iter().all(|item| !item.is_substituted()));
        let plain = second[0].scorer.as_anchored().expect("scored");
        assert_abs_diff_eq!(plain.binary_score(0, 1, 2, S, A, B), 0.0, epsilon = 1e-9);

        let before = first[1].scorer.as_anchored().expect("scored");
        let after = second[1].scorer.as_anchored().expect("scored");
        let (b, c) = (before.lexical_score(1, 2, B), before.lexical_score(1, 2, C));
        let preferred = if b > c { B } else { C };
        assert!(after.lexical_score(1, 2, preferred) > before.lexical_score(1, 2, preferred));

        for item in &second {
            let scorer = item.scorer.as_anchored().expect("scored");
            for position in 0..2 {
                assert_abs_diff_eq!(lexical_mass(scorer, position), 1.0, epsilon = 1e-9);
            }
            assert_abs_diff_eq!(unary_mass(scorer, 0, 2), 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(binary_mass(scorer, 0, 2), 1.0, epsilon = 1e-9);
        }
    }
}
