//! Shared fixtures for the integration tests: a small exhaustive CKY
//! inside-outside parser over a `RuleTable` and a word → tag lexicon.
#![allow(dead_code)]

use loglinear_grammar::{
    chart::{
        core::{
            BaseGrammar, ChartView, Layer, ParseCharts, RuleTable, SpanScorer, TriangularChart,
        },
        errors::ChartResult,
        models::ChartParser,
    },
    optimization::numerical_stability::log_add,
};

/// Exhaustive binary-branching parser with one unary-closure step per span.
///
/// `lexicon[word]` lists `(preterminal, log-score)` pairs. Charts follow the
/// library's layer contract: the bottom layer holds scores before the unary
/// closure, the top layer after it, and unit-span bottom inside scores leave
/// out the scorer's lexical term (it is added when the closure lifts a tag to
/// the top layer).
pub struct CkyParser {
    pub grammar: RuleTable,
    pub lexicon: Vec<Vec<(usize, f64)>>,
    pub root: usize,
}

fn add_into(
    chart: &mut TriangularChart, layer: Layer, begin: usize, end: usize, label: usize, score: f64,
) {
    if !score.is_finite() {
        return;
    }
    let current = chart.score(layer, begin, end, label);
    chart.set(layer, begin, end, label, log_add(current, score)).expect("span and label in range");
}

impl CkyParser {
    /// Bottom inside of `label`, with the lexical term on unit spans.
    fn bottom_inside(
        inside: &TriangularChart, scorer: &dyn SpanScorer, begin: usize, end: usize, label: usize,
    ) -> f64 {
        let lexical = if end - begin == 1 { scorer.lexical_score(begin, end, label) } else { 0.0 };
        inside.score(Layer::Bottom, begin, end, label) + lexical
    }

    fn close_inside(
        &self, inside: &mut TriangularChart, scorer: &dyn SpanScorer, begin: usize, end: usize,
    ) {
        for parent in 0..self.grammar.num_labels() {
            for rule in self.grammar.unary_closure(parent) {
                let score = rule.score
                    + Self::bottom_inside(inside, scorer, begin, end, rule.child)
                    + scorer.unary_score(begin, end, parent, rule.child);
                add_into(inside, Layer::Top, begin, end, parent, score);
            }
        }
    }
}

impl ChartParser for CkyParser {
    type Sentence = Vec<usize>;
    type Chart = TriangularChart;

    fn parse(
        &self, sentence: &Vec<usize>, scorer: &dyn SpanScorer,
    ) -> ChartResult<ParseCharts<TriangularChart>> {
        let n = sentence.len();
        let labels = self.grammar.num_labels();
        let mut inside = TriangularChart::new(n, labels);
        let mut outside = TriangularChart::new(n, labels);

        for (i, &word) in sentence.iter().enumerate() {
            for &(tag, score) in self.lexicon.get(word).map(Vec::as_slice).unwrap_or(&[]) {
                add_into(&mut inside, Layer::Bottom, i, i + 1, tag, score);
            }
            self.close_inside(&mut inside, scorer, i, i + 1);
        }
        for width in 2..=n {
            for begin in 0..=n - width {
                let end = begin + width;
                for parent in 0..labels {
                    for rule in self.grammar.binary_rules(parent) {
                        let (l, r) = (rule.left, rule.right);
                        for split in begin + 1..end {
                            let score = inside.score(Layer::Top, begin, split, l)
                                + inside.score(Layer::Top, split, end, r)
                                + rule.score
                                + scorer.binary_score(begin, split, end, parent, l, r);
                            add_into(&mut inside, Layer::Bottom, begin, end, parent, score);
                        }
                    }
                }
                self.close_inside(&mut inside, scorer, begin, end);
            }
        }

        if n > 0 && inside.score(Layer::Top, 0, n, self.root).is_finite() {
            add_into(&mut outside, Layer::Top, 0, n, self.root, 0.0);
        }
        for width in (1..=n).rev() {
            for begin in 0..=n - width {
                let end = begin + width;
                for (parent, out_p) in outside.entered(Layer::Top, begin, end) {
                    for rule in self.grammar.unary_closure(parent) {
                        let score =
                            out_p + rule.score + scorer.unary_score(begin, end, parent, rule.child);
                        add_into(&mut outside, Layer::Bottom, begin, end, rule.child, score);
                    }
                }
                if width < 2 {
                    continue;
                }
                for (parent, out_p) in outside.entered(Layer::Bottom, begin, end) {
                    for rule in self.grammar.binary_rules(parent) {
                        let (l, r) = (rule.left, rule.right);
                        for split in begin + 1..end {
                            let base = out_p
                                + rule.score
                                + scorer.binary_score(begin, split, end, parent, l, r);
                            let in_l = inside.score(Layer::Top, begin, split, l);
                            let in_r = inside.score(Layer::Top, split, end, r);
                            add_into(&mut outside, Layer::Top, begin, split, l, base + in_r);
                            add_into(&mut outside, Layer::Top, split, end, r, base + in_l);
                        }
                    }
                }
            }
        }
        ParseCharts::from_root(inside, outside, self.root)
    }

    fn tokens(&self, sentence: &Vec<usize>) -> Vec<String> {
        sentence.iter().map(|word| format!("w{word}")).collect()
    }
}
