//! chart::core — span addressing, charts, grammar, projection and scorers.
pub mod charts;
pub mod grammar;
pub mod projection;
pub mod scorer;
pub mod triangle;

// ---- Re-exports ----
pub use self::charts::{ChartView, Layer, ParseCharts, TriangularChart};
pub use self::grammar::{BaseGrammar, BinaryRule, RuleTable, UnaryRule};
pub use self::projection::LabelProjection;
pub use self::scorer::{IdentityScorer, SpanScorer};
pub use self::triangle::{TriangularArray, num_spans, spans_by_length, triangular_index};
