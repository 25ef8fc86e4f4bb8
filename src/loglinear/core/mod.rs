//! loglinear::core — registries, feature grid, thetas and expected counts.
//!
//! Everything here is plain data plus pure functions over it. Nothing logs
//! and nothing optimizes; the models layer composes these pieces into the
//! training objective and the EM driver.
pub mod counts;
pub mod directory;
pub mod grid;
pub mod index;
pub mod theta;

// ---- Re-exports ----
pub use self::counts::ExpectedCounts;
pub use self::directory::{DENSE_FILL_RATIO, SmallIntMap};
pub use self::grid::{FeatureGrid, FeatureGridBuilder, FeatureSource, FeatureSpace};
pub use self::index::Index;
pub use self::theta::{LogThetas, compute_log_thetas};
