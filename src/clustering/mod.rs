// Module declarations
pub mod consolidate;
pub mod grouping;
pub mod orchestrator;

pub use consolidate::{format_date_range, Consolidator, FALLBACK_SUMMARY_SEPARATOR};
pub use grouping::{group_by_similarity, group_findings_by_similarity, GroupingThresholds};
pub use orchestrator::sort_consolidated;

/// Similarity a candidate must reach to join a seed's group
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;

/// Lower bar used when the seed and candidate share at least one named entity
pub const DEFAULT_SAME_PERSON_THRESHOLD: f64 = 0.3;
