pub mod clustering;
pub mod environment;
pub mod finding;
pub mod fingerprint;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod similarity;
pub mod util;

pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_FINGERPRINT: &str = "fingerprint";
pub const TARGET_SIMILARITY: &str = "similarity";
pub const TARGET_CONSOLIDATION: &str = "consolidation";

pub use clustering::{
    group_by_similarity, group_findings_by_similarity, Consolidator, GroupingThresholds,
};
pub use finding::{ConsolidatedFinding, ParkedArticle, RawFinding, Severity, SourceRef};
pub use fingerprint::{extract_fingerprint, EventType, Fingerprint, Gender};
pub use llm::{CompletionProvider, ConsolidatorConfig, ProviderConfig};
pub use similarity::{calculate_similarity, detect_identity_conflict, IdentityConflict};
