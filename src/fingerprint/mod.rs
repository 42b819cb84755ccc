pub mod extraction;
pub mod patterns;
pub mod types;

pub use extraction::extract_fingerprint;
pub use types::*;
