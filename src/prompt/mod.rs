// Declare submodules
mod common;
mod consolidation;

pub use common::*;
pub use consolidation::consolidation_prompt;
