// ABOUTME: Label normalization and taxonomy storage
// ABOUTME: Reconciles the historical label wire shapes into the canonical LabelSet

pub mod normalize;
pub mod taxonomy;

// Re-export main entry points
pub use normalize::{normalize, normalize_set, normalize_values, RawLabel};
pub use taxonomy::{LabelError, LabelResult, LabelTaxonomy};
