//! Features Module - transaction → model input encoding

pub mod layout;
pub mod vector;

pub use layout::{feature_name, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::FeatureVector;
