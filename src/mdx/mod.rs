//! MDX preprocessing.
//!
//! Splits documents into prose and fenced code and strips non-code directive
//! markup from the prose.

mod clean;
pub mod segment;


pub use clean::MdxPreprocessor;
pub use segment::{Fence, Segment, split_segments};
