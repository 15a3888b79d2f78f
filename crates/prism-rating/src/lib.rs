//! Rating pipeline: per-metric colors rolled up into sector and final colors.

pub mod errors;
pub mod model;
pub mod pipeline;

pub use errors::{RatingError, Result};
pub use model::{ColorCounts, RatingResult, RatingSummary};
pub use pipeline::{RatingPipeline, compute};
