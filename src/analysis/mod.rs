//! Structured screen-activity analyses: the record schema, the normalization
//! of raw model output into it, the per-day JSON store, and the review
//! rendering.

pub mod normalize;
pub mod record;
pub mod report;
pub mod store;
