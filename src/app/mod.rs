// LogLens - app/mod.rs
//
// Application layer: live tail orchestration and on-demand summaries.
// Dependencies: core, platform.

pub mod summary;
pub mod tail;
