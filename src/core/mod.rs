// LogLens - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: app, platform, or perform file I/O directly.

pub mod export;
pub mod matcher;
pub mod model;
