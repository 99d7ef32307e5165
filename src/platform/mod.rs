// LogLens - platform/mod.rs
//
// Platform abstraction layer: config discovery and loading, filesystem reads.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
