//! savecache: CI step that saves build outputs to a remote build cache.
//!
//! The binary wires four stages into a strict sequential pipeline:
//! cache-key template evaluation, path resolution, archive construction
//! and the upload to the cache service. The stages themselves live in
//! their own crates; this crate owns configuration, logging, telemetry
//! and the exit contract.

pub mod cli;
pub mod config;
pub mod step;
pub mod telemetry;
