//! # bazel-bridge
//!
//! Bridges a Maven build's resolved dependency graph into per-project
//! `bazel.json` descriptors for a downstream Bazel build-file generator.
//!
//! ## Architecture
//!
//! - **cache**: Shared probe cache mapping repository URLs to HTTP status,
//!   persisted between builds with a reference-counted lifecycle
//! - **resolve**: Remote-repository resolution per artifact via cached probes
//! - **classify**: Scope bucketing and repository annotation of dependency sets
//! - **descriptor**: Assembly and output of the bazel.json document
//! - **model**: Build-model input types supplied by the build tool
//! - **config**: CLI wiring for the build root and cache maintenance
//! - **error**: Crate-wide error taxonomy

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod model;
pub mod resolve;
