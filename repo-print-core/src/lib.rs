#![doc = "repo-print-core: core logic library for repo-print."]

//! This crate contains the file selection and rendering pipeline behind repo-print:
//! path matching, content filtering, classification, rendering and output assembly,
//! plus the repository-source collaborators that feed it.
//!
//! # Usage
//! Add this as a dependency for all shared pipeline, rendering, config and snapshot code.
//! The CLI crate only parses configuration and calls [`snapshot::snapshot`].

pub mod assemble;
pub mod classify;
pub mod config;
pub mod content_filter;
pub mod contract;
pub mod matcher;
pub mod pipeline;
pub mod render;
pub mod snapshot;
pub mod source;
