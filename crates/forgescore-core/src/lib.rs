//! forgescore-core — Validator, output parsers, and scoring.
//!
//! This crate defines the data model, the test tool seam, the summary-line
//! parsers, and the validator that ties discovery, staging, invocation, and
//! scoring together.

pub mod config;
pub mod engine;
pub mod error;
pub mod mock;
pub mod model;
pub mod parser;
pub mod report;
pub mod submission;
pub mod traits;
