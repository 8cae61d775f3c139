//! Iterbench - cold-cache benchmarking of file iteration strategies
//!
//! This library drives an external file iterator over one or more corpora
//! with every selected traversal strategy, flushing the OS page cache before
//! each timed run, and turns the captured run output into plots, statistics
//! and a console ranking.

pub mod aggregate;
pub mod artifact;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod parser;
pub mod report;
pub mod strategy;
