//! `pr-report` library crate.
//!
//! The binary (`pr`) is a thin wrapper around this library so that:
//!
//! - the reconcile/derive pipeline is testable without touching the filesystem
//! - file providers and chart sinks can be swapped (directory vs in-memory,
//!   SVG vs terminal preview)

pub mod analytics;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
