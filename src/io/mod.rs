//! Input/output helpers.
//!
//! - file providers (`source`)
//! - per-file parsing + date reconciliation (`ingest`)
//! - CSV/JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod source;

pub use export::*;
pub use ingest::*;
pub use source::*;
