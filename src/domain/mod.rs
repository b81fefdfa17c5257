//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement categories (`Category`)
//! - the reconciled series (`DailyRecord`, `Series`)
//! - derived outputs (`DerivedPoint`, `ColorClass`, `SummaryStatistics`)
//! - configuration (`BudgetModel`, `ReportConfig`)

pub mod types;

pub use types::*;
