//! Shared "report pipeline" logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! provider -> reconcile -> combined export -> derivation -> summary
//!
//! The subcommand handlers can then focus on presentation (printing vs charts).

use std::path::Path;

use crate::analytics::{Derivation, derive, validate_budget};
use crate::domain::ReportConfig;
use crate::error::AppError;
use crate::io::export::{read_combined_csv, write_combined_csv};
use crate::io::ingest::{IngestedData, reconcile};
use crate::io::source::MeasurementProvider;

/// All computed outputs of a run that found data.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub derivation: Derivation,
}

/// Result of a pipeline run. An empty reconciliation is not an error.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// No date carried a value; nothing was derived.
    Empty(IngestedData),
    Complete(Box<RunOutput>),
}

/// Reconcile `provider`, write the combined CSV if configured, and derive.
pub fn run_pipeline<P>(provider: &P, config: &ReportConfig) -> Result<PipelineOutcome, AppError>
where
    P: MeasurementProvider + ?Sized,
{
    // Reject bad parameters before anything is written.
    validate_config(config)?;

    // 1) Read and merge every measurement file.
    log::info!("Reading measurements from {}", provider.describe());
    let ingest = reconcile(provider);

    // 2) Persist the merged table before deriving anything from it.
    if let Some(path) = &config.combined_path {
        if ingest.is_empty() {
            log::debug!("Nothing to write to {}", path.display());
        } else {
            write_combined_csv(path, &ingest.series)?;
        }
    }

    derive_outcome(ingest, config)
}

/// Derive from an already reconciled (or re-read) series.
pub fn derive_outcome(
    ingest: IngestedData,
    config: &ReportConfig,
) -> Result<PipelineOutcome, AppError> {
    validate_config(config)?;

    match derive(&ingest.series, &config.budget, config.ma_window) {
        Some(derivation) => Ok(PipelineOutcome::Complete(Box::new(RunOutput {
            ingest,
            derivation,
        }))),
        None => Ok(PipelineOutcome::Empty(ingest)),
    }
}

fn validate_config(config: &ReportConfig) -> Result<(), AppError> {
    validate_budget(&config.budget)?;
    if config.ma_window == 0 {
        return Err(AppError::input("Moving-average window must be at least 1"));
    }
    Ok(())
}

/// Wrap a previously exported combined CSV as ingest output.
pub fn load_combined(path: &Path) -> Result<IngestedData, AppError> {
    let series = read_combined_csv(path)?;
    log::info!("Loaded {} dates from {}", series.len(), path.display());
    Ok(IngestedData {
        series,
        skipped: Vec::new(),
        files_seen: 1,
        files_used: 1,
        source: format!("combined CSV {}", path.display()),
    })
}
