//! Measurement ingest and reconciliation.
//!
//! This module turns two loosely structured file sets (one small CSV per day
//! and category) into a single date-ordered [`Series`].
//!
//! Design goals:
//! - **File-level validation** (skip bad files, but report what happened)
//! - **Deterministic behavior** (same inputs -> same series and skip list,
//!   regardless of directory order or thread scheduling)
//! - **Separation of concerns**: no derivation logic here
//!
//! Value extraction: each file is a CSV whose first row is a header. A column
//! is numeric when every non-missing cell parses as a number. Numeric cells are
//! scanned row-major (row by row, left to right) and the first finite value is
//! the file's measurement.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use csv::StringRecord;
use rayon::prelude::*;

use crate::domain::{Category, Series};
use crate::io::source::{MeasurementFile, MeasurementProvider};

/// Cell spellings treated as missing rather than as text.
const NA_TOKENS: [&str; 12] = [
    "na", "n/a", "nan", "-nan", "null", "none", "#n/a", "#na", "-1.#ind", "1.#qnan", "<na>",
    "#value!",
];

/// Why a single file contributed nothing to the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The identifying name is not a `YYYY-MM-DD` date.
    InvalidDate,
    /// The content could not be read.
    Unreadable(String),
    /// The content is not a usable table.
    Malformed(String),
    /// The table holds no finite numeric cell.
    NoNumericValue,
    /// Another file already supplied this date and category.
    DuplicateDate { kept: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidDate => write!(f, "file name is not a YYYY-MM-DD date"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
            SkipReason::Malformed(e) => write!(f, "malformed table: {e}"),
            SkipReason::NoNumericValue => write!(f, "no numeric value"),
            SkipReason::DuplicateDate { kept } => write!(f, "duplicate date (kept {kept})"),
        }
    }
}

/// A file excluded from the series.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub category: Category,
    pub origin: String,
    pub reason: SkipReason,
}

/// A single dated value extracted from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub category: Category,
    pub date: NaiveDate,
    pub value: f64,
    pub origin: String,
}

/// Per-file result: either a value or a recorded skip.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Parsed(Observation),
    Skipped(SkippedFile),
}

impl FileOutcome {
    fn sort_key(&self) -> (Category, &str) {
        match self {
            FileOutcome::Parsed(o) => (o.category, o.origin.as_str()),
            FileOutcome::Skipped(s) => (s.category, s.origin.as_str()),
        }
    }
}

/// Ingest output: reconciled series + per-file bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub series: Series,
    pub skipped: Vec<SkippedFile>,
    pub files_seen: usize,
    pub files_used: usize,
    /// Provider description (e.g. the data directory).
    pub source: String,
}

impl IngestedData {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Read every file from `provider` and merge PR and GHI values by date.
///
/// Files are read in parallel; the merge is sequential and ordered by
/// `(category, origin)`. Never fails: problem files end up in `skipped`.
pub fn reconcile<P>(provider: &P) -> IngestedData
where
    P: MeasurementProvider + ?Sized,
{
    let mut outcomes: Vec<FileOutcome> = Category::ALL
        .into_iter()
        .flat_map(|category| provider.files(category))
        .par_bridge()
        .map(|file| read_measurement(&file))
        .collect();
    outcomes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let files_seen = outcomes.len();
    let mut values: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
    let mut kept: HashMap<(Category, NaiveDate), String> = HashMap::new();
    let mut skipped = Vec::new();

    for outcome in outcomes {
        let obs = match outcome {
            FileOutcome::Parsed(obs) => obs,
            FileOutcome::Skipped(skip) => {
                log::warn!("Skipping file {}: {}", skip.origin, skip.reason);
                skipped.push(skip);
                continue;
            }
        };

        if let Some(first) = kept.get(&(obs.category, obs.date)) {
            let skip = SkippedFile {
                category: obs.category,
                origin: obs.origin,
                reason: SkipReason::DuplicateDate {
                    kept: first.clone(),
                },
            };
            log::warn!("Skipping file {}: {}", skip.origin, skip.reason);
            skipped.push(skip);
            continue;
        }

        let slot = values.entry(obs.date).or_default();
        match obs.category {
            Category::Ghi => slot.0 = Some(obs.value),
            Category::Pr => slot.1 = Some(obs.value),
        }
        log::debug!("{} {} = {} ({})", obs.category, obs.date, obs.value, obs.origin);
        kept.insert((obs.category, obs.date), obs.origin);
    }

    let files_used = kept.len();
    let series = Series::from_map(values);
    log::info!(
        "Reconciled {} dates from {} files ({} used, {} skipped)",
        series.len(),
        files_seen,
        files_used,
        skipped.len()
    );

    IngestedData {
        series,
        skipped,
        files_seen,
        files_used,
        source: provider.describe(),
    }
}

/// Turn one file into a dated value or a skip.
pub fn read_measurement(file: &MeasurementFile) -> FileOutcome {
    let skip = |reason| {
        FileOutcome::Skipped(SkippedFile {
            category: file.category,
            origin: file.origin.clone(),
            reason,
        })
    };

    let Some(date) = parse_file_date(&file.name) else {
        return skip(SkipReason::InvalidDate);
    };

    let content = match file.read_content() {
        Ok(c) => c,
        Err(e) => return skip(SkipReason::Unreadable(e.to_string())),
    };

    match first_numeric_value(&content) {
        Ok(Some(value)) => FileOutcome::Parsed(Observation {
            category: file.category,
            date,
            value,
            origin: file.origin.clone(),
        }),
        Ok(None) => skip(SkipReason::NoNumericValue),
        Err(e) => skip(SkipReason::Malformed(e)),
    }
}

/// Parse a file's identifying name as an ISO calendar date.
///
/// Names with surrounding whitespace are not dates.
pub fn parse_file_date(name: &str) -> Option<NaiveDate> {
    if name.chars().any(char::is_whitespace) {
        return None;
    }
    NaiveDate::parse_from_str(name, "%Y-%m-%d").ok()
}

/// First finite value among numeric columns, scanning row-major.
///
/// `Ok(None)` means the table parsed but held no usable number.
pub fn first_numeric_value(content: &str) -> Result<Option<f64>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let n_cols = reader
        .headers()
        .map_err(|e| format!("failed to read header: {e}"))?
        .len();
    if n_cols == 0 {
        return Err("empty file".to_string());
    }

    let mut rows: Vec<StringRecord> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV parse error: {e}"))?;
        if record.len() > n_cols {
            // +2: header line plus 1-based numbering.
            return Err(format!(
                "line {} has {} fields, header has {n_cols}",
                idx + 2,
                record.len()
            ));
        }
        rows.push(record);
    }

    let numeric: Vec<bool> = (0..n_cols)
        .map(|col| {
            rows.iter()
                .filter_map(|r| r.get(col))
                .all(|cell| parse_cell(cell).is_ok())
        })
        .collect();

    let first = rows.iter().find_map(|row| {
        row.iter()
            .enumerate()
            .filter(|(col, _)| numeric[*col])
            .find_map(|(_, cell)| parse_cell(cell).ok().flatten().filter(|v| v.is_finite()))
    });

    Ok(first)
}

/// `Ok(None)` for missing cells, `Err(())` for text.
fn parse_cell(cell: &str) -> Result<Option<f64>, ()> {
    let cell = cell.trim().trim_start_matches('\u{feff}');
    if cell.is_empty() || NA_TOKENS.iter().any(|t| cell.eq_ignore_ascii_case(t)) {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some).map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::{DirectoryProvider, MemoryProvider};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_value_is_row_major_over_numeric_columns() {
        let csv = "a,b\n,2.5\n1.5,3.0\n";
        assert_eq!(first_numeric_value(csv).unwrap(), Some(2.5));

        let csv = "a,b\n7,2.5\n";
        assert_eq!(first_numeric_value(csv).unwrap(), Some(7.0));
    }

    #[test]
    fn text_columns_are_ignored_entirely() {
        // Column `a` holds one text cell, so none of its cells count.
        let csv = "a,b\n1.0,\nfoo,4.2\n";
        assert_eq!(first_numeric_value(csv).unwrap(), Some(4.2));
    }

    #[test]
    fn missing_tokens_do_not_make_a_column_textual() {
        let csv = "date,PR\n2024-01-01,NaN\n2024-01-01,N/A\n2024-01-01,78.25\n";
        assert_eq!(first_numeric_value(csv).unwrap(), Some(78.25));
    }

    #[test]
    fn header_only_or_text_only_has_no_value() {
        assert_eq!(first_numeric_value("PR\n").unwrap(), None);
        assert_eq!(first_numeric_value("label\nhello\n").unwrap(), None);
    }

    #[test]
    fn ragged_and_empty_tables_are_malformed() {
        assert!(first_numeric_value("").is_err());
        assert!(first_numeric_value("a\n1,2\n").is_err());
    }

    #[test]
    fn file_dates_must_be_iso() {
        assert_eq!(parse_file_date("2024-03-01"), Some(d(2024, 3, 1)));
        assert_eq!(parse_file_date("01-03-2024"), None);
        assert_eq!(parse_file_date("2024-02-30"), None);
        assert_eq!(parse_file_date("summary"), None);
        assert_eq!(parse_file_date(" 2024-01-01 "), None);
        assert_eq!(parse_file_date("2024-01-01 "), None);
    }

    #[test]
    fn reconcile_merges_by_date_and_keeps_gaps_undefined() {
        let provider = MemoryProvider::new()
            .with_file(Category::Pr, "2024-01-02", "PR\n81.0\n")
            .with_file(Category::Pr, "2024-01-01", "PR\n79.5\n")
            .with_file(Category::Ghi, "2024-01-01", "GHI\n4.4\n")
            .with_file(Category::Ghi, "2024-01-03", "GHI\n1.2\n");

        let data = reconcile(&provider);
        let records = data.series.records();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].date, d(2024, 1, 1));
        assert_eq!(records[0].pr, Some(79.5));
        assert_eq!(records[0].ghi, Some(4.4));

        assert_eq!(records[1].date, d(2024, 1, 2));
        assert_eq!(records[1].ghi, None);

        assert_eq!(records[2].date, d(2024, 1, 3));
        assert_eq!(records[2].pr, None);

        assert_eq!(data.files_seen, 4);
        assert_eq!(data.files_used, 4);
        assert!(data.skipped.is_empty());
    }

    #[test]
    fn reconcile_skips_bad_files_individually() {
        let provider = MemoryProvider::new()
            .with_file(Category::Pr, "2024-01-01", "PR\n80.0\n")
            .with_file(Category::Pr, "not-a-date", "PR\n80.0\n")
            .with_file(Category::Pr, "2024-01-02", "PR\nbroken\n")
            .with_file(Category::Ghi, "2024-01-03", "");

        let data = reconcile(&provider);
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.files_seen, 4);
        assert_eq!(data.files_used, 1);

        let reasons: Vec<_> = data.skipped.iter().map(|s| s.reason.clone()).collect();
        assert!(reasons.contains(&SkipReason::InvalidDate));
        assert!(reasons.contains(&SkipReason::NoNumericValue));
        assert!(reasons.iter().any(|r| matches!(r, SkipReason::Malformed(_))));
    }

    #[test]
    fn all_missing_dates_are_not_materialized() {
        let provider = MemoryProvider::new()
            .with_file(Category::Pr, "2024-05-01", "PR\n\n")
            .with_file(Category::Ghi, "2024-05-01", "GHI\nnan\n");

        let data = reconcile(&provider);
        assert!(data.is_empty());
        assert_eq!(data.skipped.len(), 2);
    }

    #[test]
    fn duplicate_dates_keep_first_origin() {
        // The same day stored under two nested directories.
        let tmp = tempfile::tempdir().unwrap();
        for (dir, value) in [("a", "70.0"), ("b", "90.0")] {
            let nested = tmp.path().join("PR").join(dir);
            std::fs::create_dir_all(&nested).unwrap();
            std::fs::write(nested.join("2024-01-01.csv"), format!("PR\n{value}\n")).unwrap();
        }

        let data = reconcile(&DirectoryProvider::new(tmp.path()));
        assert_eq!(data.series.len(), 1);
        assert_eq!(data.series.records()[0].pr, Some(70.0));
        assert_eq!(data.files_seen, 2);
        assert_eq!(data.skipped.len(), 1);
        let parent = |origin: &str| {
            std::path::Path::new(origin)
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
        };
        assert_eq!(parent(data.skipped[0].origin.as_str()).as_deref(), Some("b"));
        let SkipReason::DuplicateDate { kept } = &data.skipped[0].reason else {
            panic!("expected a duplicate-date skip");
        };
        assert_eq!(parent(kept.as_str()).as_deref(), Some("a"));
    }

    #[test]
    fn reconcile_is_deterministic_and_strictly_ordered() {
        let mut provider = MemoryProvider::new();
        for day in (1..=28).rev() {
            let name = format!("2024-02-{day:02}");
            provider.push(Category::Pr, &name, &format!("PR\n{}\n", 60.0 + day as f64));
            if day % 3 == 0 {
                provider.push(Category::Ghi, &name, &format!("GHI\n{}\n", day as f64 / 4.0));
            }
        }

        let a = reconcile(&provider);
        let b = reconcile(&provider);
        assert_eq!(a.series, b.series);
        assert_eq!(a.skipped, b.skipped);
        assert!(
            a.series
                .records()
                .windows(2)
                .all(|w| w[0].date < w[1].date)
        );
    }

    #[test]
    fn empty_provider_gives_empty_series() {
        let data = reconcile(&MemoryProvider::new());
        assert!(data.is_empty());
        assert_eq!(data.files_seen, 0);
    }
}
