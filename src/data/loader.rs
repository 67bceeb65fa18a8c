use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use super::model::{Dataset, Metric, Record};
use crate::error::LoadError;

/// Non-numeric columns the header must carry.
pub const DATE_COLUMN: &str = "Date";
pub const COMPANY_COLUMN: &str = "Company";
pub const EVENT_COLUMN: &str = "Event";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the dataset from a CSV file on disk.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = load_reader(file)?;
    log::info!(
        "Loaded {} records for {} companies from {}",
        dataset.len(),
        dataset.companies().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse, coerce and sort a CSV stream into a [`Dataset`].
///
/// * Header names are compared after trimming whitespace (and a UTF-8 BOM).
/// * Every date must parse, otherwise the whole load fails.
/// * Numeric cells that do not parse become missing values.
/// * Extra columns are ignored.
pub fn load_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    let mut coerced = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = result?;

        let raw_date = row.get(columns.date).unwrap_or("").trim();
        let date = parse_date(raw_date).ok_or_else(|| LoadError::ParseDate {
            line,
            value: raw_date.to_string(),
        })?;

        let mut numeric = [None; 4];
        for (slot, &col) in numeric.iter_mut().zip(columns.metrics.iter()) {
            let cell = row.get(col).unwrap_or("");
            let value = coerce_numeric(cell);
            if value.is_none() && !is_blank(cell) {
                coerced += 1;
                log::debug!("line {line}: '{cell}' is not numeric, treated as missing");
            }
            *slot = value;
        }
        let [rd_spending, ai_revenue, revenue_growth_pct, stock_impact_pct] = numeric;

        let company = row.get(columns.company).unwrap_or("").trim();
        let event = row
            .get(columns.event)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(Record::new(
            date,
            company,
            rd_spending,
            ai_revenue,
            revenue_growth_pct,
            stock_impact_pct,
            event,
        ));
    }

    if coerced > 0 {
        log::warn!("{coerced} numeric cells could not be parsed and were set to missing");
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Position of every required column in the source header.
struct ColumnIndex {
    date: usize,
    company: usize,
    event: usize,
    /// Same order as [`Metric::RAW`].
    metrics: [usize; 4],
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let names: Vec<&str> = headers.iter().map(normalize_header_name).collect();
        let find = |wanted: &str| {
            names
                .iter()
                .position(|n| *n == wanted)
                .ok_or_else(|| LoadError::MissingColumn(wanted.to_string()))
        };

        // First header position of each raw metric.
        let mut found = [None; 4];
        for (pos, name) in names.iter().enumerate() {
            let slot = Metric::from_column(name)
                .and_then(|m| Metric::RAW.iter().position(|raw| *raw == m));
            if let Some(slot) = slot {
                found[slot].get_or_insert(pos);
            }
        }

        let date = find(DATE_COLUMN)?;
        let company = find(COMPANY_COLUMN)?;
        let mut metrics = [0usize; 4];
        for ((slot, pos), metric) in metrics.iter_mut().zip(found).zip(Metric::RAW) {
            *slot = pos.ok_or_else(|| LoadError::MissingColumn(metric.column().to_string()))?;
        }
        let event = find(EVENT_COLUMN)?;

        Ok(ColumnIndex {
            date,
            company,
            event,
            metrics,
        })
    }
}

fn normalize_header_name(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim()
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Permissive numeric coercion: anything that is not a finite number is missing.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a calendar date, accepting plain dates and timestamps (time is dropped).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
