use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::filter::FilteredView;
use super::model::Metric;

// ---------------------------------------------------------------------------
// MonthKey – (year, month) grouping key
// ---------------------------------------------------------------------------

/// Calendar month. Orders chronologically; displays as zero-padded `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            MonthKey {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Consecutive month number, handy as a plot x-coordinate.
    pub fn ordinal(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_ordinal(ordinal: i64) -> Self {
        MonthKey {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// MonthlyTable – per-month means
// ---------------------------------------------------------------------------

/// Per-month means of a chosen list of metrics.
///
/// Months iterate chronologically; each row holds one value per requested
/// metric in request order, `None` when the month had no value for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyTable {
    metrics: Vec<Metric>,
    rows: BTreeMap<MonthKey, Vec<Option<f64>>>,
}

impl MonthlyTable {
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Months in chronological order.
    pub fn months(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.rows.keys().copied()
    }

    /// `(month, means)` in chronological order.
    pub fn rows(&self) -> impl Iterator<Item = (MonthKey, &[Option<f64>])> {
        self.rows.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Mean of one metric in one month.
    pub fn mean(&self, month: MonthKey, metric: Metric) -> Option<f64> {
        let col = self.metrics.iter().position(|m| *m == metric)?;
        self.rows.get(&month)?.get(col).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Running sum / count of non-missing values.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group the view by calendar month and average each metric, ignoring missing
/// values. A month where a metric is entirely missing reports `None` for it.
pub fn monthly_average(view: &FilteredView, metrics: &[Metric]) -> MonthlyTable {
    let mut groups: BTreeMap<MonthKey, Vec<MeanAccumulator>> = BTreeMap::new();

    for record in view.records() {
        let accs = groups
            .entry(MonthKey::of(record.date))
            .or_insert_with(|| vec![MeanAccumulator::default(); metrics.len()]);
        for (acc, metric) in accs.iter_mut().zip(metrics) {
            acc.push(record.value(*metric));
        }
    }

    MonthlyTable {
        metrics: metrics.to_vec(),
        rows: groups
            .into_iter()
            .map(|(k, accs)| (k, accs.into_iter().map(MeanAccumulator::mean).collect()))
            .collect(),
    }
}

/// Monthly means of a single metric with missing months dropped, the shape
/// consumed by the forecaster.
pub fn monthly_series(view: &FilteredView, metric: Metric) -> Vec<(MonthKey, f64)> {
    monthly_average(view, &[metric])
        .rows()
        .filter_map(|(month, means)| means[0].map(|v| (month, v)))
        .collect()
}
