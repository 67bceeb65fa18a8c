use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Metric, Record};

// ---------------------------------------------------------------------------
// Filter predicate: selected companies and an inclusive date range
// ---------------------------------------------------------------------------

/// The user's current selection. Pure value; every interaction builds a new
/// [`FilteredView`] from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Selected companies. Empty means nothing is shown.
    pub companies: BTreeSet<String>,
    /// Inclusive lower bound.
    pub start: NaiveDate,
    /// Inclusive upper bound.
    pub end: NaiveDate,
}

impl FilterState {
    /// Select every company over the full date span (i.e., show everything).
    pub fn all(dataset: &Dataset) -> Self {
        let (start, end) = dataset
            .date_span()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterState {
            companies: dataset.companies().iter().cloned().collect(),
            start,
            end,
        }
    }

    /// Whether a record passes the filter.
    ///
    /// An inverted range (`start > end`) matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        self.start <= record.date
            && record.date <= self.end
            && self.companies.contains(&record.company)
    }

    pub fn has_inverted_range(&self) -> bool {
        self.start > self.end
    }

    /// Toggle a single company in the selection.
    pub fn toggle_company(&mut self, company: &str) {
        if !self.companies.remove(company) {
            self.companies.insert(company.to_string());
        }
    }

    /// Select all companies of the dataset.
    pub fn select_all_companies(&mut self, dataset: &Dataset) {
        self.companies = dataset.companies().iter().cloned().collect();
    }

    /// Deselect every company.
    pub fn select_no_companies(&mut self) {
        self.companies.clear();
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The rows of a [`Dataset`] passing a [`FilterState`], in dataset order
/// (ascending date). May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    records: Vec<Record>,
}

/// Apply the filter to the whole dataset.
pub fn filter(dataset: &Dataset, state: &FilterState) -> FilteredView {
    filter_records(dataset.records(), state)
}

fn filter_records<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    state: &FilterState,
) -> FilteredView {
    if state.has_inverted_range() || state.companies.is_empty() {
        return FilteredView::default();
    }
    FilteredView {
        records: records
            .into_iter()
            .filter(|r| state.matches(r))
            .cloned()
            .collect(),
    }
}

impl FilteredView {
    /// Narrow an existing view further.
    pub fn refine(&self, state: &FilterState) -> FilteredView {
        filter_records(&self.records, state)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Last row of the view (the most recent date).
    pub fn latest(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Rows carrying an event label.
    pub fn events(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.event.is_some())
    }

    /// `(date, value)` pairs for one metric, one per row.
    pub fn series(&self, metric: Metric) -> Vec<(NaiveDate, Option<f64>)> {
        self.records.iter().map(|r| (r.date, r.value(metric))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for d in 1..=10 {
            for company in ["A", "B"] {
                records.push(Record::new(
                    date(1, d),
                    company,
                    Some(d as f64),
                    Some(1.0),
                    None,
                    None,
                    None,
                ));
            }
        }
        Dataset::from_records(records)
    }

    fn state(companies: &[&str], start: NaiveDate, end: NaiveDate) -> FilterState {
        FilterState {
            companies: companies.iter().map(|c| c.to_string()).collect(),
            start,
            end,
        }
    }

    #[test]
    fn full_selection_returns_every_row_in_order() {
        let ds = dataset();
        let view = filter(&ds, &FilterState::all(&ds));
        assert_eq!(view.records(), ds.records());
    }

    #[test]
    fn single_company_over_full_range() {
        let ds = dataset();
        let view = filter(&ds, &state(&["B"], date(1, 1), date(1, 10)));
        assert_eq!(view.len(), 10);
        assert!(view.records().iter().all(|r| r.company == "B"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let ds = dataset();
        let view = filter(&ds, &state(&["A"], date(1, 3), date(1, 5)));
        let days: Vec<NaiveDate> = view.records().iter().map(|r| r.date).collect();
        assert_eq!(days, vec![date(1, 3), date(1, 4), date(1, 5)]);
    }

    #[test]
    fn empty_company_set_gives_empty_view() {
        let ds = dataset();
        let view = filter(&ds, &state(&[], date(1, 1), date(1, 10)));
        assert!(view.is_empty());
    }

    #[test]
    fn inverted_range_gives_empty_view() {
        let ds = dataset();
        let view = filter(&ds, &state(&["A", "B"], date(1, 8), date(1, 2)));
        assert!(view.is_empty());
    }

    #[test]
    fn refiltering_is_idempotent() {
        let ds = dataset();
        let narrow = state(&["A"], date(1, 2), date(1, 6));
        let view = filter(&ds, &narrow);

        assert_eq!(view.refine(&narrow), view);
        let wider = state(&["A", "B"], date(1, 1), date(1, 10));
        assert_eq!(view.refine(&wider), view);
    }

    #[test]
    fn toggling_companies() {
        let ds = dataset();
        let mut s = FilterState::all(&ds);
        s.toggle_company("A");
        assert!(!s.companies.contains("A"));
        s.toggle_company("A");
        assert!(s.companies.contains("A"));
        s.select_no_companies();
        assert!(s.companies.is_empty());
        s.select_all_companies(&ds);
        assert_eq!(s.companies.len(), 2);
    }
}
