// One pure pass from the dataset to everything the dashboard draws.
//
// Every interaction builds a fresh `DashboardSnapshot` from the shared
// dataset and the current `FilterState`; nothing derived is kept between
// interactions, so stale derived columns cannot accumulate.

use chrono::NaiveDate;

use crate::config::{DashboardConfig, SmoothingWindow};
use crate::data::aggregate::{monthly_average, MonthlyTable};
use crate::data::filter::{filter, FilterState, FilteredView};
use crate::data::model::{Dataset, Metric};
use crate::data::smooth::rolling_mean;
use crate::forecast::{run_forecast, ForecastOutcome, Forecaster};

/// Options that change what is derived, not which rows are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_forecast: bool,
    pub window: SmoothingWindow,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_forecast: false,
            window: SmoothingWindow::default(),
        }
    }
}

/// Headline numbers over the filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    /// AI revenue on the last row of the view.
    pub latest_ai_revenue: Option<f64>,
    /// R&D spending on the last row of the view.
    pub latest_rd_spending: Option<f64>,
    /// Mean of the non-missing growth values.
    pub average_growth: Option<f64>,
    /// Rows with an event label.
    pub event_count: usize,
}

impl KpiSummary {
    /// `None` for an empty view.
    pub fn compute(view: &FilteredView) -> Option<Self> {
        let latest = view.latest()?;
        let (sum, n) = view
            .records()
            .iter()
            .filter_map(|r| r.revenue_growth_pct)
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));

        Some(KpiSummary {
            latest_ai_revenue: latest.ai_revenue,
            latest_rd_spending: latest.rd_spending,
            average_growth: (n > 0).then(|| sum / n as f64),
            event_count: view.events().count(),
        })
    }
}

/// Daily growth next to its rolling mean, aligned by row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrowthTrend {
    pub daily: Vec<(NaiveDate, Option<f64>)>,
    pub smoothed: Vec<(NaiveDate, Option<f64>)>,
    pub window: usize,
}

/// Everything derived for one interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    /// Rows in the whole dataset, before filtering.
    pub source_rows: usize,
    pub filter: FilterState,
    pub options: ViewOptions,
    pub view: FilteredView,
    pub kpis: Option<KpiSummary>,
    pub monthly: MonthlyTable,
    pub growth: GrowthTrend,
    /// `None` while the forecast toggle is off.
    pub forecast: Option<ForecastOutcome>,
}

impl DashboardSnapshot {
    pub fn compute(
        dataset: &Dataset,
        filter_state: &FilterState,
        options: ViewOptions,
        config: &DashboardConfig,
        forecaster: &dyn Forecaster,
    ) -> Self {
        let view = filter(dataset, filter_state);
        log::debug!(
            "Recomputed view: {} of {} rows ({} companies, {}..={})",
            view.len(),
            dataset.len(),
            filter_state.companies.len(),
            filter_state.start,
            filter_state.end
        );
        if view.is_empty() {
            log::warn!("Filter matches no rows");
        }

        let kpis = KpiSummary::compute(&view);
        let monthly = monthly_average(&view, &Metric::RAW);

        let daily = view.series(Metric::RevenueGrowth);
        let window = options.window.get();
        let smoothed = rolling_mean(&daily, window);

        let forecast = (options.show_forecast && !view.is_empty()).then(|| {
            run_forecast(
                &view,
                forecaster,
                config.forecast_horizon,
                config.forecast_min_periods,
            )
        });

        DashboardSnapshot {
            source_rows: dataset.len(),
            filter: filter_state.clone(),
            options,
            view,
            kpis,
            monthly,
            growth: GrowthTrend {
                daily,
                smoothed,
                window,
            },
            forecast,
        }
    }

    /// Placeholder text when the view has no rows.
    pub fn empty_message(&self) -> Option<&'static str> {
        if !self.view.is_empty() {
            return None;
        }
        if self.source_rows == 0 {
            Some("No data: the source file has no rows.")
        } else if self.filter.has_inverted_range() {
            Some("No data: the start date is after the end date.")
        } else if self.filter.companies.is_empty() {
            Some("No data: select at least one company.")
        } else {
            Some("No data matches the current filters.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use crate::forecast::LinearTrendForecaster;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new(date(1, 1), "A", Some(10.0), Some(5.0), Some(1.0), Some(0.1), None),
            Record::new(
                date(1, 2),
                "B",
                Some(11.0),
                Some(6.0),
                None,
                Some(0.2),
                Some("Deal".into()),
            ),
            Record::new(date(2, 1), "A", Some(12.0), Some(7.0), Some(3.0), Some(0.3), None),
        ])
    }

    #[test]
    fn kpis_come_from_last_row_and_non_missing_growth() {
        let ds = dataset();
        let snap = DashboardSnapshot::compute(
            &ds,
            &FilterState::all(&ds),
            ViewOptions::default(),
            &DashboardConfig::default(),
            &LinearTrendForecaster::default(),
        );
        let kpis = snap.kpis.as_ref().unwrap();
        assert_eq!(kpis.latest_ai_revenue, Some(7.0));
        assert_eq!(kpis.latest_rd_spending, Some(12.0));
        assert_eq!(kpis.average_growth, Some(2.0));
        assert_eq!(kpis.event_count, 1);
        assert_eq!(snap.monthly.len(), 2);
        assert_eq!(snap.growth.daily.len(), snap.growth.smoothed.len());
        assert!(snap.forecast.is_none());
        assert!(snap.empty_message().is_none());
    }

    #[test]
    fn empty_selection_degrades_to_message() {
        let ds = dataset();
        let mut state = FilterState::all(&ds);
        state.select_no_companies();
        let options = ViewOptions {
            show_forecast: true,
            ..ViewOptions::default()
        };
        let snap = DashboardSnapshot::compute(
            &ds,
            &state,
            options,
            &DashboardConfig::default(),
            &LinearTrendForecaster::default(),
        );

        assert!(snap.kpis.is_none());
        assert!(snap.monthly.is_empty());
        assert!(snap.growth.smoothed.is_empty());
        assert!(snap.forecast.is_none());
        assert_eq!(snap.empty_message(), Some("No data: select at least one company."));
    }

    #[test]
    fn inverted_range_has_its_own_message() {
        let ds = dataset();
        let mut state = FilterState::all(&ds);
        std::mem::swap(&mut state.start, &mut state.end);
        let snap = DashboardSnapshot::compute(
            &ds,
            &state,
            ViewOptions::default(),
            &DashboardConfig::default(),
            &LinearTrendForecaster::default(),
        );
        assert!(snap.view.is_empty());
        assert!(snap.empty_message().unwrap().contains("start date"));
    }

    #[test]
    fn empty_source_is_not_blamed_on_the_selection() {
        let ds = Dataset::default();
        let snap = DashboardSnapshot::compute(
            &ds,
            &FilterState::all(&ds),
            ViewOptions::default(),
            &DashboardConfig::default(),
            &LinearTrendForecaster::default(),
        );
        assert_eq!(snap.source_rows, 0);
        assert!(snap.kpis.is_none());
        assert_eq!(snap.empty_message(), Some("No data: the source file has no rows."));
    }

    #[test]
    fn forecast_toggle_with_short_history_reports_insufficient_data() {
        let ds = dataset();
        let options = ViewOptions {
            show_forecast: true,
            ..ViewOptions::default()
        };
        let snap = DashboardSnapshot::compute(
            &ds,
            &FilterState::all(&ds),
            options,
            &DashboardConfig::default(),
            &LinearTrendForecaster::default(),
        );
        assert!(matches!(
            snap.forecast,
            Some(ForecastOutcome::InsufficientData { available: 2, .. })
        ));
    }
}
