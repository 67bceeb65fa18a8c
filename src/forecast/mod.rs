// Forecasting seam.
//
// The dashboard only consumes forecasts: a `Forecaster` receives monthly
// means and returns projected periods with an uncertainty band. The core
// decides whether there is enough history to ask at all.

pub mod linear;

use crate::data::aggregate::{monthly_series, MonthKey};
use crate::data::filter::FilteredView;
use crate::data::model::Metric;
use crate::error::ForecastError;

pub use linear::LinearTrendForecaster;

/// Metric projected by the forecast chart.
pub const FORECAST_METRIC: Metric = Metric::AiRevenue;

/// One projected period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub period: MonthKey,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

/// External time-series extrapolation.
pub trait Forecaster {
    /// Project `horizon` periods past the last entry of `history`.
    ///
    /// `history` is ordered and has no missing values.
    fn forecast(
        &self,
        history: &[(MonthKey, f64)],
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;
}

/// What the forecast section should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Too few monthly points; the forecaster was not called.
    InsufficientData { available: usize, required: usize },
    Ready {
        history: Vec<(MonthKey, f64)>,
        points: Vec<ForecastPoint>,
    },
    Failed(ForecastError),
}

impl ForecastOutcome {
    /// Message for the UI when there is nothing to chart.
    pub fn status_message(&self) -> Option<String> {
        match self {
            ForecastOutcome::InsufficientData { .. } => {
                Some("Not enough monthly data to forecast in this range.".to_string())
            }
            ForecastOutcome::Failed(e) => Some(format!("Forecast failed: {e}")),
            ForecastOutcome::Ready { .. } => None,
        }
    }
}

/// Build the monthly history of [`FORECAST_METRIC`] for the view and, when it
/// has at least `min_periods` points, ask the forecaster for `horizon` more.
pub fn run_forecast(
    view: &FilteredView,
    forecaster: &dyn Forecaster,
    horizon: usize,
    min_periods: usize,
) -> ForecastOutcome {
    let history = monthly_series(view, FORECAST_METRIC);

    if history.len() < min_periods {
        log::warn!(
            "Skipping forecast: {} monthly points, {} required",
            history.len(),
            min_periods
        );
        return ForecastOutcome::InsufficientData {
            available: history.len(),
            required: min_periods,
        };
    }

    match forecaster.forecast(&history, horizon) {
        Ok(points) => ForecastOutcome::Ready { history, points },
        Err(e) => {
            log::error!("Forecaster error: {e}");
            ForecastOutcome::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use chrono::NaiveDate;

    use crate::data::filter::{filter, FilterState};
    use crate::data::model::{Dataset, Record};

    /// Records how often it was called and echoes the last value.
    struct CountingForecaster {
        calls: Cell<usize>,
    }

    impl Forecaster for CountingForecaster {
        fn forecast(
            &self,
            history: &[(MonthKey, f64)],
            horizon: usize,
        ) -> Result<Vec<ForecastPoint>, ForecastError> {
            self.calls.set(self.calls.get() + 1);
            let (mut period, last) = *history.last().ok_or(ForecastError::InsufficientData {
                required: 1,
                actual: 0,
            })?;
            let mut out = Vec::new();
            for _ in 0..horizon {
                period = period.next();
                out.push(ForecastPoint {
                    period,
                    estimate: last,
                    lower: last,
                    upper: last,
                });
            }
            Ok(out)
        }
    }

    fn monthly_view(months: u32) -> FilteredView {
        let records = (0..months)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2020 + (i / 12) as i32, i % 12 + 1, 15).unwrap();
                Record::new(date, "A", Some(1.0), Some(100.0 + i as f64), None, None, None)
            })
            .collect();
        let ds = Dataset::from_records(records);
        filter(&ds, &FilterState::all(&ds))
    }

    #[test]
    fn short_history_skips_the_forecaster() {
        let f = CountingForecaster { calls: Cell::new(0) };
        let outcome = run_forecast(&monthly_view(5), &f, 3, 21);

        assert_eq!(
            outcome,
            ForecastOutcome::InsufficientData {
                available: 5,
                required: 21
            }
        );
        assert!(outcome.status_message().unwrap().contains("Not enough"));
        assert_eq!(f.calls.get(), 0);
    }

    #[test]
    fn twenty_points_are_still_too_few() {
        let f = CountingForecaster { calls: Cell::new(0) };
        let outcome = run_forecast(&monthly_view(20), &f, 3, 21);
        assert!(matches!(outcome, ForecastOutcome::InsufficientData { .. }));
        assert_eq!(f.calls.get(), 0);
    }

    #[test]
    fn long_history_is_forecast() {
        let f = CountingForecaster { calls: Cell::new(0) };
        let outcome = run_forecast(&monthly_view(24), &f, 3, 21);

        assert_eq!(f.calls.get(), 1);
        match outcome {
            ForecastOutcome::Ready { history, points } => {
                assert_eq!(history.len(), 24);
                assert_eq!(points.len(), 3);
                assert!(points[0].period > history.last().unwrap().0);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
