// Linear trend forecaster.
//
// Fits `y = intercept + slope * t` by ordinary least squares over the period
// index and projects it forward. The band around each projection uses the
// standard deviation of the in-sample residuals, widened by `sqrt(h)` for the
// `h`-th step ahead.

use crate::data::aggregate::MonthKey;
use crate::error::ForecastError;

use super::{ForecastPoint, Forecaster};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrendForecaster {
    /// Two-sided confidence level of the band, e.g. `0.95`.
    pub confidence_level: f64,
}

impl Default for LinearTrendForecaster {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

/// Slope, intercept and residual standard deviation of an OLS line.
#[derive(Debug, Clone, Copy)]
struct TrendFit {
    intercept: f64,
    slope: f64,
    residual_std: f64,
}

fn fit_trend(values: &[f64]) -> Result<TrendFit, ForecastError> {
    if values.len() < 2 {
        return Err(ForecastError::InsufficientData {
            required: 2,
            actual: values.len(),
        });
    }

    let n = values.len() as f64;
    let sum_t: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_t2: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();
    let sum_ty: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();

    let denominator = n * sum_t2 - sum_t * sum_t;
    if denominator.abs() < f64::EPSILON {
        return Err(ForecastError::Degenerate("time index has no variance".into()));
    }

    let slope = (n * sum_ty - sum_t * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_t) / n;

    let residuals: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (intercept + slope * i as f64))
        .collect();
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    Ok(TrendFit {
        intercept,
        slope,
        residual_std: variance.sqrt(),
    })
}

/// Approximate two-sided z-score for common confidence levels.
fn z_score(confidence_level: f64) -> f64 {
    match confidence_level {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        _ => 1.96,
    }
}

impl Forecaster for LinearTrendForecaster {
    fn forecast(
        &self,
        history: &[(MonthKey, f64)],
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let values: Vec<f64> = history.iter().map(|(_, v)| *v).collect();
        let fit = fit_trend(&values)?;
        let z = z_score(self.confidence_level);

        let Some(&(mut period, _)) = history.last() else {
            return Ok(Vec::new());
        };
        let last_t = (values.len() - 1) as f64;

        let mut points = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            period = period.next();
            let estimate = fit.intercept + fit.slope * (last_t + h as f64);
            let half_width = z * fit.residual_std * (h as f64).sqrt();
            points.push(ForecastPoint {
                period,
                estimate,
                lower: estimate - half_width,
                upper: estimate + half_width,
            });
        }
        Ok(points)
    }
}
