use std::ops::RangeInclusive;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Fixed dashboard settings
// ---------------------------------------------------------------------------

/// Source file read at start-up, relative to the working directory.
pub const SOURCE_FILE: &str = "ai_financial_market_daily_realistic_synthetic.csv";

/// File name offered by the export dialog.
pub const EXPORT_FILE_NAME: &str = "openai_cleaned.csv";

/// Everything the dashboard needs to know that is not user-adjustable.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// CSV loaded into the [`crate::data::model::Dataset`].
    pub source_path: PathBuf,
    /// Default name of the exported view.
    pub export_file_name: String,
    /// Number of future monthly periods requested from the forecaster.
    pub forecast_horizon: usize,
    /// Minimum number of monthly points before the forecaster is invoked.
    pub forecast_min_periods: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(SOURCE_FILE),
            export_file_name: EXPORT_FILE_NAME.to_string(),
            forecast_horizon: 3,
            forecast_min_periods: 21,
        }
    }
}

// ---------------------------------------------------------------------------
// SmoothingWindow – user-adjustable rolling window, in rows
// ---------------------------------------------------------------------------

/// Rolling window length as chosen on the slider. Always within [`Self::RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SmoothingWindow(usize);

impl SmoothingWindow {
    pub const MIN: usize = 7;
    pub const MAX: usize = 90;
    pub const DEFAULT: usize = 30;
    pub const RANGE: RangeInclusive<usize> = Self::MIN..=Self::MAX;

    /// Build a window, clamping out-of-range requests to the nearest bound.
    pub fn new(days: usize) -> Self {
        Self(days.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
