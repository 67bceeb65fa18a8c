use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::{DashboardConfig, SmoothingWindow};
use crate::data::cache::DatasetCache;
use crate::data::filter::FilterState;
use crate::data::model::Dataset;
use crate::export::export_to_path;
use crate::forecast::{Forecaster, LinearTrendForecaster};
use crate::pipeline::{DashboardSnapshot, ViewOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Memoized source file.
    cache: DatasetCache,

    /// Loaded dataset (None until the source has been read successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Company and date selection.
    pub filters: FilterState,

    /// Forecast toggle and smoothing window.
    pub options: ViewOptions,

    /// Derived outputs for the current `filters` and `options`.
    pub snapshot: Option<DashboardSnapshot>,

    /// Colour per company.
    pub company_colors: ColorMap,

    forecaster: Box<dyn Forecaster>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_forecaster(config, Box::new(LinearTrendForecaster::default()))
    }

    pub fn with_forecaster(config: DashboardConfig, forecaster: Box<dyn Forecaster>) -> Self {
        Self {
            cache: DatasetCache::new(config.source_path.clone()),
            config,
            dataset: None,
            filters: FilterState::all(&Dataset::default()),
            options: ViewOptions::default(),
            snapshot: None,
            company_colors: ColorMap::default(),
            forecaster,
            status_message: None,
        }
    }

    /// Read the source through the cache. A fresh dataset resets the filters
    /// to "everything"; a cache hit keeps the user's selection.
    pub fn load(&mut self) -> Result<()> {
        let dataset = self
            .cache
            .get()
            .with_context(|| format!("loading {}", self.cache.path().display()))?;

        let unchanged = self
            .dataset
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &dataset));
        if !unchanged {
            self.set_dataset(dataset);
        }
        self.status_message = None;
        Ok(())
    }

    /// Load, turning a failure into the status message.
    pub fn load_or_report(&mut self) {
        if let Err(e) = self.load() {
            log::error!("Failed to load data: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Re-check the source; it is parsed again only if it changed on disk.
    pub fn reload(&mut self) {
        self.load_or_report();
    }

    /// Ingest a newly loaded dataset, initialise filters and colours.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.filters = FilterState::all(&dataset);
        self.company_colors = ColorMap::new(dataset.companies().iter().map(String::as_str));
        self.dataset = Some(dataset);
        self.snapshot = None;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the snapshot if the filters or options changed.
    pub fn refresh(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let stale = self
            .snapshot
            .as_ref()
            .map_or(true, |s| s.filter != self.filters || s.options != self.options);
        if stale {
            self.snapshot = Some(DashboardSnapshot::compute(
                dataset,
                &self.filters,
                self.options,
                &self.config,
                self.forecaster.as_ref(),
            ));
        }
    }

    /// Toggle a single company in the selection.
    pub fn toggle_company(&mut self, company: &str) {
        self.filters.toggle_company(company);
        self.refresh();
    }

    /// Select all companies.
    pub fn select_all(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters.select_all_companies(ds);
            self.refresh();
        }
    }

    /// Deselect all companies.
    pub fn select_none(&mut self) {
        self.filters.select_no_companies();
        self.refresh();
    }

    /// Reset the date range to the dataset's full span.
    pub fn reset_dates(&mut self) {
        if let Some((start, end)) = self.dataset.as_ref().and_then(|ds| ds.date_span()) {
            self.filters.start = start;
            self.filters.end = end;
            self.refresh();
        }
    }

    pub fn set_window(&mut self, days: usize) {
        self.options.window = SmoothingWindow::new(days);
        self.refresh();
    }

    pub fn set_show_forecast(&mut self, show: bool) {
        self.options.show_forecast = show;
        self.refresh();
    }

    /// Write the current view to `path`.
    pub fn export_view(&self, path: &Path) -> Result<()> {
        let snapshot = self.snapshot.as_ref().context("no data loaded")?;
        export_to_path(&snapshot.view, snapshot.growth.window, path)
            .with_context(|| format!("exporting to {}", path.display()))
    }
}
