// Export the filtered view to CSV.
//
// Columns follow the source file, followed by the derived ratio and the
// rolling mean of growth for the current window. Missing values are empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::Metric;
use crate::data::smooth::rolling_mean;
use crate::error::ExportError;

/// Header of the smoothed growth column.
pub const SMOOTHED_COLUMN: &str = "AI_Revenue_Growth_smooth";

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "R&D_Spending_USD_Mn")]
    rd_spending: Option<f64>,
    #[serde(rename = "AI_Revenue_USD_Mn")]
    ai_revenue: Option<f64>,
    #[serde(rename = "AI_Revenue_Growth_%")]
    revenue_growth_pct: Option<f64>,
    #[serde(rename = "Stock_Impact_%")]
    stock_impact_pct: Option<f64>,
    #[serde(rename = "Event")]
    event: Option<&'a str>,
    #[serde(rename = "RD_to_AI_ratio")]
    rd_to_ai_ratio: Option<f64>,
    #[serde(rename = "AI_Revenue_Growth_smooth")]
    growth_smooth: Option<f64>,
}

/// Write the view as CSV, smoothing growth over `window` rows.
pub fn write_csv<W: Write>(
    view: &FilteredView,
    window: usize,
    writer: W,
) -> Result<(), ExportError> {
    let smoothed = rolling_mean(&view.series(Metric::RevenueGrowth), window);
    let mut out = csv::Writer::from_writer(writer);

    for (record, (_, growth_smooth)) in view.records().iter().zip(smoothed) {
        out.serialize(ExportRow {
            date: record.date,
            company: &record.company,
            rd_spending: record.rd_spending,
            ai_revenue: record.ai_revenue,
            revenue_growth_pct: record.revenue_growth_pct,
            stock_impact_pct: record.stock_impact_pct,
            event: record.event.as_deref(),
            rd_to_ai_ratio: record.rd_to_ai_ratio,
            growth_smooth,
        })?;
    }

    // An empty view still gets a header row.
    if view.is_empty() {
        out.write_record([
            "Date",
            "Company",
            Metric::RdSpending.column(),
            Metric::AiRevenue.column(),
            Metric::RevenueGrowth.column(),
            Metric::StockImpact.column(),
            "Event",
            Metric::RdToAiRatio.column(),
            SMOOTHED_COLUMN,
        ])?;
    }

    out.flush()?;
    Ok(())
}

/// Write the view to a file, replacing it if present.
pub fn export_to_path(view: &FilteredView, window: usize, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_csv(view, window, file)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}
