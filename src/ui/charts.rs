use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{GridMark, Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::color::{viridis, ColorMap};
use crate::data::aggregate::{MonthKey, MonthlyTable};
use crate::data::filter::FilteredView;
use crate::data::model::Metric;
use crate::forecast::{ForecastOutcome, ForecastPoint, FORECAST_METRIC};
use crate::pipeline::{GrowthTrend, KpiSummary};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every dashboard section for the current snapshot.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(snapshot) = &state.snapshot else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(format!(
                "Waiting for data: {}",
                state.config.source_path.display()
            ));
        });
        return;
    };

    ui.heading("AI Revenue & R&D Dashboard");

    if let Some(msg) = snapshot.empty_message() {
        ui.add_space(12.0);
        info_box(ui, msg);
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(kpis) = &snapshot.kpis {
                kpi_cards(ui, kpis);
            }

            section(ui, "Time-Series Overview");
            time_series(ui, &snapshot.view, &state.company_colors);

            section(ui, "Events vs Stock Impact");
            events_scatter(ui, &snapshot.view);

            section(ui, "Monthly Averages");
            monthly_heatmap(ui, &snapshot.monthly);

            if let Some(outcome) = &snapshot.forecast {
                section(
                    ui,
                    &format!("{}-Month Forecast (Monthly)", state.config.forecast_horizon),
                );
                forecast_chart(ui, outcome);
            }

            section(ui, "AI Revenue Growth Trend");
            growth_trend(ui, &snapshot.growth);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.heading(title);
}

fn info_box(ui: &mut Ui, msg: &str) {
    ui.group(|ui: &mut Ui| {
        ui.label(RichText::new(msg).color(Color32::LIGHT_BLUE));
    });
}

fn warning_box(ui: &mut Ui, msg: &str) {
    ui.group(|ui: &mut Ui| {
        ui.label(RichText::new(msg).color(Color32::YELLOW));
    });
}

// -- Axis helpers --

fn day_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn day_label(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.to_string())
        .unwrap_or_default()
}

fn month_label(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    MonthKey::from_ordinal(mark.value.round() as i64).label()
}

fn fmt_millions(v: Option<f64>) -> String {
    v.map(|v| format!("${v:.1} M")).unwrap_or_else(|| "n/a".to_string())
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

fn kpi_cards(ui: &mut Ui, kpis: &KpiSummary) {
    let cards = [
        ("Latest AI Revenue", fmt_millions(kpis.latest_ai_revenue)),
        ("Latest R&D", fmt_millions(kpis.latest_rd_spending)),
        (
            "Avg Growth (%)",
            kpis.average_growth
                .map(|g| format!("{g:.1} %"))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        ("Events", kpis.event_count.to_string()),
    ];

    ui.columns(cards.len(), |cols| {
        for (col, (title, value)) in cols.iter_mut().zip(cards) {
            col.group(|ui: &mut Ui| {
                ui.label(title);
                ui.heading(RichText::new(value).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Time series: R&D spending and AI revenue per company
// ---------------------------------------------------------------------------

fn time_series(ui: &mut Ui, view: &FilteredView, colors: &ColorMap) {
    // company → (rd points, revenue points)
    let mut per_company: BTreeMap<&str, (Vec<[f64; 2]>, Vec<[f64; 2]>)> = BTreeMap::new();
    for r in view.records() {
        let entry = per_company.entry(r.company.as_str()).or_default();
        let x = day_x(r.date);
        if let Some(v) = r.rd_spending {
            entry.0.push([x, v]);
        }
        if let Some(v) = r.ai_revenue {
            entry.1.push([x, v]);
        }
    }

    Plot::new("time_series")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("USD (millions)")
        .x_axis_formatter(day_label)
        .show(ui, |plot_ui| {
            for (company, (rd, revenue)) in per_company {
                let color = colors.color_for(company);
                plot_ui.line(
                    Line::new(PlotPoints::from(rd))
                        .name(format!("{company} – {}", Metric::RdSpending.label()))
                        .color(color)
                        .width(1.5),
                );
                plot_ui.line(
                    Line::new(PlotPoints::from(revenue))
                        .name(format!("{company} – {}", Metric::AiRevenue.label()))
                        .color(color)
                        .style(LineStyle::dashed_loose())
                        .width(1.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Events: growth vs stock impact, sized by revenue
// ---------------------------------------------------------------------------

/// One event row that has both plot coordinates.
#[derive(Debug, Clone, PartialEq)]
struct EventPoint<'a> {
    label: &'a str,
    growth: f64,
    impact: f64,
    revenue: f64,
}

/// Event rows with growth and stock impact present. Rows missing either are
/// skipped; a missing revenue only shrinks the marker.
fn plottable_events(view: &FilteredView) -> Vec<EventPoint<'_>> {
    view.events()
        .filter_map(|r| {
            Some(EventPoint {
                label: r.event.as_deref()?,
                growth: r.revenue_growth_pct?,
                impact: r.stock_impact_pct?,
                revenue: r.ai_revenue.unwrap_or(0.0),
            })
        })
        .collect()
}

fn events_scatter(ui: &mut Ui, view: &FilteredView) {
    if view.events().next().is_none() {
        info_box(ui, "No events in selected range.");
        return;
    }
    let events = plottable_events(view);
    if events.is_empty() {
        info_box(ui, "Events in range are missing growth or stock impact values.");
        return;
    }

    let event_colors = ColorMap::new(events.iter().map(|e| e.label));
    let max_revenue = events.iter().map(|e| e.revenue).fold(0.0_f64, f64::max);

    Plot::new("events_scatter")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(Metric::RevenueGrowth.label())
        .y_axis_label(Metric::StockImpact.label())
        .show(ui, |plot_ui| {
            for event in &events {
                let scale = if max_revenue > 0.0 {
                    event.revenue / max_revenue
                } else {
                    0.0
                };
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[event.growth, event.impact]]))
                        .name(event.label)
                        .color(event_colors.color_for(event.label))
                        .radius(3.0 + 9.0 * scale.max(0.0) as f32),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Monthly heatmap: one row per metric, one column per month
// ---------------------------------------------------------------------------

fn monthly_heatmap(ui: &mut Ui, table: &MonthlyTable) {
    if table.is_empty() {
        info_box(ui, "No monthly data in selected range.");
        return;
    }

    // Per-metric min/max so every row uses its own colour scale.
    let ranges: Vec<Option<(f64, f64)>> = (0..table.metrics().len())
        .map(|col| {
            table
                .rows()
                .filter_map(|(_, means)| means[col])
                .fold(None, |acc: Option<(f64, f64)>, v| {
                    Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
                })
        })
        .collect();

    let cell = egui::vec2(28.0, 22.0);

    egui::ScrollArea::horizontal()
        .id_salt("heatmap_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("monthly_heatmap")
                .spacing(egui::vec2(2.0, 2.0))
                .show(ui, |ui: &mut Ui| {
                    for (col, metric) in table.metrics().iter().enumerate() {
                        ui.label(metric.label());
                        for (month, means) in table.rows() {
                            let (rect, response) =
                                ui.allocate_exact_size(cell, egui::Sense::hover());
                            let hover = match (means[col], ranges[col]) {
                                (Some(v), Some((lo, hi))) => {
                                    let t = if hi > lo { (v - lo) / (hi - lo) } else { 0.5 };
                                    ui.painter().rect_filled(rect, 0.0, viridis(t));
                                    format!("{month} · {}: {v:.2}", metric.label())
                                }
                                _ => format!("{month} · {}: missing", metric.label()),
                            };
                            response.on_hover_text(hover);
                        }
                        ui.end_row();
                    }

                    // Month labels under the grid.
                    ui.label("");
                    for month in table.months() {
                        let text = format!("{:02}\n{}", month.month, month.year);
                        ui.label(RichText::new(text).small());
                    }
                    ui.end_row();
                });
        });
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

fn forecast_chart(ui: &mut Ui, outcome: &ForecastOutcome) {
    let (history, points) = match outcome {
        ForecastOutcome::Ready { history, points } => (history, points),
        other => {
            if let Some(msg) = other.status_message() {
                warning_box(ui, &msg);
            }
            return;
        }
    };

    let observed: PlotPoints = history
        .iter()
        .map(|(m, v)| [m.ordinal() as f64, *v])
        .collect();

    // Forecast lines start at the last observation so they join the history.
    let anchor = history.last().map(|(m, v)| [m.ordinal() as f64, *v]);
    let projected = |pick: fn(&ForecastPoint) -> f64| -> PlotPoints {
        anchor
            .into_iter()
            .chain(points.iter().map(|p| [p.period.ordinal() as f64, pick(p)]))
            .collect()
    };

    Plot::new("forecast")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label(FORECAST_METRIC.label())
        .x_axis_formatter(month_label)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(observed).name("Monthly mean").color(Color32::LIGHT_BLUE));
            plot_ui.line(
                Line::new(projected(|p| p.estimate))
                    .name("Forecast")
                    .color(Color32::from_rgb(65, 105, 225))
                    .width(2.0),
            );
            plot_ui.line(
                Line::new(projected(|p| p.lower))
                    .name("Lower bound")
                    .color(Color32::GRAY)
                    .style(LineStyle::dashed_loose()),
            );
            plot_ui.line(
                Line::new(projected(|p| p.upper))
                    .name("Upper bound")
                    .color(Color32::GRAY)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

// ---------------------------------------------------------------------------
// Growth trend: daily values and rolling mean
// ---------------------------------------------------------------------------

fn growth_trend(ui: &mut Ui, growth: &GrowthTrend) {
    let to_points = |series: &[(NaiveDate, Option<f64>)]| -> PlotPoints {
        series
            .iter()
            .filter_map(|(d, v)| v.map(|v| [day_x(*d), v]))
            .collect()
    };

    Plot::new("growth_trend")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("Growth %")
        .x_axis_formatter(day_label)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(to_points(&growth.daily))
                    .name("Daily")
                    .color(Color32::LIGHT_GRAY),
            );
            plot_ui.line(
                Line::new(to_points(&growth.smoothed))
                    .name(format!("{}-day MA", growth.window))
                    .color(Color32::RED)
                    .width(2.0),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterState};
    use crate::data::model::{Dataset, Record};

    fn view(records: Vec<Record>) -> FilteredView {
        let ds = Dataset::from_records(records);
        filter(&ds, &FilterState::all(&ds))
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn events_missing_coordinates_are_skipped_not_hidden() {
        let v = view(vec![
            Record::new(day(1), "A", None, Some(5.0), Some(1.0), Some(0.5), Some("Deal".into())),
            Record::new(day(2), "A", None, None, None, Some(0.7), Some("Launch".into())),
            Record::new(day(3), "A", None, None, Some(2.0), Some(-0.3), Some("Launch".into())),
            Record::new(day(4), "A", None, Some(9.0), Some(4.0), Some(1.0), None),
        ]);

        let points = plottable_events(&v);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "Deal");
        assert_eq!(points[1].revenue, 0.0);
        assert_eq!(points[1].impact, -0.3);
    }

    #[test]
    fn events_without_any_coordinates_still_count_as_events() {
        let v = view(vec![Record::new(
            day(1),
            "A",
            None,
            None,
            None,
            None,
            Some("Deal".into()),
        )]);
        assert_eq!(v.events().count(), 1);
        assert!(plottable_events(&v).is_empty());
    }
}
