use std::cell::Cell;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use rd_dashboard::config::{DashboardConfig, SmoothingWindow};
use rd_dashboard::data::aggregate::{monthly_average, MonthKey};
use rd_dashboard::data::filter::{filter, FilterState};
use rd_dashboard::data::loader::load_reader;
use rd_dashboard::data::model::{Dataset, Metric};
use rd_dashboard::error::ForecastError;
use rd_dashboard::export::write_csv;
use rd_dashboard::forecast::{ForecastOutcome, ForecastPoint, Forecaster, LinearTrendForecaster};
use rd_dashboard::pipeline::{DashboardSnapshot, ViewOptions};

const HEADER: &str =
    "Date,Company,R&D_Spending_USD_Mn,AI_Revenue_USD_Mn,AI_Revenue_Growth_%,Stock_Impact_%,Event\n";

/// Companies A and B with ten daily rows each; A's fifth row has zero revenue.
fn two_company_csv() -> String {
    let mut csv = HEADER.to_string();
    for day in 1..=10 {
        for company in ["A", "B"] {
            let revenue = if company == "A" && day == 5 { 0.0 } else { day as f64 };
            let event = if day == 7 { "Launch" } else { "" };
            csv.push_str(&format!(
                "2024-01-{day:02},{company},{},{revenue},{},0.5,{event}\n",
                day * 2,
                day as f64 / 2.0
            ));
        }
    }
    csv
}

fn load(csv: &str) -> Dataset {
    load_reader(csv.as_bytes()).expect("fixture loads")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn companies(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn ratio_is_missing_for_zero_revenue_and_exact_otherwise() {
    let ds = load(&two_company_csv());
    assert_eq!(ds.len(), 20);

    for r in ds.records() {
        match (r.rd_spending, r.ai_revenue) {
            (Some(rd), Some(ai)) if ai != 0.0 => {
                assert!((r.rd_to_ai_ratio.unwrap() - rd / ai).abs() < 1e-12)
            }
            _ => assert_eq!(r.rd_to_ai_ratio, None),
        }
    }

    let a5 = ds
        .records()
        .iter()
        .find(|r| r.company == "A" && r.date == date(2024, 1, 5))
        .unwrap();
    assert_eq!(a5.ai_revenue, Some(0.0));
    assert_eq!(a5.rd_to_ai_ratio, None);
}

#[test]
fn filtering_one_company_over_its_full_range() {
    let ds = load(&two_company_csv());
    let state = FilterState {
        companies: companies(&["B"]),
        start: date(2024, 1, 1),
        end: date(2024, 1, 10),
    };
    let view = filter(&ds, &state);

    assert_eq!(view.len(), 10);
    assert!(view.records().iter().all(|r| r.company == "B"));
    assert!(view.records().windows(2).all(|w| w[0].date <= w[1].date));
}

#[test]
fn full_filter_returns_the_dataset_unchanged() {
    let ds = load(&two_company_csv());
    let view = filter(&ds, &FilterState::all(&ds));
    assert_eq!(view.records(), ds.records());
    assert_eq!(view.refine(&FilterState::all(&ds)), view);
}

#[test]
fn month_without_revenue_reports_missing_but_keeps_other_metrics() {
    let csv = format!(
        "{HEADER}\
         2024-02-28,A,10,4,1,0.1,\n\
         2024-03-01,A,12,,2,0.2,\n\
         2024-03-15,A,14,oops,4,0.4,\n\
         2024-04-02,A,16,8,3,0.3,\n"
    );
    let ds = load(&csv);
    let view = filter(&ds, &FilterState::all(&ds));
    let table = monthly_average(&view, &Metric::RAW);
    let march = MonthKey { year: 2024, month: 3 };

    assert_eq!(table.mean(march, Metric::AiRevenue), None);
    assert_eq!(table.mean(march, Metric::RdSpending), Some(13.0));
    assert_eq!(table.mean(march, Metric::RevenueGrowth), Some(3.0));
    let labels: Vec<String> = table.months().map(|m| m.to_string()).collect();
    assert_eq!(labels, vec!["2024-02", "2024-03", "2024-04"]);
}

struct NeverCalled {
    calls: Cell<usize>,
}

impl Forecaster for NeverCalled {
    fn forecast(
        &self,
        _history: &[(MonthKey, f64)],
        _horizon: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }
}

#[test]
fn five_monthly_points_skip_the_forecast() {
    let mut csv = HEADER.to_string();
    for month in 1..=5 {
        csv.push_str(&format!("2024-{month:02}-10,A,5,{},1,0,\n", month * 10));
    }
    let ds = load(&csv);
    let forecaster = NeverCalled { calls: Cell::new(0) };
    let options = ViewOptions {
        show_forecast: true,
        window: SmoothingWindow::default(),
    };

    let snap = DashboardSnapshot::compute(
        &ds,
        &FilterState::all(&ds),
        options,
        &DashboardConfig::default(),
        &forecaster,
    );

    assert_eq!(
        snap.forecast,
        Some(ForecastOutcome::InsufficientData {
            available: 5,
            required: 21
        })
    );
    assert_eq!(forecaster.calls.get(), 0);
}

#[test]
fn two_years_of_history_produce_a_forecast() {
    let mut csv = HEADER.to_string();
    for i in 0..24 {
        let (year, month) = (2022 + i / 12, i % 12 + 1);
        csv.push_str(&format!("{year}-{month:02}-01,A,5,{},1,0,\n", 100 + 5 * i));
    }
    let ds = load(&csv);
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

    match snap.forecast {
        Some(ForecastOutcome::Ready { points, .. }) => {
            assert_eq!(points.len(), 3);
            assert_eq!(points[0].period, MonthKey { year: 2024, month: 1 });
            assert!((points[0].estimate - 220.0).abs() < 1e-6);
        }
        other => panic!("expected a forecast, got {other:?}"),
    }
}

#[test]
fn smoothing_first_value_matches_raw_and_lengths_agree() {
    let ds = load(&two_company_csv());
    let snap = DashboardSnapshot::compute(
        &ds,
        &FilterState::all(&ds),
        ViewOptions::default(),
        &DashboardConfig::default(),
        &LinearTrendForecaster::default(),
    );
    let growth = &snap.growth;

    assert_eq!(growth.daily.len(), growth.smoothed.len());
    assert_eq!(growth.daily[0], growth.smoothed[0]);
    assert_eq!(growth.window, 30);
}

#[test]
fn export_of_filtered_view_keeps_order_and_adds_derived_columns() {
    let ds = load(&two_company_csv());
    let state = FilterState {
        companies: companies(&["A"]),
        start: date(2024, 1, 4),
        end: date(2024, 1, 6),
    };
    let view = filter(&ds, &state);

    let mut buf = Vec::new();
    write_csv(&view, 7, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with("RD_to_AI_ratio,AI_Revenue_Growth_smooth"));
    assert!(lines[1].starts_with("2024-01-04,A,"));
    // Zero revenue on the 5th: ratio cell is empty.
    assert!(lines[2].starts_with("2024-01-05,A,10.0,0.0,2.5,0.5,,,"));
}
