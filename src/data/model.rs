use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Metric – the fixed set of numeric columns
// ---------------------------------------------------------------------------

/// A numeric column of the dataset, including the derived ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    RdSpending,
    AiRevenue,
    RevenueGrowth,
    StockImpact,
    RdToAiRatio,
}

impl Metric {
    /// Columns read from the source file, in header order.
    pub const RAW: [Metric; 4] = [
        Metric::RdSpending,
        Metric::AiRevenue,
        Metric::RevenueGrowth,
        Metric::StockImpact,
    ];

    /// Every metric, raw columns first.
    pub const ALL: [Metric; 5] = [
        Metric::RdSpending,
        Metric::AiRevenue,
        Metric::RevenueGrowth,
        Metric::StockImpact,
        Metric::RdToAiRatio,
    ];

    /// Column name as it appears in the CSV header (and in exports).
    pub fn column(self) -> &'static str {
        match self {
            Metric::RdSpending => "R&D_Spending_USD_Mn",
            Metric::AiRevenue => "AI_Revenue_USD_Mn",
            Metric::RevenueGrowth => "AI_Revenue_Growth_%",
            Metric::StockImpact => "Stock_Impact_%",
            Metric::RdToAiRatio => "RD_to_AI_ratio",
        }
    }

    /// Short human label for legends and axes.
    pub fn label(self) -> &'static str {
        match self {
            Metric::RdSpending => "R&D Spending ($M)",
            Metric::AiRevenue => "AI Revenue ($M)",
            Metric::RevenueGrowth => "AI Revenue Growth (%)",
            Metric::StockImpact => "Stock Impact (%)",
            Metric::RdToAiRatio => "R&D / AI Revenue",
        }
    }

    /// Look a metric up by its column name, ignoring surrounding whitespace.
    pub fn from_column(name: &str) -> Option<Metric> {
        let name = name.trim();
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source file
// ---------------------------------------------------------------------------

/// One company on one day. Numeric fields are `None` when missing or uncoercible.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub company: String,
    pub rd_spending: Option<f64>,
    pub ai_revenue: Option<f64>,
    pub revenue_growth_pct: Option<f64>,
    pub stock_impact_pct: Option<f64>,
    /// `None` means no event that day.
    pub event: Option<String>,
    /// `rd_spending / ai_revenue`, see [`derived_ratio`].
    pub rd_to_ai_ratio: Option<f64>,
}

impl Record {
    /// Build a record, computing the derived ratio from the raw values.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        company: impl Into<String>,
        rd_spending: Option<f64>,
        ai_revenue: Option<f64>,
        revenue_growth_pct: Option<f64>,
        stock_impact_pct: Option<f64>,
        event: Option<String>,
    ) -> Self {
        Self {
            date,
            company: company.into(),
            rd_spending,
            ai_revenue,
            revenue_growth_pct,
            stock_impact_pct,
            event,
            rd_to_ai_ratio: derived_ratio(rd_spending, ai_revenue),
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::RdSpending => self.rd_spending,
            Metric::AiRevenue => self.ai_revenue,
            Metric::RevenueGrowth => self.revenue_growth_pct,
            Metric::StockImpact => self.stock_impact_pct,
            Metric::RdToAiRatio => self.rd_to_ai_ratio,
        }
    }
}

/// R&D-to-revenue ratio. Missing whenever revenue is zero or either side is missing,
/// so the ratio is never infinite.
pub fn derived_ratio(rd_spending: Option<f64>, ai_revenue: Option<f64>) -> Option<f64> {
    match (rd_spending, ai_revenue) {
        (Some(rd), Some(ai)) if ai != 0.0 => Some(rd / ai),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The normalized table, sorted ascending by date. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    /// Company names in order of first appearance.
    companies: Vec<String>,
}

impl Dataset {
    /// Sort the records by date (stable, so same-day rows keep file order)
    /// and index the companies.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.date);

        let mut companies: Vec<String> = Vec::new();
        for r in &records {
            if !companies.contains(&r.company) {
                companies.push(r.company.clone());
            }
        }

        Dataset { records, companies }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// First and last date, `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        let last = self.records.last()?.date;
        Some((first, last))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
