use chrono::{Days, NaiveDate};

use rd_dashboard::config::SOURCE_FILE;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Starting R&D and AI revenue (USD millions) and yearly revenue drift.
struct CompanyProfile {
    name: &'static str,
    rd_base: f64,
    revenue_base: f64,
    yearly_growth: f64,
}

const COMPANIES: [CompanyProfile; 3] = [
    CompanyProfile {
        name: "OpenAI",
        rd_base: 8.0,
        revenue_base: 2.0,
        yearly_growth: 0.9,
    },
    CompanyProfile {
        name: "Google",
        rd_base: 90.0,
        revenue_base: 40.0,
        yearly_growth: 0.25,
    },
    CompanyProfile {
        name: "Meta",
        rd_base: 60.0,
        revenue_base: 15.0,
        yearly_growth: 0.35,
    },
];

const EVENTS: [&str; 4] = ["Model launch", "Partnership", "Funding round", "Regulatory review"];

fn fmt(v: f64) -> String {
    format!("{v:.2}")
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid start date");
    let days = 5 * 365;

    let mut writer = csv::Writer::from_path(SOURCE_FILE).expect("Failed to create output file");
    writer
        .write_record([
            "Date",
            "Company",
            "R&D_Spending_USD_Mn",
            "AI_Revenue_USD_Mn",
            "AI_Revenue_Growth_%",
            "Stock_Impact_%",
            "Event",
        ])
        .expect("Failed to write header");

    let mut rows = 0usize;
    for day in 0..days {
        let date = start + Days::new(day);
        let years = day as f64 / 365.0;

        for company in &COMPANIES {
            let revenue_trend = company.revenue_base * (1.0 + company.yearly_growth).powf(years);
            let revenue = (revenue_trend * (1.0 + rng.gauss(0.0, 0.05))).max(0.0);
            let rd = (company.rd_base * (1.0 + 0.15 * years) + rng.gauss(0.0, 1.5)).max(0.0);
            let growth = company.yearly_growth * 100.0 / 365.0 + rng.gauss(0.0, 1.2);

            let event = if rng.chance(0.02) {
                EVENTS[(rng.next_u64() % EVENTS.len() as u64) as usize]
            } else {
                ""
            };
            let shock = if event.is_empty() {
                0.0
            } else {
                rng.gauss(1.5, 2.0)
            };
            let impact = rng.gauss(0.0, 0.8) + shock;

            // A few zero-revenue days and unparseable cells, as in real exports.
            let revenue_cell = if rng.chance(0.002) {
                "0".to_string()
            } else if rng.chance(0.002) {
                "n/a".to_string()
            } else {
                fmt(revenue)
            };
            let growth_cell = if rng.chance(0.003) { String::new() } else { fmt(growth) };

            writer
                .write_record([
                    date.to_string(),
                    company.name.to_string(),
                    fmt(rd),
                    revenue_cell,
                    growth_cell,
                    fmt(impact),
                    event.to_string(),
                ])
                .expect("Failed to write row");
            rows += 1;
        }
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {rows} rows for {} companies to {SOURCE_FILE}", COMPANIES.len());
}
