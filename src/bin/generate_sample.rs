//! Writes a synthetic `marketing_campaign_data.csv` with the same schema as
//! the public marketing-campaign dataset, including the noise the cleaning
//! pipeline has to deal with.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

const CUSTOMERS: usize = 2_240;

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

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, items: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for (item, w) in items {
            if target < *w {
                return *item;
            }
            target -= w;
        }
        items.last().map_or("", |(item, _)| *item)
    }
}

const MARITAL: [(&str, f64); 8] = [
    ("Married", 38.6),
    ("Together", 25.9),
    ("Single", 21.4),
    ("Divorced", 10.4),
    ("Widow", 3.4),
    ("Alone", 0.15),
    ("Absurd", 0.1),
    ("YOLO", 0.1),
];

const EDUCATION: [(&str, f64); 5] = [
    ("Graduation", 50.3),
    ("PhD", 21.7),
    ("Master", 16.5),
    ("2n Cycle", 9.1),
    ("Basic", 2.4),
];

const COUNTRIES: [(&str, f64); 8] = [
    ("Spain", 48.8),
    ("South Africa", 15.0),
    ("Canada", 12.0),
    ("Australia", 7.1),
    ("India", 6.6),
    ("Germany", 5.2),
    ("United States", 4.9),
    ("Montenegro", 0.4),
];

/// Average two-year spend per product at an income of 50k.
const SPEND_BASE: [f64; 6] = [300.0, 26.0, 165.0, 37.0, 27.0, 44.0];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let first_enrollment = NaiveDate::from_ymd_opt(2012, 7, 30).context("invalid start date")?;

    let output_path = "marketing_campaign_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record([
        "ID",
        "Year_Birth",
        "Education",
        "Marital_Status",
        "Income",
        "Kidhome",
        "Teenhome",
        "Dt_Customer",
        "Recency",
        "MntWines",
        "MntFruits",
        "MntMeatProducts",
        "MntFishProducts",
        "MntSweetProducts",
        "MntGoldProds",
        "AcceptedCmp1",
        "AcceptedCmp2",
        "AcceptedCmp3",
        "AcceptedCmp4",
        "AcceptedCmp5",
        "Response",
        "Country",
    ])?;

    for id in 0..CUSTOMERS {
        // A handful of implausible birth years, as in the public data.
        let year_birth = if rng.chance(0.002) {
            1893 + (rng.next_u64() % 8) as i64
        } else {
            rng.gauss(1969.0, 12.0).round().clamp(1940.0, 1996.0) as i64
        };

        let kids = rng.next_u64() % 3;
        let teens = rng.next_u64() % 3;
        let income = if rng.chance(0.002) {
            666_666.0
        } else {
            (rng.gauss(52_000.0, 21_000.0) - 6_000.0 * kids as f64).clamp(1_730.0, 160_000.0)
        };
        let income_cell = if rng.chance(0.01) {
            String::new()
        } else {
            format!("{income:.0}")
        };

        let enrolled = first_enrollment + Duration::days((rng.next_u64() % 700) as i64);
        let wealth = (income / 50_000.0).min(3.0);

        let spends: Vec<String> = SPEND_BASE
            .iter()
            .map(|base| {
                let v = rng.gauss(base * wealth.powf(1.6), base * 0.4).max(0.0);
                format!("{v:.0}")
            })
            .collect();
        let total_spend: f64 = spends.iter().filter_map(|s| s.parse::<f64>().ok()).sum();

        let propensity = (0.03 + total_spend / 25_000.0).min(0.35);
        let flags: Vec<&str> = (0..6)
            .map(|i| {
                let p = if i == 5 { propensity * 1.8 } else { propensity };
                if rng.chance(p) {
                    "1"
                } else {
                    "0"
                }
            })
            .collect();

        let mut record = vec![
            (5_000 + id).to_string(),
            year_birth.to_string(),
            rng.weighted(&EDUCATION).to_string(),
            rng.weighted(&MARITAL).to_string(),
            income_cell,
            kids.to_string(),
            teens.to_string(),
            enrolled.format("%Y-%m-%d").to_string(),
            (rng.next_u64() % 100).to_string(),
        ];
        record.extend(spends);
        record.extend(flags.iter().map(|f| f.to_string()));
        record.push(rng.weighted(&COUNTRIES).to_string());

        writer.write_record(&record)?;
    }

    writer.flush()?;
    println!("Wrote {CUSTOMERS} customers to {output_path}");
    Ok(())
}
