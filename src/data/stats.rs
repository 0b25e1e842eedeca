//! Read-only aggregate queries over a [`TableView`].

use std::collections::BTreeMap;
use std::fmt;

use super::filter::TableView;
use super::model::CellValue;
use super::schema::{AGE, CAMPAIGN_COLUMNS, INCOME, TOTAL_ACCEPTED, TOTAL_SPEND};

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub customers: usize,
    pub avg_income: Option<f64>,
    pub avg_total_spend: Option<f64>,
    pub avg_accepted_campaigns: Option<f64>,
}

impl Kpis {
    pub fn compute(view: &TableView) -> Self {
        Kpis {
            customers: view.len(),
            avg_income: mean(&view.numbers(INCOME)),
            avg_total_spend: mean(&view.numbers(TOTAL_SPEND)),
            avg_accepted_campaigns: mean(&view.numbers(TOTAL_ACCEPTED)),
        }
    }
}

/// Acceptance rate (%) of each campaign flag, in campaign order.
pub fn acceptance_rates(view: &TableView) -> Vec<(String, f64)> {
    CAMPAIGN_COLUMNS
        .iter()
        .map(|col| {
            let rate = mean(&view.numbers(col)).map_or(0.0, |m| m * 100.0);
            (col.to_string(), rate)
        })
        .collect()
}

/// Mean of `value_col` per distinct `group_col` value. Groups come back
/// sorted; rows with a null group key are left out.
pub fn grouped_mean(view: &TableView, group_col: &str, value_col: &str) -> Vec<(CellValue, f64)> {
    let mut groups: BTreeMap<CellValue, Vec<f64>> = BTreeMap::new();
    for row in view.rows() {
        let key = row.get(group_col).cloned().unwrap_or(CellValue::Null);
        if key.is_null() {
            continue;
        }
        let values = groups.entry(key).or_default();
        if let Some(v) = row.get(value_col).and_then(CellValue::as_f64) {
            values.push(v);
        }
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| mean(&values).map(|m| (key, m)))
        .collect()
}

/// Mean of each column over the view; empty columns average to zero.
pub fn column_means(view: &TableView, columns: &[&str]) -> Vec<(String, f64)> {
    columns
        .iter()
        .map(|col| (col.to_string(), mean(&view.numbers(col)).unwrap_or(0.0)))
        .collect()
}

/// Number of rows per distinct value, most frequent first, nulls skipped.
pub fn value_counts(view: &TableView, column: &str) -> Vec<(CellValue, usize)> {
    let mut counts: BTreeMap<CellValue, usize> = BTreeMap::new();
    for value in view.values(column).filter(|v| !v.is_null()) {
        *counts.entry(value.clone()).or_default() += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

// ---------------------------------------------------------------------------
// Age groups
// ---------------------------------------------------------------------------

/// Right-closed age buckets `(0,30] (30,45] (45,60] (60,100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    UnderThirty,
    ThirtyToFortyFive,
    FortySixToSixty,
    OverSixty,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::UnderThirty,
        AgeGroup::ThirtyToFortyFive,
        AgeGroup::FortySixToSixty,
        AgeGroup::OverSixty,
    ];

    pub fn from_age(age: f64) -> Option<Self> {
        match age {
            a if a <= 0.0 => None,
            a if a <= 30.0 => Some(AgeGroup::UnderThirty),
            a if a <= 45.0 => Some(AgeGroup::ThirtyToFortyFive),
            a if a <= 60.0 => Some(AgeGroup::FortySixToSixty),
            a if a <= 100.0 => Some(AgeGroup::OverSixty),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::UnderThirty => "<30",
            AgeGroup::ThirtyToFortyFive => "30-45",
            AgeGroup::FortySixToSixty => "46-60",
            AgeGroup::OverSixty => "60+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `value_col` split by age group. Every group is present, possibly empty.
pub fn values_by_age_group(view: &TableView, value_col: &str) -> BTreeMap<AgeGroup, Vec<f64>> {
    let mut groups: BTreeMap<AgeGroup, Vec<f64>> =
        AgeGroup::ALL.iter().map(|g| (*g, Vec::new())).collect();
    for row in view.rows() {
        let group = row
            .get(AGE)
            .and_then(CellValue::as_f64)
            .and_then(AgeGroup::from_age);
        let value = row.get(value_col).and_then(CellValue::as_f64);
        if let (Some(group), Some(value)) = (group, value) {
            groups.entry(group).or_default().push(value);
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Box plot summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Quartiles with linear interpolation; whiskers reach the most extreme
    /// values within 1.5 × IQR of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Quantile of sorted data, linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Equal-width bins spanning the data; the last bin includes its right edge.
    pub fn compute(values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (min, max) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
        let width = (max - min) / bins as f64;

        let edges = (0..=bins).map(|i| min + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Histogram { edges, counts })
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// Centre of each bin, paired with its count.
    pub fn centers(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

// ---------------------------------------------------------------------------
// Linear trend
// ---------------------------------------------------------------------------

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearTrend {
    /// `None` with fewer than two points or when every `x` is equal.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let (dx, dy) = (x - mean_x, y - mean_y);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx.abs() < f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy.abs() < f64::EPSILON {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };
        Some(LinearTrend {
            slope,
            intercept,
            r_squared,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Paired `(x, y)` values of two columns, rows with either value missing skipped.
pub fn paired_numbers(view: &TableView, x_col: &str, y_col: &str) -> Vec<[f64; 2]> {
    view.rows()
        .filter_map(|row| {
            let x = row.get(x_col).and_then(CellValue::as_f64)?;
            let y = row.get(y_col).and_then(CellValue::as_f64)?;
            Some([x, y])
        })
        .collect()
}
