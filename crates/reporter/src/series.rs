//! Per-step aggregation of agent counts.

use std::collections::BTreeMap;

use run_table::RunRecord;

/// Mean and spread of both populations at one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPoint {
    pub step: u64,
    pub honest_mean: f64,
    /// Sample standard deviation; NaN with a single sample
    pub honest_std: f64,
    pub deceptive_mean: f64,
    /// Sample standard deviation; NaN with a single sample
    pub deceptive_std: f64,
    /// Number of records contributing to this step
    pub samples: usize,
}

impl StepPoint {
    /// Lower and upper edge of the honest ±1σ band.
    pub fn honest_band(&self) -> (f64, f64) {
        band(self.honest_mean, self.honest_std)
    }

    /// Lower and upper edge of the deceptive ±1σ band.
    pub fn deceptive_band(&self) -> (f64, f64) {
        band(self.deceptive_mean, self.deceptive_std)
    }
}

/// Step-ordered aggregate series for one configuration group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSeries {
    pub points: Vec<StepPoint>,
}

impl StepSeries {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut by_step: BTreeMap<u64, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let (honest, deceptive) = by_step.entry(record.step).or_default();
            honest.push(record.honest);
            deceptive.push(record.deceptive);
        }

        let points = by_step
            .into_iter()
            .map(|(step, (honest, deceptive))| StepPoint {
                step,
                honest_mean: mean(&honest),
                honest_std: sample_std(&honest),
                deceptive_mean: mean(&deceptive),
                deceptive_std: sample_std(&deceptive),
                samples: honest.len(),
            })
            .collect();

        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// First and last step, or `None` for an empty series.
    pub fn step_range(&self) -> Option<(u64, u64)> {
        Some((self.points.first()?.step, self.points.last()?.step))
    }

    /// Smallest and largest value covered by either mean line or band.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .flat_map(|p| {
                let (h_lo, h_hi) = p.honest_band();
                let (d_lo, d_hi) = p.deceptive_band();
                [h_lo, h_hi, d_lo, d_hi]
            })
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n-1) standard deviation. NaN when fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Band edges around `mean`; an undefined spread collapses to zero width.
fn band(mean: f64, std: f64) -> (f64, f64) {
    let width = if std.is_nan() { 0.0 } else { std };
    (mean - width, mean + width)
}
