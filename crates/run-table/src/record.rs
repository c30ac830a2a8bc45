//! Typed run records and configuration groups.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::LoadError;
use crate::loader::{
    load_table, LoadedTable, DECEPTIVE_COUNT_COLUMN, HONEST_COUNT_COLUMN, RUN_NUMBER_MARKER,
    STEP_MARKER,
};

/// One row of simulation output.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Run identifier
    pub run: u64,
    /// Step index within the run
    pub step: u64,
    /// Configuration values, in column order (raw text)
    pub config: Vec<String>,
    /// Honest agents alive at this step
    pub honest: f64,
    /// Deceptive agents alive at this step
    pub deceptive: f64,
}

/// An export with its columns resolved into run records.
#[derive(Debug, Clone)]
pub struct RunTable {
    /// Zero-based line index of the header within the source file
    pub header_line: usize,
    /// Columns strictly between `[run number]` and `[step]`
    pub config_columns: Vec<String>,
    /// Records in file order
    pub records: Vec<RunRecord>,
}

impl RunTable {
    /// Loads and resolves the export at `path`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let loaded = load_table(path)?;
        Self::from_loaded(path, &loaded)
    }

    /// Resolves the required columns of a parsed table.
    pub fn from_loaded(path: &Path, table: &LoadedTable) -> Result<Self, LoadError> {
        let column = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| LoadError::malformed(path, format!("missing column {}", name)))
        };

        let run_idx = column(RUN_NUMBER_MARKER)?;
        let step_idx = column(STEP_MARKER)?;
        let honest_idx = column(HONEST_COUNT_COLUMN)?;
        let deceptive_idx = column(DECEPTIVE_COUNT_COLUMN)?;

        if step_idx <= run_idx {
            return Err(LoadError::malformed(
                path,
                format!("{} must come after {}", STEP_MARKER, RUN_NUMBER_MARKER),
            ));
        }

        let config_range = run_idx + 1..step_idx;
        let config_columns = table.headers[config_range.clone()].to_vec();

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            let line = table.header_line + i + 2;
            let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

            let run = parse_index(cell(run_idx)).ok_or_else(|| {
                LoadError::malformed(path, format!("line {}: bad run number {:?}", line, cell(run_idx)))
            })?;
            let step = parse_index(cell(step_idx)).ok_or_else(|| {
                LoadError::malformed(path, format!("line {}: bad step {:?}", line, cell(step_idx)))
            })?;
            let honest = parse_count(cell(honest_idx)).ok_or_else(|| {
                LoadError::malformed(
                    path,
                    format!("line {}: bad {} {:?}", line, HONEST_COUNT_COLUMN, cell(honest_idx)),
                )
            })?;
            let deceptive = parse_count(cell(deceptive_idx)).ok_or_else(|| {
                LoadError::malformed(
                    path,
                    format!(
                        "line {}: bad {} {:?}",
                        line,
                        DECEPTIVE_COUNT_COLUMN,
                        cell(deceptive_idx)
                    ),
                )
            })?;

            records.push(RunRecord {
                run,
                step,
                config: config_range.clone().map(|idx| cell(idx).to_string()).collect(),
                honest,
                deceptive,
            });
        }

        Ok(Self {
            header_line: table.header_line,
            config_columns,
            records,
        })
    }

    /// Splits the records into configuration groups, ordered by key.
    ///
    /// Records keep their file order inside each group.
    pub fn config_groups(&self) -> Vec<ConfigGroup> {
        let mut groups: BTreeMap<ConfigKey, Vec<RunRecord>> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry(ConfigKey(record.config.clone()))
                .or_default()
                .push(record.clone());
        }

        groups
            .into_iter()
            .map(|(key, records)| ConfigGroup { key, records })
            .collect()
    }
}

/// Parses a non-negative integer, accepting integral floats like `"12.0"`.
fn parse_index(cell: &str) -> Option<u64> {
    if let Ok(value) = cell.parse::<u64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

fn parse_count(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Compares two configuration cells.
///
/// Cells that both read as finite numbers compare numerically, so `"10"`
/// sorts after `"9"`. Numbers sort before text. Equal numbers with different
/// spelling (`"1"`, `"1.0"`) fall back to text order to keep the ordering
/// total.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    let number = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x
            .partial_cmp(&y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Values of every configuration column for one group.
///
/// Equality is on the raw cell text, not on parsed values: `1` and `1.0`
/// in the same column are separate groups, and `false` stays spelt as it
/// is in the export. Only the ordering is numeric-aware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigKey(pub Vec<String>);

impl ConfigKey {
    /// Values joined with `-`, as used in chart file names.
    pub fn dash_joined(&self) -> String {
        self.0.join("-")
    }
}

impl Ord for ConfigKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match compare_cells(a, b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for ConfigKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Records sharing identical configuration values.
#[derive(Debug, Clone)]
pub struct ConfigGroup {
    pub key: ConfigKey,
    pub records: Vec<RunRecord>,
}

impl ConfigGroup {
    /// Configuration values of this group.
    pub fn values(&self) -> &[String] {
        &self.key.0
    }

    /// Number of distinct runs in the group.
    pub fn run_count(&self) -> usize {
        self.records.iter().map(|r| r.run).collect::<BTreeSet<_>>().len()
    }
}
