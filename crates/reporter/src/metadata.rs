//! Human-readable labels for experiment configurations.
//!
//! BehaviorSpace names parameters after the model's sliders and switches,
//! which are too long for a chart subtitle. A [`LabelTable`] shortens the
//! interesting ones and drops the noise.

use std::collections::BTreeMap;

use crate::config::LabelConfig;

/// Built-in short codes for well-known parameters.
pub const DEFAULT_RENAMES: &[(&str, &str)] = &[
    ("max-belief-factor", "MBF"),
    ("credulity-factor", "CF"),
    ("slander-ratio", "SR"),
    ("reputation-spread", "RS"),
    ("number-of-trees", "NoT"),
    ("deception-intensity", "DI"),
];

/// Built-in parameters that never appear in labels.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "print-enabled",
    "initial-number-honest-agents",
    "initial-number-deceptive-agents",
    "number-of-trees",
];

/// Rename and exclusion tables used to build configuration labels.
#[derive(Debug, Clone)]
pub struct LabelTable {
    renames: BTreeMap<String, String>,
    exclusions: Vec<String>,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::from_config(&LabelConfig::default())
    }
}

impl LabelTable {
    pub fn new(renames: BTreeMap<String, String>, exclusions: Vec<String>) -> Self {
        Self {
            renames,
            exclusions,
        }
    }

    pub fn from_config(config: &LabelConfig) -> Self {
        Self::new(config.renames.clone(), config.exclude.clone())
    }

    /// Returns true when `name` (brackets stripped) contains an excluded entry.
    pub fn is_excluded(&self, name: &str) -> bool {
        let name = strip_brackets(name);
        self.exclusions.iter().any(|skip| name.contains(skip.as_str()))
    }

    /// Display name for a column, or `None` if the column is excluded.
    pub fn display_name<'a>(&'a self, column: &'a str) -> Option<&'a str> {
        if self.is_excluded(column) {
            return None;
        }
        let name = strip_brackets(column);
        Some(self.renames.get(name).map(String::as_str).unwrap_or(name))
    }

    /// Builds the `Label: value` list for one configuration.
    ///
    /// Pairs keep the column order of the export.
    pub fn describe(&self, columns: &[String], values: &[String]) -> String {
        columns
            .iter()
            .zip(values)
            .filter_map(|(column, value)| {
                self.display_name(column)
                    .map(|label| format!("{}: {}", label, value))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Removes surrounding `[` and `]` from a column name.
pub fn strip_brackets(name: &str) -> &str {
    name.trim_matches(|c| c == '[' || c == ']')
}
