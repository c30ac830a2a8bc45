//! Configuration loading for the reporter.
//!
//! All reporter settings can be loaded from a TOML configuration file. Every
//! section is optional and falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metadata::{DEFAULT_EXCLUSIONS, DEFAULT_RENAMES};

/// Complete reporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Input, archive and output directories
    #[serde(default)]
    pub paths: PathsConfig,
    /// Chart image settings
    #[serde(default)]
    pub chart: ChartConfig,
    /// Parameter label tables
    #[serde(default)]
    pub labels: LabelConfig,
}

impl ReporterConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Toml)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Default configuration with every directory placed under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            paths: PathsConfig::rooted_at(root),
            ..Self::default()
        }
    }
}

/// Directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `.csv` exports
    pub input_dir: PathBuf,
    /// Directory successfully processed exports are moved into
    pub imported_dir: PathBuf,
    /// Directory charts are written to
    pub graph_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::rooted_at(Path::new(""))
    }
}

impl PathsConfig {
    /// Default layout below `root`.
    pub fn rooted_at(root: &Path) -> Self {
        let input_dir = root.join("Netlogo outputs");
        Self {
            imported_dir: input_dir.join("imported"),
            input_dir,
            graph_dir: root.join("graphs"),
        }
    }

    /// All directories the reporter needs, in creation order.
    pub fn all(&self) -> [&Path; 3] {
        [&self.input_dir, &self.imported_dir, &self.graph_dir]
    }
}

/// Chart image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// TrueType font used for all chart text; searched for when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            font_path: None,
        }
    }
}

/// Parameter label tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Short display codes for known parameters
    pub renames: BTreeMap<String, String>,
    /// Parameters left out of labels (substring match)
    pub exclude: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            renames: DEFAULT_RENAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            exclude: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# BehaviorSpace report configuration

[paths]
input_dir = "Netlogo outputs"
imported_dir = "Netlogo outputs/imported"
graph_dir = "graphs"

[chart]
width = 1000
height = 600
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

[labels]
exclude = [
    "print-enabled",
    "initial-number-honest-agents",
    "initial-number-deceptive-agents",
    "number-of-trees",
]

[labels.renames]
max-belief-factor = "MBF"
credulity-factor = "CF"
slander-ratio = "SR"
reputation-spread = "RS"
number-of-trees = "NoT"
deception-intensity = "DI"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReporterConfig::default();

        assert_eq!(config.paths.input_dir, Path::new("Netlogo outputs"));
        assert_eq!(
            config.paths.imported_dir,
            Path::new("Netlogo outputs/imported")
        );
        assert_eq!(config.paths.graph_dir, Path::new("graphs"));
        assert_eq!(config.chart.width, 1000);
        assert!(config.chart.font_path.is_none());
        assert_eq!(config.labels.renames.get("slander-ratio").map(String::as_str), Some("SR"));
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [paths]
            input_dir = "in"
            graph_dir = "out"

            [chart]
            width = 640
            font_path = "fonts/Sans.ttf"
        "#;

        let config = ReporterConfig::from_str(toml).unwrap();

        assert_eq!(config.paths.input_dir, Path::new("in"));
        assert_eq!(config.paths.graph_dir, Path::new("out"));
        assert_eq!(config.chart.width, 640);
        assert_eq!(config.chart.height, 600);
        assert_eq!(config.chart.font_path.as_deref(), Some(Path::new("fonts/Sans.ttf")));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [chart]
            height = 480
        "#;

        let config = ReporterConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.chart.height, 480);
        // Default values
        assert_eq!(config.chart.width, 1000);
        assert_eq!(config.labels.exclude.len(), 4);
        assert_eq!(config.paths.graph_dir, Path::new("graphs"));
    }

    #[test]
    fn test_label_tables_replace_defaults() {
        let toml = r#"
            [labels]
            exclude = ["debug"]

            [labels.renames]
            trust-decay = "TD"
        "#;

        let config = ReporterConfig::from_str(toml).unwrap();

        assert_eq!(config.labels.exclude, vec!["debug".to_string()]);
        assert_eq!(config.labels.renames.len(), 1);
        assert_eq!(config.labels.renames.get("trust-decay").map(String::as_str), Some("TD"));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = ReporterConfig::from_str(&toml).unwrap();
        let defaults = LabelConfig::default();

        assert_eq!(config.paths.input_dir, Path::new("Netlogo outputs"));
        assert_eq!(config.labels.renames, defaults.renames);
        assert_eq!(config.labels.exclude, defaults.exclude);
    }

    #[test]
    fn test_config_to_toml() {
        let toml = ReporterConfig::default().to_toml().unwrap();

        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[chart]"));
        assert!(toml.contains("max-belief-factor"));
        assert!(!toml.contains("font_path"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = ReporterConfig::from_str("[chart]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReporterConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_rooted_layout() {
        let config = ReporterConfig::rooted_at(Path::new("/tmp/run"));
        let [input, imported, graphs] = config.paths.all();

        assert_eq!(input, Path::new("/tmp/run/Netlogo outputs"));
        assert_eq!(imported, Path::new("/tmp/run/Netlogo outputs/imported"));
        assert_eq!(graphs, Path::new("/tmp/run/graphs"));
    }
}
