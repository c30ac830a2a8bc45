//! Outcome charts for BehaviorSpace experiment exports.
//!
//! The reporter picks up every `.csv` export waiting in the input directory,
//! splits it into configuration groups, and draws one chart per group with
//! the mean honest and deceptive populations over time. Each chart subtitle
//! carries the configuration label and the win ratio over all runs. Exports
//! whose charts were all written are moved to the imported directory.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐  load   ┌───────────┐  group   ┌──────────────┐  render  ┌────────┐
//! │ input/*.csv │ ──────▶ │ RunTable  │ ───────▶ │ GroupReport  │ ───────▶ │ graphs │
//! └─────────────┘         └───────────┘          └──────────────┘          └────────┘
//!        │                                                 archive on success
//!        └───────────────────────────────────────────────────────────────▶ imported/
//! ```
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with built-in defaults
//! - [`metadata`]: Configuration labels (renames and exclusions)
//! - [`outcome`]: Terminal outcome classification and win ratios
//! - [`series`]: Per-step mean and standard deviation
//! - [`chart`]: Chart rendering behind the [`ChartRenderer`] trait
//! - [`archive`]: Input discovery, naming and archiving

pub mod archive;
pub mod chart;
pub mod config;
pub mod metadata;
pub mod outcome;
pub mod series;

// Re-export config types
pub use config::{
    default_config_toml, ChartConfig, ConfigError, LabelConfig, PathsConfig, ReporterConfig,
};

// Re-export chart types
pub use chart::{chart_path, ChartError, ChartRenderer, ChartRequest, PlottersRenderer};

// Re-export analysis types
pub use metadata::LabelTable;
pub use outcome::{Outcome, OutcomeTally};
pub use series::{StepPoint, StepSeries};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use run_table::{LoadError, RunTable};
use thiserror::Error;

/// Errors that can occur while reporting on an export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The export could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
    /// A filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A chart could not be drawn
    #[error("failed to render {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: ChartError,
    },
    /// The configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReportError {
    fn io(path: &Path, source: io::Error) -> Self {
        ReportError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true when the export itself is malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ReportError::Load(e) if e.is_malformed())
    }
}

/// Whether a batch draws and archives, or only analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Render charts and archive processed exports
    #[default]
    Render,
    /// Load and summarise exports, leaving every file untouched
    DryRun,
}

/// Everything drawn for one configuration group.
#[derive(Debug, Clone)]
pub struct GroupReport {
    /// Chart name without extension
    pub graph_name: String,
    /// `Label: value` list of the configuration
    pub label: String,
    pub tally: OutcomeTally,
    pub series: StepSeries,
}

impl GroupReport {
    /// Chart subtitle: configuration label and win ratio.
    pub fn subtitle(&self) -> String {
        format!("{} | {}", self.label, self.tally)
    }
}

/// Analysis of one export, before anything is written.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub source: PathBuf,
    pub timestamp: String,
    pub header_line: usize,
    pub groups: Vec<GroupReport>,
}

/// Result of fully processing one export.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    /// Where the export was archived; `None` in a dry run
    pub archived_to: Option<PathBuf>,
    /// Charts written, in group order
    pub charts: Vec<PathBuf>,
    pub analysis: FileAnalysis,
}

/// An export that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: ReportError,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    /// Number of exports looked at.
    pub fn files_seen(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// Total charts written over the batch.
    pub fn charts_written(&self) -> usize {
        self.reports.iter().map(|r| r.charts.len()).sum()
    }
}

/// Batch reporter over a configured directory layout.
#[derive(Debug)]
pub struct Reporter<R = PlottersRenderer> {
    config: ReporterConfig,
    labels: LabelTable,
    renderer: R,
}

impl Reporter<PlottersRenderer> {
    /// Creates a reporter drawing PNG charts with `plotters`.
    pub fn new(config: ReporterConfig) -> Self {
        let renderer = PlottersRenderer::from_config(&config.chart);
        Self::with_renderer(config, renderer)
    }
}

impl<R: ChartRenderer> Reporter<R> {
    pub fn with_renderer(config: ReporterConfig, renderer: R) -> Self {
        Self {
            labels: LabelTable::from_config(&config.labels),
            config,
            renderer,
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Creates the input, imported and graph directories.
    pub fn prepare(&self) -> Result<(), ReportError> {
        for dir in self.config.paths.all() {
            fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))?;
        }
        Ok(())
    }

    /// Processes every export in the input directory.
    ///
    /// Failures are logged and collected per file; only directory setup and
    /// listing errors abort the batch.
    pub fn run(&self, mode: BatchMode) -> Result<BatchSummary, ReportError> {
        self.prepare()?;

        let input_dir = &self.config.paths.input_dir;
        let inputs = archive::list_inputs(input_dir).map_err(|e| ReportError::io(input_dir, e))?;
        tracing::info!("Processing {} file(s) from {:?}", inputs.len(), input_dir);

        let mut summary = BatchSummary::default();
        for path in inputs {
            let result = match mode {
                BatchMode::Render => self.process_file(&path),
                BatchMode::DryRun => self.analyze(&path).map(|analysis| FileReport {
                    source: path.clone(),
                    archived_to: None,
                    charts: Vec::new(),
                    analysis,
                }),
            };

            match result {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    tracing::error!("Failed to process {:?}: {}", path, error);
                    summary.failures.push(FileFailure {
                        source: path,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "Batch finished: {} processed, {} failed, {} chart(s) written",
            summary.reports.len(),
            summary.failures.len(),
            summary.charts_written()
        );
        Ok(summary)
    }

    /// Loads an export and computes every group report without writing.
    pub fn analyze(&self, path: &Path) -> Result<FileAnalysis, ReportError> {
        tracing::info!("Analysing {:?}", path);

        let table = RunTable::load(path)?;
        let timestamp = archive::file_timestamp(path).map_err(|e| ReportError::io(path, e))?;

        let groups: Vec<GroupReport> = table
            .config_groups()
            .into_iter()
            .map(|group| {
                let report = GroupReport {
                    graph_name: archive::graph_name(&timestamp, path, &group.key.dash_joined()),
                    label: self.labels.describe(&table.config_columns, group.values()),
                    tally: OutcomeTally::from_records(&group.records),
                    series: StepSeries::from_records(&group.records),
                };
                tracing::debug!(
                    "{}: {} run(s), {} step(s), {}",
                    report.graph_name,
                    group.run_count(),
                    report.series.len(),
                    report.subtitle()
                );
                report
            })
            .collect();

        if groups.is_empty() {
            tracing::warn!("{:?} has a header but no data rows", path);
        }

        Ok(FileAnalysis {
            source: path.to_path_buf(),
            timestamp,
            header_line: table.header_line,
            groups,
        })
    }

    /// Renders every chart of an export, then archives it.
    ///
    /// Either all charts are written and the export is archived, or the
    /// charts written so far are removed and the export stays in place.
    pub fn process_file(&self, path: &Path) -> Result<FileReport, ReportError> {
        let analysis = self.analyze(path)?;

        let mut charts = Vec::with_capacity(analysis.groups.len());
        for group in &analysis.groups {
            let chart = chart_path(&self.config.paths.graph_dir, &group.graph_name);
            let subtitle = group.subtitle();
            let request = ChartRequest {
                title: &group.graph_name,
                subtitle: &subtitle,
                series: &group.series,
            };

            if let Err(source) = self.renderer.render(&request, &chart) {
                charts.push(chart.clone());
                discard_charts(&charts);
                return Err(ReportError::Render {
                    path: chart,
                    source,
                });
            }
            tracing::info!("Chart written: {:?}", chart);
            charts.push(chart);
        }

        let destination =
            archive::archive_path(&self.config.paths.imported_dir, &analysis.timestamp, path);
        if let Err(e) = archive::move_file(path, &destination) {
            discard_charts(&charts);
            return Err(ReportError::io(path, e));
        }
        tracing::info!("Moved {:?} to {:?}", path, destination);

        Ok(FileReport {
            source: path.to_path_buf(),
            archived_to: Some(destination),
            charts,
            analysis,
        })
    }
}

/// Best-effort removal of charts from a failed export.
///
/// Paths that were never written are skipped silently.
fn discard_charts(charts: &[PathBuf]) {
    for chart in charts {
        match fs::remove_file(chart) {
            Ok(()) => tracing::debug!("Removed partial chart {:?}", chart),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove partial chart {:?}: {}", chart, e),
        }
    }
}
