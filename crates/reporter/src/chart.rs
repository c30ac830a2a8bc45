//! Chart rendering.
//!
//! [`ChartRenderer`] is the seam between the batch pipeline and the image
//! backend. [`PlottersRenderer`] draws PNG files with `plotters`; tests plug in
//! their own renderer to observe what would have been drawn.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::FontStyle;
use thiserror::Error;

use crate::config::ChartConfig;
use crate::series::StepSeries;

/// Extension of every chart file.
pub const IMAGE_EXTENSION: &str = "png";

/// Font family every text element is drawn with.
const FONT_FAMILY: &str = "sans-serif";

/// Places searched for a TrueType font when none is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const HONEST_COLOR: RGBColor = BLUE;
const DECEPTIVE_COLOR: RGBColor = RED;

/// Everything needed to draw one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartRequest<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub series: &'a StepSeries,
}

/// Errors that can occur while rendering a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// No usable font for chart text
    #[error("font unavailable: {0}")]
    Font(String),
    /// Drawing or encoding the image failed
    #[error("drawing failed: {0}")]
    Draw(String),
}

/// Draws a chart image to a file.
pub trait ChartRenderer {
    /// Renders `request` to `path`, replacing any existing file.
    fn render(&self, request: &ChartRequest<'_>, path: &Path) -> Result<(), ChartError>;
}

/// Full path of the chart called `name` inside `graph_dir`.
pub fn chart_path(graph_dir: &Path, name: &str) -> PathBuf {
    // `name` contains dots from the timestamp, so no `with_extension`.
    graph_dir.join(format!("{}.{}", name, IMAGE_EXTENSION))
}

/// PNG renderer backed by `plotters`.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
    font_path: Option<PathBuf>,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            font_path: None,
        }
    }

    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            font_path: config.font_path.clone(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, request: &ChartRequest<'_>, path: &Path) -> Result<(), ChartError> {
        ensure_font(self.font_path.as_deref())?;
        draw_chart(request, path, self.size()).map_err(|e| ChartError::Draw(e.to_string()))
    }
}

/// Registers the chart font once per process.
///
/// The first successful or failed attempt is cached; later renderers share
/// whichever font was registered first.
fn ensure_font(configured: Option<&Path>) -> Result<(), ChartError> {
    static REGISTERED: OnceLock<Result<PathBuf, String>> = OnceLock::new();

    REGISTERED
        .get_or_init(|| {
            let path = match configured {
                Some(path) => path.to_path_buf(),
                None => FONT_CANDIDATES
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.is_file())
                    .ok_or_else(|| {
                        "no TrueType font found; set chart.font_path in the configuration"
                            .to_string()
                    })?,
            };
            register_font_file(&path)?;
            Ok(path)
        })
        .as_ref()
        .map(|_| ())
        .map_err(|e| ChartError::Font(e.clone()))
}

/// Reads a TrueType file and registers it as the chart font family.
fn register_font_file(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    // plotters keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| format!("invalid font {}", path.display()))?;
    tracing::debug!("Registered chart font {:?}", path);
    Ok(())
}

fn draw_chart(
    request: &ChartRequest<'_>,
    path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn std::error::Error>> {
    let series = request.series;

    let (first, last) = series.step_range().unwrap_or((0, 1));
    let x_min = first as f64;
    let x_max = if last > first { last as f64 } else { x_min + 1.0 };
    let (lo, hi) = series.value_range().unwrap_or((0.0, 1.0));
    let y_min = lo.min(0.0);
    let y_max = if hi > y_min { hi * 1.05 } else { y_min + 1.0 };

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(request.title, (FONT_FAMILY, 16))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(request.subtitle, (FONT_FAMILY, 13))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Step")
        .y_desc("Agent Count")
        .draw()?;

    let points = &series.points;
    if points.len() >= 2 {
        let mut band: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.step as f64, p.honest_band().1))
            .collect();
        band.extend(points.iter().rev().map(|p| (p.step as f64, p.honest_band().0)));
        chart.draw_series(std::iter::once(Polygon::new(
            band,
            HONEST_COLOR.mix(0.2).filled(),
        )))?;

        let mut band: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.step as f64, p.deceptive_band().1))
            .collect();
        band.extend(points.iter().rev().map(|p| (p.step as f64, p.deceptive_band().0)));
        chart.draw_series(std::iter::once(Polygon::new(
            band,
            DECEPTIVE_COLOR.mix(0.2).filled(),
        )))?;
    }

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.step as f64, p.honest_mean)),
            HONEST_COLOR.stroke_width(2),
        ))?
        .label("Honest Agents")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], HONEST_COLOR));
    chart
        .draw_series(LineSeries::new(
            points.iter().map(|p| (p.step as f64, p.deceptive_mean)),
            DECEPTIVE_COLOR.stroke_width(2),
        ))?
        .label("Deceptive Agents")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DECEPTIVE_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use run_table::RunRecord;

    #[test]
    fn test_chart_path_keeps_dotted_name() {
        let path = chart_path(
            Path::new("graphs"),
            "2026.10.18-09.30.00 - sweep [0.5-1.2]",
        );

        assert_eq!(
            path,
            Path::new("graphs/2026.10.18-09.30.00 - sweep [0.5-1.2].png")
        );
    }

    #[test]
    fn test_renderer_from_config() {
        let config = ChartConfig {
            width: 800,
            height: 500,
            font_path: Some(PathBuf::from("Sans.ttf")),
        };
        let renderer = PlottersRenderer::from_config(&config);

        assert_eq!(renderer.size(), (800, 500));
        assert_eq!(renderer.font_path.as_deref(), Some(Path::new("Sans.ttf")));
        assert_eq!(PlottersRenderer::new(10, 10).font_path, None);
    }

    #[test]
    fn test_font_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("broken.ttf");
        fs::write(&garbage, b"not a font").unwrap();

        let err = register_font_file(&garbage).unwrap_err();
        assert!(err.starts_with("invalid font"), "{}", err);
        assert!(err.contains("broken.ttf"));

        let err = register_font_file(&dir.path().join("missing.ttf")).unwrap_err();
        assert!(err.starts_with("cannot read"), "{}", err);
    }

    #[test]
    #[ignore = "needs a system TrueType font"]
    fn test_plotters_writes_png() {
        let records: Vec<RunRecord> = (0..2)
            .flat_map(|run| {
                (0..5).map(move |step| RunRecord {
                    run,
                    step,
                    config: Vec::new(),
                    honest: 20.0 + step as f64 + run as f64,
                    deceptive: 10.0 - step as f64 * 2.0,
                })
            })
            .collect();
        let series = StepSeries::from_records(&records);
        let dir = tempfile::tempdir().unwrap();
        let path = chart_path(dir.path(), "chart");

        PlottersRenderer::new(640, 400)
            .render(
                &ChartRequest {
                    title: "chart",
                    subtitle: "MBF: 0.5 | WRH: 100%/0% (2/0)",
                    series: &series,
                },
                &path,
            )
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
