use anyhow::{Result, bail};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

static PUBLISHED_CHARTS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/published_charts.json"
));

/// Default series colors.
pub const PALETTE: [&str; 6] = [
    "#336699", "#dd8800", "#116644", "#2277bb", "#bb7722", "#cc3333",
];

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const MARGIN_LEFT: f64 = 100.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 100.0;
const GRID_LINES: u32 = 5;
const HEADROOM: f64 = 1.2;

/// One set of bars in a chart.  A single series may color each bar individually; with
/// several series the first color is used for every bar of the series.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    #[serde(default)]
    pub colors: Vec<String>,
    pub values: Vec<f64>,
}

/// A bar chart definition.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChartSpec {
    pub file: String,
    pub title: String,
    pub y_label: String,
    #[serde(default)]
    pub unit: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

/// Charts of previously published results.
///
/// # Errors
/// * If the bundled chart definitions cannot be parsed
pub fn published() -> Result<Vec<ChartSpec>> {
    let charts = serde_json::from_str(PUBLISHED_CHARTS)?;
    Ok(charts)
}

impl ChartSpec {
    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() || self.series.is_empty() {
            bail!("Chart {} has no data", self.file);
        }
        for series in &self.series {
            if series.values.len() != self.categories.len() {
                bail!(
                    "Chart {}: series {} has {} values for {} categories",
                    self.file,
                    series.label,
                    series.values.len(),
                    self.categories.len()
                );
            }
            if series.values.iter().any(|value| !value.is_finite() || *value < 0.0) {
                bail!(
                    "Chart {}: series {} has invalid values",
                    self.file,
                    series.label
                );
            }
        }
        Ok(())
    }

    fn max_value(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|series| series.values.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Upper bound of the y axis: 120% of the largest value.
    #[must_use]
    pub fn y_max(&self) -> f64 {
        let max = self.max_value();
        if max > 0.0 {
            max * HEADROOM
        } else {
            1.0
        }
    }

    fn color(&self, series_index: usize, category_index: usize) -> String {
        let series = &self.series[series_index];
        let color = if self.series.len() == 1 {
            series
                .colors
                .get(category_index % series.colors.len().max(1))
                .cloned()
        } else {
            series.colors.first().cloned()
        };
        let palette_index = if self.series.len() == 1 {
            category_index
        } else {
            series_index
        };
        color.unwrap_or_else(|| PALETTE[palette_index % PALETTE.len()].to_string())
    }

    /// Render the chart as an SVG document.
    ///
    /// # Errors
    /// * If the chart has no data or the document cannot be written
    pub fn to_svg(&self) -> Result<String> {
        self.validate()?;

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        start(
            &mut writer,
            "svg",
            &[
                ("xmlns", "http://www.w3.org/2000/svg".to_string()),
                ("width", number(WIDTH)),
                ("height", number(HEIGHT)),
                ("viewBox", format!("0 0 {} {}", number(WIDTH), number(HEIGHT))),
                ("font-family", "sans-serif".to_string()),
            ],
        )?;
        empty(
            &mut writer,
            "rect",
            &[
                ("width", "100%".to_string()),
                ("height", "100%".to_string()),
                ("fill", "#ffffff".to_string()),
            ],
        )?;
        text(
            &mut writer,
            &[
                ("x", number(WIDTH / 2.0)),
                ("y", number(MARGIN_TOP / 2.0)),
                ("text-anchor", "middle".to_string()),
                ("font-size", "22".to_string()),
                ("font-weight", "bold".to_string()),
            ],
            &self.title,
        )?;

        self.write_axes(&mut writer)?;
        self.write_bars(&mut writer)?;
        if self.series.len() > 1 {
            self.write_legend(&mut writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        let svg = String::from_utf8(writer.into_inner())?;
        Ok(svg)
    }

    fn write_axes(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = HEIGHT - MARGIN_BOTTOM;
        let y_max = self.y_max();

        for step in 0..=GRID_LINES {
            let fraction = f64::from(step) / f64::from(GRID_LINES);
            let y = bottom - fraction * plot_height;
            empty(
                writer,
                "line",
                &[
                    ("x1", number(MARGIN_LEFT)),
                    ("y1", number(y)),
                    ("x2", number(WIDTH - MARGIN_RIGHT)),
                    ("y2", number(y)),
                    ("stroke", "#dddddd".to_string()),
                ],
            )?;
            text(
                writer,
                &[
                    ("x", number(MARGIN_LEFT - 10.0)),
                    ("y", number(y + 5.0)),
                    ("text-anchor", "end".to_string()),
                    ("font-size", "12".to_string()),
                ],
                &format!("{:.2}", y_max * fraction),
            )?;
        }

        empty(
            writer,
            "line",
            &[
                ("x1", number(MARGIN_LEFT)),
                ("y1", number(bottom)),
                ("x2", number(WIDTH - MARGIN_RIGHT)),
                ("y2", number(bottom)),
                ("stroke", "#000000".to_string()),
            ],
        )?;

        let label_y = MARGIN_TOP + plot_height / 2.0;
        text(
            writer,
            &[
                ("x", "24".to_string()),
                ("y", number(label_y)),
                ("text-anchor", "middle".to_string()),
                ("font-size", "14".to_string()),
                ("font-weight", "bold".to_string()),
                ("transform", format!("rotate(-90 24 {})", number(label_y))),
            ],
            &self.y_label,
        )?;

        let group_width = self.group_width();
        for (index, category) in self.categories.iter().enumerate() {
            let x = MARGIN_LEFT + group_width * (index as f64 + 0.5);
            text(
                writer,
                &[
                    ("x", number(x)),
                    ("y", number(bottom + 24.0)),
                    ("text-anchor", "middle".to_string()),
                    ("font-size", "13".to_string()),
                ],
                category,
            )?;
        }
        Ok(())
    }

    fn group_width(&self) -> f64 {
        (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / self.categories.len() as f64
    }

    fn write_bars(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = HEIGHT - MARGIN_BOTTOM;
        let y_max = self.y_max();
        let group_width = self.group_width();
        let bar_width = group_width * 0.8 / self.series.len() as f64;
        let single_series = self.series.len() == 1;

        for (series_index, series) in self.series.iter().enumerate() {
            for (category_index, value) in series.values.iter().enumerate() {
                let height = value / y_max * plot_height;
                let x = MARGIN_LEFT
                    + group_width * category_index as f64
                    + group_width * 0.1
                    + bar_width * series_index as f64;
                let y = bottom - height;
                empty(
                    writer,
                    "rect",
                    &[
                        ("x", number(x)),
                        ("y", number(y)),
                        ("width", number(bar_width)),
                        ("height", number(height)),
                        ("fill", self.color(series_index, category_index)),
                        ("fill-opacity", "0.8".to_string()),
                        ("stroke", "#000000".to_string()),
                    ],
                )?;
                if single_series {
                    text(
                        writer,
                        &[
                            ("x", number(x + bar_width / 2.0)),
                            ("y", number(y - 6.0)),
                            ("text-anchor", "middle".to_string()),
                            ("font-size", "13".to_string()),
                            ("font-weight", "bold".to_string()),
                        ],
                        &format!("{value}{}", self.unit),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn write_legend(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let x = MARGIN_LEFT + 20.0;
        for (index, series) in self.series.iter().enumerate() {
            let y = MARGIN_TOP + 10.0 + 24.0 * index as f64;
            empty(
                writer,
                "rect",
                &[
                    ("x", number(x)),
                    ("y", number(y)),
                    ("width", "16".to_string()),
                    ("height", "16".to_string()),
                    ("fill", self.color(index, 0)),
                    ("stroke", "#000000".to_string()),
                ],
            )?;
            text(
                writer,
                &[
                    ("x", number(x + 24.0)),
                    ("y", number(y + 13.0)),
                    ("font-size", "14".to_string()),
                ],
                series.label.trim(),
            )?;
        }
        Ok(())
    }
}

fn number(value: f64) -> String {
    format!("{value:.1}")
}

fn element<'a>(name: &'a str, attributes: &[(&str, String)]) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(
        attributes
            .iter()
            .map(|(key, value)| (*key, value.as_str())),
    )
}

fn start(writer: &mut Writer<Vec<u8>>, name: &str, attributes: &[(&str, String)]) -> Result<()> {
    writer.write_event(Event::Start(element(name, attributes)))?;
    Ok(())
}

fn empty(writer: &mut Writer<Vec<u8>>, name: &str, attributes: &[(&str, String)]) -> Result<()> {
    writer.write_event(Event::Empty(element(name, attributes)))?;
    Ok(())
}

fn text(writer: &mut Writer<Vec<u8>>, attributes: &[(&str, String)], content: &str) -> Result<()> {
    writer.write_event(Event::Start(element("text", attributes)))?;
    writer.write_event(Event::Text(BytesText::new(content)))?;
    writer.write_event(Event::End(BytesEnd::new("text")))?;
    Ok(())
}

/// Render every chart into `directory`, returning the files written.
///
/// # Errors
/// * If the directory cannot be created or a chart cannot be rendered or written
#[instrument(level = "info", skip(charts))]
pub fn write_charts(charts: &[ChartSpec], directory: &Path) -> Result<Vec<PathBuf>> {
    create_dir_all(directory)?;
    let mut files = Vec::with_capacity(charts.len());
    for chart in charts {
        let path = directory.join(&chart.file);
        let svg = chart.to_svg()?;
        fs::write(&path, svg)?;
        debug!("Wrote chart {}", path.display());
        files.push(path);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    fn insert_chart() -> ChartSpec {
        ChartSpec {
            file: "insert.svg".to_string(),
            title: "INSERT performance - 100,000 records".to_string(),
            y_label: "Time (seconds)".to_string(),
            unit: "s".to_string(),
            categories: vec!["PostgreSQL".to_string(), "MySQL & co".to_string()],
            series: vec![Series {
                label: "INSERT".to_string(),
                colors: vec!["#336699".to_string(), "#dd8800".to_string()],
                values: vec![5.22, 1.29],
            }],
        }
    }

    #[test]
    fn test_published() -> Result<()> {
        let charts = published()?;
        assert_eq!(charts.len(), 7);
        for chart in &charts {
            chart.validate()?;
            assert!(chart.file.ends_with(".svg"));
        }
        let select = &charts[1];
        assert_eq!(select.series.len(), 3);
        assert_eq!(select.series[0].label, "PostgreSQL");
        assert_eq!(select.series[0].values, vec![0.52, 4.91, 15.61, 9.06, 25.02, 16.47]);
        Ok(())
    }

    #[test]
    fn test_y_max() {
        let chart = insert_chart();
        assert!((chart.y_max() - 5.22 * 1.2).abs() < 1e-9);

        let mut chart = insert_chart();
        chart.series[0].values = vec![0.0, 0.0];
        assert!((chart.y_max() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_series_svg() -> Result<()> {
        let svg = insert_chart().to_svg()?;
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("INSERT performance - 100,000 records"));
        assert!(svg.contains(">5.22s</text>"));
        assert!(svg.contains(">1.29s</text>"));
        assert!(svg.contains("fill=\"#dd8800\""));
        assert!(svg.contains("MySQL &amp; co"));
        assert!(!svg.contains(">INSERT</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
        Ok(())
    }

    #[test]
    fn test_multiple_series_svg_has_legend() -> Result<()> {
        let chart = ChartSpec {
            file: "order_by.svg".to_string(),
            title: "ORDER BY".to_string(),
            y_label: "Time (ms)".to_string(),
            unit: "ms".to_string(),
            categories: vec!["PostgreSQL".to_string(), "MySQL".to_string()],
            series: vec![
                Series {
                    label: "Before indexes".to_string(),
                    colors: vec!["#cc3333".to_string()],
                    values: vec![16.47, 28.97],
                },
                Series {
                    label: "After indexes".to_string(),
                    colors: Vec::new(),
                    values: vec![0.73, 1.76],
                },
            ],
        };

        let svg = chart.to_svg()?;

        assert!(svg.contains(">Before indexes</text>"));
        assert!(svg.contains(">After indexes</text>"));
        assert!(!svg.contains(">16.47ms</text>"));
        assert!(svg.contains("fill=\"#cc3333\""));
        assert!(svg.contains(&format!("fill=\"{}\"", PALETTE[1])));
        Ok(())
    }

    #[test]
    fn test_invalid_charts() {
        let mut chart = insert_chart();
        chart.series[0].values = vec![1.0];
        assert!(chart.to_svg().is_err());

        let mut chart = insert_chart();
        chart.series[0].values = vec![1.0, -1.0];
        assert!(chart.to_svg().is_err());

        let mut chart = insert_chart();
        chart.categories.clear();
        chart.series[0].values.clear();
        assert!(chart.to_svg().is_err());
    }

    #[test]
    fn test_write_charts() -> Result<()> {
        let directory = tempdir()?;
        let output_dir = directory.path().join("charts");

        let files = write_charts(&[insert_chart()], &output_dir)?;

        assert_eq!(files, vec![output_dir.join("insert.svg")]);
        let svg = fs::read_to_string(&files[0])?;
        assert!(svg.contains("</svg>"));
        Ok(())
    }
}
