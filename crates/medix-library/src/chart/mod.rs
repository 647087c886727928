use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::OnceLock,
};

use image::{ImageFormat, RgbImage};
use plotters::{
    coord::Shift,
    prelude::*,
    style::{FontStyle, register_font},
};
use tracing::{Level, debug, info, instrument, warn};

use crate::{error::ChartError, library_config::ChartConfig, table::SummaryTable};

pub const WIDTH_VS_HEIGHT: &str = "width_vs_height.png";
pub const SIZE_PER_FILE: &str = "size_per_file.png";
pub const AUDIO_DURATION: &str = "audio_duration.png";
pub const IMAGE_RESOLUTIONS: &str = "image_resolutions.png";

const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
const SEA_GREEN: RGBColor = RGBColor(60, 179, 113);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const SALMON: RGBColor = RGBColor(250, 128, 114);

const FONT: &str = "sans-serif";
static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_READY: OnceLock<bool> = OnceLock::new();

type DrawResult = Result<(), Box<dyn Error>>;
type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Renders the summary charts. Works only on the table; media files are never reopened.
#[derive(Debug, Clone)]
pub struct Visualizer {
    config: ChartConfig,
}

impl Visualizer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Rasterizes every applicable chart in memory, without touching the filesystem.
    pub fn charts(&self, table: &SummaryTable) -> Result<Vec<(&'static str, RgbImage)>, ChartError> {
        ensure_font()?;

        let (w, h) = (self.config.width, self.config.height);
        let layout = Layout::new(w, h);

        let points = dimension_points(table);
        let sizes = size_bars(table);
        let mut charts = vec![
            plot(WIDTH_VS_HEIGHT, w, h, |root| scatter_chart(root, &layout, &points, DARK_ORANGE))?,
            plot(SIZE_PER_FILE, w, h, |root| {
                bar_chart(root, &layout, "Size per file", "size (KB)", &sizes, SEA_GREEN)
            })?,
        ];

        if table.of_type("audio").next().is_some() {
            let durations = duration_bars(table);
            charts.push(plot(AUDIO_DURATION, w, h, |root| {
                bar_chart(root, &layout, "Audio duration", "duration (s)", &durations, SKY_BLUE)
            })?);
        }

        if table.of_type("image").next().is_some() {
            let resolutions = resolution_counts(table);
            charts.push(plot(IMAGE_RESOLUTIONS, w, h, |root| {
                bar_chart(root, &layout, "Image resolutions", "files", &resolutions, SALMON)
            })?);
        }

        Ok(charts)
    }

    /// Writes every chart into `out_dir` and returns the written paths.
    #[instrument(level = Level::INFO, skip(self, table), fields(out_dir = %out_dir.display()))]
    pub fn render(&self, table: &SummaryTable, out_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
        fs::create_dir_all(out_dir).map_err(|source| ChartError::CreateDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for (file_name, img) in self.charts(table)? {
            let path = out_dir.join(file_name);
            img.save_with_format(&path, ImageFormat::Png)
                .map_err(|source| ChartError::Write {
                    path: path.clone(),
                    source,
                })?;
            info!(chart = %path.display(), "chart written");

            if self.config.show {
                present(&path);
            }
            written.push(path);
        }

        Ok(written)
    }
}

/// `(width, height)` of every row carrying both.
pub fn dimension_points(table: &SummaryTable) -> Vec<(f64, f64)> {
    table
        .rows()
        .iter()
        .filter_map(|row| Some((row.get_f64("width")?, row.get_f64("height")?)))
        .collect()
}

pub fn size_bars(table: &SummaryTable) -> Vec<(String, f64)> {
    named_values(table.rows().iter(), "size_kb")
}

pub fn duration_bars(table: &SummaryTable) -> Vec<(String, f64)> {
    named_values(table.of_type("audio"), "duration_seconds")
}

/// Occurrences of each resolution among image rows, most frequent first.
pub fn resolution_counts(table: &SummaryTable) -> Vec<(String, f64)> {
    let mut counts: Vec<(String, f64)> = Vec::new();
    for res in table.of_type("image").filter_map(|row| row.get_str("resolution")) {
        match counts.iter_mut().find(|(r, _)| r == res) {
            Some((_, n)) => *n += 1.0,
            None => counts.push((res.to_string(), 1.0)),
        }
    }
    counts.sort_by(|a, b| b.1.total_cmp(&a.1));
    counts
}

fn named_values<'a>(rows: impl Iterator<Item = &'a medix_probe::SummaryRow>, field: &str) -> Vec<(String, f64)> {
    rows.filter_map(|row| Some((row.get_str("name")?.to_string(), row.get_f64(field)?)))
        .collect()
}

/// The bundled font is registered once per process; plotters looks it up by family name.
fn ensure_font() -> Result<(), ChartError> {
    let ready = *FONT_READY.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_DATA).is_ok());
    if ready { Ok(()) } else { Err(ChartError::Font) }
}

/// Margins, label areas and text sizes scale with the canvas so that the plot area
/// keeps a positive size down to the smallest accepted chart.
struct Layout {
    margin: u32,
    caption: f64,
    label: f64,
    x_area: u32,
    y_area: u32,
    dot: i32,
}

impl Layout {
    fn new(width: u32, height: u32) -> Self {
        Layout {
            margin: (height / 50).clamp(4, 12),
            caption: f64::from(height / 20).clamp(10.0, 24.0),
            label: f64::from(height / 40).clamp(8.0, 14.0),
            x_area: (height / 5).clamp(24, 110),
            y_area: (width / 12).clamp(30, 70),
            dot: (height / 100).clamp(2, 5) as i32,
        }
    }
}

fn plot<F>(name: &'static str, width: u32, height: u32, draw: F) -> Result<(&'static str, RgbImage), ChartError>
where
    F: FnOnce(&Root<'_>) -> DrawResult,
{
    rasterize(width, height, draw)
        .map(|img| (name, img))
        .map_err(|e| ChartError::Draw {
            chart: name,
            reason: e.to_string(),
        })
}

fn rasterize<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, Box<dyn Error>>
where
    F: FnOnce(&Root<'_>) -> DrawResult,
{
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    RgbImage::from_raw(width, height, buf).ok_or_else(|| "chart buffer does not match its size".into())
}

/// One bar per entry, x axis labelled with the entry names read top to bottom.
fn bar_chart(
    root: &Root<'_>,
    layout: &Layout,
    title: &str,
    y_desc: &str,
    bars: &[(String, f64)],
    color: RGBColor,
) -> DrawResult {
    let slots = bars.len().max(1) as u32;
    let max = axis_max(bars.iter().map(|(_, v)| *v));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, layout.caption))
        .margin(layout.margin)
        .x_label_area_size(layout.x_area)
        .y_label_area_size(layout.y_area)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0f64..max)?;

    let name_of = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars.get(*i as usize).map(|(name, _)| name.clone()).unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .label_style((FONT, layout.label))
        .axis_desc_style((FONT, layout.label))
        .x_labels(slots as usize)
        .x_label_formatter(&name_of)
        .x_label_style((FONT, layout.label).into_font().transform(FontTransform::Rotate90))
        .y_desc(y_desc)
        .y_label_formatter(&|v: &f64| format_tick(*v))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
        let i = i as u32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value.max(0.0))],
            color.filled(),
        );
        bar.set_margin(0, 0, 2, 2);
        bar
    }))?;

    Ok(())
}

fn scatter_chart(root: &Root<'_>, layout: &Layout, points: &[(f64, f64)], color: RGBColor) -> DrawResult {
    let max_x = axis_max(points.iter().map(|(x, _)| *x));
    let max_y = axis_max(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption("Width vs height", (FONT, layout.caption))
        .margin(layout.margin)
        .x_label_area_size(layout.x_area)
        .y_label_area_size(layout.y_area)
        .build_cartesian_2d(0f64..max_x, 0f64..max_y)?;

    chart
        .configure_mesh()
        .label_style((FONT, layout.label))
        .axis_desc_style((FONT, layout.label))
        .x_desc("width (px)")
        .y_desc("height (px)")
        .x_label_formatter(&|v: &f64| format_tick(*v))
        .y_label_formatter(&|v: &f64| format_tick(*v))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), layout.dot, color.filled())),
    )?;

    Ok(())
}

/// Top of the value axis: 5% headroom over the largest value, 1 when there is nothing to show.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn format_tick(value: f64) -> String {
    if value >= 100.0 || value == value.trunc() {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn display_available() -> bool {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        return true;
    }
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

/// Opens `path` in the system viewer. Failures are only logged.
fn present(path: &Path) {
    if !display_available() {
        debug!(chart = %path.display(), "no display available, skipping preview");
        return;
    }

    let mut cmd = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };

    match cmd.arg(path).status() {
        Ok(status) if status.success() => debug!(chart = %path.display(), "chart opened"),
        Ok(status) => warn!(chart = %path.display(), %status, "chart viewer exited with an error"),
        Err(e) => warn!(chart = %path.display(), error = %e, "could not open chart viewer"),
    }
}
