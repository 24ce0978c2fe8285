//! plotters adapter: draws chart specs into `<dir>/<surface>.svg`
use crate::api::errors::VizError;
use crate::presentation::chart_surfaces::{BarChart, CalculusChart, ChartBackend, ChartHandle, ChartSpec, SurfaceId};
use crate::presentation::sampler::PlotSeries;
use crate::presentation::tree_layout::TreeLayout;
use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CHART_SIZE: (u32, u32) = (800, 600);
const LINE_BLUE: RGBColor = RGBColor(59, 130, 246);
const MARKER_RED: RGBColor = RGBColor(239, 68, 68);
const LINK_GREY: RGBColor = RGBColor(148, 163, 184);
const CAPTION_GREY: RGBColor = RGBColor(100, 116, 139);
/// points per Bezier link
const LINK_SEGMENTS: usize = 16;

fn render_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::Render(e.to_string())
}

/// "#rrggbb" -> colour, grey for anything unparsable
pub fn hex_color(hex: &str) -> RGBColor {
    let digits = hex.trim_start_matches('#');
    let channel = |i: usize| digits.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => RGBColor(107, 114, 128),
    }
}

fn cubic(p: [(f64, f64); 4], t: f64) -> (i32, i32) {
    let u = 1.0 - t;
    let x = u * u * u * p[0].0 + 3.0 * u * u * t * p[1].0 + 3.0 * u * t * t * p[2].0 + t * t * t * p[3].0;
    let y = u * u * u * p[0].1 + 3.0 * u * u * t * p[1].1 + 3.0 * u * t * t * p[2].1 + t * t * t * p[3].1;
    (x.round() as i32, y.round() as i32)
}

/// Tree drawing straight onto the drawing area: links first, then the nodes on top
pub fn draw_tree(area: &DrawingArea<SVGBackend, Shift>, tree: &TreeLayout) -> Result<(), VizError> {
    area.fill(&WHITE).map_err(render_err)?;
    for link in &tree.links {
        let curve = tree.link_curve(link);
        let points: Vec<(i32, i32)> = (0..=LINK_SEGMENTS)
            .map(|i| cubic(curve, i as f64 / LINK_SEGMENTS as f64))
            .collect();
        area.draw(&PathElement::new(points, LINK_GREY.stroke_width(2)))
            .map_err(render_err)?;
    }
    for node in &tree.nodes {
        let center = (node.x.round() as i32, node.y.round() as i32);
        let color = hex_color(node.kind.color());
        area.draw(&Circle::new(center, node.radius.round() as i32, color.filled()))
            .map_err(render_err)?;
        let label_style = TextStyle::from(("sans-serif", 16).into_font())
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(node.label.clone(), center, label_style))
            .map_err(render_err)?;
        let caption_style = TextStyle::from(("sans-serif", 10).into_font())
            .color(&CAPTION_GREY)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let caption_at = (center.0, center.1 + node.radius.round() as i32 + 4);
        area.draw(&Text::new(node.kind.as_str().to_string(), caption_at, caption_style))
            .map_err(render_err)?;
    }
    area.present().map_err(render_err)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < 1e-12 {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

pub fn draw_calculus(area: &DrawingArea<SVGBackend, Shift>, spec: &CalculusChart) -> Result<(), VizError> {
    area.fill(&WHITE).map_err(render_err)?;
    let curve = spec.curve();
    let (x_lo, x_hi) = bounds(curve.iter().map(|p| p.x));
    let (y_lo, y_hi) = bounds(curve.iter().map(|p| p.y).chain(std::iter::once(0.0)));
    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(render_err)?;
    let decimals = spec.x_label_decimals;
    chart
        .configure_mesh()
        .x_label_formatter(&|x| format!("{:.*}", decimals, x))
        .draw()
        .map_err(render_err)?;

    let points: Vec<(f64, f64)> = curve.iter().map(|p| (p.x, p.y)).collect();
    if spec.fills_area() {
        chart
            .draw_series(AreaSeries::new(points, 0.0, LINE_BLUE.mix(0.2)).border_style(LINE_BLUE.stroke_width(2)))
            .map_err(render_err)?
            .label(spec.series_label.as_str())
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], LINE_BLUE.mix(0.2).filled()));
    } else {
        chart
            .draw_series(LineSeries::new(points, LINE_BLUE.stroke_width(2)))
            .map_err(render_err)?
            .label(spec.series_label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_BLUE));
    }
    if let PlotSeries::Differentiation { point, .. } = &spec.series {
        let marker = chart
            .draw_series(std::iter::once(Circle::new((point.x, point.y), 6, MARKER_RED.filled())))
            .map_err(render_err)?;
        if let Some(label) = &spec.marker_label {
            marker
                .label(label.as_str())
                .legend(|(x, y)| Circle::new((x + 10, y), 5, MARKER_RED.filled()));
        }
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(render_err)?;
    area.present().map_err(render_err)
}

/// grouped bars, one group per label and one bar per dataset inside the group
pub fn draw_bars(area: &DrawingArea<SVGBackend, Shift>, spec: &BarChart) -> Result<(), VizError> {
    area.fill(&WHITE).map_err(render_err)?;
    let groups = spec.labels.len().max(1);
    let top = (spec.max_value() * 1.1).max(1.0);
    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..groups as f64, 0.0..top)
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .draw()
        .map_err(render_err)?;

    let width = 0.8 / spec.datasets.len().max(1) as f64;
    for (k, dataset) in spec.datasets.iter().enumerate() {
        let bars: Vec<Rectangle<(f64, f64)>> = dataset
            .values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let color = dataset
                    .colors
                    .get(i)
                    .or_else(|| dataset.colors.first())
                    .map_or(LINE_BLUE, |c| hex_color(c));
                let left = i as f64 + 0.1 + k as f64 * width;
                Rectangle::new([(left, 0.0), (left + width, *value)], color.filled())
            })
            .collect();
        let legend_color = dataset.colors.first().map_or(LINE_BLUE, |c| hex_color(c));
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(dataset.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], legend_color.filled()));
    }
    // group names sit above the tallest bar of their group
    let label_style = TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    let group_labels: Vec<Text<(f64, f64), String>> = spec
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let tallest = spec
                .datasets
                .iter()
                .filter_map(|d| d.values.get(i).copied())
                .fold(0.0, f64::max);
            Text::new(label.clone(), (i as f64 + 0.5, tallest), label_style.clone())
        })
        .collect();
    chart.draw_series(group_labels).map_err(render_err)?;
    if spec.datasets.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    area.present().map_err(render_err)
}

/// `ChartBackend` writing one SVG file per surface. Re-rendering a surface overwrites its file.
pub struct SvgChartBackend {
    dir: PathBuf,
    next: u64,
    live: HashMap<ChartHandle, PathBuf>,
}

impl SvgChartBackend {
    pub fn new(dir: &Path) -> Result<Self, VizError> {
        std::fs::create_dir_all(dir)?;
        Ok(SvgChartBackend {
            dir: dir.to_path_buf(),
            next: 0,
            live: HashMap::new(),
        })
    }

    pub fn path_of(&self, surface: SurfaceId) -> PathBuf {
        self.dir.join(format!("{}.svg", surface))
    }

    /// file behind a live chart
    pub fn file_of(&self, handle: ChartHandle) -> Option<&Path> {
        self.live.get(&handle).map(PathBuf::as_path)
    }
}

impl ChartBackend for SvgChartBackend {
    fn create(&mut self, surface: SurfaceId, spec: &ChartSpec) -> Result<ChartHandle, VizError> {
        let path = self.path_of(surface);
        {
            let size = match spec {
                ChartSpec::SyntaxTree(tree) => (tree.width.max(1.0) as u32, tree.height.max(1.0) as u32),
                _ => CHART_SIZE,
            };
            let area = SVGBackend::new(&path, size).into_drawing_area();
            match spec {
                ChartSpec::SyntaxTree(tree) => draw_tree(&area, tree)?,
                ChartSpec::Calculus(chart) => draw_calculus(&area, chart)?,
                ChartSpec::Bars(chart) => draw_bars(&area, chart)?,
            }
        }
        self.next += 1;
        let handle = ChartHandle(self.next);
        info!("drew {} into {}", surface, path.display());
        self.live.insert(handle, path);
        Ok(handle)
    }

    fn destroy(&mut self, surface: SurfaceId, handle: ChartHandle) {
        if self.live.remove(&handle).is_some() {
            debug!("released chart {:?} of {}", handle, surface);
        }
    }
}
