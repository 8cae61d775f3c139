//! SVG figures: per-run scatter plots and per-strategy box plots
//!
//! One row per corpus, two columns: truncated strategies on the left, full
//! file strategies on the right.

use crate::aggregate::percentile;
use crate::parser::{ResultSet, Sample};
use crate::report::split_by_truncation;

const WIDTH: f64 = 1920.0;
const MIN_HEIGHT: f64 = 1080.0;
const MIN_ROW_HEIGHT: f64 = 240.0;

const MARGIN_LEFT: f64 = 110.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 20.0;

const PLOT_LEFT: f64 = 70.0;
const PLOT_RIGHT: f64 = 20.0;
const PLOT_TOP: f64 = 15.0;
const PLOT_BOTTOM: f64 = 50.0;

const POINT_RADIUS: f64 = 4.0;
const BOX_WIDTH: f64 = 0.5;
const BOX_FILL: &str = "#add8e6";
const MEDIAN_COLOR: &str = "#ff7f0e";

const COLUMN_TITLES: [&str; 2] = ["First 64kB", "Full file"];

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// Data range widened by 5% on both ends
    fn padded(values: impl IntoIterator<Item = f64>) -> Range {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() || !max.is_finite() {
            return Range { min: 0.0, max: 1.0 };
        }

        let pad = if max > min {
            (max - min) * 0.05
        } else if max != 0.0 {
            max.abs() * 0.05
        } else {
            0.5
        };
        Range {
            min: min - pad,
            max: max + pad,
        }
    }

    fn span(&self) -> f64 {
        self.max - self.min
    }

    fn contains(&self, v: f64) -> bool {
        v >= self.min - 1e-12 && v <= self.max + 1e-12
    }
}

/// Tick step of 1, 2 or 5 times a power of ten, aiming for about five ticks
fn tick_step(range: Range) -> f64 {
    let raw = range.span() / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let nice = if norm < 1.5 {
        1.0
    } else if norm < 3.0 {
        2.0
    } else if norm < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn ticks(range: Range, step: f64) -> Vec<f64> {
    let mut out = Vec::new();
    let mut v = (range.min / step).ceil() * step;
    while range.contains(v) {
        out.push(v);
        v += step;
    }
    out
}

fn tick_label(v: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10()).ceil() as usize
    };
    format!("{:.*}", decimals, v)
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

struct Plot {
    area: Rect,
    x: Range,
    y: Range,
}

impl Plot {
    fn in_cell(cell: Rect, x: Range, y: Range) -> Self {
        let area = Rect {
            x: cell.x + PLOT_LEFT,
            y: cell.y + PLOT_TOP,
            w: cell.w - PLOT_LEFT - PLOT_RIGHT,
            h: cell.h - PLOT_TOP - PLOT_BOTTOM,
        };
        Self { area, x, y }
    }

    fn px(&self, v: f64) -> f64 {
        self.area.x + (v - self.x.min) / self.x.span() * self.area.w
    }

    fn py(&self, v: f64) -> f64 {
        self.area.y + self.area.h - (v - self.y.min) / self.y.span() * self.area.h
    }

    /// Frame, y ticks, x ticks and axis labels
    fn draw_axes(&self, svg: &mut String, x_ticks: &[(f64, String)], x_label: Option<&str>) {
        let a = self.area;
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#000\"/>",
            a.x, a.y, a.w, a.h
        ));

        let step = tick_step(self.y);
        for v in ticks(self.y, step) {
            let y = self.py(v);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#000\"/>",
                a.x - 4.0,
                a.x
            ));
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"11\" text-anchor=\"end\">{}</text>",
                a.x - 7.0,
                y + 4.0,
                tick_label(v, step)
            ));
        }

        let bottom = a.y + a.h;
        for (v, label) in x_ticks {
            let x = self.px(*v);
            svg.push_str(&format!(
                "<line x1=\"{x:.1}\" y1=\"{bottom:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
                bottom + 4.0
            ));
            svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
                bottom + 17.0,
                xml_escape(label)
            ));
        }

        if let Some(label) = x_label {
            svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"12\" text-anchor=\"middle\">{}</text>",
                a.x + a.w / 2.0,
                bottom + 36.0,
                label
            ));
        }

        let (lx, ly) = (a.x - 50.0, a.y + a.h / 2.0);
        svg.push_str(&format!(
            "<text x=\"{lx:.1}\" y=\"{ly:.1}\" transform=\"rotate(-90 {lx:.1} {ly:.1})\" font-family=\"sans-serif\" font-size=\"12\" text-anchor=\"middle\">time [s]</text>"
        ));
    }
}

/// Page layout shared by both figure kinds
struct Figure {
    row_height: f64,
    svg: String,
}

impl Figure {
    fn new(corpora: &[&str]) -> Self {
        let rows = corpora.len();
        let height = MIN_HEIGHT.max(MARGIN_TOP + MARGIN_BOTTOM + MIN_ROW_HEIGHT * rows as f64);
        let row_height = (height - MARGIN_TOP - MARGIN_BOTTOM) / rows.max(1) as f64;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{height}\" viewBox=\"0 0 {WIDTH} {height}\">"
        ));
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{WIDTH}\" height=\"{height}\" fill=\"#fff\"/>"
        ));

        let mut figure = Self { row_height, svg };

        for (col, title) in COLUMN_TITLES.iter().enumerate() {
            let cell = figure.cell(0, col);
            figure.svg.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"16\" text-anchor=\"middle\">{}</text>",
                cell.x + PLOT_LEFT + (cell.w - PLOT_LEFT - PLOT_RIGHT) / 2.0,
                MARGIN_TOP - 12.0,
                title
            ));
        }

        for (row, corpus) in corpora.iter().enumerate() {
            let cell = figure.cell(row, 0);
            let (x, y) = (MARGIN_LEFT / 2.0, cell.y + cell.h / 2.0);
            figure.svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{y:.1}\" transform=\"rotate(-90 {x:.1} {y:.1})\" font-family=\"sans-serif\" font-size=\"13\" text-anchor=\"middle\">{}</text>",
                xml_escape(corpus)
            ));
        }

        figure
    }

    fn cell(&self, row: usize, col: usize) -> Rect {
        let w = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0;
        Rect {
            x: MARGIN_LEFT + w * col as f64,
            y: MARGIN_TOP + self.row_height * row as f64,
            w,
            h: self.row_height,
        }
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

fn draw_no_data(svg: &mut String, cell: Rect) {
    let plot = Plot::in_cell(cell, Range { min: 0.0, max: 1.0 }, Range { min: 0.0, max: 1.0 });
    plot.draw_axes(svg, &[], None);
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"12\" fill=\"#888\" text-anchor=\"middle\">no data</text>",
        plot.area.x + plot.area.w / 2.0,
        plot.area.y + plot.area.h / 2.0
    ));
}

fn draw_legend(svg: &mut String, plot: &Plot, labels: &[&str]) {
    let x = plot.area.x + plot.area.w - 90.0;
    for (idx, label) in labels.iter().enumerate() {
        let y = plot.area.y + 14.0 + 16.0 * idx as f64;
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{POINT_RADIUS}\" fill=\"{}\"/>",
            x,
            y - 4.0,
            PALETTE[idx % PALETTE.len()]
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" font-family=\"sans-serif\" font-size=\"11\">{}</text>",
            x + 10.0,
            xml_escape(label)
        ));
    }
}

/// Points of one strategy: (repetition index, seconds)
type Series<'a> = (&'a str, Vec<(f64, f64)>);

fn scatter_panel(svg: &mut String, cell: Rect, series: &[Series<'_>]) {
    let points = || series.iter().flat_map(|(_, pts)| pts.iter().copied());
    if points().next().is_none() {
        draw_no_data(svg, cell);
        return;
    }

    let run_min = points().map(|(x, _)| x).fold(f64::INFINITY, f64::min);
    let run_max = points().map(|(x, _)| x).fold(f64::NEG_INFINITY, f64::max);
    let x = Range {
        min: run_min - 0.5,
        max: run_max + 0.5,
    };
    let plot = Plot::in_cell(cell, x, Range::padded(points().map(|(_, y)| y)));

    let step = tick_step(x).max(1.0).round();
    let x_ticks: Vec<(f64, String)> = ticks(x, step)
        .into_iter()
        .map(|v| (v, tick_label(v, step)))
        .collect();
    plot.draw_axes(svg, &x_ticks, Some("run"));

    for (idx, (_, pts)) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        for &(run, secs) in pts {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{POINT_RADIUS}\" fill=\"{color}\"/>",
                plot.px(run),
                plot.py(secs)
            ));
        }
    }

    let labels: Vec<&str> = series.iter().map(|(label, _)| *label).collect();
    draw_legend(svg, &plot, &labels);
}

/// Per-run scatter figure
pub fn scatter_svg(results: &ResultSet) -> String {
    let corpora: Vec<&str> = results.corpora().collect();
    let mut figure = Figure::new(&corpora);

    for (row, corpus) in corpora.iter().enumerate() {
        let (truncated, full) = split_by_truncation(results.strategies(corpus));
        for (col, group) in [truncated, full].into_iter().enumerate() {
            let series: Vec<Series<'_>> = group
                .into_iter()
                .map(|(strategy, runs)| {
                    let pts: Vec<(f64, f64)> = runs
                        .iter()
                        .map(|(&rep, &secs)| (f64::from(rep), secs))
                        .collect();
                    (strategy, pts)
                })
                .collect();
            let cell = figure.cell(row, col);
            scatter_panel(&mut figure.svg, cell, &series);
        }
    }

    figure.finish()
}

/// Box-and-whisker summary in the matplotlib convention
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest sample within 1.5 IQR below q1
    pub whisker_low: f64,
    /// Highest sample within 1.5 IQR above q3
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let reach = 1.5 * (q3 - q1);
        let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

        let inside = || sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let whisker_low = inside().next().unwrap_or(q1);
        let whisker_high = inside().last().unwrap_or(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(Self {
            q1,
            median: percentile(&sorted, 50.0),
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }
}

fn box_panel(svg: &mut String, cell: Rect, groups: &[(&str, Vec<Sample>)]) {
    let boxes: Vec<(&str, BoxSummary)> = groups
        .iter()
        .filter_map(|(label, samples)| Some((*label, BoxSummary::from_samples(samples)?)))
        .collect();
    if boxes.is_empty() {
        draw_no_data(svg, cell);
        return;
    }

    let x = Range {
        min: 0.5,
        max: boxes.len() as f64 + 0.5,
    };
    let y = Range::padded(groups.iter().flat_map(|(_, s)| s.iter().copied()));
    let plot = Plot::in_cell(cell, x, y);

    let x_ticks: Vec<(f64, String)> = boxes
        .iter()
        .enumerate()
        .map(|(idx, (label, _))| ((idx + 1) as f64, label.to_string()))
        .collect();
    plot.draw_axes(svg, &x_ticks, None);

    for (idx, (_, b)) in boxes.iter().enumerate() {
        let center = (idx + 1) as f64;
        let left = plot.px(center - BOX_WIDTH / 2.0);
        let right = plot.px(center + BOX_WIDTH / 2.0);
        let cx = plot.px(center);
        let cap = (right - left) / 4.0;

        svg.push_str(&format!(
            "<line x1=\"{cx:.1}\" y1=\"{:.1}\" x2=\"{cx:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
            plot.py(b.whisker_low),
            plot.py(b.q1)
        ));
        svg.push_str(&format!(
            "<line x1=\"{cx:.1}\" y1=\"{:.1}\" x2=\"{cx:.1}\" y2=\"{:.1}\" stroke=\"#000\"/>",
            plot.py(b.q3),
            plot.py(b.whisker_high)
        ));
        for whisker in [b.whisker_low, b.whisker_high] {
            let wy = plot.py(whisker);
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{wy:.1}\" x2=\"{:.1}\" y2=\"{wy:.1}\" stroke=\"#000\"/>",
                cx - cap,
                cx + cap
            ));
        }

        let top = plot.py(b.q3);
        svg.push_str(&format!(
            "<rect x=\"{left:.1}\" y=\"{top:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{BOX_FILL}\" stroke=\"#000\"/>",
            right - left,
            (plot.py(b.q1) - top).max(1.0)
        ));
        let my = plot.py(b.median);
        svg.push_str(&format!(
            "<line x1=\"{left:.1}\" y1=\"{my:.1}\" x2=\"{right:.1}\" y2=\"{my:.1}\" stroke=\"{MEDIAN_COLOR}\" stroke-width=\"2\"/>"
        ));

        for &flier in &b.fliers {
            svg.push_str(&format!(
                "<circle cx=\"{cx:.1}\" cy=\"{:.1}\" r=\"{POINT_RADIUS}\" fill=\"none\" stroke=\"#000\"/>",
                plot.py(flier)
            ));
        }
    }
}

/// Per-strategy box plot figure
pub fn box_svg(results: &ResultSet) -> String {
    let corpora: Vec<&str> = results.corpora().collect();
    let mut figure = Figure::new(&corpora);

    for (row, corpus) in corpora.iter().enumerate() {
        let (truncated, full) = split_by_truncation(results.strategies(corpus));
        for (col, group) in [truncated, full].into_iter().enumerate() {
            let groups: Vec<(&str, Vec<Sample>)> = group
                .into_iter()
                .map(|(strategy, runs)| {
                    let samples: Vec<Sample> = runs.values().copied().collect();
                    (strategy, samples)
                })
                .collect();
            let cell = figure.cell(row, col);
            box_panel(&mut figure.svg, cell, &groups);
        }
    }

    figure.finish()
}
