//! Composite PNG dashboard (2 rows x 3 panels)
//!
//! Panel data is shaped by small pure helpers; the drawing code only maps
//! those onto plotters elements.

use crate::config::AuditConfig;
use crate::models::{DatasetStatistics, ImageProperties, CORRELATION_LABELS};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

const SIZE: (u32, u32) = (2400, 1600);
const HISTOGRAM_BINS: usize = 30;
const FONT: &str = "sans-serif";
const NO_SAMPLES: &str = "No sampled images";
const MUTED: RGBColor = RGBColor(120, 120, 120);

const CLASS_COLORS: [RGBColor; 6] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn class_color(i: usize) -> RGBColor {
    CLASS_COLORS[i % CLASS_COLORS.len()]
}

/// Render the dashboard to `path`, creating parent folders as needed
pub fn render_dashboard(
    config: &AuditConfig,
    stats: &DatasetStatistics,
    props: &ImageProperties,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&config.project.name, (FONT, 44))?;
    let panels = root.split_evenly((2, 3));
    let classes = &config.dataset.classes;

    draw_subset_distribution(&panels[0], classes, stats)?;
    draw_global_share(&panels[1], classes, stats)?;
    draw_dimension_scatter(&panels[2], props)?;
    draw_size_histogram(&panels[3], props)?;
    draw_correlation(&panels[4], props)?;
    draw_summary_table(&panels[5], classes, stats)?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Chart saved: {}", path.display());
    Ok(())
}

/// Axis formatter showing `names[i]` at integer positions only
fn index_label(names: &[String], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    names.get(i as usize).cloned().unwrap_or_default()
}

fn draw_message(area: &Area, title: &str, message: &str) -> Result<()> {
    let inner = area.titled(title, (FONT, 30))?;
    let (w, h) = inner.dim_in_pixel();
    let style = TextStyle::from((FONT, 26).into_font())
        .color(&MUTED)
        .pos(Pos::new(HPos::Center, VPos::Center));
    inner.draw(&Text::new(message.to_string(), (w as i32 / 2, h as i32 / 2), style))?;
    Ok(())
}

fn draw_subset_distribution(area: &Area, classes: &[String], stats: &DatasetStatistics) -> Result<()> {
    let title = "Class distribution per subset";
    let subsets: Vec<_> = stats.present_subsets().collect();
    if subsets.is_empty() {
        return draw_message(area, title, "No subsets found");
    }

    let names: Vec<String> = subsets.iter().map(|(name, _)| name.to_uppercase()).collect();
    let y_max = subsets
        .iter()
        .flat_map(|(_, s)| classes.iter().map(|c| s.count(c)))
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.15;
    let n = subsets.len() as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..n - 0.5, 0f64..y_max)?;
    let formatter = |x: &f64| index_label(&names, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(subsets.len())
        .x_label_formatter(&formatter)
        .y_desc("Images")
        .draw()?;

    let bar = 0.8 / classes.len().max(1) as f64;
    for (j, class_name) in classes.iter().enumerate() {
        let color = class_color(j);
        chart
            .draw_series(subsets.iter().enumerate().map(|(i, (_, s))| {
                let x0 = i as f64 - 0.4 + j as f64 * bar;
                Rectangle::new([(x0, 0.0), (x0 + bar, s.count(class_name) as f64)], color.filled())
            }))?
            .label(class_name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

/// Share of each class over the whole dataset, in percent
fn class_shares(classes: &[String], stats: &DatasetStatistics) -> Vec<f64> {
    let totals: Vec<usize> = classes.iter().map(|c| stats.class_total(c)).collect();
    let sum: usize = totals.iter().sum();
    totals
        .iter()
        .map(|&n| if sum > 0 { n as f64 * 100.0 / sum as f64 } else { 0.0 })
        .collect()
}

fn draw_global_share(area: &Area, classes: &[String], stats: &DatasetStatistics) -> Result<()> {
    let title = "Global class share";
    if stats.total_dataset == 0 {
        return draw_message(area, title, "No images counted");
    }

    let shares = class_shares(classes, stats);
    let n = classes.len() as f64;
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..n - 0.5, 0f64..110f64)?;
    let formatter = |x: &f64| index_label(classes, *x);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(classes.len())
        .x_label_formatter(&formatter)
        .y_desc("% of dataset")
        .draw()?;

    chart.draw_series(shares.iter().enumerate().map(|(i, &pct)| {
        Rectangle::new([(i as f64 - 0.3, 0.0), (i as f64 + 0.3, pct)], class_color(i).filled())
    }))?;
    let label_style = TextStyle::from((FONT, 24).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        shares
            .iter()
            .enumerate()
            .map(|(i, &pct)| Text::new(format!("{:.1}%", pct), (i as f64, pct + 1.0), label_style.clone())),
    )?;
    Ok(())
}

fn draw_dimension_scatter(area: &Area, props: &ImageProperties) -> Result<()> {
    let title = "Image dimensions";
    if props.is_empty() {
        return draw_message(area, title, NO_SAMPLES);
    }

    let x_max = props.widths().into_iter().fold(1.0, f64::max) * 1.05;
    let y_max = props.heights().into_iter().fold(1.0, f64::max) * 1.05;
    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Width (px)")
        .y_desc("Height (px)")
        .draw()?;
    chart.draw_series(
        props
            .dimensions
            .iter()
            .map(|&(w, h)| Circle::new((w as f64, h as f64), 4, BLUE.mix(0.6).filled())),
    )?;
    Ok(())
}

/// Equal-width bins over `values`: (lower edge, upper edge, count)
fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        max = min + 1.0;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

fn draw_size_histogram(area: &Area, props: &ImageProperties) -> Result<()> {
    let title = "File size distribution";
    if props.is_empty() {
        return draw_message(area, title, NO_SAMPLES);
    }

    let bins = histogram(&props.file_sizes_mb(), HISTOGRAM_BINS);
    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.0, last.1),
        _ => return draw_message(area, title, NO_SAMPLES),
    };
    let y_max = bins.iter().map(|b| b.2).max().unwrap_or(0) as f64 + 1.0;

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc("Size (MB)")
        .y_desc("Images")
        .x_label_formatter(&|x: &f64| format!("{:.2}", x))
        .draw()?;
    chart.draw_series(bins.iter().map(|&(lo, hi, count)| {
        Rectangle::new([(lo, 0.0), (hi, count as f64)], RGBColor(85, 168, 104).mix(0.8).filled())
    }))?;
    Ok(())
}

/// Diverging blue-white-red scale for values in [-1, 1]
fn coolwarm(value: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let v = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
    let (from, to, t) = if v < 0.0 { (MID, COLD, -v) } else { (MID, WARM, v) };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

fn draw_correlation(area: &Area, props: &ImageProperties) -> Result<()> {
    let title = "Property correlation";
    if props.is_empty() {
        return draw_message(area, title, NO_SAMPLES);
    }

    let matrix = props.correlation_matrix();
    let labels: Vec<String> = CORRELATION_LABELS.iter().map(|s| s.to_string()).collect();
    let n = labels.len();
    let top = (n - 1) as f64;
    // first row drawn at the top
    let row_labels: Vec<String> = labels.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(150)
        .build_cartesian_2d(-0.5f64..top + 0.5, -0.5f64..top + 0.5)?;
    let x_formatter = |x: &f64| index_label(&labels, *x);
    let y_formatter = |y: &f64| index_label(&row_labels, *y);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()?;

    let cells: Vec<(f64, f64, f64)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (j as f64, top - i as f64, i * n + j)))
        .map(|(x, y, k)| (x, y, matrix[k / n][k % n]))
        .collect();
    chart.draw_series(cells.iter().map(|&(x, y, v)| {
        Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], coolwarm(v).filled())
    }))?;
    let value_style = TextStyle::from((FONT, 24).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(
        cells
            .iter()
            .map(|&(x, y, v)| Text::new(format!("{:.2}", v), (x, y), value_style.clone())),
    )?;
    Ok(())
}

/// Table lines: header, one row per present subset, then the totals row.
///
/// The ratio column is last class over first class (PNEUMONIA:NORMAL with
/// the default classes), `0.00:1` when the first class is empty.
fn summary_rows(classes: &[String], stats: &DatasetStatistics) -> Vec<String> {
    let ratio = |counts: &[usize]| match (counts.first(), counts.last()) {
        (Some(&first), Some(&last)) if counts.len() >= 2 => {
            let r = if first > 0 { last as f64 / first as f64 } else { 0.0 };
            format!("{:.2}:1", r)
        }
        _ => "-".to_string(),
    };
    let row = |name: &str, counts: &[usize], total: usize| {
        let mut line = format!("{:<8}", name);
        for c in counts {
            line.push_str(&format!("{:>11}", c));
        }
        line.push_str(&format!("{:>9}{:>12}", total, ratio(counts)));
        line
    };

    let initial = |c: Option<&String>| c.and_then(|c| c.chars().next()).unwrap_or('?');
    let mut header = format!("{:<8}", "Subset");
    for c in classes {
        header.push_str(&format!("{:>11}", truncate(c, 10)));
    }
    header.push_str(&format!(
        "{:>9}{:>12}",
        "Total",
        format!("Ratio {}:{}", initial(classes.last()), initial(classes.first()))
    ));

    let mut rows = vec![header];
    for (name, s) in stats.present_subsets() {
        let counts: Vec<usize> = classes.iter().map(|c| s.count(c)).collect();
        rows.push(row(&name.to_uppercase(), &counts, s.total));
    }
    let totals: Vec<usize> = classes.iter().map(|c| stats.class_total(c)).collect();
    rows.push(row("TOTAL", &totals, stats.total_dataset));
    rows
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn draw_summary_table(area: &Area, classes: &[String], stats: &DatasetStatistics) -> Result<()> {
    let inner = area.titled("Summary", (FONT, 30))?;
    let rows = summary_rows(classes, stats);
    let last = rows.len().saturating_sub(1);
    for (i, line) in rows.into_iter().enumerate() {
        let color = if i == 0 || i == last { BLACK } else { RGBColor(60, 60, 60) };
        let style = TextStyle::from(("monospace", 26).into_font()).color(&color);
        inner.draw(&Text::new(line, (30, 40 + i as i32 * 48), style))?;
    }
    Ok(())
}
