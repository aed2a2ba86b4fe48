//! Stacked-area drawing of a [`SeriesTable`] via plotters.
//!
//! Labels are iterated in *reverse* rank order: cumulative series
//! overdraw each other, so the bottom of the stack must be drawn last
//! to end up on top of the canvas. Open regions are plotted on top of
//! the total-closed baseline with a light alpha fill plus an outline;
//! closed regions are solid fills.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;

use issuestack::SeriesTable;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const TICK_INTERVAL_DAYS: i64 = 2;
const OPEN_FILL_ALPHA: f64 = 0.15;

/// Fallback for malformed hex strings, same neutral as the unlabeled
/// pseudo-label.
const FALLBACK_COLOR: RGBColor = RGBColor(0xaa, 0xaa, 0xaa);

fn parse_color(hex: &str) -> RGBColor {
    fn byte(hex: &str, at: usize) -> Option<u8> {
        u8::from_str_radix(hex.get(at..at + 2)?, 16).ok()
    }
    if hex.len() != 6 {
        return FALLBACK_COLOR;
    }
    match (byte(hex, 0), byte(hex, 2), byte(hex, 4)) {
        (Some(r), Some(g), Some(b)) => RGBColor(r, g, b),
        _ => FALLBACK_COLOR,
    }
}

fn label_color(colors: &HashMap<String, String>, label: &str) -> RGBColor {
    colors.get(label).map_or(FALLBACK_COLOR, |c| parse_color(c))
}

fn points(dates: &[NaiveDate], values: &[u64], baseline: &[u64]) -> Vec<(NaiveDate, u64)> {
    dates
        .iter()
        .copied()
        .zip(values.iter().zip(baseline).map(|(v, b)| v + b))
        .collect()
}

/// Render the stacked chart to `path` as a PNG. An empty table yields
/// a blank image rather than an error.
pub(crate) fn render_chart(
    path: &Path,
    title: &str,
    label_set: &[String],
    colors: &HashMap<String, String>,
    table: &SeriesTable,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    if table.is_empty() {
        root.present()?;
        return Ok(());
    }

    let first = table.dates[0];
    let mut last = table.dates[table.dates.len() - 1];
    if last == first {
        // A one-event axis would make a degenerate coordinate range.
        last = first + chrono::Duration::days(1);
    }

    // Open areas sit on top of the full closed stack.
    let baseline = table.closed_total();
    let zeros = vec![0; table.dates.len()];
    let mut y_max = 1;
    for series in &table.closed {
        y_max = y_max.max(series.values.iter().copied().max().unwrap_or(0));
    }
    for series in &table.open {
        for (value, base) in series.values.iter().zip(&baseline) {
            y_max = y_max.max(value + base);
        }
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(first..last, 0u64..y_max + 1)?;

    let span_days = (last - first).num_days().max(1);
    let x_labels = usize::try_from(span_days / TICK_INTERVAL_DAYS + 1)
        .unwrap_or(usize::MAX)
        .clamp(2, 20);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_labels)
        .x_label_formatter(&|date: &NaiveDate| date.format("%d.%m").to_string())
        .x_desc("Date")
        .y_desc("Issues")
        .draw()?;

    let open_by_label: HashMap<&str, &[u64]> = table
        .open
        .iter()
        .map(|s| (s.label.as_str(), s.values.as_slice()))
        .collect();
    let closed_by_label: HashMap<&str, &[u64]> = table
        .closed
        .iter()
        .map(|s| (s.label.as_str(), s.values.as_slice()))
        .collect();

    for label in label_set.iter().rev() {
        let Some(values) = open_by_label.get(label.as_str()) else {
            continue;
        };
        let color = label_color(colors, label);
        let top = points(&table.dates, values, &baseline);
        // White underfill first: the alpha fill must not blend with
        // whatever was drawn below this stack level.
        chart.draw_series(AreaSeries::new(top.iter().copied(), 0, WHITE.filled()))?;
        chart.draw_series(AreaSeries::new(
            top.iter().copied(),
            0,
            color.mix(OPEN_FILL_ALPHA).filled(),
        ))?;
        chart
            .draw_series(LineSeries::new(
                top.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(format!("open-{label}"))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
            });
    }

    for label in label_set.iter().rev() {
        let Some(values) = closed_by_label.get(label.as_str()) else {
            continue;
        };
        let color = label_color(colors, label);
        let top = points(&table.dates, values, &zeros);
        chart
            .draw_series(AreaSeries::new(top.iter().copied(), 0, color.filled()))?
            .label(format!("closed-{label}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 4), (x + 16, y + 4)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
