use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::models::{Direction, PricePoint};

/// Bars rendered in the text chart
pub const TEXT_CHART_POINTS: usize = 12;
/// Width of a full bar in characters
pub const TEXT_CHART_BAR_WIDTH: usize = 20;

const ORANGE: RGBColor = RGBColor(255, 140, 0);

/// Render a monospace bar chart of the first [`TEXT_CHART_POINTS`] points.
///
/// Bars are scaled between the lowest and highest close of the whole series;
/// a flat series renders every bar half full.
pub fn render_text_chart(history: &[PricePoint]) -> String {
    if history.is_empty() {
        return "No chart data available".to_string();
    }

    let min = history.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
    let max = history.iter().map(|p| p.close).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut chart = String::from("Price Chart (UTC):\n");
    chart.push_str(&"━".repeat(30));
    chart.push('\n');

    for point in history.iter().take(TEXT_CHART_POINTS) {
        let normalized = if range > 0.0 { (point.close - min) / range } else { 0.5 };
        let filled = ((normalized * TEXT_CHART_BAR_WIDTH as f64).round() as usize).min(TEXT_CHART_BAR_WIDTH);
        chart.push_str(&format!(
            "{} {}{} ${:.0}\n",
            point.timestamp.format("%I:%M %p"),
            "█".repeat(filled),
            "░".repeat(TEXT_CHART_BAR_WIDTH - filled),
            point.close
        ));
    }

    chart
}

/// Generate a PNG line chart of recent closes with baseline and current price marked
pub fn render_png_chart(
    history: &[PricePoint],
    symbol: &str,
    baseline: f64,
    current: f64,
    direction: Direction,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    if history.len() < 2 {
        return Err("Not enough price data to generate chart (minimum 2 points required)".to_string());
    }

    // BitMapBackend encodes PNG only when writing to a path
    let temp_file = std::env::temp_dir().join(format!(
        "btc_alert_chart_{}_{}.png",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    ));

    let drawn = draw_png_chart(&temp_file, history, symbol, baseline, current, direction, (width, height))
        .and_then(|_| {
            std::fs::read(&temp_file).map_err(|e| format!("Failed to read chart file: {}", e))
        });
    let _ = std::fs::remove_file(&temp_file);

    drawn
}

fn draw_png_chart(
    path: &Path,
    history: &[PricePoint],
    symbol: &str,
    baseline: f64,
    current: f64,
    direction: Direction,
    size: (u32, u32),
) -> Result<(), String> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| format!("Failed to fill canvas: {}", e))?;

    let closes = history.iter().map(|p| p.close);
    let min_price = closes.clone().chain([baseline, current]).fold(f64::INFINITY, f64::min);
    let max_price = closes.chain([baseline, current]).fold(f64::NEG_INFINITY, f64::max);

    let padding = (max_price - min_price).max(1e-8) * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    let x_min = history[0].timestamp;
    let x_max = history[history.len() - 1].timestamp;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Recent Price Movement", symbol),
            ("sans-serif", 32.0).into_font(),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| format!("Failed to build chart: {}", e))?;

    chart
        .configure_mesh()
        .x_desc("Time (UTC)")
        .y_desc("Price (USD)")
        .draw()
        .map_err(|e| format!("Failed to draw mesh: {}", e))?;

    chart
        .draw_series(LineSeries::new(history.iter().map(|p| (p.timestamp, p.close)), &BLUE))
        .map_err(|e| format!("Failed to draw closes: {}", e))?
        .label(format!("{} close", symbol))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_min, baseline), (x_max, baseline)],
            10,
            6,
            ORANGE.stroke_width(2),
        ))
        .map_err(|e| format!("Failed to draw baseline: {}", e))?
        .label(format!("Baseline ${:.2}", baseline))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));

    let current_color = match direction {
        Direction::Up => GREEN,
        Direction::Down => RED,
    };
    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_min, current), (x_max, current)],
            3,
            4,
            current_color.stroke_width(2),
        ))
        .map_err(|e| format!("Failed to draw current price: {}", e))?
        .label(format!("Current ${:.2}", current))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], current_color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| format!("Failed to draw legend: {}", e))?;

    root.present()
        .map_err(|e| format!("Failed to render chart: {}", e))
}
