use chrono::{Local, TimeZone};
use plotters::prelude::*;

use crate::{
    db::token_price::models::TokenPriceData,
    query::resample::Metric,
    sync::hour::SECONDS_PER_HOUR,
};

/// Chart configuration options
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub metric: Metric,
    pub color: RGBColor,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            metric: Metric::PriceUsd,
            color: BLUE,
        }
    }
}

/// Renders one metric of the resampled points as an SVG line chart.
pub fn generate_price_chart(
    symbol: &str,
    points: &[TokenPriceData],
    config: &ChartConfig,
) -> Result<String, String> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(generate_empty_chart(symbol, config.width, config.height));
    };

    let series: Vec<(i64, f64)> = points
        .iter()
        .map(|point| (point.period_start_unix, config.metric.value(point)))
        .collect();

    let min_x = first.period_start_unix;
    let max_x = last.period_start_unix.max(min_x + SECONDS_PER_HOUR);

    let (min_y, max_y) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, value)| {
            (lo.min(*value), hi.max(*value))
        });
    let padding = ((max_y - min_y) * 0.05).max(max_y.abs() * 0.01).max(f64::EPSILON);
    let (y_lo, y_hi) = (min_y - padding, max_y + padding);

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(|e| format!("Failed to fill background: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{} - {} (USD)", symbol, config.metric.name()),
                ("sans-serif", 24).into_font(),
            )
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(min_x..max_x, y_lo..y_hi)
            .map_err(|e| format!("Failed to build chart: {}", e))?;

        chart
            .configure_mesh()
            .x_desc("Time")
            .y_desc(config.metric.name())
            .x_label_formatter(&|epoch| axis_label(*epoch, &Local))
            .y_label_formatter(&|y| format!("{:.2}", y))
            .draw()
            .map_err(|e| format!("Failed to configure mesh: {}", e))?;

        chart
            .draw_series(LineSeries::new(
                series.iter().copied(),
                config.color.stroke_width(2),
            ))
            .map_err(|e| format!("Failed to draw line series: {}", e))?;

        chart
            .draw_series(PointSeries::of_element(
                series.iter().copied(),
                3,
                config.color,
                &|coord, size, style| Circle::new(coord, size, style.filled()),
            ))
            .map_err(|e| format!("Failed to draw points: {}", e))?;

        root.present().map_err(|e| format!("Failed to present chart: {}", e))?;
    }

    Ok(buffer)
}

/// Hour label of an x-axis tick, in the same zone as the history series.
fn axis_label<Tz: TimeZone>(epoch_seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    tz.timestamp_opt(epoch_seconds, 0)
        .single()
        .map(|datetime| datetime.format("%m/%d %H:00").to_string())
        .unwrap_or_default()
}

pub fn generate_empty_chart(symbol: &str, width: u32, height: u32) -> String {
    format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\
            <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\
            <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"18\" fill=\"#666666\">\
                No price data available for {symbol}\
            </text>\
        </svg>",
        width / 2,
        height / 2,
    )
}
