//! Timeline chart: one line per series across the selected months.

use crate::style::{hover_template, ChartStyle};
use crate::traits::{ChartData, ChartRenderer, TraceData};
use plotly::common::{Line, Marker, Mode};
use plotly::layout::AxisType;
use plotly::{Plot, Scatter};
use ratingscope_common::{RatingsError, Result};

/// Line chart with markers over a month range.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineRenderer;

impl ChartRenderer for TimelineRenderer {
    fn title(&self, data: &ChartData) -> String {
        data.base_title()
    }

    fn traces(&self, data: &ChartData) -> Vec<TraceData> {
        data.series
            .iter()
            .filter_map(|series| {
                let points: Vec<_> = data.series_points(series).cloned().collect();
                if points.is_empty() {
                    return None;
                }
                Some(TraceData {
                    name: series.clone(),
                    x: points.iter().map(|point| point.month.first_day().to_string()).collect(),
                    points,
                })
            })
            .collect()
    }

    fn render(&self, data: &ChartData, style: &ChartStyle) -> Result<Plot> {
        let traces = self.traces(data);
        if traces.is_empty() {
            return Err(RatingsError::chart("timeline has no series to draw"));
        }

        let mut plot = Plot::new();
        let hover = hover_template(data.metric);
        for (index, trace) in traces.into_iter().enumerate() {
            let y = trace.y();
            let color = style.color(index);
            plot.add_trace(
                Scatter::new(trace.x, y)
                    .name(&trace.name)
                    .mode(Mode::LinesMarkers)
                    .line(Line::new().color(color.clone()).width(2.0))
                    .marker(Marker::new().color(color).size(6))
                    .hover_template(&hover),
            );
        }

        let x_axis = style
            .axis("Month")
            .type_(AxisType::Date)
            .tick_format("%b %Y");
        plot.set_layout(style.layout(&self.title(data), x_axis, style.value_axis(data)));
        Ok(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MonthSelection;
    use crate::traits::ChartPoint;
    use ratingscope_common::{Metric, Month};

    fn month(raw: &str) -> Month {
        raw.parse().unwrap()
    }

    fn point(month_raw: &str, series: &str, value: f64) -> ChartPoint {
        ChartPoint {
            month: month(month_raw),
            series: series.to_string(),
            value,
        }
    }

    fn data() -> ChartData {
        ChartData {
            filter_title: "Dayparts".to_string(),
            metric: Metric::GrpImp,
            group_column: Some("daypart".to_string()),
            selection: MonthSelection::Range {
                start: month("2025-01"),
                end: month("2025-02"),
            },
            series: vec!["Prime".to_string(), "Late Night".to_string()],
            points: vec![
                point("2025-01", "Prime", 10.0),
                point("2025-01", "Late Night", 4.0),
                point("2025-02", "Prime", 12.0),
                point("2025-02", "Late Night", 5.0),
            ],
        }
    }

    #[test]
    fn test_one_trace_per_series_in_legend_order() {
        let traces = TimelineRenderer.traces(&data());
        let names: Vec<_> = traces.iter().map(|trace| trace.name.as_str()).collect();
        assert_eq!(names, ["Prime", "Late Night"]);
        assert_eq!(traces[0].x, ["2025-01-01", "2025-02-01"]);
        assert_eq!(traces[1].y(), [4.0, 5.0]);
    }

    #[test]
    fn test_title() {
        assert_eq!(TimelineRenderer.title(&data()), "GRP Impressions for Dayparts");
    }

    #[test]
    fn test_render_embeds_traces() {
        let html = TimelineRenderer
            .render(&data(), &ChartStyle::default())
            .unwrap()
            .to_html();
        assert!(html.contains("Late Night"));
        assert!(html.contains("GRP Impressions for Dayparts"));
        assert!(html.contains("lines+markers"));
    }
}
