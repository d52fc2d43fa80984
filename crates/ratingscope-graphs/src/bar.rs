//! Grouped bar chart for one month, optionally against a comparison month.

use crate::selection::MonthSelection;
use crate::style::{hover_template, ChartStyle};
use crate::traits::{ChartData, ChartRenderer, TraceData};
use plotly::common::Marker;
use plotly::layout::BarMode;
use plotly::{Bar, Plot};
use ratingscope_common::{RatingsError, Result};

/// Grouped bars. With a grouping column the groups sit on the x axis and
/// every month is its own trace; without one the months sit on the x axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarRenderer;

impl ChartRenderer for BarRenderer {
    fn title(&self, data: &ChartData) -> String {
        match data.selection {
            MonthSelection::Points {
                month,
                compare: Some(compare),
            } => format!("{} - {} vs. {}", data.base_title(), compare.label(), month.label()),
            MonthSelection::Points {
                month,
                compare: None,
            } => format!("{} - {}", data.base_title(), month.label()),
            MonthSelection::Range { .. } => {
                format!("{} - {}", data.base_title(), data.selection.describe())
            }
        }
    }

    fn traces(&self, data: &ChartData) -> Vec<TraceData> {
        if data.group_column.is_none() {
            let points = data.points.clone();
            return vec![TraceData {
                name: data.filter_title.clone(),
                x: points.iter().map(|point| point.month.label()).collect(),
                points,
            }];
        }

        data.months()
            .into_iter()
            .map(|month| {
                let points: Vec<_> = data.month_points(month).cloned().collect();
                TraceData {
                    name: month.label(),
                    x: points.iter().map(|point| point.series.clone()).collect(),
                    points,
                }
            })
            .collect()
    }

    fn render(&self, data: &ChartData, style: &ChartStyle) -> Result<Plot> {
        let traces = self.traces(data);
        if traces.iter().all(|trace| trace.points.is_empty()) {
            return Err(RatingsError::chart("bar chart has no values to draw"));
        }

        let mut plot = Plot::new();
        let hover = hover_template(data.metric);
        for (index, trace) in traces.into_iter().enumerate() {
            let y = trace.y();
            plot.add_trace(
                Bar::new(trace.x, y)
                    .name(&trace.name)
                    .marker(Marker::new().color(style.color(index)))
                    .hover_template(&hover),
            );
        }

        let x_label = data
            .group_column
            .as_deref()
            .map_or_else(|| "Month".to_string(), ratingscope_common::clean_label);
        let layout = style
            .layout(&self.title(data), style.axis(&x_label), style.value_axis(data))
            .bar_mode(BarMode::Group);
        plot.set_layout(layout);
        Ok(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn grouped() -> ChartData {
        ChartData {
            filter_title: "Race and Ethnicity".to_string(),
            metric: Metric::ReachPct,
            group_column: Some("characteristic".to_string()),
            selection: MonthSelection::Points {
                month: month("2025-03"),
                compare: Some(month("2023-03")),
            },
            series: vec!["Asian".to_string(), "Black".to_string()],
            points: vec![
                point("2023-03", "Asian", 31.0),
                point("2023-03", "Black", 42.0),
                point("2025-03", "Asian", 33.0),
                point("2025-03", "Black", 40.0),
            ],
        }
    }

    #[test]
    fn test_grouped_traces_are_months() {
        let traces = BarRenderer.traces(&grouped());
        let names: Vec<_> = traces.iter().map(|trace| trace.name.as_str()).collect();
        assert_eq!(names, ["Mar 2023", "Mar 2025"]);
        assert_eq!(traces[1].x, ["Asian", "Black"]);
        assert_eq!(traces[1].y(), [33.0, 40.0]);
    }

    #[test]
    fn test_ungrouped_trace_has_months_on_x() {
        let mut data = grouped();
        data.group_column = None;
        data.series = vec!["Totals".to_string()];
        data.points = vec![point("2023-03", "Totals", 1.0), point("2025-03", "Totals", 2.0)];

        let traces = BarRenderer.traces(&data);
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].x, ["Mar 2023", "Mar 2025"]);
    }

    #[test]
    fn test_titles() {
        let mut data = grouped();
        assert_eq!(
            BarRenderer.title(&data),
            "Reach % for Race and Ethnicity - Mar 2023 vs. Mar 2025"
        );
        data.selection = MonthSelection::Points {
            month: month("2025-03"),
            compare: None,
        };
        assert_eq!(BarRenderer.title(&data), "Reach % for Race and Ethnicity - Mar 2025");
    }

    #[test]
    fn test_render_groups_bars() {
        let html = BarRenderer
            .render(&grouped(), &ChartStyle::default())
            .unwrap()
            .to_html();
        assert!(html.contains("\"barmode\":\"group\""));
        assert!(html.contains("Mar 2023"));
    }
}
