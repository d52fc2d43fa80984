//! Shared chart look: fonts, palette, backgrounds and value axis.

use crate::traits::ChartData;
use plotly::common::{Font, Title};
use plotly::layout::{Axis, Layout, Margin};
use ratingscope_common::Metric;
use ratingscope_config::ChartSettings;

const FALLBACK_COLOR: &str = "#1f77b4";
const BACKGROUND: &str = "white";
const GRID_COLOR: &str = "#e5e5e5";

/// Chart look derived from [`ChartSettings`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    settings: ChartSettings,
}

impl ChartStyle {
    /// Style from `settings`.
    pub const fn new(settings: ChartSettings) -> Self {
        Self { settings }
    }

    /// Underlying settings.
    pub const fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Palette colour of the `index`th trace, cycling.
    pub fn color(&self, index: usize) -> String {
        let colors = &self.settings.colors;
        if colors.is_empty() {
            return FALLBACK_COLOR.to_string();
        }
        colors[index % colors.len()].clone()
    }

    /// Body font.
    pub fn font(&self) -> Font {
        Font::new()
            .family(&self.settings.font_family)
            .color(self.settings.font_color.clone())
            .size(self.settings.font_size)
    }

    fn title(&self, text: &str) -> Title {
        Title::with_text(text).font(
            Font::new()
                .family(&self.settings.font_family)
                .color(self.settings.font_color.clone())
                .size(self.settings.title_font_size),
        )
    }

    /// Category or date axis titled `label`.
    pub fn axis(&self, label: &str) -> Axis {
        Axis::new()
            .title(self.title_plain(label))
            .show_grid(false)
            .line_color(GRID_COLOR)
    }

    fn title_plain(&self, text: &str) -> Title {
        Title::with_text(text).font(self.font())
    }

    /// Value axis from zero (or the smallest negative value) to the
    /// headroom above the largest value.
    pub fn value_axis(&self, data: &ChartData) -> Axis {
        let (low, high) = value_range(data, self.settings.headroom);
        let axis = Axis::new()
            .title(self.title_plain(data.metric.display_name()))
            .range(vec![low, high])
            .tick_format(tick_format(data.metric))
            .show_grid(true)
            .grid_color(GRID_COLOR)
            .zero_line(true)
            .zero_line_color(GRID_COLOR);
        if data.metric == Metric::ReachPct {
            axis.tick_suffix("%")
        } else {
            axis
        }
    }

    /// Layout shared by every chart.
    pub fn layout(&self, title: &str, x_axis: Axis, y_axis: Axis) -> Layout {
        let mut layout = Layout::new()
            .title(self.title(title))
            .font(self.font())
            .plot_background_color(BACKGROUND)
            .paper_background_color(BACKGROUND)
            .margin(Margin::new().left(80).right(40).top(80).bottom(80))
            .x_axis(x_axis)
            .y_axis(y_axis);
        if let Some(width) = self.settings.width {
            layout = layout.width(width);
        }
        if let Some(height) = self.settings.height {
            layout = layout.height(height);
        }
        layout
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::new(ChartSettings::default())
    }
}

impl From<&ChartSettings> for ChartStyle {
    fn from(settings: &ChartSettings) -> Self {
        Self::new(settings.clone())
    }
}

/// Y axis tick format of `metric`.
pub const fn tick_format(metric: Metric) -> &'static str {
    match metric {
        Metric::ReachImp | Metric::GrpImp | Metric::ReachPct => ",.0f",
        Metric::AvgFreq => ",.1f",
    }
}

/// Hover template of `metric`, with thousands separators.
pub fn hover_template(metric: Metric) -> String {
    let value = match metric {
        Metric::ReachImp | Metric::GrpImp => "%{y:,.0f}",
        Metric::ReachPct => "%{y:,.1f}%",
        Metric::AvgFreq => "%{y:,.2f}",
    };
    format!(
        "<b>%{{fullData.name}}</b><br>%{{x}}<br>{}: {value}<extra></extra>",
        metric.display_name()
    )
}

fn value_range(data: &ChartData, headroom: f64) -> (f64, f64) {
    let (low, high) = data.value_bounds();
    let low = if low.is_finite() { low.min(0.0) } else { 0.0 };
    let high = if high.is_finite() { high.max(0.0) * headroom } else { 0.0 };
    if high > low {
        (low * headroom, high)
    } else {
        (low, low + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MonthSelection;
    use crate::traits::ChartPoint;
    use ratingscope_common::test_utils::assert_approx_eq;
    use ratingscope_common::Month;

    fn data(metric: Metric, values: &[f64]) -> ChartData {
        let month: Month = "2025-03".parse().unwrap();
        ChartData {
            filter_title: "Totals".to_string(),
            metric,
            group_column: None,
            selection: MonthSelection::Points {
                month,
                compare: None,
            },
            series: vec!["Totals".to_string()],
            points: values
                .iter()
                .map(|value| ChartPoint {
                    month,
                    series: "Totals".to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_palette_cycles() {
        let style = ChartStyle::default();
        let palette = style.settings().colors.clone();
        assert_eq!(style.color(0), palette[0]);
        assert_eq!(style.color(palette.len()), palette[0]);
        assert_eq!(style.color(palette.len() + 1), palette[1]);
    }

    #[test]
    fn test_value_range_has_headroom() {
        let (low, high) = value_range(&data(Metric::ReachImp, &[100.0, 250.0]), 1.12);
        assert_approx_eq(low, 0.0, 1e-9);
        assert_approx_eq(high, 280.0, 1e-9);
    }

    #[test]
    fn test_value_range_of_zeros_is_not_empty() {
        let (low, high) = value_range(&data(Metric::GrpImp, &[0.0]), 1.12);
        assert!(high > low);
    }

    #[test]
    fn test_value_range_covers_negative_values() {
        let (low, high) = value_range(&data(Metric::ReachImp, &[-50.0, 100.0]), 1.1);
        assert!(low < -50.0);
        assert_approx_eq(high, 110.0, 1e-9);
    }

    #[test]
    fn test_hover_templates_use_separators() {
        assert!(hover_template(Metric::ReachImp).contains("%{y:,.0f}"));
        assert!(hover_template(Metric::ReachPct).contains("%{y:,.1f}%"));
        assert!(hover_template(Metric::AvgFreq).contains("Average Frequency"));
    }
}
