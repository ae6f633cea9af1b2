use crate::config::{ColorParser, Theme};
use ratatui::style::Color;

/// Snapshot of theme colors and display configuration for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub primary: Color,
    pub error: Color,
    pub dimmed: Color,
    pub background: Color,
    pub controls_bg: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub table_header: Color,
    pub selector_focused: Color,
    pub modal_border_error: Color,
    pub heatmap_undefined: Color,
    pub series: Vec<Color>,

    pub table_cell_padding: u16,
    pub max_column_width: u16,
    pub row_numbers: bool,

    /// Maps heatmap RGB values onto what the terminal can show
    pub color_parser: ColorParser,
}

impl RenderContext {
    /// Build render context from app theme and display config.
    pub fn from_theme_and_config(theme: &Theme, display: &crate::config::DisplayConfig) -> Self {
        Self {
            primary: theme.get("primary"),
            error: theme.get("error"),
            dimmed: theme.get("dimmed"),
            background: theme.get("background"),
            controls_bg: theme.get("controls_bg"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            table_header: theme.get("table_header"),
            selector_focused: theme.get("selector_focused"),
            modal_border_error: theme.get("modal_border_error"),
            heatmap_undefined: theme.get("heatmap_undefined"),
            series: (0..7).map(|i| theme.series_color(i)).collect(),
            table_cell_padding: display.table_cell_padding,
            max_column_width: display.max_column_width,
            row_numbers: display.row_numbers,
            color_parser: ColorParser::new(),
        }
    }

    /// Color of the n-th series, cycling.
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return self.primary;
        }
        self.series[index % self.series.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisplayConfig, ThemeConfig};

    #[test]
    fn test_series_colors_cycle() {
        let theme = Theme::from_config(&ThemeConfig::default()).unwrap();
        let ctx = RenderContext::from_theme_and_config(&theme, &DisplayConfig::default());
        assert_eq!(ctx.series.len(), 7);
        assert_eq!(ctx.series_color(0), ctx.series_color(7));
        assert_eq!(ctx.selector_focused, theme.get("selector_focused"));
    }
}
