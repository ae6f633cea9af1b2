use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::render::RenderContext;
use crate::selection::{ChartKind, ChartSelection};

/// One row of `label: ◀ choice ▶` entries for a chart's selectors.
pub struct SelectorBar<'a> {
    pub selection: &'a ChartSelection,
    pub chart: ChartKind,
    /// Whether this chart's section is the one receiving keys
    pub active: bool,
    pub ctx: &'a RenderContext,
}

impl Widget for SelectorBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_style = Style::default().fg(self.ctx.text_secondary);
        let mut spans: Vec<Span> = Vec::new();
        for (i, id) in self.chart.selectors().iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            let selectbox = self.selection.get(*id);
            let focused = self.active && self.selection.focused() == *id;
            let value_style = if focused {
                Style::default()
                    .fg(self.ctx.selector_focused)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.ctx.text_primary)
            };
            spans.push(Span::styled(format!("{}: ", selectbox.label()), label_style));
            let value = match selectbox.selected() {
                Some(name) => format!("◀ {} ▶", name),
                None => "(no columns)".to_string(),
            };
            spans.push(Span::styled(value, value_style));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
