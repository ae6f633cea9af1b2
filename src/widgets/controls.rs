use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph, Widget},
};

/// Bottom bar: key hints on the left, table shape on the right.
pub struct Controls {
    pub shape: Option<(usize, usize)>,
    pub controls: Vec<(&'static str, &'static str)>,
    pub bg_color: Color,
    pub key_color: Color,
    pub label_color: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            shape: None,
            controls: Vec::new(),
            bg_color: Color::Indexed(236),
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }
}

impl Controls {
    pub fn new(controls: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            controls,
            ..Self::default()
        }
    }

    /// Rows and columns of the loaded table
    pub fn with_shape(mut self, rows: usize, cols: usize) -> Self {
        self.shape = Some((rows, cols));
        self
    }

    pub fn with_colors(mut self, bg_color: Color, key_color: Color, label_color: Color) -> Self {
        self.bg_color = bg_color;
        self.key_color = key_color;
        self.label_color = label_color;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let no_bg = self.bg_color == Color::Reset;
        let base = if no_bg {
            Style::default()
        } else {
            Style::default().bg(self.bg_color)
        };
        Block::default().style(base).render(area, buf);

        let shape_text = self
            .shape
            .map(|(rows, cols)| format!("{} rows x {} cols", format_number_with_commas(rows), cols));
        let right_reserved = shape_text
            .as_ref()
            .map(|t| t.chars().count() as u16 + 1)
            .unwrap_or(0);
        let mut available = area.width.saturating_sub(right_reserved);

        // Key gets one trailing space, label one trailing space before the next key.
        let pair_width = |(key, action): &(&str, &str)| -> u16 {
            (key.chars().count() as u16 + 1) + (action.chars().count() as u16 + 1)
        };
        let mut n_show = 0;
        for pair in &self.controls {
            let need = pair_width(pair);
            if available < need {
                break;
            }
            available -= need;
            n_show += 1;
        }

        let mut constraints: Vec<Constraint> = self
            .controls
            .iter()
            .take(n_show)
            .flat_map(|(key, action)| {
                [
                    Constraint::Length(key.chars().count() as u16 + 1),
                    Constraint::Length(action.chars().count() as u16 + 1),
                ]
            })
            .collect();
        constraints.push(Constraint::Fill(1));
        constraints.push(Constraint::Length(right_reserved));
        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let key_style = base.fg(self.key_color);
        let label_style = base.fg(self.label_color);
        for (i, (key, action)) in self.controls.iter().take(n_show).enumerate() {
            let j = i * 2;
            Paragraph::new(*key).style(key_style).render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        if let Some(text) = shape_text {
            Paragraph::new(text)
                .style(label_style)
                .right_aligned()
                .render(layout[n_show * 2 + 1], buf);
        }
    }
}

fn format_number_with_commas(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_with_commas() {
        assert_eq!(format_number_with_commas(0), "0");
        assert_eq!(format_number_with_commas(1234), "1,234");
        assert_eq!(format_number_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_render_shows_keys_and_shape() {
        let controls = Controls::new(vec![("q", "Quit")]).with_shape(1200, 3);
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        (&controls).render(area, &mut buf);
        let line: String = (0..40).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(line.starts_with("q Quit"));
        assert!(line.contains("1,200 rows x 3 cols"));
    }
}
