use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Top-level layout: title row, main view, control bar, optional debug row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub title: Rect,
    pub main_view: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

pub fn app_layout(area: Rect, debug_enabled: bool) -> AppLayout {
    let mut constraints = vec![
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ];

    if debug_enabled {
        constraints.push(Constraint::Length(1));
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    AppLayout {
        title: layout[0],
        main_view: layout[1],
        control_bar: layout[2],
        debug: debug_enabled.then(|| layout[3]),
    }
}

/// Section header row plus body. Chart sections also get one row for their selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    pub header: Rect,
    pub selectors: Option<Rect>,
    pub body: Rect,
}

pub fn section_layout(area: Rect, with_selectors: bool) -> SectionLayout {
    let mut constraints = vec![Constraint::Length(1)];
    if with_selectors {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Fill(1));

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    SectionLayout {
        header: layout[0],
        selectors: with_selectors.then(|| layout[1]),
        body: layout[layout.len() - 1],
    }
}

/// Centered rect within `r` with given percentage width and height.
pub fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Like `centered_rect` but enforces minimum width and height, clamped to `r`.
pub fn centered_rect_with_min(
    r: Rect,
    percent_x: u16,
    percent_y: u16,
    min_width: u16,
    min_height: u16,
) -> Rect {
    let inner = centered_rect(r, percent_x, percent_y);
    let width = inner.width.max(min_width).min(r.width);
    let height = inner.height.max(min_height).min(r.height);
    Rect {
        x: r.x + r.width.saturating_sub(width) / 2,
        y: r.y + r.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_layout_minimal() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = app_layout(area, false);

        assert_eq!(layout.title.height, 1);
        assert_eq!(layout.main_view.height, 48);
        assert_eq!(layout.control_bar.y, 49);
        assert_eq!(layout.debug, None);
    }

    #[test]
    fn test_app_layout_with_debug() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = app_layout(area, true);

        assert_eq!(layout.main_view.height, 47);
        assert_eq!(layout.control_bar.y, 48);
        assert_eq!(layout.debug.map(|d| d.y), Some(49));
    }

    #[test]
    fn test_section_layout() {
        let area = Rect::new(0, 0, 80, 20);
        let plain = section_layout(area, false);
        assert_eq!(plain.selectors, None);
        assert_eq!(plain.body.height, 19);

        let chart = section_layout(area, true);
        assert_eq!(chart.selectors.map(|s| s.y), Some(1));
        assert_eq!(chart.body.y, 2);
    }

    #[test]
    fn test_centered_rect_50_50() {
        let area = Rect::new(0, 0, 100, 100);
        let centered = centered_rect(area, 50, 50);

        assert_eq!(centered, Rect::new(25, 25, 50, 50));
    }

    #[test]
    fn test_centered_rect_with_min_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let centered = centered_rect_with_min(area, 10, 10, 50, 8);

        assert_eq!(centered.width, 40);
        assert_eq!(centered.height, 8);
        assert_eq!(centered.y, 1);
    }
}
