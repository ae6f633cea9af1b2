use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Chart, Dataset, GraphType, LegendPosition, Paragraph, Widget,
    },
};

use crate::chart_data::{format_axis_label, BarChartData, HeatmapData, LineChartData, PieChartData};
use crate::render::RenderContext;

fn render_placeholder(message: &str, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
    Paragraph::new(message)
        .style(Style::default().fg(ctx.text_secondary))
        .centered()
        .render(area, buf);
}

/// Min/max over finite values, widened so the range is never empty.
fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), v| {
            (a.min(v), b.max(v))
        });
    if !lo.is_finite() {
        (0.0, 1.0)
    } else if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn y_labels(lo: f64, hi: f64, style: Style) -> Vec<Span<'static>> {
    vec![
        Span::styled(format_axis_label(lo), style),
        Span::styled(format_axis_label((lo + hi) / 2.0), style),
        Span::styled(format_axis_label(hi), style),
    ]
}

/// Bar chart: one colored dataset per category, named in the legend.
pub struct BarChartView<'a> {
    pub data: &'a BarChartData,
    pub ctx: &'a RenderContext,
}

impl Widget for BarChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let groups = &self.data.groups;
        if groups.is_empty() {
            render_placeholder("No rows with values in both columns", area, buf, self.ctx);
            return;
        }

        let points: Vec<Vec<(f64, f64)>> = groups
            .iter()
            .enumerate()
            .map(|(i, g)| g.points(i))
            .collect();

        // bars are drawn from 0
        let (y_min, y_max) = bounds(
            groups
                .iter()
                .flat_map(|g| g.values.iter().copied())
                .chain(std::iter::once(0.0)),
        );

        let datasets: Vec<Dataset> = groups
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (group, pts))| {
                Dataset::default()
                    .name(group.category.clone())
                    .marker(symbols::Marker::HalfBlock)
                    .graph_type(GraphType::Bar)
                    .style(Style::default().fg(self.ctx.series_color(i)))
                    .data(pts)
            })
            .collect();

        let axis_style = Style::default().fg(self.ctx.text_primary);
        let x_axis = Axis::default()
            .title(self.data.x_column.as_str())
            .bounds([-0.5, groups.len() as f64 - 0.5])
            .style(axis_style);
        let y_axis = Axis::default()
            .title(self.data.y_column.as_str())
            .bounds([y_min, y_max])
            .style(axis_style)
            .labels(y_labels(y_min, y_max, axis_style));

        Chart::new(datasets)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(3, 4)))
            .render(area, buf);
    }
}

/// Line chart over the sorted points, x labels formatted for the x column's type.
pub struct LineChartView<'a> {
    pub data: &'a LineChartData,
    pub ctx: &'a RenderContext,
}

impl Widget for LineChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let points = &self.data.points;
        if points.is_empty() {
            render_placeholder("No rows with values in both columns", area, buf, self.ctx);
            return;
        }

        let (x_min, x_max) = bounds(points.iter().map(|p| p.0));
        let (y_min, y_max) = bounds(points.iter().map(|p| p.1));

        let dataset = Dataset::default()
            .name(self.data.y_column.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.ctx.series_color(0)))
            .data(points);

        let axis_style = Style::default().fg(self.ctx.text_primary);
        let x_labels = vec![
            Span::styled(self.data.format_x(x_min), axis_style),
            Span::styled(self.data.format_x((x_min + x_max) / 2.0), axis_style),
            Span::styled(self.data.format_x(x_max), axis_style),
        ];
        let x_axis = Axis::default()
            .title(self.data.x_column.as_str())
            .bounds([x_min, x_max])
            .style(axis_style)
            .labels(x_labels);
        let y_axis = Axis::default()
            .title(self.data.y_column.as_str())
            .bounds([y_min, y_max])
            .style(axis_style)
            .labels(y_labels(y_min, y_max, axis_style));

        Chart::new(vec![dataset])
            .x_axis(x_axis)
            .y_axis(y_axis)
            .legend_position(None)
            .render(area, buf);
    }
}

/// Slice under the point `(x, y)` of a unit pie, or None outside the circle.
/// Slices start at twelve o'clock and run counterclockwise.
pub fn slice_at(fractions: &[f64], x: f64, y: f64) -> Option<usize> {
    if x * x + y * y > 1.0 || fractions.is_empty() {
        return None;
    }
    let angle = (-x).atan2(y).rem_euclid(std::f64::consts::TAU);
    let position = angle / std::f64::consts::TAU;
    let mut end = 0.0;
    for (i, f) in fractions.iter().enumerate() {
        end += f;
        if position < end {
            return Some(i);
        }
    }
    // rounding can leave the last sliver uncovered
    fractions.iter().rposition(|f| *f > 0.0)
}

/// Pie chart: filled disc on the left, legend with counts and shares on the right.
pub struct PieChartView<'a> {
    pub data: &'a PieChartData,
    pub ctx: &'a RenderContext,
}

impl Widget for PieChartView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.data.total() == 0 {
            render_placeholder("No values to count", area, buf, self.ctx);
            return;
        }

        // terminal cells are about twice as tall as wide
        let pie_width = (area.height.saturating_mul(2)).min(area.width / 2).max(1);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(pie_width), Constraint::Fill(1)])
            .split(area);

        let fractions: Vec<f64> = (0..self.data.slices.len())
            .map(|i| self.data.fraction(i))
            .collect();

        // braille packs 2x4 dots per cell
        let cols = (chunks[0].width as usize * 2).max(1);
        let rows = (chunks[0].height as usize * 4).max(1);
        let mut slice_points: Vec<Vec<(f64, f64)>> = vec![Vec::new(); fractions.len()];
        for r in 0..rows {
            let y = 1.0 - 2.0 * (r as f64 + 0.5) / rows as f64;
            for c in 0..cols {
                let x = -1.0 + 2.0 * (c as f64 + 0.5) / cols as f64;
                if let Some(i) = slice_at(&fractions, x, y) {
                    slice_points[i].push((x, y));
                }
            }
        }

        let ctx = self.ctx;
        Canvas::default()
            .marker(symbols::Marker::Braille)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(|painter| {
                for (i, slice) in slice_points.iter().enumerate() {
                    painter.draw(&Points {
                        coords: slice.as_slice(),
                        color: ctx.series_color(i),
                    });
                }
            })
            .render(chunks[0], buf);

        let legend: Vec<Line> = self
            .data
            .slices
            .iter()
            .enumerate()
            .map(|(i, (value, count))| {
                Line::from(vec![
                    Span::styled("■ ", Style::default().fg(ctx.series_color(i))),
                    Span::styled(value.clone(), Style::default().fg(ctx.text_primary)),
                    Span::styled(
                        format!("  {} ({:.1}%)", count, fractions[i] * 100.0),
                        Style::default().fg(ctx.text_secondary),
                    ),
                ])
            })
            .collect();
        Paragraph::new(legend).render(chunks[1], buf);
    }
}

/// Correlation heatmap: a colored grid of annotated cells with a color bar on the right.
pub struct HeatmapView<'a> {
    pub data: &'a HeatmapData,
    pub ctx: &'a RenderContext,
}

const HEATMAP_LABEL_MAX: usize = 14;
const COLOR_BAR_WIDTH: u16 = 9;

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Dark text on light cells, light text on dark ones.
fn annotation_color(rgb: (u8, u8, u8)) -> Color {
    let (r, g, b) = rgb;
    let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    if luminance > 140.0 {
        Color::Black
    } else {
        Color::White
    }
}

impl HeatmapView<'_> {
    fn render_color_bar(&self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 2 {
            return;
        }
        let (lo, hi) = self.data.value_range();
        let parser = &self.ctx.color_parser;
        let steps = area.height.max(2) - 1;
        for dy in 0..area.height {
            let t = 1.0 - dy as f64 / steps as f64;
            let (r, g, b) = crate::chart_data::coolwarm(t);
            buf[(area.x, area.y + dy)]
                .set_symbol(" ")
                .set_bg(parser.rgb(r, g, b));
        }
        let label_style = Style::default().fg(self.ctx.text_secondary);
        let label_width = area.width - 2;
        buf.set_stringn(area.x + 2, area.y, format!("{:.2}", hi), label_width as usize, label_style);
        buf.set_stringn(
            area.x + 2,
            area.bottom() - 1,
            format!("{:.2}", lo),
            label_width as usize,
            label_style,
        );
    }
}

/// `start + index * step`, saturating at the edge of the coordinate space.
fn grid_offset(start: u16, index: usize, step: u16) -> u16 {
    let index = u16::try_from(index).unwrap_or(u16::MAX);
    start.saturating_add(index.saturating_mul(step))
}

impl Widget for HeatmapView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let matrix = &self.data.matrix;
        let n = matrix.len();
        if n == 0 || area.height < 2 {
            return;
        }
        let n_cells = u16::try_from(n).unwrap_or(u16::MAX);

        let label_width = matrix
            .columns
            .iter()
            .map(|c| c.chars().count().min(HEATMAP_LABEL_MAX))
            .max()
            .unwrap_or(0) as u16
            + 1;
        let grid_width = area.width.saturating_sub(label_width + COLOR_BAR_WIDTH + 1);
        let cell_width = (grid_width / n_cells).clamp(6, 12);
        let cell_height = ((area.height - 1) / n_cells).clamp(1, 3);

        let header_style = Style::default()
            .fg(self.ctx.text_primary)
            .add_modifier(Modifier::BOLD);
        let origin_x = area.x.saturating_add(label_width);
        let origin_y = area.y + 1;

        for (j, name) in matrix.columns.iter().enumerate() {
            let x = grid_offset(origin_x, j, cell_width);
            if x >= area.right() {
                break;
            }
            let text = truncate(name, cell_width as usize - 1);
            let pad = (cell_width as usize - text.chars().count()) / 2;
            let max = (area.right() - x) as usize;
            buf.set_stringn(x + pad as u16, area.y, text, max.saturating_sub(pad), header_style);
        }

        for i in 0..n {
            let y = grid_offset(origin_y, i, cell_height);
            if y >= area.bottom() {
                break;
            }
            let label_row = y + cell_height / 2;
            if label_row < area.bottom() {
                buf.set_stringn(
                    area.x,
                    label_row,
                    truncate(&matrix.columns[i], HEATMAP_LABEL_MAX),
                    label_width as usize - 1,
                    header_style,
                );
            }

            for j in 0..n {
                let x = grid_offset(origin_x, j, cell_width);
                if x >= area.right() {
                    break;
                }
                let cell = Rect::new(x, y, cell_width, cell_height).intersection(area);
                if cell.is_empty() {
                    continue;
                }
                let (bg, fg) = match self.data.cell_rgb(i, j) {
                    Some((r, g, b)) => (
                        self.ctx.color_parser.rgb(r, g, b),
                        annotation_color((r, g, b)),
                    ),
                    None => (self.ctx.heatmap_undefined, self.ctx.text_primary),
                };
                let style = Style::default().bg(bg).fg(fg);
                buf.set_style(cell, style);
                let text = self.data.annotation(i, j);
                let text_row = cell.y + cell.height / 2;
                let pad = cell.width.saturating_sub(text.chars().count() as u16) / 2;
                buf.set_stringn(cell.x + pad, text_row, text, (cell.width - pad) as usize, style);
            }
        }

        let bar_x = grid_offset(origin_x, n, cell_width).saturating_add(1);
        if bar_x.saturating_add(COLOR_BAR_WIDTH) <= area.right() {
            let bar_height = n_cells
                .saturating_mul(cell_height)
                .min(area.bottom() - origin_y);
            self.render_color_bar(Rect::new(bar_x, origin_y, COLOR_BAR_WIDTH, bar_height), buf);
        }
    }
}
