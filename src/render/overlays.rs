//! Overlay rendering (upload prompt, error modal).

use crate::render::context::RenderContext;
use crate::render::layout::{centered_rect, centered_rect_with_min};
use crate::upload::UPLOAD_LABEL;
use crate::widgets::text_input::TextInput;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Widget;
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

/// Renders the file prompt: a path input plus the accepted extensions.
pub fn render_upload_prompt(
    area: Rect,
    buf: &mut Buffer,
    input: &TextInput,
    ctx: &RenderContext,
) {
    let popup_area = centered_rect_with_min(area, 60, 20, 40, 6);
    Clear.render(popup_area, buf);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(UPLOAD_LABEL)
        .border_style(Style::default().fg(ctx.primary))
        .style(Style::default().bg(ctx.background));
    let inner_area = block.inner(popup_area);
    block.render(popup_area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inner_area);

    input.render(chunks[0], buf);

    let hint = format!(
        "Accepted: {}  |  Enter: load  Esc: cancel  Up/Down: history",
        storeviz_cli::FileFormat::accepted_extensions()
            .iter()
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(" ")
    );
    Paragraph::new(hint)
        .style(Style::default().fg(ctx.text_secondary))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .render(chunks[2], buf);
}

/// Renders the error modal with an OK button.
pub fn render_error_modal(
    area: Rect,
    buf: &mut Buffer,
    modal: &crate::ErrorModal,
    ctx: &RenderContext,
) {
    let popup_area = centered_rect(area, 70, 40);
    Clear.render(popup_area, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("Error")
        .border_style(Style::default().fg(ctx.modal_border_error));
    let inner_area = block.inner(popup_area);
    block.render(popup_area, buf);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner_area);

    Paragraph::new(modal.message.as_str())
        .style(Style::default().fg(ctx.error))
        .wrap(ratatui::widgets::Wrap { trim: true })
        .render(chunks[0], buf);

    Paragraph::new("OK")
        .centered()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ctx.primary)),
        )
        .render(chunks[1], buf);
}
