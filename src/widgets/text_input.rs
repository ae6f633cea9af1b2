use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::cache::{add_to_history, CacheManager};

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Submit,         // Enter pressed
    Cancel,         // Esc pressed
    HistoryChanged, // Up/Down walked the history
}

/// Single-line text input wrapping tui-textarea, with an optional path history.
pub struct TextInput {
    textarea: TextArea<'static>,
    history_enabled: bool,
    history: Vec<String>,
    history_index: Option<usize>,
    /// What the user was typing before walking the history
    history_temp: Option<String>,
    history_limit: usize,
    history_loaded: bool,
    text_color: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            history_enabled: false,
            history: Vec::new(),
            history_index: None,
            history_temp: None,
            history_limit: 100,
            history_loaded: false,
            text_color: None,
            focused: false,
        };
        widget.apply_style();
        widget
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = Some(color);
        self.apply_style();
        self
    }

    /// Remember submitted values, keeping at most `limit`.
    pub fn with_history(mut self, limit: usize) -> Self {
        self.history_enabled = true;
        self.history_limit = limit;
        self
    }

    fn apply_style(&mut self) {
        let style = match self.text_color {
            Some(c) => Style::default().fg(c),
            None => Style::default(),
        };
        self.textarea.set_style(style);
        // no underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
        self.apply_cursor_style();
    }

    fn apply_cursor_style(&mut self) {
        if self.focused {
            self.textarea
                .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        } else {
            // same style as the text hides the cursor
            let text_style = self.textarea.style();
            self.textarea.set_cursor_style(text_style);
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_cursor_style();
    }

    pub fn value(&self) -> String {
        self.textarea.lines().first().cloned().unwrap_or_default()
    }

    pub fn set_value(&mut self, value: &str) {
        let single_line = value.replace(['\n', '\r'], " ");
        let cursor = single_line.chars().count();
        self.textarea = TextArea::new(vec![single_line]);
        self.apply_style();
        self.textarea
            .move_cursor(CursorMove::Jump(0, cursor.min(u16::MAX as usize) as u16));
    }

    pub fn clear(&mut self) {
        self.set_value("");
        self.history_index = None;
        self.history_temp = None;
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn ensure_history(&mut self, cache: Option<&CacheManager>) {
        if self.history_loaded || !self.history_enabled {
            return;
        }
        let Some(cache) = cache else {
            return;
        };
        match cache.load_history() {
            Ok(history) => self.history = history,
            Err(e) => tracing::warn!("could not load upload history: {}", e),
        }
        self.history_loaded = true;
    }

    fn remember(&mut self, cache: Option<&CacheManager>) {
        if !self.history_enabled {
            return;
        }
        let value = self.value();
        if value.is_empty() {
            return;
        }
        self.ensure_history(cache);
        add_to_history(&mut self.history, value);
        if let Some(cache) = cache {
            if let Err(e) = cache.save_history(&self.history, self.history_limit) {
                tracing::warn!("could not save upload history: {}", e);
            }
        }
    }

    /// Older entry
    pub fn history_up(&mut self, cache: Option<&CacheManager>) {
        self.ensure_history(cache);
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            Some(i) => i.saturating_sub(1),
            None => {
                self.history_temp = Some(self.value());
                self.history.len() - 1
            }
        };
        self.history_index = Some(index);
        if let Some(entry) = self.history.get(index).cloned() {
            self.set_value(&entry);
        }
    }

    /// Newer entry, or back to what was being typed
    pub fn history_down(&mut self) {
        let Some(current) = self.history_index else {
            return;
        };
        if current + 1 >= self.history.len() {
            let temp = self.history_temp.take().unwrap_or_default();
            self.set_value(&temp);
            self.history_index = None;
        } else {
            self.history_index = Some(current + 1);
            if let Some(entry) = self.history.get(current + 1).cloned() {
                self.set_value(&entry);
            }
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent, cache: Option<&CacheManager>) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => {
                self.remember(cache);
                return TextInputEvent::Submit;
            }
            KeyCode::Esc => return TextInputEvent::Cancel,
            KeyCode::Up if self.history_enabled => {
                self.history_up(cache);
                return TextInputEvent::HistoryChanged;
            }
            KeyCode::Down if self.history_enabled => {
                self.history_down();
                return TextInputEvent::HistoryChanged;
            }
            _ => {}
        }

        let input = key_event_to_input(event);
        if matches!(input.key, Key::Char('\n') | Key::Char('\r') | Key::Null) {
            return TextInputEvent::None;
        }
        self.textarea.input(input);
        if self.history_index.is_some() {
            self.history_index = None;
            self.history_temp = None;
        }
        TextInputEvent::None
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        _ => Key::Null,
    };
    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        // tui-textarea underlines by default
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}
