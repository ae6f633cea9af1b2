use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

pub mod cache;
pub mod chart_data;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod error_display;
pub mod loader;
pub mod logging;
pub mod render;
pub mod selection;
pub mod statistics;
pub mod table;
pub mod upload;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{AppConfig, ConfigManager, Theme};
pub use dashboard::Dashboard;
pub use render::sections::Section;
pub use storeviz_cli::{Args, FileFormat};
pub use table::Table;

use crate::classify::{all_columns, classify};
use crate::error_display::user_message_from_report;
use crate::loader::LoadOptions;
use crate::render::layout::app_layout;
use crate::render::overlays::{render_error_modal, render_upload_prompt};
use crate::render::sections::{render_section, render_section_tabs, SectionView};
use crate::render::RenderContext;
use crate::selection::ChartSelection;
use crate::upload::NO_FILE_MESSAGE;
use crate::widgets::controls::Controls;
use crate::widgets::datatable::DataTableState;
use crate::widgets::debug::DebugState;
use crate::widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "storeviz";

pub const DASHBOARD_TITLE: &str = "Store Data Dashboard";

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    DoLoad(PathBuf), // Internal event to actually perform loading after UI update
    /// A selector changed: rebuild the page from the current table
    Rerun,
    Resize(u16, u16), // resized (width, height)
    Exit,
    Crash(String),
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// The upload prompt has the keyboard
    Upload,
}

pub struct App {
    events: Sender<AppEvent>,
    table: Option<Table>,
    file_name: Option<String>,
    dashboard: Option<Dashboard>,
    selection: ChartSelection,
    section: Section,
    datatable_state: DataTableState,
    summary_start_col: usize,
    upload_input: TextInput,
    input_mode: InputMode,
    /// Name of the file being loaded, shown until the load finishes
    loading: Option<String>,
    error_modal: ErrorModal,
    cache: Option<CacheManager>,
    config: AppConfig,
    theme: Theme,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> App {
        let config = AppConfig::default();
        let theme = Theme::from_config(&config.theme).unwrap_or_else(|e| {
            tracing::warn!("default theme failed to parse: {}", e);
            Theme {
                colors: Default::default(),
            }
        });
        Self::new_with_config(events, theme, config)
    }

    pub fn new_with_config(events: Sender<AppEvent>, theme: Theme, config: AppConfig) -> App {
        // Fall back to a temp dir so upload history still works without a home directory
        let cache = CacheManager::new(APP_NAME)
            .unwrap_or_else(|_| CacheManager::with_dir(std::env::temp_dir().join(APP_NAME)));

        let mut upload_input = TextInput::new().with_text_color(theme.get("text_primary"));
        if config.upload.enable_history {
            upload_input = upload_input.with_history(config.upload.history_limit);
        }

        let debug = DebugState {
            enabled: config.debug.enabled,
            ..Default::default()
        };

        App {
            events,
            table: None,
            file_name: None,
            dashboard: None,
            selection: ChartSelection::default(),
            section: Section::default(),
            datatable_state: DataTableState::default(),
            summary_start_col: 0,
            upload_input,
            input_mode: InputMode::Normal,
            loading: None,
            error_modal: ErrorModal::new(),
            cache: Some(cache),
            config,
            theme,
            debug,
        }
    }

    /// Use `cache` for upload history, or no persistence at all with None.
    pub fn with_cache(mut self, cache: Option<CacheManager>) -> Self {
        self.cache = cache;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        self.dashboard.as_ref()
    }

    pub fn selection(&self) -> &ChartSelection {
        &self.selection
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn error_modal(&self) -> &ErrorModal {
        &self.error_modal
    }

    pub fn debug(&self) -> &DebugState {
        &self.debug
    }

    pub fn set_section(&mut self, section: Section) {
        self.section = section;
        if let Some(chart) = section.chart() {
            self.selection.focus_chart(chart);
        }
    }

    /// Read `path` and rebuild the page, or show why it could not be loaded.
    fn load(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let options = LoadOptions::from(&self.config.loading);
        let loaded =
            upload::accept(path).and_then(|file| loader::load_table_with(&file, &options));

        match loaded {
            Ok(table) => {
                tracing::info!(file = %name, rows = table.height(), cols = table.width(), "loaded");
                let classification = classify(&table);
                self.selection
                    .rebuild(&classification, &all_columns(&table));
                self.datatable_state.reset(table.height(), table.width());
                self.summary_start_col = 0;
                self.table = Some(table);
                self.file_name = Some(name);
                self.rerun();
            }
            Err(e) => {
                tracing::error!(file = %name, error = %e, "load failed");
                self.table = None;
                self.dashboard = None;
                self.file_name = None;
                self.error_modal
                    .show(user_message_from_report(&e, Some(&name)));
            }
        }
    }

    /// Derive everything on the page from the table and the current selections.
    fn rerun(&mut self) {
        let Some(table) = &self.table else {
            self.dashboard = None;
            return;
        };
        self.debug.num_reruns += 1;
        match Dashboard::build(table, &self.selection, &self.config.chart) {
            Ok(dashboard) => self.dashboard = Some(dashboard),
            Err(e) => {
                tracing::error!(error = %e, "dashboard rebuild failed");
                self.dashboard = None;
                self.error_modal
                    .show(user_message_from_report(&e, self.file_name.as_deref()));
            }
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;

        match event {
            AppEvent::Key(key) => {
                if key.is_press() {
                    self.debug.on_key(key);
                    self.key(key)
                } else {
                    None
                }
            }
            AppEvent::Open(path) => {
                // draw "Loading" before the blocking read
                self.loading = Some(path.display().to_string());
                Some(AppEvent::DoLoad(path.clone()))
            }
            AppEvent::DoLoad(path) => {
                self.load(path);
                self.loading = None;
                None
            }
            AppEvent::Rerun => {
                self.rerun();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Enter | KeyCode::Esc) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.input_mode == InputMode::Upload {
            return self.upload_key(event);
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return Some(AppEvent::Exit);
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('o') => {
                self.input_mode = InputMode::Upload;
                self.upload_input.clear();
                self.upload_input.set_focused(true);
                return None;
            }
            _ => {}
        }

        self.table.as_ref()?;

        match event.code {
            KeyCode::Tab => self.set_section(self.section.next()),
            KeyCode::BackTab => self.set_section(self.section.prev()),
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.set_section(Section::ALL[index]);
            }
            _ => return self.section_key(event),
        }
        None
    }

    fn upload_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match self.upload_input.handle_key(event, self.cache.as_ref()) {
            TextInputEvent::Submit => {
                let value = self.upload_input.value().trim().to_string();
                if value.is_empty() {
                    return None;
                }
                self.input_mode = InputMode::Normal;
                self.upload_input.set_focused(false);
                self.upload_input.clear();
                Some(AppEvent::Open(PathBuf::from(value)))
            }
            TextInputEvent::Cancel => {
                self.input_mode = InputMode::Normal;
                self.upload_input.set_focused(false);
                self.upload_input.clear();
                None
            }
            TextInputEvent::None | TextInputEvent::HistoryChanged => None,
        }
    }

    fn section_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if let Some(chart) = self.section.chart() {
            return match event.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.selection.move_focus(chart, false);
                    None
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.selection.move_focus(chart, true);
                    None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selection.cycle(true).then_some(AppEvent::Rerun)
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selection.cycle(false).then_some(AppEvent::Rerun)
                }
                _ => None,
            };
        }

        match self.section {
            Section::RawData => {
                let state = &mut self.datatable_state;
                match event.code {
                    KeyCode::Down | KeyCode::Char('j') => state.scroll_down(1),
                    KeyCode::Up | KeyCode::Char('k') => state.scroll_up(1),
                    KeyCode::PageDown => state.page_down(),
                    KeyCode::PageUp => state.page_up(),
                    KeyCode::Home | KeyCode::Char('g') => state.scroll_to_start(),
                    KeyCode::End | KeyCode::Char('G') => state.scroll_to_end(),
                    KeyCode::Right | KeyCode::Char('l') => state.scroll_right(),
                    KeyCode::Left | KeyCode::Char('h') => state.scroll_left(),
                    _ => {}
                }
            }
            Section::Summary => {
                let columns = self
                    .dashboard
                    .as_ref()
                    .map(|d| d.summary.column_names().len())
                    .unwrap_or(0);
                match event.code {
                    KeyCode::Right | KeyCode::Char('l') if self.summary_start_col + 1 < columns => {
                        self.summary_start_col += 1
                    }
                    KeyCode::Left | KeyCode::Char('h') => {
                        self.summary_start_col = self.summary_start_col.saturating_sub(1)
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        None
    }

    fn controls(&self) -> Controls {
        let keys: Vec<(&'static str, &'static str)> = if self.input_mode == InputMode::Upload {
            vec![("Enter", "Load"), ("Esc", "Cancel"), ("↑↓", "History")]
        } else if self.table.is_none() {
            vec![("o", "Upload"), ("q", "Quit")]
        } else if self.section.chart().is_some() {
            vec![
                ("Tab", "Section"),
                ("←→", "Selector"),
                ("↑↓", "Column"),
                ("o", "Upload"),
                ("q", "Quit"),
            ]
        } else {
            vec![
                ("Tab", "Section"),
                ("↑↓", "Scroll"),
                ("←→", "Columns"),
                ("o", "Upload"),
                ("q", "Quit"),
            ]
        };
        let controls = Controls::new(keys).with_colors(
            self.theme.get("controls_bg"),
            self.theme.get("primary"),
            self.theme.get("text_primary"),
        );
        match &self.table {
            Some(table) => controls.with_shape(table.height(), table.width()),
            None => controls,
        }
    }

    fn render_title(&self, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
        let mut spans = vec![Span::styled(
            DASHBOARD_TITLE,
            Style::default()
                .fg(ctx.primary)
                .add_modifier(Modifier::BOLD),
        )];
        let status = match (&self.loading, &self.file_name) {
            (Some(path), _) => Some(format!("Loading {}...", path)),
            (None, Some(name)) => Some(name.clone()),
            (None, None) => None,
        };
        if let Some(status) = status {
            spans.push(Span::styled(
                format!("  {}", status),
                Style::default().fg(ctx.text_secondary),
            ));
        }
        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        let ctx = RenderContext::from_theme_and_config(&self.theme, &self.config.display);

        Clear.render(area, buf);
        Block::default()
            .style(Style::default().bg(ctx.background))
            .render(area, buf);

        let layout = app_layout(area, self.debug.enabled);
        self.render_title(layout.title, buf, &ctx);

        match (&self.table, &self.dashboard) {
            (Some(table), Some(dashboard)) => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(1), Constraint::Fill(1)])
                    .split(layout.main_view);
                render_section_tabs(chunks[0], buf, self.section, &ctx);
                render_section(
                    chunks[1],
                    buf,
                    SectionView {
                        section: self.section,
                        table,
                        dashboard,
                        selection: &self.selection,
                        summary_start_col: self.summary_start_col,
                        ctx: &ctx,
                    },
                    &mut self.datatable_state,
                );
            }
            _ => {
                Paragraph::new(vec![
                    Line::from(NO_FILE_MESSAGE),
                    Line::from(Span::styled(
                        "Press o to choose a file",
                        Style::default().fg(ctx.text_secondary),
                    )),
                ])
                .style(Style::default().fg(ctx.text_primary))
                .centered()
                .render(layout.main_view, buf);
            }
        }

        (&self.controls()).render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            (&self.debug).render(debug_area, buf);
        }

        if self.input_mode == InputMode::Upload {
            render_upload_prompt(layout.main_view, buf, &self.upload_input, &ctx);
        }

        if self.error_modal.active {
            render_error_modal(area, buf, &self.error_modal, &ctx);
        }
    }
}

/// Start the terminal UI, loading `path` first when given.
pub fn run(path: Option<PathBuf>, config: AppConfig, debug: bool) -> Result<()> {
    use std::sync::mpsc;

    let theme = Theme::from_config(&config.theme)
        .or_else(|e| Theme::from_config(&AppConfig::default().theme).map_err(|_| e))?;

    let mut terminal = ratatui::try_init().map_err(|e| {
        color_eyre::eyre::eyre!(
            "storeviz requires an interactive terminal (TTY). No terminal detected: {}",
            e
        )
    })?;
    let (tx, rx) = mpsc::channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config.clone());
    if debug {
        app.enable_debug();
    }

    terminal.draw(|frame| frame.render_widget(&mut app, frame.area()))?;
    if let Some(path) = path {
        tx.send(AppEvent::Open(path))?;
    }

    let result = event_loop(&mut terminal, &mut app, &tx, &rx, &config);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    tx: &Sender<AppEvent>,
    rx: &std::sync::mpsc::Receiver<AppEvent>,
    config: &AppConfig,
) -> Result<()> {
    use std::sync::mpsc::RecvTimeoutError;
    use std::time::Duration;

    loop {
        if crossterm::event::poll(Duration::from_millis(
            config.performance.event_poll_interval_ms,
        ))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if key.is_press() {
                        tx.send(AppEvent::Key(key))?
                    }
                }
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(next) = app.event(&event) {
                            tx.send(next)?;
                        }
                    }
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            terminal.draw(|frame| frame.render_widget(&mut *app, frame.area()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn app() -> App {
        let (tx, _rx) = channel();
        App::new(tx).with_cache(None)
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(matches!(
            app.event(&press(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(matches!(app.event(&ctrl_c), Some(AppEvent::Exit)));
    }

    #[test]
    fn test_open_defers_load() {
        let mut app = app();
        let next = app.event(&AppEvent::Open(PathBuf::from("store.csv")));
        assert!(matches!(next, Some(AppEvent::DoLoad(p)) if p == Path::new("store.csv")));
    }

    #[test]
    fn test_upload_prompt_submits_path() {
        let mut app = app();
        app.event(&press(KeyCode::Char('o')));
        assert_eq!(app.input_mode(), InputMode::Upload);
        // q is typed into the prompt, not a quit
        for c in "q.csv".chars() {
            assert!(app.event(&press(KeyCode::Char(c))).is_none());
        }
        let next = app.event(&press(KeyCode::Enter));
        assert!(matches!(next, Some(AppEvent::Open(p)) if p == Path::new("q.csv")));
        assert_eq!(app.input_mode(), InputMode::Normal);
    }

    #[test]
    fn test_missing_file_shows_error() {
        let mut app = app();
        app.event(&AppEvent::DoLoad(PathBuf::from("/nonexistent/store.csv")));
        assert!(app.error_modal().active);
        assert!(app.table().is_none());
        app.event(&press(KeyCode::Esc));
        assert!(!app.error_modal().active);
    }

    #[test]
    fn test_sections_need_a_table() {
        let mut app = app();
        app.event(&press(KeyCode::Tab));
        assert_eq!(app.section(), Section::RawData);
    }

    #[test]
    fn test_render_without_file() {
        let mut app = app();
        let area = Rect::new(0, 0, 80, 12);
        let mut buf = Buffer::empty(area);
        (&mut app).render(area, &mut buf);
        let text: String = (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains(DASHBOARD_TITLE));
        assert!(text.contains(NO_FILE_MESSAGE));
    }
}
