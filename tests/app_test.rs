mod common;

use common::{store_xlsx, write_temp_file, STORE_CSV};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::sync::mpsc::channel;
use storeviz::selection::SelectorId;
use storeviz::{App, AppEvent, Section, DASHBOARD_TITLE};

fn app() -> App {
    let (tx, _rx) = channel();
    App::new(tx).with_cache(None)
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

/// Feed an event and every follow-up it produces, like the event loop does.
fn dispatch(app: &mut App, event: AppEvent) {
    let mut next = app.event(&event);
    while let Some(event) = next {
        next = app.event(&event);
    }
}

fn screen(app: &mut App) -> String {
    let area = Rect::new(0, 0, 120, 30);
    let mut buf = Buffer::empty(area);
    (&mut *app).render(area, &mut buf);
    (0..area.height)
        .map(|y| {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_upload_then_walk_every_section() {
    let (_dir, path) = write_temp_file("store.csv", STORE_CSV.as_bytes());
    let mut app = app();
    dispatch(&mut app, AppEvent::Open(path));

    assert!(!app.error_modal().active);
    assert_eq!(app.file_name(), Some("store.csv"));
    assert_eq!(app.table().map(|t| t.height()), Some(5));
    assert!(app.dashboard().is_some());

    let first = screen(&mut app);
    assert!(first.contains(DASHBOARD_TITLE));
    assert!(first.contains("Raw Data"));
    assert!(first.contains("region"));

    for expected in [
        Section::Summary,
        Section::Bar,
        Section::Pie,
        Section::Line,
        Section::Heatmap,
    ] {
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.section(), expected);
        assert!(screen(&mut app).contains(expected.title()));
    }
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.section(), Section::RawData);
}

#[test]
fn test_selector_change_requests_rerun() {
    let (_dir, path) = write_temp_file("store.csv", STORE_CSV.as_bytes());
    let mut app = app();
    dispatch(&mut app, AppEvent::Open(path));

    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.section(), Section::Bar);
    assert_eq!(app.selection().focused(), SelectorId::BarX);

    let next = press(&mut app, KeyCode::Down);
    assert!(matches!(next, Some(AppEvent::Rerun)));
    dispatch(&mut app, AppEvent::Rerun);
    assert_eq!(
        app.dashboard().and_then(|d| d.bar.as_ref()).map(|b| b.title.as_str()),
        Some("sales by region")
    );
    assert!(screen(&mut app).contains("sales by region"));

    // y selector next
    press(&mut app, KeyCode::Right);
    assert_eq!(app.selection().focused(), SelectorId::BarY);
}

#[test]
fn test_excel_upload() {
    let bytes = store_xlsx(&["North", "South"], &[1.0, 2.0]);
    let (_dir, path) = write_temp_file("store.xlsx", &bytes);
    let mut app = app();
    dispatch(&mut app, AppEvent::Open(path));
    assert_eq!(app.table().map(|t| t.width()), Some(2));
}

#[test]
fn test_failed_upload_clears_previous_table() {
    let (_dir, good) = write_temp_file("store.csv", STORE_CSV.as_bytes());
    let (_dir2, bad) = write_temp_file("store.xlsx", STORE_CSV.as_bytes());
    let mut app = app();
    dispatch(&mut app, AppEvent::Open(good));
    assert!(app.table().is_some());

    dispatch(&mut app, AppEvent::Open(bad));
    assert!(app.error_modal().active);
    assert!(app.error_modal().message.contains("store.xlsx"));
    assert!(app.table().is_none());
    assert!(screen(&mut app).contains("Error"));
}
