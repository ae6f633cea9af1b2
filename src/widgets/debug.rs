use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    /// Dashboard rebuilds (uploads and selector changes)
    pub num_reruns: usize,
    pub last_key_event_name: String,
    pub enabled: bool,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} last_key={} reruns={} frames={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.num_reruns,
            self.num_frames,
        ))
        .render(area, buf);
    }
}
