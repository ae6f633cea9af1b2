//! Column selectors for the three chart sections.

use crate::classify::ColumnClassification;

/// A dropdown over column names. Starts on the first option and keeps the user's choice
/// as long as it stays among the options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selectbox {
    label: &'static str,
    options: Vec<String>,
    index: Option<usize>,
}

impl Selectbox {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            options: Vec::new(),
            index: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn selected(&self) -> Option<&str> {
        self.index
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Replace the options, keeping the selected name when it is still offered.
    pub fn set_options(&mut self, options: Vec<String>) {
        let keep = self
            .selected()
            .and_then(|name| options.iter().position(|o| o == name));
        self.index = match keep {
            Some(i) => Some(i),
            None if options.is_empty() => None,
            None => Some(0),
        };
        self.options = options;
    }

    /// Pick an option by name; false when it is not offered.
    pub fn select(&mut self, name: &str) -> bool {
        match self.options.iter().position(|o| o == name) {
            Some(i) => {
                self.index = Some(i);
                true
            }
            None => false,
        }
    }

    /// Move to the next (or previous) option, wrapping. Returns true when the choice changed.
    pub fn cycle(&mut self, forward: bool) -> bool {
        let len = self.options.len();
        let Some(current) = self.index else {
            return false;
        };
        if len < 2 {
            return false;
        }
        self.index = Some(if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        });
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectorId {
    BarX,
    BarY,
    Pie,
    LineX,
    LineY,
}

impl ChartKind {
    /// Selectors of the chart, left to right
    pub fn selectors(self) -> &'static [SelectorId] {
        match self {
            ChartKind::Bar => &[SelectorId::BarX, SelectorId::BarY],
            ChartKind::Pie => &[SelectorId::Pie],
            ChartKind::Line => &[SelectorId::LineX, SelectorId::LineY],
        }
    }
}

/// The user's column choices for every chart, plus which selector has focus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSelection {
    pub bar_x: Selectbox,
    pub bar_y: Selectbox,
    pub pie: Selectbox,
    pub line_x: Selectbox,
    pub line_y: Selectbox,
    focus: SelectorId,
}

impl Default for ChartSelection {
    fn default() -> Self {
        Self {
            bar_x: Selectbox::new("X-axis (categorical)"),
            bar_y: Selectbox::new("Y-axis (numeric)"),
            pie: Selectbox::new("Column for Pie Chart"),
            line_x: Selectbox::new("X-axis (Date/Time or Categorical)"),
            line_y: Selectbox::new("Y-axis (numeric)"),
            focus: SelectorId::BarX,
        }
    }
}

impl ChartSelection {
    /// Refresh every selector's options from a newly classified table.
    pub fn rebuild(&mut self, classification: &ColumnClassification, all_columns: &[String]) {
        self.bar_x.set_options(classification.categorical.clone());
        self.bar_y.set_options(classification.numeric.clone());
        self.pie.set_options(classification.categorical.clone());
        self.line_x.set_options(all_columns.to_vec());
        self.line_y.set_options(classification.numeric.clone());
    }

    pub fn get(&self, id: SelectorId) -> &Selectbox {
        match id {
            SelectorId::BarX => &self.bar_x,
            SelectorId::BarY => &self.bar_y,
            SelectorId::Pie => &self.pie,
            SelectorId::LineX => &self.line_x,
            SelectorId::LineY => &self.line_y,
        }
    }

    pub fn get_mut(&mut self, id: SelectorId) -> &mut Selectbox {
        match id {
            SelectorId::BarX => &mut self.bar_x,
            SelectorId::BarY => &mut self.bar_y,
            SelectorId::Pie => &mut self.pie,
            SelectorId::LineX => &mut self.line_x,
            SelectorId::LineY => &mut self.line_y,
        }
    }

    pub fn focused(&self) -> SelectorId {
        self.focus
    }

    /// Put focus on `chart`'s first selector unless it already sits on one of them.
    pub fn focus_chart(&mut self, chart: ChartKind) {
        let selectors = chart.selectors();
        if !selectors.contains(&self.focus) {
            self.focus = selectors[0];
        }
    }

    /// Move focus between the selectors of `chart`, wrapping.
    pub fn move_focus(&mut self, chart: ChartKind, forward: bool) {
        let selectors = chart.selectors();
        let len = selectors.len();
        let pos = selectors.iter().position(|s| *s == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.focus = selectors[next];
    }

    /// Change the focused selector's option. True when a rerun is needed.
    pub fn cycle(&mut self, forward: bool) -> bool {
        let focus = self.focus;
        self.get_mut(focus).cycle(forward)
    }
}
