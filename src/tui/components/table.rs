//! # Data Table
//!
//! Column-configured table over JSON object rows, with selection and
//! column sorting. Rows are `serde_json::Value` objects so applications
//! can load whatever their data source returns without an intermediate
//! row struct.

use std::fmt;

use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Row, Table, TableState};
use serde_json::Value;

use crate::core::theme::Theme;
use crate::tui::component::Component;
use crate::tui::components::{theme_color, truncate};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Key looked up in each row object.
    pub key: String,
    /// Header label.
    pub label: String,
    /// Column width in cells.
    pub width: u16,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>, width: u16) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    UnknownColumn(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::UnknownColumn(key) => write!(f, "unknown table column: {key}"),
        }
    }
}

impl std::error::Error for TableError {}

/// A sortable, selectable data table.
pub struct DataTable {
    columns: Vec<Column>,
    rows: Vec<Value>,
    state: TableState,
}

impl DataTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            state: TableState::default(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    /// Replace the table contents. Selection resets to the first row.
    pub fn load_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
        self.state
            .select(if self.rows.is_empty() { None } else { Some(0) });
    }

    /// The display text of a cell: strings verbatim, other JSON values via
    /// their JSON rendering, null/missing as empty.
    pub fn cell_text(row: &Value, key: &str) -> String {
        match row.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Sort rows by a column key. Numeric when both cells are numbers,
    /// lexicographic otherwise. Unknown keys are an error.
    pub fn sort_by(&mut self, key: &str) -> Result<(), TableError> {
        if !self.columns.iter().any(|c| c.key == key) {
            return Err(TableError::UnknownColumn(key.to_string()));
        }
        self.rows.sort_by(|a, b| {
            match (
                a.get(key).and_then(Value::as_f64),
                b.get(key).and_then(Value::as_f64),
            ) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => Self::cell_text(a, key).cmp(&Self::cell_text(b, key)),
            }
        });
        Ok(())
    }

    pub fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) => (i + 1).min(self.rows.len() - 1),
            None => 0,
        };
        self.state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.state.select(Some(self.rows.len() - 1));
        }
    }

    /// Built-in navigation: arrows plus Home/End. Returns whether the
    /// event was consumed.
    pub fn handle_navigation(&mut self, event: &TuiEvent) -> bool {
        let TuiEvent::Key(key) = event else {
            return false;
        };
        match key.code {
            KeyCode::Up => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            _ => return false,
        }
        true
    }
}

impl Component for DataTable {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let header_style = Style::default()
            .fg(theme_color(&theme.colors.primary))
            .add_modifier(Modifier::BOLD);
        let header = Row::new(
            self.columns
                .iter()
                .map(|c| truncate(&c.label, c.width as usize)),
        )
        .style(header_style);

        let rows = self.rows.iter().map(|row| {
            Row::new(self.columns.iter().map(|column| {
                truncate(&Self::cell_text(row, &column.key), column.width as usize)
            }))
        });

        let widths: Vec<Constraint> = self
            .columns
            .iter()
            .map(|c| Constraint::Length(c.width))
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::bordered()
                    .border_style(Style::default().fg(theme_color(&theme.colors.secondary))),
            )
            .row_highlight_style(
                Style::default()
                    .bg(theme_color(&theme.colors.selection))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_table() -> DataTable {
        let mut table = DataTable::new(vec![
            Column::new("name", "Name", 20),
            Column::new("age", "Age", 10),
            Column::new("city", "City", 20),
        ]);
        table.load_rows(vec![
            json!({"name": "John", "age": 30, "city": "New York"}),
            json!({"name": "Alice", "age": 25, "city": "London"}),
            json!({"name": "Bob", "age": 35, "city": "Paris"}),
        ]);
        table
    }

    #[test]
    fn test_load_rows_selects_first() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.selected(), Some(0));
    }

    #[test]
    fn test_load_empty_clears_selection() {
        let mut table = sample_table();
        table.load_rows(Vec::new());
        assert_eq!(table.selected(), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_sort_by_string_column() {
        let mut table = sample_table();
        table.sort_by("name").unwrap();
        let names: Vec<String> = table
            .rows()
            .iter()
            .map(|r| DataTable::cell_text(r, "name"))
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "John"]);
    }

    #[test]
    fn test_sort_by_numeric_column() {
        let mut table = sample_table();
        table.sort_by("age").unwrap();
        let ages: Vec<String> = table
            .rows()
            .iter()
            .map(|r| DataTable::cell_text(r, "age"))
            .collect();
        assert_eq!(ages, vec!["25", "30", "35"]);
    }

    #[test]
    fn test_sort_unknown_column_is_error() {
        let mut table = sample_table();
        assert_eq!(
            table.sort_by("salary"),
            Err(TableError::UnknownColumn("salary".to_string()))
        );
    }

    #[test]
    fn test_cell_text_handles_missing_and_null() {
        let row = json!({"a": "text", "b": 7, "c": null});
        assert_eq!(DataTable::cell_text(&row, "a"), "text");
        assert_eq!(DataTable::cell_text(&row, "b"), "7");
        assert_eq!(DataTable::cell_text(&row, "c"), "");
        assert_eq!(DataTable::cell_text(&row, "missing"), "");
    }

    #[test]
    fn test_selection_clamps_at_edges() {
        let mut table = sample_table();
        table.select_prev();
        assert_eq!(table.selected(), Some(0));
        for _ in 0..10 {
            table.select_next();
        }
        assert_eq!(table.selected(), Some(2));
    }

    #[test]
    fn test_navigation_events() {
        use crossterm::event::{KeyEvent, KeyModifiers};
        let mut table = sample_table();
        let down = TuiEvent::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        let end = TuiEvent::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        let home = TuiEvent::Key(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        let other = TuiEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));

        assert!(table.handle_navigation(&down));
        assert_eq!(table.selected(), Some(1));
        assert!(table.handle_navigation(&end));
        assert_eq!(table.selected(), Some(2));
        assert!(table.handle_navigation(&home));
        assert_eq!(table.selected(), Some(0));
        assert!(!table.handle_navigation(&other));
    }
}
