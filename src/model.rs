use std::time::{Duration, Instant};

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::domain::{HELP_TEXT, HrConfig, Message, TableConfig};
use crate::inputter::{InputResult, Inputter};
use crate::loader::{Dataset, Record};
use crate::table::{TableEngine, ViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modus {
    Table,
    Popup,
    Filter,
}

/// State of the terminal table browser.
pub struct Model {
    name: String,
    engine: TableEngine<Record>,
    config: HrConfig,
    pub status: Status,
    modus: Modus,
    selected_column: usize,
    input: Inputter,
    last_input: InputResult,
    filter_before_edit: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn new(name: impl Into<String>, engine: TableEngine<Record>, config: HrConfig) -> Self {
        Self {
            name: name.into(),
            engine,
            config,
            status: Status::Ready,
            modus: Modus::Table,
            selected_column: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            filter_before_edit: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }

    pub fn from_dataset(dataset: Dataset, table_config: &TableConfig, config: HrConfig) -> Self {
        let columns = dataset.columns();
        let engine = TableEngine::new(dataset.records, columns, table_config);
        let mut model = Self::new(dataset.name, engine, config);
        model.set_status_message(format!("Loaded {} rows", model.engine.rows().len()));
        model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &TableEngine<Record> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TableEngine<Record> {
        &mut self.engine
    }

    pub fn view(&self) -> ViewModel<'_, Record> {
        self.engine.derive()
    }

    pub fn config(&self) -> &HrConfig {
        &self.config
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    /// Position of the selected column among the visible ones.
    pub fn selected_column(&self) -> usize {
        self.selected_column
    }

    pub fn selected_column_id(&self) -> Option<String> {
        self.engine
            .visible_columns()
            .get(self.selected_column)
            .map(|c| c.id().to_string())
    }

    pub fn input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::Filter
    }

    pub fn show_popup(&self) -> bool {
        self.modus == Modus::Popup
    }

    pub fn help_text(&self) -> &'static str {
        HELP_TEXT
    }

    /// The last status message, until it times out.
    pub fn status_message(&self) -> Option<&str> {
        let timeout = Duration::from_secs(self.config.status_message_timeout);
        (!self.status_message.is_empty() && self.last_status_message_update.elapsed() < timeout)
            .then_some(self.status_message.as_str())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        trace!("Status: {}", self.status_message);
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        match self.modus {
            Modus::Table => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.modus = Modus::Popup,
                Message::MoveLeft => self.move_selection_left(),
                Message::MoveRight => self.move_selection_right(),
                Message::NextPage => self.engine.next_page(),
                Message::PrevPage => self.engine.previous_page(),
                Message::FirstPage => self.engine.set_page(0),
                Message::LastPage => self.engine.last_page(),
                Message::ToggleSort => self.sort_selected(false),
                Message::ToggleSortMulti => self.sort_selected(true),
                Message::ClearSort => {
                    self.engine.clear_sort();
                    self.set_status_message("Sorting cleared");
                }
                Message::HideColumn => self.hide_selected(),
                Message::ShowAllColumns => {
                    self.engine.show_all_columns();
                    self.set_status_message("All columns visible");
                }
                Message::EditFilter => self.enter_filter_mode(),
                Message::ClearFilter => {
                    self.engine.set_global_filter("");
                    self.set_status_message("Filter cleared");
                }
                Message::Exit | Message::RawKey(_) => (),
            },
            Modus::Popup => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.modus = Modus::Table,
                _ => (),
            },
            Modus::Filter => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
    }

    fn move_selection_left(&mut self) {
        self.selected_column = self.selected_column.saturating_sub(1);
    }

    fn move_selection_right(&mut self) {
        let visible = self.engine.visible_columns().len();
        if self.selected_column + 1 < visible {
            self.selected_column += 1;
        }
    }

    fn sort_selected(&mut self, multi: bool) {
        let Some(id) = self.selected_column_id() else {
            return;
        };
        if multi {
            self.engine.toggle_sort_multi(&id);
        } else {
            self.engine.toggle_sort(&id);
        }
        let message = match self.engine.state().sort_direction(&id) {
            Some(direction) => format!("Sorted by {id} ({direction:?})"),
            None => format!("Not sorting by {id}"),
        };
        self.set_status_message(message);
    }

    fn hide_selected(&mut self) {
        let Some(id) = self.selected_column_id() else {
            return;
        };
        let visible = self.engine.visible_columns().len();
        if visible <= 1 {
            self.set_status_message("Cannot hide the last column");
            return;
        }
        let hideable = self.engine.column(&id).is_some_and(|c| c.is_hideable());
        if !hideable {
            self.set_status_message(format!("{id} cannot be hidden"));
            return;
        }
        self.engine.set_column_visibility(&id, false);
        self.selected_column = self.selected_column.min(visible - 2);
        self.set_status_message(format!("Hid {id}, press v to show all columns"));
    }

    fn enter_filter_mode(&mut self) {
        trace!("Editing filter ...");
        self.modus = Modus::Filter;
        self.filter_before_edit = self.engine.state().global_filter.clone();
        self.input.set(&self.filter_before_edit);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.canceled {
            debug!("Filter edit canceled");
            let previous = std::mem::take(&mut self.filter_before_edit);
            self.engine.set_global_filter(previous);
        } else {
            // Filter while typing
            self.engine.set_global_filter(self.last_input.input.clone());
        }
        if self.last_input.finished {
            self.modus = Modus::Table;
            let filter = &self.engine.state().global_filter;
            info!("Global filter: {filter:?}");
            let message = if filter.is_empty() {
                "No filter".to_string()
            } else {
                format!("{} matching rows", self.engine.filtered_len())
            };
            self.set_status_message(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{SortDirection, Value};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn model() -> Model {
        let dataset = Dataset {
            name: "people.csv".into(),
            headers: vec!["name".into(), "role".into()],
            records: vec![
                vec![Value::from("Alice"), Value::from("Engineer")],
                vec![Value::from("Bob"), Value::from("Designer")],
                vec![Value::from("Carol"), Value::from("Engineer")],
            ],
        };
        Model::from_dataset(dataset, &TableConfig::default().page_size(2), HrConfig::default())
    }

    fn key(code: KeyCode) -> Option<Message> {
        Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_filter(model: &mut Model, text: &str) {
        model.update(Some(Message::EditFilter));
        for c in text.chars() {
            model.update(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn filter_is_applied_while_typing_and_kept_on_enter() {
        let mut model = model();
        type_filter(&mut model, "engi");
        assert!(model.raw_keyevents());
        assert_eq!(model.view().filtered_rows, 2);

        model.update(key(KeyCode::Enter));
        assert_eq!(model.modus(), Modus::Table);
        assert_eq!(model.engine().state().global_filter, "engi");
        assert_eq!(model.status_message(), Some("2 matching rows"));
    }

    #[test]
    fn escape_restores_previous_filter() {
        let mut model = model();
        type_filter(&mut model, "bob");
        model.update(key(KeyCode::Enter));

        type_filter(&mut model, "xyz");
        assert_eq!(model.view().filtered_rows, 0);
        model.update(key(KeyCode::Esc));
        assert_eq!(model.engine().state().global_filter, "bob");
        assert_eq!(model.view().filtered_rows, 1);
    }

    #[test]
    fn sorts_selected_column() {
        let mut model = model();
        model.update(Some(Message::MoveRight));
        model.update(Some(Message::MoveRight));
        assert_eq!(model.selected_column(), 1);
        model.update(Some(Message::ToggleSort));
        assert_eq!(
            model.engine().state().sort_direction("role"),
            Some(SortDirection::Ascending)
        );
        let view = model.view();
        assert_eq!(view.rows[0].cells[0], "Bob");
    }

    #[test]
    fn hiding_keeps_one_column() {
        let mut model = model();
        model.update(Some(Message::MoveRight));
        model.update(Some(Message::HideColumn));
        assert_eq!(model.view().visible_columns.len(), 1);
        assert_eq!(model.selected_column(), 0);
        model.update(Some(Message::HideColumn));
        assert_eq!(model.view().visible_columns.len(), 1);
        model.update(Some(Message::ShowAllColumns));
        assert_eq!(model.view().visible_columns.len(), 2);
    }

    #[test]
    fn paging_and_popup() {
        let mut model = model();
        model.update(Some(Message::NextPage));
        assert_eq!(model.view().page_index, 1);
        model.update(Some(Message::FirstPage));
        assert_eq!(model.view().page_index, 0);

        model.update(Some(Message::Help));
        assert!(model.show_popup());
        model.update(Some(Message::NextPage));
        assert_eq!(model.view().page_index, 0);
        model.update(Some(Message::Exit));
        assert!(!model.show_popup());

        model.update(Some(Message::Quit));
        assert_eq!(model.status, Status::Quitting);
    }
}
