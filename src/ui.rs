use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::domain::HrConfig;
use crate::model::{Modus, Model};
use crate::table::{ColumnHeader, SortDirection};

const COLUMN_WIDTH_MARGIN: usize = 2;
const STATUSLINE_HEIGHT: u16 = 1;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

fn header_label(column: &ColumnHeader, sort_position: Option<usize>, multi: bool) -> String {
    let arrow = match column.sort {
        Some(SortDirection::Ascending) => " ▲",
        Some(SortDirection::Descending) => " ▼",
        None => "",
    };
    match sort_position {
        Some(pos) if multi => format!("{}{arrow}{}", column.header, pos + 1),
        _ => format!("{}{arrow}", column.header),
    }
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    area
}

impl TableUI {
    pub fn new(config: &HrConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let [table_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(STATUSLINE_HEIGHT)]).areas(frame.area());

        self.draw_table(model, frame, table_area);
        self.draw_statusline(model, frame, status_area);
        if model.show_popup() {
            self.draw_help(model, frame);
        }
    }

    fn draw_table(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let view = model.view();
        let sort = &model.engine().state().sort;
        let multi = sort.len() > 1;

        let labels: Vec<String> = view
            .visible_columns
            .iter()
            .map(|c| header_label(c, sort.iter().position(|k| k.column_id == c.id), multi))
            .collect();

        let widths: Vec<Constraint> = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let content = view
                    .rows
                    .iter()
                    .map(|r| r.cells[idx].chars().count())
                    .max()
                    .unwrap_or(0);
                let width = content.max(label.chars().count()) + COLUMN_WIDTH_MARGIN;
                Constraint::Length(width.min(self.max_column_width) as u16)
            })
            .collect();

        let header = Row::new(labels.into_iter().enumerate().map(|(idx, label)| {
            let cell = Cell::from(label);
            if idx == model.selected_column() {
                cell.style(Style::new().bold().reversed())
            } else {
                cell
            }
        }))
        .style(Style::new().bold().underlined());

        let rows = view.rows.iter().map(|row| {
            Row::new(row.cells.iter().enumerate().map(|(idx, text)| {
                let cell = Cell::from(text.replace('\n', " ↵ "));
                if idx == model.selected_column() {
                    cell.style(Style::new().add_modifier(Modifier::BOLD))
                } else {
                    cell
                }
            }))
        });

        let title = Line::from(format!(" {} ", model.name()).bold());
        let position = Line::from(format!(
            " {} of {} rows | page {}/{} ",
            view.filtered_rows,
            view.total_rows,
            view.page_index + 1,
            view.page_count
        ));
        let block = Block::bordered()
            .title(title.centered())
            .title_bottom(position.right_aligned())
            .border_set(border::ROUNDED);

        if view.is_empty() {
            let message = Paragraph::new(Text::from("No results.").italic())
                .centered()
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let table = Table::new(rows, widths).header(header).block(block).column_spacing(1);
        frame.render_widget(table, area);
    }

    fn draw_statusline(&self, model: &Model, frame: &mut Frame, area: Rect) {
        if model.modus() == Modus::Filter {
            let input = model.input();
            let line = Line::from(vec![Span::from("/").yellow().bold(), Span::from(input.input.as_str())]);
            frame.render_widget(Paragraph::new(line), area);
            frame.set_cursor_position(Position::new(area.x + 1 + input.cursor_pos as u16, area.y));
            return;
        }

        let state = model.engine().state();
        let line = match model.status_message() {
            Some(message) => Line::from(message.to_string()),
            None if !state.global_filter.is_empty() => Line::from(vec![
                Span::from("filter: ").dim(),
                Span::from(state.global_filter.as_str()),
            ]),
            None => Line::from(" ?: help  /: filter  s: sort  q: quit ").dim(),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_help(&self, model: &Model, frame: &mut Frame) {
        let text = model.help_text();
        let height = text.lines().count() as u16 + 2;
        let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let area = popup_area(frame.area(), width, height);

        let popup = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Help ").border_set(border::THICK));
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_labels_show_sort_state() {
        let mut column = ColumnHeader {
            id: "name".into(),
            header: "Name".into(),
            sortable: true,
            sort: None,
        };
        assert_eq!(header_label(&column, None, false), "Name");
        column.sort = Some(SortDirection::Descending);
        assert_eq!(header_label(&column, Some(0), false), "Name ▼");
        column.sort = Some(SortDirection::Ascending);
        assert_eq!(header_label(&column, Some(1), true), "Name ▲2");
    }

    #[test]
    fn popup_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 40), 20, 10);
        assert_eq!(area, Rect::new(40, 15, 20, 10));
    }
}
