use std::cmp::Ordering;
use std::fmt;

use rayon::prelude::*;
use tracing::{debug, trace};

use super::column::{Column, ColumnFilter};
use super::state::{SortDirection, ViewState};
use super::value::Value;
use crate::domain::TableConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

/// Entry for a column chooser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnToggle {
    pub id: String,
    pub header: String,
    pub visible: bool,
}

/// One rendered row. `index` is the position in the source row set.
pub struct ViewRow<'a, T> {
    pub index: usize,
    pub row: &'a T,
    pub cells: Vec<String>,
}

impl<T> Clone for ViewRow<'_, T> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            row: self.row,
            cells: self.cells.clone(),
        }
    }
}

impl<T> PartialEq for ViewRow<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.cells == other.cells
    }
}

impl<T> fmt::Debug for ViewRow<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRow")
            .field("index", &self.index)
            .field("cells", &self.cells)
            .finish()
    }
}

/// Read-only snapshot handed to the presentation layer.
pub struct ViewModel<'a, T> {
    pub visible_columns: Vec<ColumnHeader>,
    pub rows: Vec<ViewRow<'a, T>>,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Rows left after filtering, across all pages.
    pub filtered_rows: usize,
    pub total_rows: usize,
    pub can_prev: bool,
    pub can_next: bool,
}

impl<T> ViewModel<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> PartialEq for ViewModel<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.visible_columns == other.visible_columns
            && self.rows == other.rows
            && self.page_index == other.page_index
            && self.page_size == other.page_size
            && self.page_count == other.page_count
            && self.filtered_rows == other.filtered_rows
            && self.total_rows == other.total_rows
            && self.can_prev == other.can_prev
            && self.can_next == other.can_next
    }
}

impl<T> fmt::Debug for ViewModel<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("visible_columns", &self.visible_columns)
            .field("rows", &self.rows)
            .field("page_index", &self.page_index)
            .field("page_count", &self.page_count)
            .field("filtered_rows", &self.filtered_rows)
            .field("total_rows", &self.total_rows)
            .finish()
    }
}

fn is_visible<T>(column: &Column<T>, state: &ViewState) -> bool {
    !column.is_hideable() || state.is_marked_visible(column.id())
}

fn visible_columns<'c, T>(columns: &'c [Column<T>], state: &ViewState) -> Vec<&'c Column<T>> {
    columns.iter().filter(|c| is_visible(c, state)).collect()
}

/// Indices of the rows passing the global filter and then the column filters,
/// in source order.
fn filter_rows<T: Sync>(rows: &[T], columns: &[Column<T>], state: &ViewState) -> Vec<usize> {
    let visible = visible_columns(columns, state);
    let needle = state.global_filter.to_lowercase();
    let column_filters: Vec<_> = state
        .column_filters
        .iter()
        .filter_map(|(id, filter)| columns.iter().find(|c| c.id() == id).map(|c| (c, filter)))
        .collect();

    (0..rows.len())
        .into_par_iter()
        .filter(|&ridx| {
            needle.is_empty()
                || visible.iter().any(|column| {
                    column
                        .render(&column.value(&rows[ridx]))
                        .to_lowercase()
                        .contains(&needle)
                })
        })
        .filter(|&ridx| {
            column_filters
                .iter()
                .all(|(column, filter)| filter.matches(column, &column.value(&rows[ridx])))
        })
        .collect()
}

fn compare_keys<T>(keys: &[(&Column<T>, SortDirection)], a: &[Value], b: &[Value]) -> Ordering {
    for (n, (column, direction)) in keys.iter().enumerate() {
        let ordering = match (a[n].is_null(), b[n].is_null()) {
            (true, true) => Ordering::Equal,
            // Nulls go last independent of the direction
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => direction.apply(column.compare(&a[n], &b[n])),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of `indices` by the active sort keys. Keys naming unknown or
/// non sortable columns are skipped.
fn sort_rows<T: Sync>(rows: &[T], columns: &[Column<T>], state: &ViewState, indices: Vec<usize>) -> Vec<usize> {
    let keys: Vec<(&Column<T>, SortDirection)> = state
        .sort
        .iter()
        .filter_map(|key| {
            columns
                .iter()
                .find(|c| c.id() == key.column_id && c.is_sortable())
                .map(|c| (c, key.direction))
        })
        .collect();
    if keys.is_empty() {
        return indices;
    }

    let mut keyed: Vec<(usize, Vec<Value>)> = indices
        .into_par_iter()
        .map(|ridx| (ridx, keys.iter().map(|(c, _)| c.value(&rows[ridx])).collect()))
        .collect();
    keyed.par_sort_by(|(_, a), (_, b)| compare_keys(&keys, a, b));
    keyed.into_iter().map(|(ridx, _)| ridx).collect()
}

/// Derive the view model from rows, columns and view state.
///
/// Stages run in a fixed order: global filter, column filters, sort and
/// finally the page slice, so page counts always describe the filtered and
/// sorted set. The page index is clamped, never rejected.
pub fn derive<'a, T: Sync>(rows: &'a [T], columns: &'a [Column<T>], state: &ViewState) -> ViewModel<'a, T> {
    let visible = visible_columns(columns, state);
    let indices = sort_rows(rows, columns, state, filter_rows(rows, columns, state));

    let filtered_rows = indices.len();
    let page = &state.page;
    let page_rows = indices[page.range(filtered_rows)]
        .iter()
        .map(|&ridx| ViewRow {
            index: ridx,
            row: &rows[ridx],
            cells: visible
                .iter()
                .map(|column| column.render(&column.value(&rows[ridx])))
                .collect(),
        })
        .collect();

    ViewModel {
        visible_columns: visible
            .iter()
            .map(|c| ColumnHeader {
                id: c.id().to_string(),
                header: c.header().to_string(),
                sortable: c.is_sortable(),
                sort: state.sort_direction(c.id()),
            })
            .collect(),
        rows: page_rows,
        page_index: page.clamped_index(filtered_rows),
        page_size: page.size(),
        page_count: page.page_count(filtered_rows),
        filtered_rows,
        total_rows: rows.len(),
        can_prev: page.can_prev(filtered_rows),
        can_next: page.can_next(filtered_rows),
    }
}

/// Row set, column definitions and view state of one table, with the
/// operations a user can trigger on it.
pub struct TableEngine<T> {
    rows: Vec<T>,
    columns: Vec<Column<T>>,
    state: ViewState,
}

impl<T: Sync> TableEngine<T> {
    pub fn new(rows: Vec<T>, columns: Vec<Column<T>>, config: &TableConfig) -> Self {
        let mut engine = Self {
            rows,
            columns,
            state: ViewState::new(config.page_size),
        };
        for id in &config.hidden_columns {
            engine.set_column_visibility(id, false);
        }
        engine
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn replace_state(&mut self, state: ViewState) {
        self.state = state;
    }

    /// Swap in a freshly fetched row set; the view state is kept.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        debug!("Replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
        self.clamp_page();
    }

    pub fn column(&self, column_id: &str) -> Option<&Column<T>> {
        let column = self.columns.iter().find(|c| c.id() == column_id);
        if column.is_none() {
            debug!("Ignoring unknown column \"{column_id}\"");
        }
        column
    }

    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.state.global_filter = text.into();
        self.state.page.reset();
        trace!("Global filter set to {:?}", self.state.global_filter);
    }

    pub fn set_column_filter(&mut self, column_id: &str, filter: ColumnFilter) {
        if self.column(column_id).is_some() {
            trace!("Column filter on {column_id}: {filter:?}");
            self.state.column_filters.insert(column_id.to_string(), filter);
            self.state.page.reset();
        }
    }

    pub fn clear_column_filter(&mut self, column_id: &str) {
        if self.state.column_filters.remove(column_id).is_some() {
            self.state.page.reset();
        }
    }

    /// Cycle the column through none, ascending and descending. An active
    /// column becomes the only sort key.
    pub fn toggle_sort(&mut self, column_id: &str) {
        self.cycle_sort(column_id, false);
    }

    /// Like [`Self::toggle_sort`] but keeps the other sort keys.
    pub fn toggle_sort_multi(&mut self, column_id: &str) {
        self.cycle_sort(column_id, true);
    }

    fn cycle_sort(&mut self, column_id: &str, multi: bool) {
        match self.column(column_id) {
            Some(column) if column.is_sortable() => {
                self.state.cycle_sort(column_id, multi);
                self.state.page.reset();
                trace!("Sort keys: {:?}", self.state.sort);
            }
            Some(_) => trace!("Column {column_id} is not sortable"),
            None => {}
        }
    }

    pub fn clear_sort(&mut self) {
        self.state.sort.clear();
        self.state.page.reset();
    }

    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) {
        match self.column(column_id) {
            Some(column) if column.is_hideable() => {
                self.state.visibility.insert(column_id.to_string(), visible);
                // The global filter depends on the visible columns
                self.clamp_page();
            }
            Some(_) => {
                self.state.visibility.remove(column_id);
                trace!("Column {column_id} cannot be hidden");
            }
            None => {}
        }
    }

    pub fn show_all_columns(&mut self) {
        self.state.visibility.clear();
        self.clamp_page();
    }

    pub fn hideable_columns(&self) -> Vec<ColumnToggle> {
        self.columns
            .iter()
            .filter(|c| c.is_hideable())
            .map(|c| ColumnToggle {
                id: c.id().to_string(),
                header: c.header().to_string(),
                visible: is_visible(c, &self.state),
            })
            .collect()
    }

    /// Columns that would be rendered, in definition order.
    pub fn visible_columns(&self) -> Vec<&Column<T>> {
        visible_columns(&self.columns, &self.state)
    }

    pub fn filtered_len(&self) -> usize {
        filter_rows(&self.rows, &self.columns, &self.state).len()
    }

    pub fn page_count(&self) -> usize {
        self.state.page.page_count(self.filtered_len())
    }

    fn clamp_page(&mut self) {
        let total = self.filtered_len();
        self.state.page.clamp(total);
    }

    /// Clamped to the available pages; with no rows this stays on page 0.
    pub fn set_page(&mut self, index: usize) {
        let total = self.filtered_len();
        self.state.page.set_index(index, total);
    }

    pub fn next_page(&mut self) {
        let total = self.filtered_len();
        self.state.page.next(total);
    }

    pub fn previous_page(&mut self) {
        let total = self.filtered_len();
        self.state.page.previous(total);
    }

    pub fn last_page(&mut self) {
        let total = self.filtered_len();
        self.state.page.last(total);
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.state.page.set_size(size);
    }

    pub fn derive(&self) -> ViewModel<'_, T> {
        derive(&self.rows, &self.columns, &self.state)
    }
}

impl<T> fmt::Debug for TableEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("rows", &self.rows.len())
            .field("columns", &self.columns)
            .field("state", &self.state)
            .finish()
    }
}
