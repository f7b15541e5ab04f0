use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use super::column::ColumnFilter;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// none -> ascending -> descending -> none
    fn cycle(current: Option<SortDirection>) -> Option<SortDirection> {
        match current {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// User driven presentation choices. Owned by the presentation layer and
/// only changed through the engine operations.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub global_filter: String,
    pub column_filters: BTreeMap<String, ColumnFilter>,
    /// First key is the primary sort key.
    pub sort: Vec<SortKey>,
    /// Missing entries are visible.
    pub visibility: HashMap<String, bool>,
    pub page: Pagination,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: Pagination::new(page_size),
            ..Default::default()
        }
    }

    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.sort
            .iter()
            .find(|k| k.column_id == column_id)
            .map(|k| k.direction)
    }

    pub fn is_marked_visible(&self, column_id: &str) -> bool {
        self.visibility.get(column_id).copied().unwrap_or(true)
    }

    /// Advance the sort cycle of one column. In single mode an active column
    /// becomes the only sort key; in multi mode it keeps its position among
    /// the other keys and is appended when first activated.
    pub(crate) fn cycle_sort(&mut self, column_id: &str, multi: bool) {
        let next = SortDirection::cycle(self.sort_direction(column_id));
        if !multi {
            self.sort = next
                .map(|direction| vec![SortKey::new(column_id, direction)])
                .unwrap_or_default();
            return;
        }
        match (self.sort.iter().position(|k| k.column_id == column_id), next) {
            (Some(pos), Some(direction)) => self.sort[pos].direction = direction,
            (Some(pos), None) => {
                self.sort.remove(pos);
            }
            (None, Some(direction)) => self.sort.push(SortKey::new(column_id, direction)),
            (None, None) => {}
        }
    }
}
