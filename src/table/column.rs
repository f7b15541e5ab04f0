use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::value::Value;

pub type Accessor<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
pub type Renderer = Box<dyn Fn(&Value) -> String + Send + Sync>;
pub type Comparator = Box<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// A named projection of a row of type `T`.
///
/// The accessor must be deterministic and free of side effects, the engine
/// calls it as often as it needs and from worker threads. A panicking accessor
/// is a configuration bug and unwinds through `derive`.
pub struct Column<T> {
    id: String,
    header: String,
    accessor: Accessor<T>,
    renderer: Option<Renderer>,
    comparator: Option<Comparator>,
    sortable: bool,
    hideable: bool,
}

impl<T> Column<T> {
    pub fn new<F>(id: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let id = id.into();
        Self {
            header: id.clone(),
            id,
            accessor: Box::new(accessor),
            renderer: None,
            comparator: None,
            sortable: true,
            hideable: true,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Text used for display and for the global filter. Defaults to the
    /// `Display` form of the value.
    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Replaces [`Value::compare`] for non-null values of this column.
    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    pub fn value(&self, row: &T) -> Value {
        (self.accessor)(row)
    }

    pub fn render(&self, value: &Value) -> String {
        match &self.renderer {
            Some(renderer) => renderer(value),
            None => value.to_string(),
        }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match &self.comparator {
            Some(comparator) => comparator(a, b),
            None => a.compare(b),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .finish_non_exhaustive()
    }
}

/// Per column filter, evaluated after the global filter.
#[derive(Clone)]
pub enum ColumnFilter {
    /// Case-insensitive substring of the rendered value.
    Contains(String),
    Equals(Value),
    /// Inclusive bounds, using the column ordering. Nulls never match.
    Between { min: Option<Value>, max: Option<Value> },
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

impl ColumnFilter {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ColumnFilter::Predicate(Arc::new(predicate))
    }

    pub fn matches<T>(&self, column: &Column<T>, value: &Value) -> bool {
        match self {
            ColumnFilter::Contains(needle) => {
                needle.is_empty()
                    || column
                        .render(value)
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
            ColumnFilter::Equals(expected) => match (value.is_null(), expected.is_null()) {
                (true, true) => true,
                (false, false) => column.compare(value, expected) == Ordering::Equal,
                _ => false,
            },
            ColumnFilter::Between { min, max } => {
                if value.is_null() {
                    return false;
                }
                let above = min
                    .as_ref()
                    .is_none_or(|m| column.compare(value, m) != Ordering::Less);
                let below = max
                    .as_ref()
                    .is_none_or(|m| column.compare(value, m) != Ordering::Greater);
                above && below
            }
            ColumnFilter::Predicate(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnFilter::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            ColumnFilter::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            ColumnFilter::Between { min, max } => f
                .debug_struct("Between")
                .field("min", min)
                .field("max", max)
                .finish(),
            ColumnFilter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: &'static str,
        age: Option<u32>,
    }

    fn age() -> Column<Person> {
        Column::new("age", |p: &Person| p.age.into())
    }

    #[test]
    fn builder_defaults() {
        let column = Column::new("name", |p: &Person| p.name.into());
        assert_eq!(column.header(), "name");
        assert!(column.is_sortable());
        assert!(column.is_hideable());

        let column = column.with_header("Name").sortable(false).hideable(false);
        assert_eq!(column.header(), "Name");
        assert!(!column.is_sortable());
        assert!(!column.is_hideable());
    }

    #[test]
    fn renderer_overrides_display() {
        let column = age().with_renderer(|v| if v.is_null() { "NA".into() } else { v.to_string() });
        let row = Person { name: "x", age: None };
        assert_eq!(column.render(&column.value(&row)), "NA");
    }

    #[test]
    fn between_is_inclusive_and_skips_nulls() {
        let column = age();
        let filter = ColumnFilter::Between {
            min: Some(3.into()),
            max: Some(5.into()),
        };
        assert!(filter.matches(&column, &3.into()));
        assert!(filter.matches(&column, &5.into()));
        assert!(!filter.matches(&column, &6.into()));
        assert!(!filter.matches(&column, &Value::Null));
    }

    #[test]
    fn contains_and_equals() {
        let column = Column::new("name", |p: &Person| p.name.into());
        assert!(ColumnFilter::Contains("LIC".into()).matches(&column, &"Alice".into()));
        assert!(!ColumnFilter::Contains("bob".into()).matches(&column, &"Alice".into()));
        assert!(ColumnFilter::Equals("alice".into()).matches(&column, &"Alice".into()));
        assert!(ColumnFilter::Equals(Value::Null).matches(&column, &Value::Null));
        assert!(ColumnFilter::predicate(|v| v.is_null()).matches(&column, &Value::Null));
    }
}
