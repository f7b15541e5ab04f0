use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

/// Cell value produced by a column accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

impl Value {
    /// Missing values. NaN counts as missing so it cannot poison the ordering.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Date(_) => 2,
            Value::Text(_) => 3,
            Value::Null => 4,
        }
    }

    /// Ordering used for sorting. Numbers compare numerically, dates by
    /// instant and text case-insensitively; different kinds fall back to a
    /// fixed kind order. Nulls compare after everything else, the sort stage
    /// keeps them last independent of the direction.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (a, b) if a.is_null() || b.is_null() => a.is_null().cmp(&b.is_null()),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => compare_text(a, b),
            (a, b) => a.kind_rank().cmp(&b.kind_rank()),
        }
    }

    /// Interpret a raw cell as loaded from a file. `numeric` is set for columns
    /// whose source type was numeric.
    pub fn parse_cell(raw: &str, numeric: bool) -> Value {
        let text = raw.trim();
        if text.is_empty() {
            return Value::Null;
        }
        if numeric {
            return match text.parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::Text(text.to_string()),
            };
        }
        Self::parse_date(text).unwrap_or_else(|| Value::Text(raw.to_string()))
    }

    fn parse_date(text: &str) -> Option<Value> {
        // Cheap reject before trying every format
        if text.len() < 10 || !text.as_bytes()[0].is_ascii_digit() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Value::Date(dt.with_timezone(&Utc)));
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
                return Some(Value::Date(dt.and_utc()));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Value::Date(dt.and_utc()))
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if n.is_nan() => Ok(()),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(dt) => {
                if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 && dt.nanosecond() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            Value::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Number(v as f64)
            }
        })*
    };
}

number_from!(f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        v.and_hms_opt(0, 0, 0)
            .map(|dt| Value::Date(dt.and_utc()))
            .unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(Value::from(9).compare(&Value::from(10)), Ordering::Less);
        assert_eq!(Value::from(2.5).compare(&Value::from(2.5)), Ordering::Equal);
    }

    #[test]
    fn text_compares_case_insensitively() {
        assert_eq!(Value::from("alice").compare(&Value::from("Bob")), Ordering::Less);
        assert_eq!(Value::from("Bob").compare(&Value::from("bob")), Ordering::Equal);
    }

    #[test]
    fn dates_compare_by_instant() {
        let early = Utc.with_ymd_and_hms(2023, 5, 1, 23, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2023, 5, 2, 1, 0, 0).unwrap();
        assert_eq!(Value::from(early).compare(&Value::from(late)), Ordering::Less);
    }

    #[test]
    fn nulls_order_after_values() {
        assert_eq!(Value::Null.compare(&Value::from(1)), Ordering::Greater);
        assert_eq!(Value::Number(f64::NAN).compare(&Value::from("x")), Ordering::Greater);
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn display_matches_cell_text() {
        assert_eq!(Value::from(7).to_string(), "7");
        assert_eq!(Value::from(7.25).to_string(), "7.25");
        assert_eq!(Value::Null.to_string(), "");
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Value::from(day).to_string(), "2024-02-29");
        assert_eq!(Value::from(Some("x")).to_string(), "x");
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn parse_cell_recognises_kinds() {
        assert_eq!(Value::parse_cell("12", true), Value::Number(12.0));
        assert_eq!(Value::parse_cell("n/a", true), Value::Text("n/a".into()));
        assert_eq!(Value::parse_cell("  ", false), Value::Null);
        assert_eq!(Value::parse_cell("Engineer", false), Value::Text("Engineer".into()));

        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(Value::parse_cell("2024-03-01 09:30:00", false), Value::Date(expected));
        assert_eq!(Value::parse_cell("2024-03-01T09:30:00Z", false), Value::Date(expected));
        assert!(matches!(Value::parse_cell("2024-03-01", false), Value::Date(_)));
    }
}
