//! Per-column type inference for delimited text.
//!
//! A column's type must be unanimous over its non-null cells. A column with a
//! single stray word among numbers is text, so no value is ever silently
//! dropped from a filter or a plot.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dataset::Value;
use crate::schema::ColumnType;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
    ]
});

/// Check if a raw cell represents a missing/null value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Detect the type of a single non-null cell.
pub fn detect_value_type(value: &str) -> ColumnType {
    let trimmed = value.trim();

    // Only spellings that render back unchanged; `Yes`/`TRUE` stay text.
    if trimmed == "true" || trimmed == "false" {
        return ColumnType::Boolean;
    }

    if trimmed.parse::<i64>().is_ok() {
        return ColumnType::Integer;
    }

    if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        return ColumnType::Float;
    }

    if DATE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        if trimmed.contains(':') || trimmed.contains('T') {
            return ColumnType::DateTime;
        }
        return ColumnType::Date;
    }

    ColumnType::String
}

/// Infer a column type from its raw cells. Nulls are ignored.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a str>) -> ColumnType {
    let mut current: Option<ColumnType> = None;

    for value in values {
        if is_null_value(value) {
            continue;
        }
        let detected = detect_value_type(value);
        current = Some(match (current, detected) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(ColumnType::Integer), ColumnType::Float)
            | (Some(ColumnType::Float), ColumnType::Integer) => ColumnType::Float,
            (Some(ColumnType::Date), ColumnType::DateTime)
            | (Some(ColumnType::DateTime), ColumnType::Date) => ColumnType::DateTime,
            _ => return ColumnType::String,
        });
    }

    current.unwrap_or(ColumnType::Unknown)
}

/// Convert a raw cell into a typed value for a column of the given type.
///
/// Returns `None` when the cell does not fit the type.
pub fn convert_cell(raw: &str, column_type: ColumnType) -> Option<Value> {
    if is_null_value(raw) {
        return Some(Value::Null);
    }
    let trimmed = raw.trim();
    match column_type {
        ColumnType::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
        ColumnType::Float => trimmed.parse::<f64>().ok().map(Value::float),
        ColumnType::Boolean => trimmed.parse::<bool>().ok().map(Value::Boolean),
        ColumnType::String
        | ColumnType::Date
        | ColumnType::DateTime
        | ColumnType::Unknown => Some(Value::Text(raw.to_string())),
    }
}

/// Convert a raw cell to a type fixed elsewhere, keeping the raw text when it
/// does not fit.
pub fn convert_cell_or_text(raw: &str, column_type: ColumnType) -> Value {
    convert_cell(raw, column_type).unwrap_or_else(|| Value::Text(raw.to_string()))
}

/// Re-type an already parsed cell.
///
/// Cells that already have the target's representation are kept; others go
/// through their display form, falling back to text.
pub fn conform_cell(value: &Value, column_type: ColumnType) -> Value {
    match (value, column_type) {
        (Value::Null, _) => Value::Null,
        (Value::Integer(_), ColumnType::Integer)
        | (Value::Float(_), ColumnType::Float)
        | (Value::Boolean(_), ColumnType::Boolean)
        | (
            Value::Text(_),
            ColumnType::String | ColumnType::Date | ColumnType::DateTime | ColumnType::Unknown,
        ) => value.clone(),
        (Value::Integer(i), ColumnType::Float) => Value::Float(*i as f64),
        (other, _) => convert_cell_or_text(&other.to_string(), column_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_null_value() {
        assert!(is_null_value(""));
        assert!(is_null_value("NA"));
        assert!(is_null_value("na"));
        assert!(is_null_value("N/A"));
        assert!(is_null_value("null"));
        assert!(is_null_value("NaN"));
        assert!(is_null_value("."));
        assert!(!is_null_value("value"));
        assert!(!is_null_value("0"));
    }

    #[test]
    fn test_infer_integer_column() {
        assert_eq!(infer_column_type(["1", "2", "", "100"]), ColumnType::Integer);
    }

    #[test]
    fn test_mixed_int_float_promotes() {
        assert_eq!(infer_column_type(["1", "2.5", "3"]), ColumnType::Float);
    }

    #[test]
    fn test_any_word_makes_text() {
        assert_eq!(infer_column_type(["1", "2", "low"]), ColumnType::String);
        assert_eq!(infer_column_type(["25M", "50M"]), ColumnType::String);
    }

    #[test]
    fn test_dates_and_booleans() {
        assert_eq!(infer_column_type(["2024-01-02", "2024-02-03"]), ColumnType::Date);
        assert_eq!(
            infer_column_type(["2024-01-02", "2024-02-03T10:00:00"]),
            ColumnType::DateTime
        );
        assert_eq!(infer_column_type(["true", "false", "true"]), ColumnType::Boolean);
    }

    #[test]
    fn test_yes_no_and_capitalised_booleans_stay_text() {
        assert_eq!(infer_column_type(["Yes", "No"]), ColumnType::String);
        assert_eq!(infer_column_type(["yes", "no"]), ColumnType::String);
        assert_eq!(infer_column_type(["TRUE", "FALSE"]), ColumnType::String);
        assert_eq!(infer_column_type(["true", "True"]), ColumnType::String);
    }

    #[test]
    fn test_all_null_is_unknown() {
        assert_eq!(infer_column_type(["", "NA"]), ColumnType::Unknown);
    }

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell("42", ColumnType::Integer), Some(Value::Integer(42)));
        assert_eq!(convert_cell("4.5", ColumnType::Float), Some(Value::Float(4.5)));
        assert_eq!(convert_cell("NA", ColumnType::Float), Some(Value::Null));
        assert_eq!(convert_cell("true", ColumnType::Boolean), Some(Value::Boolean(true)));
        assert_eq!(convert_cell("Yes", ColumnType::Boolean), None);
        assert_eq!(
            convert_cell("2024-01-02", ColumnType::Date),
            Some(Value::Text("2024-01-02".into()))
        );
        assert_eq!(convert_cell("abc", ColumnType::Integer), None);
    }

    #[test]
    fn test_convert_cell_or_text_keeps_misfits() {
        assert_eq!(convert_cell_or_text("12", ColumnType::Integer), Value::Integer(12));
        assert_eq!(
            convert_cell_or_text("pending", ColumnType::Integer),
            Value::Text("pending".into())
        );
        assert_eq!(convert_cell_or_text("yes", ColumnType::String), Value::Text("yes".into()));
    }

    #[test]
    fn test_conform_cell() {
        assert_eq!(conform_cell(&Value::Integer(3), ColumnType::Float), Value::Float(3.0));
        assert_eq!(conform_cell(&Value::Float(92.0), ColumnType::Integer), Value::Integer(92));
        assert_eq!(conform_cell(&Value::Float(92.5), ColumnType::Integer), Value::Text("92.5".into()));
        assert_eq!(conform_cell(&Value::Boolean(true), ColumnType::String), Value::Text("true".into()));
        assert_eq!(conform_cell(&Value::Text("7".into()), ColumnType::Integer), Value::Integer(7));
        assert_eq!(conform_cell(&Value::Text("x".into()), ColumnType::String), Value::Text("x".into()));
        assert_eq!(conform_cell(&Value::Null, ColumnType::Boolean), Value::Null);
    }
}
