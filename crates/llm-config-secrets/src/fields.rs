//! Value coercion
//!
//! Converts one raw value (a string, or a value that is already native JSON)
//! into a typed result according to a [`Field`] descriptor. Every conversion
//! is a pure function of `(raw value, descriptor)` and fails with a
//! [`ValidationError`] naming the offending value and the target kind.
//!
//! # Supported kinds
//!
//! | Field | Output |
//! |---|---|
//! | `Str` | `String` (default kind) |
//! | `Int` | `i64` |
//! | `Float` | `f64` |
//! | `Decimal` | `rust_decimal::Decimal` |
//! | `Bool` | `bool` |
//! | `List` | `Vec<TypedValue>` split on a delimiter, elements coerced by a sub-field |
//! | `Choices` | `Vec<(String, TypedValue)>` from `key:value,key:value` |
//! | `DateTime` / `Date` / `Time` | chrono naive values parsed with a format string |
//! | `TimeDelta` | `chrono::Duration` from `H:MM:SS` |
//! | `TimeDeltaSeconds` | `chrono::Duration` from an integer number of seconds |
//! | `Uuid` | `uuid::Uuid` |
//! | `LogLevel` | `i64` severity, numeric or by level name |
//! | `Path` | `PathBuf`, no existence check |

use chrono::format::ParseErrorKind;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::ValidationError;

/// Default delimiter for lists and choices
pub const DEFAULT_DELIMITER: &str = ",";
/// Default `DateTime` format
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Default `Date` format
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
/// Default `Time` format
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Standard severity names and their numeric levels
pub const LOG_LEVELS: &[(&str, i64)] = &[
    ("CRITICAL", 50),
    ("FATAL", 50),
    ("ERROR", 40),
    ("WARNING", 30),
    ("WARN", 30),
    ("INFO", 20),
    ("DEBUG", 10),
    ("NOTSET", 0),
];

/// Coercion target descriptor
///
/// Supplied per lookup; never stored by the manager.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field {
    #[default]
    Str,
    Int,
    Float,
    Decimal,
    Bool,
    List {
        delimiter: String,
        subcast: Box<Field>,
    },
    Choices {
        delimiter: String,
        subcast: Box<Field>,
    },
    DateTime {
        format: String,
    },
    Date {
        format: String,
    },
    Time {
        format: String,
    },
    /// `H:MM:SS`
    TimeDelta,
    /// Integer seconds
    TimeDeltaSeconds,
    /// The version only matters when generating identifiers; parsing accepts
    /// any valid UUID regardless of it.
    Uuid {
        version: Option<usize>,
    },
    LogLevel,
    Path,
}

impl Field {
    /// List of strings split on `,`
    pub fn list() -> Self {
        Self::list_of(Field::Str)
    }

    /// List split on `,` with elements coerced by `subcast`
    pub fn list_of(subcast: Field) -> Self {
        Field::List {
            delimiter: DEFAULT_DELIMITER.to_string(),
            subcast: Box::new(subcast),
        }
    }

    /// `key:value` pairs split on `,` with values coerced by `subcast`
    pub fn choices_of(subcast: Field) -> Self {
        Field::Choices {
            delimiter: DEFAULT_DELIMITER.to_string(),
            subcast: Box::new(subcast),
        }
    }

    /// Datetime with the default format
    pub fn datetime() -> Self {
        Field::DateTime {
            format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }

    /// Date with the default format
    pub fn date() -> Self {
        Field::Date {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Time with the default format
    pub fn time() -> Self {
        Field::Time {
            format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// UUID, version 4 by default
    pub fn uuid() -> Self {
        Field::Uuid { version: Some(4) }
    }

    /// Replace the delimiter of a `List` or `Choices` field
    ///
    /// Other kinds are returned unchanged.
    pub fn with_delimiter(self, delimiter: impl Into<String>) -> Self {
        match self {
            Field::List { subcast, .. } => Field::List {
                delimiter: delimiter.into(),
                subcast,
            },
            Field::Choices { subcast, .. } => Field::Choices {
                delimiter: delimiter.into(),
                subcast,
            },
            other => other,
        }
    }

    /// Replace the format of a date/time field
    ///
    /// Other kinds are returned unchanged.
    pub fn with_format(self, format: impl Into<String>) -> Self {
        match self {
            Field::DateTime { .. } => Field::DateTime {
                format: format.into(),
            },
            Field::Date { .. } => Field::Date {
                format: format.into(),
            },
            Field::Time { .. } => Field::Time {
                format: format.into(),
            },
            other => other,
        }
    }

    /// Get a human-readable name for this kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Str => "string",
            Field::Int => "int",
            Field::Float => "float",
            Field::Decimal => "decimal",
            Field::Bool => "bool",
            Field::List { .. } => "list",
            Field::Choices { .. } => "choices",
            Field::DateTime { .. } => "datetime",
            Field::Date { .. } => "date",
            Field::Time { .. } => "time",
            Field::TimeDelta => "timedelta",
            Field::TimeDeltaSeconds => "timedelta_seconds",
            Field::Uuid { .. } => "uuid",
            Field::LogLevel => "log_level",
            Field::Path => "path",
        }
    }

    /// Coerce a raw value into this kind
    pub fn deserialize(&self, raw: &Value) -> Result<TypedValue, ValidationError> {
        Ok(match self {
            Field::Str => TypedValue::Str(to_str(raw)?),
            Field::Int => TypedValue::Int(to_int(raw)?),
            Field::Float => TypedValue::Float(to_float(raw)?),
            Field::Decimal => TypedValue::Decimal(to_decimal(raw)?),
            Field::Bool => TypedValue::Bool(to_bool(raw)?),
            Field::List { delimiter, subcast } => {
                TypedValue::List(to_list(raw, delimiter, subcast)?)
            }
            Field::Choices { delimiter, subcast } => {
                TypedValue::Choices(to_choices(raw, delimiter, subcast)?)
            }
            Field::DateTime { format } => TypedValue::DateTime(to_datetime(raw, format)?),
            Field::Date { format } => TypedValue::Date(to_date(raw, format)?),
            Field::Time { format } => TypedValue::Time(to_time(raw, format)?),
            Field::TimeDelta => TypedValue::Duration(to_timedelta(raw)?),
            Field::TimeDeltaSeconds => TypedValue::Duration(to_timedelta_seconds(raw)?),
            Field::Uuid { .. } => TypedValue::Uuid(to_uuid(raw)?),
            Field::LogLevel => TypedValue::LogLevel(to_log_level(raw)?),
            Field::Path => TypedValue::Path(to_path(raw)?),
        })
    }

    /// Coerce a plain string into this kind
    pub fn deserialize_str(&self, raw: &str) -> Result<TypedValue, ValidationError> {
        self.deserialize(&Value::String(raw.to_string()))
    }
}

/// Result of a coercion
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Str(String),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    List(Vec<TypedValue>),
    Choices(Vec<(String, TypedValue)>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(Duration),
    Uuid(Uuid),
    LogLevel(i64),
    Path(PathBuf),
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) | TypedValue::LogLevel(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Str(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::Str(s)
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        TypedValue::Int(i)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

/// Canonical text form; coercing it again with the same field yields the
/// same value for the scalar kinds.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Str(s) => f.write_str(s),
            TypedValue::Int(i) | TypedValue::LogLevel(i) => write!(f, "{}", i),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Decimal(d) => write!(f, "{}", d),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(DEFAULT_DELIMITER))
            }
            TypedValue::Choices(pairs) => {
                let parts: Vec<String> = pairs.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                f.write_str(&parts.join(DEFAULT_DELIMITER))
            }
            TypedValue::DateTime(dt) => write!(f, "{}", dt.format(DEFAULT_DATETIME_FORMAT)),
            TypedValue::Date(d) => write!(f, "{}", d.format(DEFAULT_DATE_FORMAT)),
            TypedValue::Time(t) => write!(f, "{}", t.format(DEFAULT_TIME_FORMAT)),
            TypedValue::Duration(d) => {
                // Each part carries the sign so the colon form parses back.
                let total = d.num_seconds();
                let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
                if total < 0 {
                    write!(f, "{}:{}:{}", hours, minutes, seconds)
                } else {
                    write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)
                }
            }
            TypedValue::Uuid(u) => write!(f, "{}", u.hyphenated()),
            TypedValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Render a raw value for error messages
fn render(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of a scalar raw value; numbers and booleans use their JSON spelling
fn scalar_text<'a>(raw: &'a Value, kind: &'static str) -> Result<Cow<'a, str>, ValidationError> {
    match raw {
        Value::String(s) => Ok(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Ok(Cow::Owned(n.to_string())),
        Value::Bool(b) => Ok(Cow::Owned(b.to_string())),
        other => Err(ValidationError::new(
            render(other),
            kind,
            "not a scalar value",
        )),
    }
}

/// Text of a raw value that must be a string
fn string_only<'a>(raw: &'a Value, kind: &'static str) -> Result<&'a str, ValidationError> {
    match raw {
        Value::String(s) => Ok(s),
        other => Err(ValidationError::new(render(other), kind, "not a string")),
    }
}

pub fn to_str(raw: &Value) -> Result<String, ValidationError> {
    scalar_text(raw, "string").map(Cow::into_owned)
}

pub fn to_int(raw: &Value) -> Result<i64, ValidationError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ValidationError::new(n.to_string(), "int", "not a valid integer")),
        _ => {
            let text = scalar_text(raw, "int")?;
            text.trim()
                .parse::<i64>()
                .map_err(|e| ValidationError::new(&*text, "int", e.to_string()))
        }
    }
}

pub fn to_float(raw: &Value) -> Result<f64, ValidationError> {
    let value = match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::new(n.to_string(), "float", "not a valid number"))?,
        _ => {
            let text = scalar_text(raw, "float")?;
            text.trim()
                .parse::<f64>()
                .map_err(|e| ValidationError::new(&*text, "float", e.to_string()))?
        }
    };
    if !value.is_finite() {
        return Err(ValidationError::new(render(raw), "float", "special numeric values are not permitted"));
    }
    Ok(value)
}

pub fn to_decimal(raw: &Value) -> Result<Decimal, ValidationError> {
    let text = match raw {
        Value::Bool(_) => {
            return Err(ValidationError::new(render(raw), "decimal", "not a valid number"))
        }
        _ => scalar_text(raw, "decimal")?,
    };
    let trimmed = text.trim();
    let invalid = |e: rust_decimal::Error| ValidationError::new(trimmed, "decimal", e.to_string());
    // Inputs past 28 fractional digits are rejected rather than rounded.
    match trimmed.split_once(|c: char| c == 'e' || c == 'E') {
        Some((mantissa, _)) => {
            Decimal::from_str_exact(mantissa).map_err(invalid)?;
            Decimal::from_scientific(trimmed).map_err(invalid)
        }
        None => Decimal::from_str_exact(trimmed).map_err(invalid),
    }
}

pub fn to_bool(raw: &Value) -> Result<bool, ValidationError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        _ => {
            let text = scalar_text(raw, "bool")?;
            match text.to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ValidationError::new(&*text, "bool", "not a valid boolean")),
            }
        }
    }
}

pub fn to_list(
    raw: &Value,
    delimiter: &str,
    subcast: &Field,
) -> Result<Vec<TypedValue>, ValidationError> {
    if let Value::Array(items) = raw {
        return items.iter().map(|item| subcast.deserialize(item)).collect();
    }
    let text = string_only(raw, "list")?;
    if delimiter.is_empty() {
        return Err(ValidationError::new(text, "list", "delimiter must not be empty"));
    }
    text.split(delimiter)
        .map(|part| subcast.deserialize_str(part))
        .collect()
}

pub fn to_choices(
    raw: &Value,
    delimiter: &str,
    subcast: &Field,
) -> Result<Vec<(String, TypedValue)>, ValidationError> {
    if let Value::Array(items) = raw {
        return items
            .iter()
            .map(|item| -> Result<(String, TypedValue), ValidationError> {
                match item {
                    Value::Array(pair) if pair.len() == 2 => {
                        Ok((to_str(&pair[0])?, subcast.deserialize(&pair[1])?))
                    }
                    other => Err(ValidationError::new(
                        render(other),
                        "choices",
                        "expected a [key, value] pair",
                    )),
                }
            })
            .collect();
    }
    let text = string_only(raw, "choices")?;
    if delimiter.is_empty() {
        return Err(ValidationError::new(text, "choices", "delimiter must not be empty"));
    }
    text.split(delimiter)
        .map(|pair| -> Result<(String, TypedValue), ValidationError> {
            let (key, value) = pair.split_once(':').ok_or_else(|| {
                ValidationError::new(pair, "choices", "expected a key:value pair")
            })?;
            Ok((key.to_string(), subcast.deserialize_str(value)?))
        })
        .collect()
}

pub fn to_datetime(raw: &Value, format: &str) -> Result<NaiveDateTime, ValidationError> {
    let text = string_only(raw, "datetime")?;
    let invalid = |e: chrono::ParseError| {
        ValidationError::new(text, "datetime", format!("{} (format '{}')", e, format))
    };
    match NaiveDateTime::parse_from_str(text, format) {
        Ok(dt) => Ok(dt),
        // A date-only format means midnight
        Err(e) if e.kind() == ParseErrorKind::NotEnough => NaiveDate::parse_from_str(text, format)
            .map(|date| date.and_time(NaiveTime::MIN))
            .map_err(|_| invalid(e)),
        Err(e) => Err(invalid(e)),
    }
}

pub fn to_date(raw: &Value, format: &str) -> Result<NaiveDate, ValidationError> {
    let text = string_only(raw, "date")?;
    NaiveDate::parse_from_str(text, format)
        .map_err(|e| ValidationError::new(text, "date", format!("{} (format '{}')", e, format)))
}

pub fn to_time(raw: &Value, format: &str) -> Result<NaiveTime, ValidationError> {
    let text = string_only(raw, "time")?;
    NaiveTime::parse_from_str(text, format)
        .map_err(|e| ValidationError::new(text, "time", format!("{} (format '{}')", e, format)))
}

/// `H:MM:SS`, each part an integer
pub fn to_timedelta(raw: &Value) -> Result<Duration, ValidationError> {
    let text = string_only(raw, "timedelta")?;
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(ValidationError::new(
            text,
            "timedelta",
            format!("expected H:MM:SS, got {} part(s)", parts.len()),
        ));
    }

    let mut numbers = [0i64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<i64>()
            .map_err(|e| ValidationError::new(text, "timedelta", e.to_string()))?;
    }
    let [hours, minutes, seconds] = numbers;

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ValidationError::new(text, "timedelta", "duration out of range"))
}

/// Integer number of seconds
pub fn to_timedelta_seconds(raw: &Value) -> Result<Duration, ValidationError> {
    let seconds = to_int(raw).map_err(|e| ValidationError { kind: "timedelta_seconds", ..e })?;
    Duration::try_seconds(seconds)
        .ok_or_else(|| ValidationError::new(render(raw), "timedelta_seconds", "duration out of range"))
}

pub fn to_uuid(raw: &Value) -> Result<Uuid, ValidationError> {
    let text = string_only(raw, "uuid")?;
    Uuid::parse_str(text).map_err(|e| ValidationError::new(text, "uuid", e.to_string()))
}

/// Numeric levels pass through; names are looked up case-insensitively
pub fn to_log_level(raw: &Value) -> Result<i64, ValidationError> {
    if let Value::Number(n) = raw {
        return n
            .as_i64()
            .ok_or_else(|| ValidationError::new(n.to_string(), "log_level", "Not a valid log level."));
    }
    let text = string_only(raw, "log_level")?;
    if let Ok(level) = text.trim().parse::<i64>() {
        return Ok(level);
    }
    let name = text.trim().to_uppercase();
    LOG_LEVELS
        .iter()
        .find(|(level_name, _)| *level_name == name)
        .map(|(_, level)| *level)
        .ok_or_else(|| ValidationError::new(text, "log_level", "Not a valid log level."))
}

pub fn to_path(raw: &Value) -> Result<PathBuf, ValidationError> {
    let text = string_only(raw, "path")?;
    Ok(PathBuf::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(text: &str) -> Value {
        Value::String(text.to_string())
    }

    #[test]
    fn test_str() {
        assert_eq!(to_str(&s("test")).unwrap(), "test");
        assert_eq!(to_str(&json!(12)).unwrap(), "12");
        assert!(to_str(&json!({"a": 1})).is_err());
        assert!(to_str(&Value::Null).is_err());
    }

    #[test]
    fn test_int() {
        assert_eq!(to_int(&s("1")).unwrap(), 1);
        assert_eq!(to_int(&s("-42")).unwrap(), -42);
        assert_eq!(to_int(&json!(1234)).unwrap(), 1234);

        let err = to_int(&s("abc")).unwrap_err();
        assert_eq!(err.kind, "int");
        assert_eq!(err.value, "abc");
        assert!(to_int(&s("1.5")).is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(to_float(&s("1.1")).unwrap(), 1.1);
        assert_eq!(to_float(&json!(1.234)).unwrap(), 1.234);
        assert!(to_float(&s("one")).is_err());
        assert!(to_float(&s("inf")).is_err());
    }

    #[test]
    fn test_decimal_is_exact() {
        assert_eq!(to_decimal(&s("1.1")).unwrap(), Decimal::new(11, 1));
        assert_eq!(to_decimal(&s("1.234")).unwrap().to_string(), "1.234");
        assert_eq!(to_decimal(&s("1e3")).unwrap(), Decimal::new(1000, 0));
        assert!(to_decimal(&s("x")).is_err());
        assert!(to_decimal(&json!(true)).is_err());
    }

    #[test]
    fn test_decimal_rejects_excess_precision() {
        let err = to_decimal(&s("0.12345678901234567890123456789012")).unwrap_err();
        assert_eq!(err.kind, "decimal");
        assert!(to_decimal(&s("0.12345678901234567890123456789012e2")).is_err());

        let max_scale = "0.1234567890123456789012345678";
        assert_eq!(to_decimal(&s(max_scale)).unwrap().to_string(), max_scale);
        assert_eq!(to_decimal(&s("2.5E-3")).unwrap(), Decimal::new(25, 4));
    }

    #[test]
    fn test_bool() {
        for truthy in ["True", "true", "TRUE", "1"] {
            assert!(to_bool(&s(truthy)).unwrap(), "{} should be true", truthy);
        }
        for falsy in ["False", "false", "0"] {
            assert!(!to_bool(&s(falsy)).unwrap(), "{} should be false", falsy);
        }
        assert!(to_bool(&json!(true)).unwrap());
        assert!(to_bool(&s("yes")).is_err());
        assert!(to_bool(&s("")).is_err());
    }

    #[test]
    fn test_list_default_and_subcast() {
        let items = to_list(&s("test1,test2,test3"), ",", &Field::Str).unwrap();
        assert_eq!(
            items,
            vec![
                TypedValue::from("test1"),
                TypedValue::from("test2"),
                TypedValue::from("test3")
            ]
        );

        let ints = Field::list_of(Field::Int)
            .with_delimiter(";")
            .deserialize(&s("1;2;3"))
            .unwrap();
        assert_eq!(
            ints,
            TypedValue::List(vec![TypedValue::Int(1), TypedValue::Int(2), TypedValue::Int(3)])
        );

        assert!(to_list(&s("1,x"), ",", &Field::Int).is_err());
        assert!(to_list(&s("a"), "", &Field::Str).is_err());
    }

    #[test]
    fn test_choices() {
        let pairs = to_choices(&s("a:1,b:2"), ",", &Field::Str).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), TypedValue::from("1")),
                ("b".to_string(), TypedValue::from("2"))
            ]
        );

        let typed = to_choices(&s("a:1,b:2"), ",", &Field::Int).unwrap();
        assert_eq!(typed[1], ("b".to_string(), TypedValue::Int(2)));

        let already = to_choices(&json!([["a", "1"], ["b", "2"]]), ",", &Field::Str).unwrap();
        assert_eq!(already, pairs);

        assert!(to_choices(&s("a1,b:2"), ",", &Field::Str).is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let dt = to_datetime(&s("2020-01-01 00:00:00"), DEFAULT_DATETIME_FORMAT).unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );

        let date = to_date(&s("01/02/2020"), "%d/%m/%Y").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());

        let time = to_time(&s("00:00:00"), DEFAULT_TIME_FORMAT).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());

        let err = to_date(&s("2020-13-01"), DEFAULT_DATE_FORMAT).unwrap_err();
        assert_eq!(err.kind, "date");
    }

    #[test]
    fn test_datetime_with_date_only_format() {
        let dt = to_datetime(&s("2020-01-01"), "%Y-%m-%d").unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );

        let err = to_datetime(&s("2020-02-30"), "%Y-%m-%d").unwrap_err();
        assert_eq!(err.kind, "datetime");
        assert!(to_datetime(&s("2020-01-01"), DEFAULT_DATETIME_FORMAT).is_err());
    }

    #[test]
    fn test_timedelta() {
        assert_eq!(to_timedelta(&s("1:0:0")).unwrap(), Duration::hours(1));
        assert_eq!(to_timedelta(&s("1:01:00")).unwrap(), Duration::seconds(3660));
        assert!(to_timedelta(&s("1:00")).is_err());
        assert!(to_timedelta(&s("1:00:00:00")).is_err());
        assert!(to_timedelta(&s("a:00:00")).is_err());
    }

    #[test]
    fn test_timedelta_seconds() {
        assert_eq!(to_timedelta_seconds(&s("1")).unwrap(), Duration::seconds(1));
        assert_eq!(to_timedelta_seconds(&s("3600")).unwrap(), Duration::hours(1));
        let err = to_timedelta_seconds(&s("soon")).unwrap_err();
        assert_eq!(err.kind, "timedelta_seconds");
    }

    #[test]
    fn test_uuid_ignores_version() {
        let parsed = Field::Uuid { version: Some(1) }
            .deserialize(&s("12345678-1234-5678-1234-567812345678"))
            .unwrap();
        assert_eq!(
            parsed,
            TypedValue::Uuid(Uuid::parse_str("12345678-1234-5678-1234-567812345678").unwrap())
        );
        assert!(to_uuid(&s("not-a-uuid")).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(to_log_level(&s("DEBUG")).unwrap(), 10);
        assert_eq!(to_log_level(&s("info")).unwrap(), 20);
        assert_eq!(to_log_level(&s("WARNING")).unwrap(), 30);
        assert_eq!(to_log_level(&s("ERROR")).unwrap(), 40);
        assert_eq!(to_log_level(&s("CRITICAL")).unwrap(), 50);
        assert_eq!(to_log_level(&s("15")).unwrap(), 15);
        assert_eq!(to_log_level(&json!(25)).unwrap(), 25);

        let err = to_log_level(&s("NOTALEVEL")).unwrap_err();
        assert_eq!(err.kind, "log_level");
        assert_eq!(err.reason, "Not a valid log level.");
    }

    #[test]
    fn test_path() {
        assert_eq!(to_path(&s("/tmp")).unwrap(), PathBuf::from("/tmp"));
        assert_eq!(
            Field::Path.deserialize(&s("does/not/exist")).unwrap(),
            TypedValue::Path(PathBuf::from("does/not/exist"))
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Field::default().kind_name(), "string");
        assert_eq!(Field::list().kind_name(), "list");
        assert_eq!(Field::datetime().with_format("%s").kind_name(), "datetime");
    }

    #[test]
    fn test_duration_display_parses_back() {
        for secs in [0i64, 59, 3600, 3661, -3661, 90061] {
            let shown = TypedValue::Duration(Duration::seconds(secs)).to_string();
            assert_eq!(
                Field::TimeDelta.deserialize_str(&shown).unwrap(),
                TypedValue::Duration(Duration::seconds(secs)),
                "{}",
                shown
            );
        }
    }
}
