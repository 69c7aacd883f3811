//! Backend-neutral property values and temporal coercion.
//!
//! Neo4j hands back dates, times and durations as native temporal types.
//! [`coerce_value`] rewrites them into ISO-8601 strings so every record the
//! engine returns is plain JSON.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A property value as stored on a node or relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Date(NaiveDate),
    LocalTime(NaiveTime),
    Time { time: NaiveTime, offset: FixedOffset },
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    ZonedDateTime { local: NaiveDateTime, zone: String },
    Duration(IsoDuration),
}

/// Calendar-aware duration in Bolt's representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsoDuration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanoseconds: i32,
}

impl IsoDuration {
    pub fn new(months: i64, days: i64, seconds: i64, nanoseconds: i32) -> Self {
        Self { months, days, seconds, nanoseconds }
    }
}

impl fmt::Display for IsoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::default() {
            return f.write_str("PT0S");
        }

        f.write_str("P")?;
        let (years, months) = (self.months / 12, self.months % 12);
        if years != 0 {
            write!(f, "{}Y", years)?;
        }
        if months != 0 {
            write!(f, "{}M", months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }

        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        if hours == 0 && minutes == 0 && seconds == 0 && self.nanoseconds == 0 {
            return Ok(());
        }

        f.write_str("T")?;
        if hours != 0 {
            write!(f, "{}H", hours)?;
        }
        if minutes != 0 {
            write!(f, "{}M", minutes)?;
        }
        if self.nanoseconds != 0 {
            let sign = if seconds == 0 && self.nanoseconds < 0 { "-" } else { "" };
            let fraction = format!("{:09}", self.nanoseconds.unsigned_abs());
            write!(f, "{}{}.{}S", sign, seconds, fraction.trim_end_matches('0'))?;
        } else if seconds != 0 {
            write!(f, "{}S", seconds)?;
        }
        Ok(())
    }
}

impl Value {
    /// True for any native temporal variant.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Value::Date(_)
                | Value::LocalTime(_)
                | Value::Time { .. }
                | Value::LocalDateTime(_)
                | Value::DateTime(_)
                | Value::ZonedDateTime { .. }
                | Value::Duration(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// ISO-8601 rendering of a temporal value; `None` for everything else.
    fn iso_string(&self) -> Option<String> {
        let rendered = match self {
            Value::Date(date) => date.format("%Y-%m-%d").to_string(),
            Value::LocalTime(time) => time.format("%H:%M:%S%.f").to_string(),
            Value::Time { time, offset } => format!("{}{}", time.format("%H:%M:%S%.f"), offset),
            Value::LocalDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::ZonedDateTime { local, zone } => {
                format!("{}[{}]", local.format("%Y-%m-%dT%H:%M:%S%.f"), zone)
            }
            Value::Duration(duration) => duration.to_string(),
            _ => return None,
        };
        Some(rendered)
    }
}

/// Recursively replace temporal values with their ISO-8601 strings.
///
/// Lists and maps are rebuilt element by element; every other scalar passes
/// through untouched, so applying it twice yields the same value.
pub fn coerce_value(value: Value) -> Value {
    match value {
        Value::List(items) => Value::List(items.into_iter().map(coerce_value).collect()),
        Value::Map(map) => Value::Map(coerce_map(map)),
        other => match other.iso_string() {
            Some(iso) => Value::String(iso),
            None => other,
        },
    }
}

/// [`coerce_value`] over a property map.
pub fn coerce_map(map: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    map.into_iter().map(|(k, v)| (k, coerce_value(v))).collect()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            temporal => match temporal.iso_string() {
                Some(iso) => serializer.serialize_str(&iso),
                None => serializer.serialize_unit(),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<IsoDuration> for Value {
    fn from(d: IsoDuration) -> Self {
        Value::Duration(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let opened = DateTime::parse_from_rfc3339("2024-03-01T08:30:00+01:00").unwrap();
        let mut inner = BTreeMap::new();
        inner.insert("opened_at".to_string(), Value::DateTime(opened));
        inner.insert("sla".to_string(), Value::Duration(IsoDuration::new(0, 1, 5400, 0)));
        inner.insert("severity".to_string(), Value::Int(2));

        let mut outer = BTreeMap::new();
        outer.insert("incident".to_string(), Value::Map(inner));
        outer.insert(
            "days".to_string(),
            Value::List(vec![
                Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                Value::Null,
                Value::from("x"),
            ]),
        );
        outer.insert(
            "shift_start".to_string(),
            Value::LocalTime(NaiveTime::from_hms_opt(6, 0, 0).unwrap()),
        );
        Value::Map(outer)
    }

    fn contains_temporal(value: &Value) -> bool {
        match value {
            Value::List(items) => items.iter().any(contains_temporal),
            Value::Map(map) => map.values().any(contains_temporal),
            other => other.is_temporal(),
        }
    }

    #[test]
    fn test_coerce_rewrites_nested_temporals() {
        let coerced = coerce_value(sample());
        assert!(!contains_temporal(&coerced));

        let json = serde_json::to_value(&coerced).unwrap();
        assert_eq!(json["incident"]["opened_at"], "2024-03-01T08:30:00+01:00");
        assert_eq!(json["incident"]["sla"], "P1DT1H30M");
        assert_eq!(json["incident"]["severity"], 2);
        assert_eq!(json["days"][0], "2024-03-01");
        assert!(json["days"][1].is_null());
        assert_eq!(json["shift_start"], "06:00:00");
    }

    #[test]
    fn test_coerce_is_idempotent() {
        let once = coerce_value(sample());
        let twice = coerce_value(once.clone());
        assert_eq!(once, twice);

        let scalar = Value::Float(1.5);
        assert_eq!(coerce_value(coerce_value(scalar.clone())), scalar);
    }

    #[test]
    fn test_serialize_matches_coerced_form() {
        let raw = serde_json::to_value(sample()).unwrap();
        let coerced = serde_json::to_value(coerce_value(sample())).unwrap();
        assert_eq!(raw, coerced);
    }

    #[test]
    fn test_duration_rendering() {
        assert_eq!(IsoDuration::default().to_string(), "PT0S");
        assert_eq!(IsoDuration::new(14, 3, 0, 0).to_string(), "P1Y2M3D");
        assert_eq!(IsoDuration::new(0, 0, 3661, 0).to_string(), "PT1H1M1S");
        assert_eq!(IsoDuration::new(0, 0, 4, 500_000_000).to_string(), "PT4.5S");
        assert_eq!(IsoDuration::new(0, 0, 0, -250_000_000).to_string(), "PT-0.25S");
    }

    #[test]
    fn test_offset_time_rendering() {
        let value = Value::Time {
            time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        };
        assert_eq!(coerce_value(value), Value::from("09:15:00+02:00"));
    }
}
