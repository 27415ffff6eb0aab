//! Per-field value coercion for report rows
//!
//! The statistics endpoint returns every cell as a string: counts as
//! `"42"`, days as `"01/02/2024"`, hours as `"01/02/2024 03:00:00"`.
//! A [`CoercionTable`] maps field names to the [`Coercion`] that turns
//! those strings into the types the report schema declares.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

const US_DATE: &str = "%m/%d/%Y";
const US_DATE_TIME: &str = "%m/%d/%Y %H:%M:%S";
const ISO_DATE: &str = "%Y-%m-%d";
const ISO_DATE_TIME: &str = "%Y-%m-%dT%H:%M:%S";
const SPACED_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// A conversion applied to one field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Whole number, from numeric strings or integral floats
    Integer,
    /// Any number, from numeric strings
    Number,
    /// Calendar date rendered as `YYYY-MM-DD`
    Date,
    /// UTC timestamp rendered as RFC 3339
    DateTime,
}

impl Coercion {
    /// Convert a value, returning it unchanged when already in target form
    ///
    /// `null` always passes through.
    pub fn apply(self, field: &str, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self {
            Coercion::Integer => to_integer(value),
            Coercion::Number => to_number(value),
            Coercion::Date => to_date(value),
            Coercion::DateTime => to_date_time(value),
        }
        .ok_or_else(|| {
            Error::normalization(field, format!("cannot convert {value} with {self:?}"))
        })
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => n.as_f64().and_then(integral_f64),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .map(Value::from)
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral_f64(f: f64) -> Option<Value> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();

    let date = NaiveDate::parse_from_str(s, US_DATE)
        .or_else(|_| NaiveDate::parse_from_str(s, ISO_DATE))
        .ok()
        .or_else(|| parse_date_time(s).map(|dt| dt.date_naive()))?;

    Some(Value::String(date.format(ISO_DATE).to_string()))
}

fn to_date_time(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    parse_date_time(s).map(|dt| Value::String(dt.to_rfc3339()))
}

fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    [US_DATE_TIME, ISO_DATE_TIME, SPACED_DATE_TIME]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Immutable mapping from field name to coercion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionTable {
    rules: BTreeMap<String, Coercion>,
}

impl CoercionTable {
    /// An empty table; every field passes through
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversions applied to statistics report rows
    pub fn report_defaults() -> Self {
        Self::new()
            .with("Clicks", Coercion::Integer)
            .with("Displays", Coercion::Integer)
            .with("Visits", Coercion::Integer)
            .with("AdvertiserCost", Coercion::Number)
            .with("Hour", Coercion::DateTime)
            .with("Day", Coercion::Date)
            .with("Week", Coercion::Date)
            .with("Month", Coercion::Date)
            .with("Year", Coercion::Date)
    }

    /// Add a rule
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, coercion: Coercion) -> Self {
        self.rules.insert(field.into(), coercion);
        self
    }

    /// The rule for a field, if any
    pub fn get(&self, field: &str) -> Option<Coercion> {
        self.rules.get(field).copied()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
