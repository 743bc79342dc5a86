use std::cmp::Ordering;
use std::collections::BTreeMap;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::date::{format_date, format_naive_datetime, format_offset_datetime, format_time};
use crate::error::FilterError;

/// A value as handed to a filter by the template engine.
///
/// `Map` plays the role of an object: its keys are its attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(Date),
    Time(Time),
    DateTime(OffsetDateTime),
    NaiveDateTime(PrimitiveDateTime),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::NaiveDateTime(_) => "naive datetime",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
        }
    }

    /// Looks up a single attribute, only maps have any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match *self {
            Value::Map(ref attributes) => attributes.get(name),
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_)
            | Value::NaiveDateTime(_)
            | Value::Seq(_) => None,
        }
    }

    /// Walks a dotted attribute path, `author.name` looks up `author` and then `name` on the result.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |current, segment| current.get(segment))
    }

    /// Natural ordering between two values.
    ///
    /// Values of the same kind order the obvious way, ints and floats order numerically
    /// against each other and sequences order lexicographically. Everything else,
    /// including `null` and maps, has no ordering.
    ///
    /// # Errors
    /// `FilterError::Incomparable` when the two values cannot be ordered.
    pub fn compare(&self, other: &Value) -> Result<Ordering, FilterError> {
        let ordering = match (self, other) {
            (&Value::Bool(ref left), &Value::Bool(ref right)) => Some(left.cmp(right)),
            (&Value::Int(ref left), &Value::Int(ref right)) => Some(left.cmp(right)),
            (&Value::Float(ref left), &Value::Float(ref right)) => left.partial_cmp(right),
            (&Value::Int(left), &Value::Float(right)) => compare_int_float(left, right),
            (&Value::Float(left), &Value::Int(right)) => {
                compare_int_float(right, left).map(Ordering::reverse)
            },
            (&Value::String(ref left), &Value::String(ref right)) => Some(left.cmp(right)),
            (&Value::Date(ref left), &Value::Date(ref right)) => Some(left.cmp(right)),
            (&Value::Time(ref left), &Value::Time(ref right)) => Some(left.cmp(right)),
            (&Value::DateTime(ref left), &Value::DateTime(ref right)) => Some(left.cmp(right)),
            (&Value::NaiveDateTime(ref left), &Value::NaiveDateTime(ref right)) => {
                Some(left.cmp(right))
            },
            (&Value::Seq(ref left), &Value::Seq(ref right)) => {
                return compare_sequences(left, right);
            },
            _ => None,
        };

        ordering.ok_or_else(|| FilterError::Incomparable {
            left: self.type_name(),
            right: other.type_name(),
        })
    }

    /// A total order over every value, used to drive sorting.
    ///
    /// Agrees with [`Value::compare`] wherever that succeeds. Kinds that don't compare
    /// are grouped (null, bools, numbers, strings, dates, times, datetimes, naive
    /// datetimes, sequences, maps), NaN sorts after every number.
    #[must_use]
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        let by_kind = kind_rank(self).cmp(&kind_rank(other));

        if by_kind.is_ne() {
            return by_kind;
        }

        match (self, other) {
            (&Value::Seq(ref left), &Value::Seq(ref right)) => left
                .iter()
                .zip(right)
                .map(|(l, r)| l.total_cmp(r))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| left.len().cmp(&right.len())),
            (&Value::Map(ref left), &Value::Map(ref right)) => left
                .iter()
                .zip(right)
                .map(|((left_key, l), (right_key, r))| {
                    left_key.cmp(right_key).then_with(|| l.total_cmp(r))
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| left.len().cmp(&right.len())),
            (&(Value::Int(_) | Value::Float(_)), _) => total_cmp_numbers(self, other),
            _ => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Converts back into JSON, dates and times become their textual form.
    ///
    /// # Errors
    /// * When a date or time cannot be rendered
    /// * `FilterError::NotJson` for NaN and infinite floats
    pub fn to_json(&self) -> Result<serde_json::Value, FilterError> {
        let json = match *self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(value),
            Value::Int(value) => serde_json::Value::from(value),
            Value::Float(value) => serde_json::Number::from_f64(value)
                .map(serde_json::Value::Number)
                .ok_or_else(|| FilterError::NotJson {
                    value: value.to_string(),
                })?,
            Value::String(ref value) => serde_json::Value::String(value.clone()),
            Value::Date(date) => serde_json::Value::String(format_date(date)?),
            Value::Time(time) => serde_json::Value::String(format_time(time)?),
            Value::DateTime(datetime) => {
                serde_json::Value::String(format_offset_datetime(datetime)?)
            },
            Value::NaiveDateTime(datetime) => {
                serde_json::Value::String(format_naive_datetime(datetime)?)
            },
            Value::Seq(ref items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Map(ref attributes) => serde_json::Value::Object(
                attributes
                    .iter()
                    .map(|(key, value)| value.to_json().map(|json| (key.clone(), json)))
                    .collect::<Result<serde_json::Map<_, _>, _>>()?,
            ),
        };

        Ok(json)
    }
}

/// Exact, `2^53` and `2^53 + 1` must not both equal `2^53 as f64`.
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63, the first float past `i64::MAX`
    const I64_END: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }

    if float >= I64_END {
        return Some(Ordering::Less);
    }

    if float < -I64_END {
        return Some(Ordering::Greater);
    }

    let floor = float.floor();

    match int.cmp(&float_to_int(floor)) {
        Ordering::Equal if float > floor => Some(Ordering::Less),
        ordering @ (Ordering::Less | Ordering::Equal | Ordering::Greater) => Some(ordering),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Only called with integral floats within the i64 range"
)]
fn float_to_int(float: f64) -> i64 {
    float as i64
}

/// Orders numbers by value with NaN after every number, and any two NaNs equal.
fn total_cmp_numbers(left: &Value, right: &Value) -> Ordering {
    let left_nan = matches!(*left, Value::Float(value) if value.is_nan());
    let right_nan = matches!(*right, Value::Float(value) if value.is_nan());

    match (left_nan, right_nan) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.compare(right).unwrap_or(Ordering::Equal),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match *value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::String(_) => 3,
        Value::Date(_) => 4,
        Value::Time(_) => 5,
        Value::DateTime(_) => 6,
        Value::NaiveDateTime(_) => 7,
        Value::Seq(_) => 8,
        Value::Map(_) => 9,
    }
}

fn compare_sequences(left: &[Value], right: &[Value]) -> Result<Ordering, FilterError> {
    for (l, r) in left.iter().zip(right) {
        match l.compare(r)? {
            Ordering::Equal => continue,
            ordering @ (Ordering::Less | Ordering::Greater) => return Ok(ordering),
        }
    }

    Ok(left.len().cmp(&right.len()))
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => number.as_i64().map_or_else(
                || number.as_f64().map_or(Value::Null, Value::Float),
                Value::Int,
            ),
            serde_json::Value::String(value) => Value::String(value),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            },
            serde_json::Value::Object(attributes) => Value::Map(
                attributes
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::NaiveDateTime(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Seq(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
