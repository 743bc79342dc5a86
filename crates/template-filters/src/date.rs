use std::fmt::Display;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::error::FilterError;
use crate::value::Value;

// RFC 3339 with a numeric offset, `Z` is only emitted when UTC is asked for
const OFFSET_DATE_TIME: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);
const UTC_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
const NAIVE_DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// What to do with a datetime that carries no offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NaivePolicy {
    #[default]
    Reject,
    AssumeUtc,
    Local,
}

impl Display for NaivePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            NaivePolicy::Reject => write!(f, "reject"),
            NaivePolicy::AssumeUtc => write!(f, "utc"),
            NaivePolicy::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFormatOptions {
    /// Shift aware datetimes to UTC before rendering, and render them with `Z`.
    pub utc: bool,
    pub naive: NaivePolicy,
}

/// Renders a date or a point in time as RFC 3339.
///
/// * `DateTime` renders as `2024-03-05T08:00:00+00:00`, fractional seconds are dropped.
///   With `options.utc` it is shifted to UTC and renders as `2024-03-05T08:00:00Z`.
/// * `Date` renders as `2024-03-05`.
/// * `NaiveDateTime` is handled per `options.naive`.
/// * `Int` and `Float` are Unix timestamps in seconds and render in UTC, or in the
///   local offset under `NaivePolicy::Local`.
///
/// # Errors
/// `FilterError::InvalidDateTime` for anything else, and for values RFC 3339 cannot express.
pub fn format_rfc3339(value: &Value, options: &DateFormatOptions) -> Result<String, FilterError> {
    match *value {
        Value::DateTime(datetime) => format_aware(datetime, options),
        Value::Date(date) => format_date(date),
        Value::NaiveDateTime(datetime) => match options.naive {
            NaivePolicy::Reject => Err(FilterError::invalid_date_time(
                "naive datetime has no offset",
            )),
            NaivePolicy::AssumeUtc => format_aware(datetime.assume_utc(), options),
            NaivePolicy::Local => {
                let offset = local_offset_at(datetime.assume_utc())?;

                format_aware(datetime.assume_offset(offset), options)
            },
        },
        Value::Int(seconds) => format_timestamp(seconds, options),
        Value::Float(seconds) => {
            if !seconds.is_finite() {
                return Err(FilterError::invalid_date_time(format!(
                    "timestamp {} is not a finite number",
                    seconds
                )));
            }

            format_timestamp(floor_seconds(seconds), options)
        },
        Value::Null => Err(FilterError::invalid_date_time("no value to render")),
        Value::Bool(_) | Value::String(_) | Value::Time(_) | Value::Seq(_) | Value::Map(_) => {
            Err(FilterError::invalid_date_time(format!(
                "a {} does not carry a date",
                value.type_name()
            )))
        },
    }
}

/// # Errors
/// When the year has more than 4 digits or the offset has a seconds component.
pub fn format_offset_datetime(datetime: OffsetDateTime) -> Result<String, FilterError> {
    check_year(datetime.year())?;

    let offset = datetime.offset();

    if offset.seconds_past_minute() != 0 {
        return Err(FilterError::invalid_date_time(format!(
            "offset {} has a seconds component",
            offset
        )));
    }

    render(datetime.format(OFFSET_DATE_TIME))
}

/// # Errors
/// When the year has more than 4 digits.
pub fn format_date(date: Date) -> Result<String, FilterError> {
    check_year(date.year())?;

    render(date.format(DATE))
}

pub(crate) fn format_naive_datetime(datetime: PrimitiveDateTime) -> Result<String, FilterError> {
    check_year(datetime.year())?;

    render(datetime.format(NAIVE_DATE_TIME))
}

pub(crate) fn format_time(time: Time) -> Result<String, FilterError> {
    render(time.format(TIME))
}

fn render(formatted: Result<String, time::error::Format>) -> Result<String, FilterError> {
    match formatted {
        Ok(formatted) => Ok(formatted),
        Err(error) => Err(FilterError::invalid_date_time(format!(
            "couldn't format, error: {}",
            error
        ))),
    }
}

fn format_aware(datetime: OffsetDateTime, options: &DateFormatOptions) -> Result<String, FilterError> {
    if !options.utc {
        return format_offset_datetime(datetime);
    }

    let in_utc = datetime.checked_to_offset(UtcOffset::UTC).ok_or_else(|| {
        FilterError::invalid_date_time("datetime is out of range once shifted to UTC")
    })?;

    check_year(in_utc.year())?;

    render(in_utc.format(UTC_DATE_TIME))
}

fn format_timestamp(seconds: i64, options: &DateFormatOptions) -> Result<String, FilterError> {
    let instant = OffsetDateTime::from_unix_timestamp(seconds).map_err(|error| {
        FilterError::invalid_date_time(format!("timestamp {} is out of range: {}", seconds, error))
    })?;

    let instant = match options.naive {
        NaivePolicy::Local => {
            let offset = local_offset_at(instant)?;

            instant.checked_to_offset(offset).ok_or_else(|| {
                FilterError::invalid_date_time(format!(
                    "timestamp {} is out of range in the local offset",
                    seconds
                ))
            })?
        },
        NaivePolicy::Reject | NaivePolicy::AssumeUtc => instant,
    };

    format_aware(instant, options)
}

fn local_offset_at(instant: OffsetDateTime) -> Result<UtcOffset, FilterError> {
    UtcOffset::local_offset_at(instant).map_err(|error| {
        FilterError::invalid_date_time(format!("local offset is unavailable: {}", error))
    })
}

fn check_year(year: i32) -> Result<(), FilterError> {
    if (0..=9999).contains(&year) {
        Ok(())
    } else {
        Err(FilterError::invalid_date_time(format!(
            "year {} does not fit in 4 digits",
            year
        )))
    }
}

/// Drops the fraction the way formatting does, towards the earlier second.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Sub-second precision is dropped, out of range values saturate and are rejected later"
)]
fn floor_seconds(seconds: f64) -> i64 {
    seconds.floor() as i64
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use time::macros::{date, datetime, time};
    use time::{Date, Month, OffsetDateTime, UtcOffset};

    use crate::date::{DateFormatOptions, NaivePolicy, format_rfc3339};
    use crate::error::FilterError;
    use crate::value::Value;

    fn format_default(value: Value) -> Result<String, FilterError> {
        format_rfc3339(&value, &DateFormatOptions::default())
    }

    #[test]
    fn formats_utc_with_numeric_offset() {
        assert_eq!(
            Ok(String::from("2024-03-05T08:00:00+00:00")),
            format_default(Value::from(datetime!(2024-03-05 08:00:00 UTC)))
        );
    }

    #[test]
    fn keeps_the_given_offset() {
        assert_eq!(
            Ok(String::from("2024-01-15T10:30:00-05:30")),
            format_default(Value::from(datetime!(2024-01-15 10:30:00 -05:30)))
        );
    }

    #[test]
    fn drops_fractional_seconds() {
        assert_eq!(
            Ok(String::from("2024-03-05T08:00:01+01:00")),
            format_default(Value::from(datetime!(2024-03-05 08:00:01.987 +01:00)))
        );
    }

    #[test]
    fn formats_date_only() {
        assert_eq!(
            Ok(String::from("2024-03-05")),
            format_default(Value::from(date!(2024-03-05)))
        );
    }

    #[test]
    fn pads_small_years() {
        assert_eq!(
            Ok(String::from("0042-01-02")),
            format_default(Value::from(
                Date::from_calendar_date(42, Month::January, 2).unwrap()
            ))
        );
    }

    #[test]
    fn rejects_null() {
        let result = format_default(Value::Null);

        assert!(matches!(result, Err(FilterError::InvalidDateTime { .. })));
    }

    #[test]
    fn rejects_values_without_a_date() {
        for value in [
            Value::from("2024-03-05"),
            Value::Bool(true),
            Value::from(time!(08:00)),
            Value::Seq(Vec::new()),
        ] {
            let result = format_default(value);

            assert!(matches!(result, Err(FilterError::InvalidDateTime { .. })));
        }
    }

    #[test]
    fn rejects_offsets_with_seconds() {
        let result = format_default(Value::from(
            datetime!(2024-03-05 08:00).assume_offset(UtcOffset::from_hms(1, 0, 30).unwrap()),
        ));

        assert!(matches!(result, Err(FilterError::InvalidDateTime { .. })));
    }

    #[test]
    fn naive_datetimes_are_rejected_by_default() {
        let result = format_default(Value::from(datetime!(2024-03-05 08:00)));

        assert!(matches!(result, Err(FilterError::InvalidDateTime { .. })));
    }

    #[test]
    fn naive_datetimes_can_be_assumed_utc() {
        let options = DateFormatOptions {
            naive: NaivePolicy::AssumeUtc,
            ..DateFormatOptions::default()
        };

        assert_eq!(
            Ok(String::from("2024-03-05T08:00:00+00:00")),
            format_rfc3339(&Value::from(datetime!(2024-03-05 08:00)), &options)
        );
    }

    #[test]
    fn utc_option_shifts_aware_datetimes() {
        let options = DateFormatOptions {
            utc: true,
            ..DateFormatOptions::default()
        };

        assert_eq!(
            Ok(String::from("2024-03-05T07:00:00Z")),
            format_rfc3339(&Value::from(datetime!(2024-03-05 09:00 +02:00)), &options)
        );
    }

    #[test]
    fn utc_option_leaves_dates_alone() {
        let options = DateFormatOptions {
            utc: true,
            ..DateFormatOptions::default()
        };

        assert_eq!(
            Ok(String::from("2024-03-05")),
            format_rfc3339(&Value::from(date!(2024-03-05)), &options)
        );
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(
            Ok(String::from("2024-03-05T08:00:00+00:00")),
            format_default(Value::Int(1_709_625_600))
        );

        assert_eq!(
            Ok(String::from("1970-01-01T00:00:01+00:00")),
            format_default(Value::Float(1.75))
        );
    }

    #[test]
    fn negative_fractional_timestamps_round_down() {
        assert_eq!(
            Ok(String::from("1969-12-31T23:59:58+00:00")),
            format_default(Value::Float(-1.5))
        );

        assert_eq!(
            format_default(Value::from(
                OffsetDateTime::from_unix_timestamp_nanos(-1_500_000_000).unwrap()
            )),
            format_default(Value::Float(-1.5))
        );
    }

    #[test]
    fn utc_option_renders_utc_timestamps_with_z() {
        let options = DateFormatOptions {
            utc: true,
            ..DateFormatOptions::default()
        };

        assert_eq!(
            Ok(String::from("2024-03-05T08:00:00Z")),
            format_rfc3339(&Value::Int(1_709_625_600), &options)
        );
    }

    #[test]
    fn rejects_unrepresentable_timestamps() {
        for value in [Value::Int(i64::MAX), Value::Float(f64::INFINITY), Value::Float(f64::NAN)] {
            let result = format_default(value);

            assert!(matches!(result, Err(FilterError::InvalidDateTime { .. })));
        }
    }
}
