use serde_json::Value;
use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
};

const LOCAL_DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];

// RFC 3339 requires seconds; clients also send `2024-06-01T08:00+09:00`.
const OFFSET_DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute][offset_hour sign:mandatory]:[offset_minute]"
);

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

/// Resolves one raw date-like value to an instant.
///
/// Values without an explicit offset (local date-times, plain dates, Jackson
/// `[y, m, d, h, min, s, nanos]` arrays) are read in `offset`. Integers are
/// epoch milliseconds.
pub fn parse_instant(value: &Value, offset: UtcOffset) -> Option<OffsetDateTime> {
    match value {
        Value::String(s) => parse_text(s, offset),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(whole_millis))
            .and_then(|ms| from_epoch_millis(ms, offset)),
        Value::Array(parts) => from_parts(parts).map(|dt| dt.assume_offset(offset)),
        _ => None,
    }
}

pub fn parse_text(s: &str, offset: UtcOffset) -> Option<OffsetDateTime> {
    let s = s.trim();
    if let Ok(instant) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(instant);
    }
    if let Ok(instant) = OffsetDateTime::parse(s, OFFSET_DATE_TIME_FORMAT) {
        return Some(instant);
    }
    LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(s, fmt).ok())
        .or_else(|| parse_date(s).map(Date::midnight))
        .map(|dt| dt.assume_offset(offset))
}

pub fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), DATE_FORMAT).ok()
}

pub fn parse_offset(s: &str) -> Option<UtcOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Some(UtcOffset::UTC);
    }
    UtcOffset::parse(s, OFFSET_FORMAT).ok()
}

fn from_epoch_millis(ms: i64, offset: UtcOffset) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .map(|t| t.to_offset(offset))
}

fn whole_millis(ms: f64) -> Option<i64> {
    (ms.fract() == 0.0 && ms.abs() < i64::MAX as f64).then_some(ms as i64)
}

fn from_parts(parts: &[Value]) -> Option<PrimitiveDateTime> {
    let part = |i: usize| -> Option<i64> {
        match parts.get(i) {
            Some(v) => v.as_i64(),
            None => Some(0),
        }
    };
    if parts.len() < 3 || parts.len() > 7 {
        return None;
    }
    let year = i32::try_from(part(0)?).ok()?;
    let month = Month::try_from(u8::try_from(part(1)?).ok()?).ok()?;
    let day = u8::try_from(part(2)?).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;
    let time = Time::from_hms_nano(
        u8::try_from(part(3)?).ok()?,
        u8::try_from(part(4)?).ok()?,
        u8::try_from(part(5)?).ok()?,
        u32::try_from(part(6)?).ok()?,
    )
    .ok()?;
    Some(PrimitiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{date, datetime, offset};

    #[test]
    fn rfc3339_keeps_its_own_offset() {
        let t = parse_instant(&json!("2024-01-05T10:00:00Z"), offset!(+9)).unwrap();
        assert_eq!(t, datetime!(2024-01-05 10:00 UTC));
        let t = parse_instant(&json!("2024-01-05T19:00:00+09:00"), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-01-05 10:00 UTC));
    }

    #[test]
    fn local_date_times_use_the_default_offset() {
        let t = parse_instant(&json!("2024-06-01T08:00:00"), offset!(+9)).unwrap();
        assert_eq!(t, datetime!(2024-06-01 08:00 +9));
        let t = parse_instant(&json!("2024-06-01 08:30"), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 08:30 UTC));
        let t = parse_instant(&json!("2024-06-01T08:00:00.250"), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 08:00:00.25 UTC));
    }

    #[test]
    fn plain_dates_resolve_to_midnight() {
        let t = parse_instant(&json!("2024-06-01"), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 00:00 UTC));
    }

    #[test]
    fn epoch_millis_and_jackson_arrays() {
        let t = parse_instant(&json!(1_717_228_800_000_i64), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 08:00 UTC));
        let t = parse_instant(&json!([2024, 6, 1, 19, 5]), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 19:05 UTC));
        assert!(parse_instant(&json!([2024, 13, 1]), UtcOffset::UTC).is_none());
        assert!(parse_instant(&json!([2024]), UtcOffset::UTC).is_none());
    }

    #[test]
    fn offsets_without_seconds_and_float_millis() {
        let t = parse_instant(&json!("2024-06-01T08:00+09:00"), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-05-31 23:00 UTC));
        let t = parse_instant(&json!(1_717_228_800_000.0_f64), UtcOffset::UTC).unwrap();
        assert_eq!(t, datetime!(2024-06-01 08:00 UTC));
        assert!(parse_instant(&json!(1_717_228_800_000.5_f64), UtcOffset::UTC).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_instant(&json!("yesterday"), UtcOffset::UTC).is_none());
        assert!(parse_instant(&json!("2024-02-30"), UtcOffset::UTC).is_none());
        assert!(parse_instant(&json!(true), UtcOffset::UTC).is_none());
        assert!(parse_instant(&json!({}), UtcOffset::UTC).is_none());
    }

    #[test]
    fn dates_and_offsets() {
        assert_eq!(parse_date("2024-06-01"), Some(date!(2024-06-01)));
        assert_eq!(parse_offset("+09:00"), Some(offset!(+9)));
        assert_eq!(parse_offset("-05:30"), Some(offset!(-5:30)));
        assert_eq!(parse_offset("UTC"), Some(UtcOffset::UTC));
        assert_eq!(parse_offset("nine"), None);
    }
}
