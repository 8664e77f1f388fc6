#![forbid(unsafe_code)]

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) fn now_rfc3339() -> Value {
    Value::String(
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string()),
    )
}

pub(crate) fn now_ms_i64() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let ms = nanos / 1_000_000i128;
    if ms <= 0 {
        0
    } else if ms >= i64::MAX as i128 {
        i64::MAX
    } else {
        ms as i64
    }
}

pub(crate) fn ts_ms_to_rfc3339(ts_ms: i64) -> String {
    let nanos = (ts_ms as i128) * 1_000_000i128;
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (read as
/// midnight UTC). Returns epoch milliseconds.
pub(crate) fn parse_date_ms(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        let ms = dt.unix_timestamp_nanos() / 1_000_000i128;
        return i64::try_from(ms).ok();
    }
    parse_plain_date_ms(trimmed)
}

fn parse_plain_date_ms(value: &str) -> Option<i64> {
    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    let month = time::Month::try_from(month).ok()?;
    let date = time::Date::from_calendar_date(year, month, day).ok()?;
    Some(date.midnight().assume_utc().unix_timestamp() * 1000)
}

/// `YYYY-MM` labels for the last `count` calendar months, oldest first,
/// ending at the current month.
pub(crate) fn trailing_months(count: usize) -> Vec<String> {
    let now = OffsetDateTime::now_utc();
    let mut year = now.year();
    let mut month = now.month() as i32;
    let mut labels = std::collections::VecDeque::with_capacity(count);
    for _ in 0..count {
        labels.push_front(format!("{year:04}-{month:02}"));
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    labels.into()
}

/// Epoch ms of the first day (00:00 UTC) of the month `months_back`
/// months before the current one; 0 means the current month.
pub(crate) fn month_start_ms(months_back: u32) -> i64 {
    let now = OffsetDateTime::now_utc();
    let mut year = now.year();
    let mut month = now.month() as i32;
    for _ in 0..months_back {
        month -= 1;
        if month == 0 {
            month = 12;
            year -= 1;
        }
    }
    let month = time::Month::try_from(month as u8).unwrap_or(time::Month::January);
    let date = time::Date::from_calendar_date(year, month, 1).unwrap_or(time::Date::MIN);
    date.midnight().assume_utc().unix_timestamp() * 1000
}
