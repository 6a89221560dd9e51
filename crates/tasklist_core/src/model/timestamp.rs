use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const NAIVE_ISO: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
const DISPLAY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

pub fn now() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::io(err.to_string()))
}

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// RFC 3339, or a naive ISO-8601 value read as local time.
pub fn parse(value: &str, local_offset: UtcOffset) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }

    PrimitiveDateTime::parse(value, NAIVE_ISO)
        .ok()
        .map(|naive| naive.assume_offset(local_offset))
}

/// `YYYY-MM-DD HH:MM` in `offset`, or the raw value when it cannot be parsed.
pub fn display(value: &str, offset: UtcOffset) -> String {
    parse(value, offset)
        .and_then(|parsed| parsed.to_offset(offset).format(DISPLAY).ok())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{display, now, parse};
    use time::UtcOffset;
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    #[test]
    fn now_is_rfc3339() {
        let value = now().unwrap();
        OffsetDateTime::parse(&value, &Rfc3339).unwrap();
    }

    #[test]
    fn parses_naive_iso_with_microseconds() {
        let parsed = parse("2024-05-01T09:30:00.123456", UtcOffset::UTC).unwrap();
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn display_converts_to_offset() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        assert_eq!(display("2026-01-01T08:15:00Z", offset), "2026-01-01 10:15");
        assert_eq!(display("2024-05-01T09:30:00", offset), "2024-05-01 09:30");
    }

    #[test]
    fn display_falls_back_to_raw_value() {
        assert_eq!(display("yesterday", UtcOffset::UTC), "yesterday");
    }
}
