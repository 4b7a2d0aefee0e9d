use chrono::{NaiveDate, NaiveDateTime};

const FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a naive time argument; a bare date means midnight. A trailing `Z`
/// is accepted and ignored.
pub fn parse_time(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim().trim_end_matches('Z');
    for format in FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(time);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid time '{raw}': expected YYYY-MM-DD[THH:MM[:SS[.fff]]]"))
}
