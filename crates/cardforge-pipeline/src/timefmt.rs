//! Wall-clock formatting without a date-time dependency

use std::time::{SystemTime, UNIX_EPOCH};

fn is_leap(y: i64) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

fn civil_from_unix(secs: u64) -> (i64, u32, u32, u32, u32, u32) {
    let days = secs / 86400;
    let time_secs = secs % 86400;
    let hours = (time_secs / 3600) as u32;
    let mins = ((time_secs % 3600) / 60) as u32;
    let s = (time_secs % 60) as u32;

    let mut y = 1970i64;
    let mut remaining_days = days as i64;
    loop {
        let days_in_year = if is_leap(y) { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        y += 1;
    }
    let month_days = [
        31,
        if is_leap(y) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut m = 0usize;
    for (i, &md) in month_days.iter().enumerate() {
        if remaining_days < md as i64 {
            m = i;
            break;
        }
        remaining_days -= md as i64;
    }

    (y, m as u32 + 1, remaining_days as u32 + 1, hours, mins, s)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current UTC time as an ISO 8601 string
pub(crate) fn now_iso8601() -> String {
    let (y, mo, d, h, mi, s) = civil_from_unix(unix_now());
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y, mo, d, h, mi, s
    )
}

/// Current UTC time as a compact `YYYYMMDD_HHMMSS` token, used for set ids
pub(crate) fn now_compact() -> String {
    let (y, mo, d, h, mi, s) = civil_from_unix(unix_now());
    format!("{:04}{:02}{:02}_{:02}{:02}{:02}", y, mo, d, h, mi, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_unix_epoch() {
        assert_eq!(civil_from_unix(0), (1970, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_civil_from_unix_known_date() {
        // 2021-03-01T12:30:45Z
        assert_eq!(civil_from_unix(1614601845), (2021, 3, 1, 12, 30, 45));
    }

    #[test]
    fn test_formats() {
        let iso = now_iso8601();
        assert!(iso.contains('T'));
        assert!(iso.ends_with('Z'));

        let compact = now_compact();
        assert_eq!(compact.len(), 15);
        assert_eq!(compact.chars().nth(8), Some('_'));
    }
}
