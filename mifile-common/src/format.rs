use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const UNIT_BASE: f64 = 1024.0;
const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Rendering used for every upload date, always in the viewer's time zone.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// zone-less timestamps as emitted by the server, `%.f` also matches no fraction
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Scales a byte count to the largest unit whose value stays below 1024, capped at GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= UNIT_BASE && unit < SIZE_UNITS.len() - 1 {
        value /= UNIT_BASE;
        unit += 1;
    }
    format!("{value:.2} {}", SIZE_UNITS[unit])
}

pub fn parse_date(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.with_timezone(&Local));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Renders a server timestamp in local time, falling back to the raw value.
pub fn format_date(value: &str) -> String {
    match parse_date(value) {
        Some(time) => time.format(DATE_FORMAT).to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone, Utc};

    use crate::format::{DATE_FORMAT, format_date, format_file_size};

    #[test]
    pub fn test_zero_bytes() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    pub fn test_size_units() {
        assert_eq!(format_file_size(1), "1.00 Bytes");
        assert_eq!(format_file_size(1023), "1023.00 Bytes");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1024 * 1024 - 1), "1024.00 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    pub fn test_size_capped_at_gb() {
        assert_eq!(format_file_size(2 * 1024u64.pow(4)), "2048.00 GB");
    }

    #[test]
    pub fn test_size_always_two_decimals() {
        for bytes in [7, 1000, 4097, 123_456_789, 9_876_543_210] {
            let formatted = format_file_size(bytes);
            let (value, unit) = formatted.split_once(' ').unwrap();
            assert_eq!(value.split_once('.').unwrap().1.len(), 2, "{formatted}");
            assert!(value.parse::<f64>().unwrap() < 1024.0 || unit == "GB");
        }
    }

    #[test]
    pub fn test_rfc3339_date() {
        let expected = Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
            .unwrap()
            .with_timezone(&Local)
            .format(DATE_FORMAT)
            .to_string();
        assert_eq!(format_date("2024-03-01T12:30:00Z"), expected);
        assert_eq!(format_date("2024-03-01T12:30:00.250+00:00"), expected);
    }

    #[test]
    pub fn test_local_date() {
        assert_eq!(format_date("2024-03-01T12:30:00"), "2024-03-01 12:30:00");
        assert_eq!(
            format_date("2024-03-01T12:30:00.123456"),
            "2024-03-01 12:30:00"
        );
        assert_eq!(format_date("2024-03-01 08:05:09"), "2024-03-01 08:05:09");
    }

    #[test]
    pub fn test_unparseable_date() {
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date(""), "");
    }
}
