// src/format.rs
//! Pure text formatting shared by every source renderer.
//! No I/O; everything here is deterministic given its inputs (and `now` for
//! the relative-time helpers).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

const ELLIPSIS: char = '\u{2026}';

/// Cut `text` to at most `max_len` chars, replacing the last kept char with `…`.
pub fn truncate(text: &str, max_len: usize) -> String {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// `999`, `1.5K`, `2.5M`.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Input accepted by [`format_time_ago`]: epoch millis or a date string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timestamp<'a> {
    Millis(i64),
    Text(&'a str),
}

impl From<i64> for Timestamp<'_> {
    fn from(ms: i64) -> Self {
        Timestamp::Millis(ms)
    }
}

impl<'a> From<&'a str> for Timestamp<'a> {
    fn from(s: &'a str) -> Self {
        Timestamp::Text(s)
    }
}

impl<'a> Timestamp<'a> {
    /// Borrow a timestamp out of a raw JSON field (number → millis, string → text).
    pub fn from_json(v: &'a serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::Number(n) => n.as_i64().map(Timestamp::Millis),
            serde_json::Value::String(s) => Some(Timestamp::Text(s)),
            _ => None,
        }
    }

    fn resolve(self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
            Timestamp::Text(s) => parse_date(s),
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// Fixed-length approximations, largest first.
const INTERVALS: [(u64, char); 6] = [
    (31_536_000, 'y'),
    (2_592_000, 'm'),
    (604_800, 'w'),
    (86_400, 'd'),
    (3_600, 'h'),
    (60, 'm'),
];

/// Relative age like `3d ago`, against the wall clock.
pub fn format_time_ago<'a>(ts: impl Into<Timestamp<'a>>) -> String {
    format_time_ago_at(ts, Utc::now())
}

/// Relative age like `3d ago`, against an explicit `now`.
pub fn format_time_ago_at<'a>(ts: impl Into<Timestamp<'a>>, now: DateTime<Utc>) -> String {
    let Some(then) = ts.into().resolve() else {
        return "Unknown".to_string();
    };
    let secs = (now - then).num_seconds();
    if secs <= 0 {
        return "Just now".to_string();
    }
    let secs = secs as u64;
    INTERVALS
        .iter()
        .find_map(|&(unit, initial)| {
            let count = secs / unit;
            (count >= 1).then(|| format!("{count}{initial} ago"))
        })
        .unwrap_or_else(|| "Just now".to_string())
}

/// `45m` below one hour, `2.5h` otherwise.
pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        format!("{}m", (hours * 60.0).round() as i64)
    } else {
        format!("{hours:.1}h")
    }
}

/// Drop `[feat. …]` and `( … )` annotations from a chart title.
pub fn clean_title(title: &str) -> String {
    static RE_FEAT: OnceCell<Regex> = OnceCell::new();
    static RE_PAREN: OnceCell<Regex> = OnceCell::new();
    let re_feat = RE_FEAT.get_or_init(|| Regex::new(r"(?i)\[feat\. .*?\]").unwrap());
    let re_paren = RE_PAREN.get_or_init(|| Regex::new(r"\(.*?\)").unwrap());

    let out = re_feat.replace_all(title, "");
    let out = re_paren.replace_all(&out, "");
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn truncate_keeps_short_text_and_ellipsizes_long() {
        assert_eq!(truncate("hello world", 5), "hell\u{2026}");
        assert_eq!(truncate("hi", 5), "hi");
        assert_eq!(truncate("exact", 5), "exact");
        assert_eq!(truncate("", 5), "");
        assert_eq!(truncate("abc", 1), "\u{2026}");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Beyoncé Knowles", 8), "Beyoncé\u{2026}");
        assert_eq!(truncate("日本語テキスト", 4), "日本語\u{2026}");
    }

    #[test]
    fn number_buckets() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.0K");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(2_500_000), "2.5M");
        assert_eq!(format_number(1_000_000), "1.0M");
    }

    #[test]
    fn time_ago_units() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let ms = |d: Duration| (now - d).timestamp_millis();

        assert_eq!(format_time_ago_at(ms(Duration::seconds(3600)), now), "1h ago");
        assert_eq!(format_time_ago_at(ms(Duration::days(3)), now), "3d ago");
        assert_eq!(format_time_ago_at(ms(Duration::days(14)), now), "2w ago");
        assert_eq!(format_time_ago_at(ms(Duration::days(45)), now), "1m ago");
        assert_eq!(format_time_ago_at(ms(Duration::days(400)), now), "1y ago");
        assert_eq!(format_time_ago_at(ms(Duration::minutes(5)), now), "5m ago");
        assert_eq!(format_time_ago_at(ms(Duration::seconds(30)), now), "Just now");
    }

    #[test]
    fn time_ago_future_and_garbage() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let future = (now + Duration::seconds(10)).timestamp_millis();
        assert_eq!(format_time_ago_at(future, now), "Just now");
        assert_eq!(format_time_ago_at(now.timestamp_millis(), now), "Just now");
        assert_eq!(format_time_ago_at("not-a-date", now), "Unknown");
        assert_eq!(format_time_ago_at("", now), "Unknown");
    }

    #[test]
    fn time_ago_parses_common_string_forms() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_time_ago_at("2025-06-01T10:00:00Z", now), "2h ago");
        assert_eq!(format_time_ago_at("2025-06-01T10:00:00.000+00:00", now), "2h ago");
        assert_eq!(format_time_ago_at("Sun, 01 Jun 2025 11:00:00 +0000", now), "1h ago");
        assert_eq!(format_time_ago_at("2025-05-29", now), "3d ago");
    }

    #[test]
    fn duration_minutes_then_hours() {
        assert_eq!(format_duration(0.5), "30m");
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(1.0), "1.0h");
        assert_eq!(format_duration(12.34), "12.3h");
    }

    #[test]
    fn clean_title_strips_annotations() {
        assert_eq!(clean_title("Song [feat. Someone] (Deluxe)"), "Song");
        assert_eq!(clean_title("Album (Remastered 2011)"), "Album");
        assert_eq!(clean_title("Hit [FEAT. X]"), "Hit");
        assert_eq!(clean_title("  Plain  "), "Plain");
        assert_eq!(clean_title(""), "");
    }
}
