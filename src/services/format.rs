use chrono::{DateTime, Utc};
use std::collections::HashMap;
use crate::domain::entities::LanguageShare;

/// 千分位格式化：1234567 -> "1,234,567"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// "Jan 5, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

const INTERVALS: [(&str, i64); 6] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
];

/// 相对时间，例如 "2 days ago"
pub fn relative_time(date: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - *date).num_seconds();

    for (unit, span) in INTERVALS {
        let count = seconds / span;
        if count >= 1 {
            let plural = if count > 1 { "s" } else { "" };
            return format!("{} {}{} ago", count, unit, plural);
        }
    }

    "just now".to_string()
}

/// 语言占比，按字节数倒序
pub fn language_shares(languages: &HashMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = languages.values().sum();

    let mut shares: Vec<LanguageShare> = languages
        .iter()
        .map(|(language, &bytes)| {
            let percentage = if total == 0 {
                0.0
            } else {
                bytes as f64 / total as f64 * 100.0
            };
            LanguageShare {
                language: language.clone(),
                bytes,
                percentage: format!("{:.1}", percentage),
            }
        })
        .collect();

    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn dates_use_short_month() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 13, 0, 0).unwrap();
        assert_eq!(format_date(&date), "Jan 5, 2024");
    }

    #[test]
    fn relative_time_picks_largest_unit() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(relative_time(&(now - Duration::seconds(30)), now), "just now");
        assert_eq!(relative_time(&(now - Duration::minutes(1)), now), "1 minute ago");
        assert_eq!(relative_time(&(now - Duration::hours(5)), now), "5 hours ago");
        assert_eq!(relative_time(&(now - Duration::days(2)), now), "2 days ago");
        assert_eq!(relative_time(&(now - Duration::days(14)), now), "2 weeks ago");
        assert_eq!(relative_time(&(now - Duration::days(400)), now), "1 year ago");
    }

    #[test]
    fn future_dates_are_just_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(relative_time(&(now + Duration::days(1)), now), "just now");
    }

    #[test]
    fn language_shares_sum_to_hundred() {
        let languages = HashMap::from([
            ("Rust".to_string(), 750u64),
            ("Shell".to_string(), 250u64),
        ]);
        let shares = language_shares(&languages);
        assert_eq!(shares[0].language, "Rust");
        assert_eq!(shares[0].percentage, "75.0");
        assert_eq!(shares[1].percentage, "25.0");
    }
}
