//! Human-readable story timestamps in the active locale.

use chrono::{DateTime, Datelike, Local, TimeZone, Utc, Weekday};

use crate::locale::Locale;

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const ID_MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn weekday_name(weekday: Weekday, locale: Locale) -> &'static str {
    match (locale, weekday) {
        (Locale::Id, Weekday::Mon) => "Senin",
        (Locale::Id, Weekday::Tue) => "Selasa",
        (Locale::Id, Weekday::Wed) => "Rabu",
        (Locale::Id, Weekday::Thu) => "Kamis",
        (Locale::Id, Weekday::Fri) => "Jumat",
        (Locale::Id, Weekday::Sat) => "Sabtu",
        (Locale::Id, Weekday::Sun) => "Minggu",
        (Locale::En, Weekday::Mon) => "Monday",
        (Locale::En, Weekday::Tue) => "Tuesday",
        (Locale::En, Weekday::Wed) => "Wednesday",
        (Locale::En, Weekday::Thu) => "Thursday",
        (Locale::En, Weekday::Fri) => "Friday",
        (Locale::En, Weekday::Sat) => "Saturday",
        (Locale::En, Weekday::Sun) => "Sunday",
    }
}

/// Long date in the local time zone, e.g. `Sabtu, 8 Januari 2022`.
pub fn format_readable(date: &DateTime<Utc>, locale: Locale) -> String {
    format_readable_in(&date.with_timezone(&Local), locale)
}

/// Long date in `date`'s own time zone.
pub fn format_readable_in<Tz: TimeZone>(date: &DateTime<Tz>, locale: Locale) -> String {
    let weekday = weekday_name(date.weekday(), locale);
    let day = date.day();
    let year = date.year();
    let month_index = date.month0() as usize;
    match locale {
        Locale::Id => format!("{weekday}, {day} {} {year}", ID_MONTHS[month_index]),
        Locale::En => format!("{weekday}, {} {day}, {year}", EN_MONTHS[month_index]),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// Elapsed time relative to now, e.g. `3 hours ago` or `kemarin`.
pub fn relative_time(date: &DateTime<Utc>, locale: Locale) -> String {
    relative_time_from(date, Utc::now(), locale)
}

/// Elapsed time between `date` and `now`. Future dates read as "now".
pub fn relative_time_from(date: &DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let elapsed = (now - *date).num_seconds().max(0);
    let (amount, unit) = match elapsed {
        s if s < MINUTE => (s, Unit::Second),
        s if s < HOUR => (s / MINUTE, Unit::Minute),
        s if s < DAY => (s / HOUR, Unit::Hour),
        s if s < MONTH => (s / DAY, Unit::Day),
        s if s < YEAR => (s / MONTH, Unit::Month),
        s => (s / YEAR, Unit::Year),
    };
    match locale {
        Locale::Id => relative_id(amount, unit),
        Locale::En => relative_en(amount, unit),
    }
}

fn relative_id(amount: i64, unit: Unit) -> String {
    match (amount, unit) {
        (0, Unit::Second) => "sekarang".to_string(),
        (1, Unit::Day) => "kemarin".to_string(),
        (1, Unit::Month) => "bulan lalu".to_string(),
        (1, Unit::Year) => "tahun lalu".to_string(),
        _ => {
            let word = match unit {
                Unit::Second => "detik",
                Unit::Minute => "menit",
                Unit::Hour => "jam",
                Unit::Day => "hari",
                Unit::Month => "bulan",
                Unit::Year => "tahun",
            };
            format!("{amount} {word} yang lalu")
        }
    }
}

fn relative_en(amount: i64, unit: Unit) -> String {
    match (amount, unit) {
        (0, Unit::Second) => "now".to_string(),
        (1, Unit::Day) => "yesterday".to_string(),
        (1, Unit::Month) => "last month".to_string(),
        (1, Unit::Year) => "last year".to_string(),
        _ => {
            let word = match unit {
                Unit::Second => "second",
                Unit::Minute => "minute",
                Unit::Hour => "hour",
                Unit::Day => "day",
                Unit::Month => "month",
                Unit::Year => "year",
            };
            let plural = if amount == 1 { "" } else { "s" };
            format!("{amount} {word}{plural} ago")
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn created() -> DateTime<Utc> {
        "2022-01-08T06:34:18.598Z".parse().unwrap()
    }

    #[test]
    fn test_readable_date_per_locale() {
        assert_eq!(format_readable_in(&created(), Locale::Id), "Sabtu, 8 Januari 2022");
        assert_eq!(
            format_readable_in(&created(), Locale::En),
            "Saturday, January 8, 2022"
        );
    }

    #[test]
    fn test_relative_thresholds_en() {
        let date = created();
        let cases = [
            (0, "now"),
            (59, "59 seconds ago"),
            (60, "1 minute ago"),
            (3_599, "59 minutes ago"),
            (3_600, "1 hour ago"),
            (DAY - 1, "23 hours ago"),
            (DAY, "yesterday"),
            (3 * DAY, "3 days ago"),
            (MONTH, "last month"),
            (200 * DAY, "6 months ago"),
            (YEAR, "last year"),
            (3 * YEAR, "3 years ago"),
        ];
        for (offset, expected) in cases {
            let now = date + Duration::seconds(offset);
            assert_eq!(relative_time_from(&date, now, Locale::En), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_relative_id() {
        let date = created();
        let at = |offset: i64| relative_time_from(&date, date + Duration::seconds(offset), Locale::Id);
        assert_eq!(at(0), "sekarang");
        assert_eq!(at(5 * MINUTE), "5 menit yang lalu");
        assert_eq!(at(DAY), "kemarin");
        assert_eq!(at(2 * YEAR), "2 tahun yang lalu");
    }

    #[test]
    fn test_future_date_reads_as_now() {
        let date = created();
        let now = date - Duration::hours(2);
        assert_eq!(relative_time_from(&date, now, Locale::En), "now");
    }
}
