//! Daily page naming
//!
//! Daily pages are titled like `October 18th, 2026` and have the uid
//! `10-18-2026`.

use chrono::{Datelike, NaiveDate};

/// Title of the daily page for `date`
pub(crate) fn page_title(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        date.format("%B"),
        ordinal(date.day()),
        date.year()
    )
}

/// Link to the daily page for `date`
pub(crate) fn page_link(date: NaiveDate) -> String {
    format!("[[{}]]", page_title(date))
}

/// Uid of the daily page for `date`
pub(crate) fn page_uid(date: NaiveDate) -> String {
    date.format("%m-%d-%Y").to_string()
}

fn ordinal(day: u32) -> String {
    let suffix = match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", day, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_page_title_ordinals() {
        assert_eq!(page_title(date(2026, 10, 1)), "October 1st, 2026");
        assert_eq!(page_title(date(2026, 10, 2)), "October 2nd, 2026");
        assert_eq!(page_title(date(2026, 10, 3)), "October 3rd, 2026");
        assert_eq!(page_title(date(2026, 10, 11)), "October 11th, 2026");
        assert_eq!(page_title(date(2026, 10, 12)), "October 12th, 2026");
        assert_eq!(page_title(date(2026, 10, 13)), "October 13th, 2026");
        assert_eq!(page_title(date(2026, 10, 21)), "October 21st, 2026");
        assert_eq!(page_title(date(2026, 10, 22)), "October 22nd, 2026");
        assert_eq!(page_title(date(2026, 10, 31)), "October 31st, 2026");
    }

    #[test]
    fn test_page_uid() {
        assert_eq!(page_uid(date(2026, 3, 7)), "03-07-2026");
    }

    #[test]
    fn test_page_link() {
        assert_eq!(page_link(date(2023, 11, 14)), "[[November 14th, 2023]]");
    }
}
