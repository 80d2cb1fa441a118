//! 报表日期范围
//!
//! 固定日期优先；否则起始日期由相对关键字推算，结束日期取明天，
//! 以吸收本地与统计服务之间的时区差。

use chrono::{Days, Months, NaiveDate};

use crate::config::{CounterSettings, StartDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn resolve(settings: &CounterSettings, today: NaiveDate) -> Self {
        let start = settings
            .fixed_start_date
            .unwrap_or_else(|| relative_start(settings.start_date, today));
        let end = settings
            .fixed_end_date
            .unwrap_or_else(|| today.checked_add_days(Days::new(1)).unwrap_or(today));
        Self { start, end }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// 展示用格式，如 `Oct 16, 2026`
    pub fn describe(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%b %-d, %Y"),
            self.end.format("%b %-d, %Y")
        )
    }
}

fn relative_start(start_date: StartDate, today: NaiveDate) -> NaiveDate {
    let shifted = match start_date {
        StartDate::OneDay => today.checked_sub_days(Days::new(1)),
        StartDate::OneWeek => today.checked_sub_days(Days::new(7)),
        StartDate::OneMonth => today.checked_sub_months(Months::new(1)),
        StartDate::ThreeMonths => today.checked_sub_months(Months::new(3)),
        StartDate::SixMonths => today.checked_sub_months(Months::new(6)),
        StartDate::OneYear => today.checked_sub_months(Months::new(12)),
        StartDate::Since2005 => NaiveDate::from_ymd_opt(2005, 1, 1),
    };
    shifted.unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_relative_range_ends_tomorrow() {
        let settings = CounterSettings::default();
        let range = DateRange::resolve(&settings, date("2026-10-17"));
        assert_eq!(range.start_str(), "2026-10-16");
        assert_eq!(range.end_str(), "2026-10-18");
    }

    #[test]
    fn test_month_offsets_clamp_to_month_end() {
        let settings = CounterSettings {
            start_date: StartDate::OneMonth,
            ..Default::default()
        };
        let range = DateRange::resolve(&settings, date("2026-03-31"));
        assert_eq!(range.start, date("2026-02-28"));
    }

    #[test]
    fn test_since_2005() {
        let settings = CounterSettings {
            start_date: StartDate::Since2005,
            ..Default::default()
        };
        let range = DateRange::resolve(&settings, date("2026-10-17"));
        assert_eq!(range.start, date("2005-01-01"));
    }

    #[test]
    fn test_fixed_dates_override() {
        let settings = CounterSettings {
            start_date: StartDate::OneYear,
            advanced_date_checkbox: true,
            fixed_start_date: Some(date("2026-01-01")),
            fixed_end_date: Some(date("2026-06-30")),
            ..Default::default()
        };
        let range = DateRange::resolve(&settings, date("2026-10-17"));
        assert_eq!(range.start, date("2026-01-01"));
        assert_eq!(range.end, date("2026-06-30"));
        assert_eq!(range.describe(), "Jan 1, 2026 - Jun 30, 2026");
    }
}
