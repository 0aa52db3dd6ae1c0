// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::models::{Devotion, FutureLetter, ScheduleTask};

pub const LETTER_NOTICE_DAYS: i64 = 5;

pub fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap(year) { 366 } else { 365 }
}

pub fn day_of_year(d: NaiveDate) -> u32 {
    d.ordinal()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayClock {
    pub day_of_year: u32,
    pub days_in_year: u32,
    pub hours_left: u32,
    pub minutes_left: u32,
    pub seconds_left: u32,
    /// Share of the day already gone, in percent.
    pub elapsed_pct: f64,
}

pub fn day_clock(now: NaiveDateTime) -> DayClock {
    let passed = now.time().num_seconds_from_midnight();
    let left = 86_400 - passed;
    DayClock {
        day_of_year: day_of_year(now.date()),
        days_in_year: days_in_year(now.year()),
        hours_left: left / 3600,
        minutes_left: (left / 60) % 60,
        seconds_left: left % 60,
        elapsed_pct: f64::from(passed) / 864.0,
    }
}

/// Sunday-first week index inside the month, starting at 1.
pub fn week_of_month(d: NaiveDate) -> u32 {
    let first_weekday = d
        .with_day(1)
        .map(|f| f.weekday().num_days_from_sunday())
        .unwrap_or(0);
    (d.day() + first_weekday).div_ceil(7)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// Six Sunday-first weeks covering the month, padded with neighbouring days.
pub fn month_grid(year: i32, month: u32) -> Vec<GridCell> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    (0..42)
        .map(|i| {
            let date = start + Duration::days(i);
            GridCell {
                date,
                in_month: date.month() == month && date.year() == year,
            }
        })
        .collect()
}

/// Fourteen days from two days back, as shown above the schedule.
pub fn schedule_strip(today: NaiveDate) -> Vec<NaiveDate> {
    (-2..12).map(|i| today + Duration::days(i)).collect()
}

pub fn daily_devotion(devotions: &[Devotion], today: NaiveDate) -> Option<&Devotion> {
    if devotions.is_empty() {
        return None;
    }
    devotions.get(day_of_year(today) as usize % devotions.len())
}

/// First letter whose unlock date is exactly five days away.
pub fn upcoming_letter(letters: &[FutureLetter], today: NaiveDate) -> Option<&FutureLetter> {
    letters
        .iter()
        .find(|l| (l.unlock_date - today).num_days() == LETTER_NOTICE_DAYS)
}

/// Tasks of one day ordered by start time, then by priority.
pub fn tasks_on(tasks: &[ScheduleTask], date: NaiveDate, today: NaiveDate) -> Vec<&ScheduleTask> {
    let mut out: Vec<&ScheduleTask> = tasks.iter().filter(|t| t.day(today) == date).collect();
    out.sort_by(|a, b| {
        a.time_start
            .cmp(&b.time_start)
            .then(a.priority.cmp(&b.priority))
    });
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaHighlight<'a> {
    pub active: Option<&'a ScheduleTask>,
    pub upcoming: Option<&'a ScheduleTask>,
    pub time_until_next: Option<String>,
}

pub fn agenda_highlight(tasks: &[ScheduleTask], now: NaiveDateTime) -> AgendaHighlight<'_> {
    let today = now.date();
    let clock = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now.time());
    let open: Vec<&ScheduleTask> = tasks
        .iter()
        .filter(|t| !t.completed && t.day(today) == today)
        .collect();

    let active = open.iter().copied().find(|t| {
        t.time_start <= clock
            && match t.time_end {
                Some(end) => end > clock,
                None => t.time_start == clock,
            }
    });
    let upcoming = open
        .iter()
        .copied()
        .filter(|t| t.time_start > clock)
        .min_by_key(|t| t.time_start);

    let time_until_next = upcoming.map(|t| {
        let mins = (t.time_start - clock).num_minutes();
        let (h, m) = (mins / 60, mins % 60);
        if h > 0 {
            format!("{h}h {m}m")
        } else {
            format!("{m}m")
        }
    });

    AgendaHighlight {
        active,
        upcoming,
        time_until_next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_of_month_is_sunday_aligned() {
        // 2024-10-01 is a Tuesday
        assert_eq!(week_of_month(d(2024, 10, 1)), 1);
        assert_eq!(week_of_month(d(2024, 10, 5)), 1);
        assert_eq!(week_of_month(d(2024, 10, 6)), 2);
        assert_eq!(week_of_month(d(2024, 10, 24)), 4);
        assert_eq!(week_of_month(d(2024, 10, 31)), 5);
    }

    #[test]
    fn grid_has_six_weeks_starting_sunday() {
        let g = month_grid(2024, 10);
        assert_eq!(g.len(), 42);
        assert_eq!(g[0].date, d(2024, 9, 29));
        assert!(!g[0].in_month);
        assert!(g[2].in_month);
    }

    #[test]
    fn leap_years() {
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }

    #[test]
    fn strip_spans_two_back_eleven_forward() {
        let s = schedule_strip(d(2025, 1, 10));
        assert_eq!(s.len(), 14);
        assert_eq!(s[0], d(2025, 1, 8));
        assert_eq!(s[13], d(2025, 1, 21));
    }
}
