//! Period boundaries and the working-day grid.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

/// Day of the month the payroll period opens on.
pub const PAYROLL_START_DAY: u32 = 20;
/// Day of the following month the payroll period closes on (inclusive).
pub const PAYROLL_END_DAY: u32 = 21;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewType {
    #[default]
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Weekly,
    Monthly,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period start {start} is after period end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
    #[error("a custom period needs both start and end")]
    Incomplete,
    #[error("date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// Inclusive date window under aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn for_view(view: ViewType, reference: NaiveDate) -> Result<Self, PeriodError> {
        match view {
            ViewType::Weekly => Self::week_of(reference),
            ViewType::Monthly => Self::payroll_month_of(reference),
        }
    }

    /// Monday..Sunday week containing `reference`.
    pub fn week_of(reference: NaiveDate) -> Result<Self, PeriodError> {
        let back = Days::new(u64::from(reference.weekday().num_days_from_monday()));
        let start = reference
            .checked_sub_days(back)
            .ok_or(PeriodError::OutOfRange(reference))?;
        let end = start
            .checked_add_days(Days::new(6))
            .ok_or(PeriodError::OutOfRange(reference))?;

        Ok(Self {
            kind: PeriodKind::Weekly,
            start,
            end,
        })
    }

    /// Payroll month: the 20th of the reference month through the 21st of
    /// the next one.
    pub fn payroll_month_of(reference: NaiveDate) -> Result<Self, PeriodError> {
        let start = NaiveDate::from_ymd_opt(reference.year(), reference.month(), PAYROLL_START_DAY)
            .ok_or(PeriodError::OutOfRange(reference))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.with_day(PAYROLL_END_DAY))
            .ok_or(PeriodError::OutOfRange(reference))?;

        Ok(Self {
            kind: PeriodKind::Monthly,
            start,
            end,
        })
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::Inverted { start, end });
        }
        Ok(Self {
            kind: PeriodKind::Custom,
            start,
            end,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day in the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// Weekdays in the window; Saturdays and Sundays are never on the grid.
    pub fn working_days(&self) -> Vec<NaiveDate> {
        self.days().filter(|d| is_working_day(*d)).collect()
    }

    pub fn sundays(&self) -> Vec<NaiveDate> {
        self.days().filter(|d| d.weekday() == Weekday::Sun).collect()
    }

    /// Worked Sundays earn the double credit only on payroll-month and
    /// custom periods.
    pub fn sunday_bonus_applies(&self) -> bool {
        self.kind != PeriodKind::Weekly
    }

    pub fn label(&self) -> String {
        match self.kind {
            PeriodKind::Weekly => format!(
                "{} - {}",
                self.start.format("%d/%m"),
                self.end.format("%d/%m/%Y")
            ),
            PeriodKind::Monthly | PeriodKind::Custom => format!(
                "{} - {}",
                self.start.format("%d/%m/%Y"),
                self.end.format("%d/%m/%Y")
            ),
        }
    }
}

pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Steps the reference date one week or one month. The caller re-derives the
/// period from the result; for the payroll month that re-anchors on the
/// 20th/21st of the new month rather than shifting the old range.
pub fn navigate(
    view: ViewType,
    reference: NaiveDate,
    direction: Direction,
) -> Result<NaiveDate, PeriodError> {
    let stepped = match (view, direction) {
        (ViewType::Weekly, Direction::Previous) => reference.checked_sub_days(Days::new(7)),
        (ViewType::Weekly, Direction::Next) => reference.checked_add_days(Days::new(7)),
        (ViewType::Monthly, Direction::Previous) => reference.checked_sub_months(Months::new(1)),
        (ViewType::Monthly, Direction::Next) => reference.checked_add_months(Months::new(1)),
    };
    stepped.ok_or(PeriodError::OutOfRange(reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekly_period_runs_monday_to_sunday() {
        let period = Period::for_view(ViewType::Weekly, d(2025, 6, 18)).unwrap();
        assert_eq!(period.start, d(2025, 6, 16));
        assert_eq!(period.end, d(2025, 6, 22));

        let days = period.working_days();
        assert_eq!(days.len(), 5);
        assert_eq!(days.first(), Some(&d(2025, 6, 16)));
        assert_eq!(days.last(), Some(&d(2025, 6, 20)));
        assert!(!period.sunday_bonus_applies());
    }

    #[test]
    fn weekly_period_from_a_sunday_stays_in_that_week() {
        let period = Period::week_of(d(2025, 6, 22)).unwrap();
        assert_eq!(period.start, d(2025, 6, 16));
        assert_eq!(period.end, d(2025, 6, 22));
    }

    #[test]
    fn monthly_period_is_twentieth_to_twenty_first() {
        let period = Period::for_view(ViewType::Monthly, d(2025, 6, 15)).unwrap();
        assert_eq!(period.start, d(2025, 6, 20));
        assert_eq!(period.end, d(2025, 7, 21));

        let days = period.working_days();
        assert!(days.iter().all(|day| is_working_day(*day)));
        assert!(days.iter().all(|day| period.contains(*day)));
        // 2025-06-20 (Fri) .. 2025-07-21 (Mon): 32 days, 10 of them weekend
        assert_eq!(days.len(), 22);
        assert_eq!(period.sundays().len(), 5);
        assert!(period.sunday_bonus_applies());
    }

    #[test]
    fn monthly_period_rolls_into_next_year() {
        let period = Period::payroll_month_of(d(2025, 12, 3)).unwrap();
        assert_eq!(period.start, d(2025, 12, 20));
        assert_eq!(period.end, d(2026, 1, 21));
    }

    #[test]
    fn monthly_navigation_reanchors_on_the_new_month() {
        let next = navigate(ViewType::Monthly, d(2025, 1, 31), Direction::Next).unwrap();
        assert_eq!(next, d(2025, 2, 28));
        let period = Period::for_view(ViewType::Monthly, next).unwrap();
        assert_eq!(period.start, d(2025, 2, 20));
        assert_eq!(period.end, d(2025, 3, 21));

        let prev = navigate(ViewType::Weekly, d(2025, 6, 18), Direction::Previous).unwrap();
        assert_eq!(prev, d(2025, 6, 11));
    }

    #[test]
    fn custom_period_rejects_inverted_range() {
        let err = Period::custom(d(2025, 6, 10), d(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, PeriodError::Inverted { .. }));

        let single = Period::custom(d(2025, 6, 15), d(2025, 6, 15)).unwrap();
        assert!(single.working_days().is_empty());
        assert_eq!(single.sundays(), vec![d(2025, 6, 15)]);
    }

    #[test]
    fn labels_follow_view_kind() {
        let week = Period::week_of(d(2025, 6, 18)).unwrap();
        assert_eq!(week.label(), "16/06 - 22/06/2025");
        let month = Period::payroll_month_of(d(2025, 6, 18)).unwrap();
        assert_eq!(month.label(), "20/06/2025 - 21/07/2025");
    }
}
