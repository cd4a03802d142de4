//! Clock-in / clock-out timesheet kept alongside the presence sheet.
//!
//! An entry moves `checked-in` → (`on-break` → `checked-in`)* →
//! `checked-out`. On clock-out the worked time is the span between the
//! clock times minus the break, and anything past a full day is extra.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use super::hours::FULL_DAY_HOURS;
use crate::model::employee::Employee;
use crate::model::time_entry::{TimeEntry, TimeEntryStatus};

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("employee {0} is already clocked in")]
    AlreadyClockedIn(String),
    #[error("employee {0} is not clocked in")]
    NotClockedIn(String),
    #[error("employee {0} is on a break")]
    OnBreak(String),
    #[error("employee {0} is not on a break")]
    NotOnBreak(String),
    #[error("employee {0} is inactive")]
    Inactive(String),
    #[error("clock time must be HH:MM, got {0:?}")]
    InvalidTime(String),
}

/// Net worked hours, rounded to two decimals and never negative.
pub fn worked_hours(
    clock_in: NaiveTime,
    clock_out: NaiveTime,
    break_start: Option<NaiveTime>,
    break_end: Option<NaiveTime>,
) -> f64 {
    let mut minutes = clock_out.signed_duration_since(clock_in).num_minutes();
    if let (Some(start), Some(end)) = (break_start, break_end) {
        minutes -= end.signed_duration_since(start).num_minutes().max(0);
    }
    let hours = minutes.max(0) as f64 / 60.0;
    (hours * 100.0).round() / 100.0
}

pub fn extra_hours(total_hours: f64) -> f64 {
    (total_hours - FULL_DAY_HOURS).max(0.0)
}

#[derive(Debug, Default)]
pub struct Timesheet {
    entries: Vec<TimeEntry>,
}

impl Timesheet {
    /// The employee's most recent entry on `date`.
    pub fn entry_for(&self, employee_id: &str, date: NaiveDate) -> Option<&TimeEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.employee_id == employee_id && e.date == date)
    }

    fn current_mut(&mut self, employee_id: &str, date: NaiveDate) -> Option<&mut TimeEntry> {
        self.entries
            .iter_mut()
            .rev()
            .find(|e| e.employee_id == employee_id && e.date == date)
    }

    /// Opens a new entry unless one is still open for the day.
    pub fn clock_in(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        at: NaiveTime,
    ) -> Result<TimeEntry, ClockError> {
        if self
            .entry_for(employee_id, date)
            .is_some_and(|open| open.status != TimeEntryStatus::CheckedOut)
        {
            return Err(ClockError::AlreadyClockedIn(employee_id.to_string()));
        }
        let entry = TimeEntry {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            date,
            clock_in: Some(at),
            clock_out: None,
            break_start: None,
            break_end: None,
            total_hours: 0.0,
            extra_hours: 0.0,
            status: TimeEntryStatus::CheckedIn,
        };
        debug!(employee_id, %date, %at, "Clocked in");
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn clock_out(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        at: NaiveTime,
    ) -> Result<TimeEntry, ClockError> {
        let entry = self.working(employee_id, date)?;
        let total = entry
            .clock_in
            .map(|clock_in| worked_hours(clock_in, at, entry.break_start, entry.break_end))
            .unwrap_or_default();
        entry.clock_out = Some(at);
        entry.total_hours = total;
        entry.extra_hours = extra_hours(total);
        entry.status = TimeEntryStatus::CheckedOut;
        debug!(employee_id, %date, %at, total_hours = total, "Clocked out");
        Ok(entry.clone())
    }

    /// A new break replaces the previous one.
    pub fn start_break(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        at: NaiveTime,
    ) -> Result<TimeEntry, ClockError> {
        let entry = self.working(employee_id, date)?;
        entry.break_start = Some(at);
        entry.break_end = None;
        entry.status = TimeEntryStatus::OnBreak;
        Ok(entry.clone())
    }

    pub fn end_break(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        at: NaiveTime,
    ) -> Result<TimeEntry, ClockError> {
        let entry = self
            .current_mut(employee_id, date)
            .filter(|e| e.status == TimeEntryStatus::OnBreak)
            .ok_or_else(|| ClockError::NotOnBreak(employee_id.to_string()))?;
        entry.break_end = Some(at);
        entry.status = TimeEntryStatus::CheckedIn;
        Ok(entry.clone())
    }

    /// The day's open entry, which must be checked in and not on a break.
    fn working(&mut self, employee_id: &str, date: NaiveDate) -> Result<&mut TimeEntry, ClockError> {
        match self.current_mut(employee_id, date) {
            Some(entry) if entry.status == TimeEntryStatus::CheckedIn => Ok(entry),
            Some(entry) if entry.status == TimeEntryStatus::OnBreak => {
                Err(ClockError::OnBreak(employee_id.to_string()))
            }
            _ => Err(ClockError::NotClockedIn(employee_id.to_string())),
        }
    }

    /// Active employees matching `search` (name or department) with their
    /// entry for `date` and the actions open to them.
    pub fn day(&self, roster: &[Employee], date: NaiveDate, search: Option<&str>) -> TimesheetDay {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let rows: Vec<TimesheetRow> = roster
            .iter()
            .filter(|e| e.is_active())
            .filter(|e| match &needle {
                Some(needle) => {
                    e.full_name().to_lowercase().contains(needle)
                        || e.department
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
                None => true,
            })
            .map(|e| TimesheetRow::new(e.clone(), self.entry_for(&e.id, date).cloned()))
            .collect();

        let count = |status: TimeEntryStatus| {
            rows.iter()
                .filter(|r| r.entry.as_ref().is_some_and(|e| e.status == status))
                .count()
        };

        TimesheetDay {
            date,
            working: count(TimeEntryStatus::CheckedIn),
            on_break: count(TimeEntryStatus::OnBreak),
            finished: count(TimeEntryStatus::CheckedOut),
            extra_hours: rows
                .iter()
                .filter_map(|r| r.entry.as_ref())
                .map(|e| e.extra_hours)
                .sum(),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimesheetRow {
    pub employee: Employee,
    pub entry: Option<TimeEntry>,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    pub can_start_break: bool,
    pub can_end_break: bool,
}

impl TimesheetRow {
    fn new(employee: Employee, entry: Option<TimeEntry>) -> Self {
        let status = entry.as_ref().map(|e| e.status);
        Self {
            employee,
            can_clock_in: matches!(status, None | Some(TimeEntryStatus::CheckedOut)),
            can_clock_out: status == Some(TimeEntryStatus::CheckedIn),
            can_start_break: status == Some(TimeEntryStatus::CheckedIn),
            can_end_break: status == Some(TimeEntryStatus::OnBreak),
            entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimesheetDay {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub working: usize,
    pub on_break: usize,
    pub finished: usize,
    pub extra_hours: f64,
    pub rows: Vec<TimesheetRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::model::time_entry::parse_clock;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
    }

    fn t(raw: &str) -> NaiveTime {
        parse_clock(raw).unwrap()
    }

    fn employee(id: &str, first: &str, department: &str, status: EmployeeStatus) -> Employee {
        Employee {
            id: id.into(),
            first_name: first.into(),
            last_name: "Reis".into(),
            tax_id: id.into(),
            department: Some(department.into()),
            team_lead: None,
            status,
        }
    }

    #[test]
    fn worked_time_excludes_the_break() {
        assert_eq!(worked_hours(t("08:00"), t("17:30"), Some(t("12:00")), Some(t("13:00"))), 8.5);
        assert_eq!(worked_hours(t("09:00"), t("09:20"), None, None), 0.33);
        assert_eq!(worked_hours(t("17:00"), t("08:00"), None, None), 0.0);
        // an unfinished break is not deducted
        assert_eq!(worked_hours(t("08:00"), t("12:00"), Some(t("10:00")), None), 4.0);
        assert_eq!(extra_hours(8.5), 0.5);
        assert_eq!(extra_hours(7.0), 0.0);
    }

    #[test]
    fn full_shift_with_a_break() {
        let mut sheet = Timesheet::default();
        sheet.clock_in("a", day(), t("08:00")).unwrap();
        let on_break = sheet.start_break("a", day(), t("12:00")).unwrap();
        assert_eq!(on_break.status, TimeEntryStatus::OnBreak);

        assert_eq!(
            sheet.clock_out("a", day(), t("12:30")),
            Err(ClockError::OnBreak("a".into()))
        );
        sheet.end_break("a", day(), t("13:00")).unwrap();
        let done = sheet.clock_out("a", day(), t("17:30")).unwrap();

        assert_eq!(done.status, TimeEntryStatus::CheckedOut);
        assert_eq!(done.total_hours, 8.5);
        assert_eq!(done.extra_hours, 0.5);
        assert_eq!(done.clock_out, Some(t("17:30")));
    }

    #[test]
    fn transitions_out_of_order_are_rejected() {
        let mut sheet = Timesheet::default();
        assert_eq!(
            sheet.clock_out("a", day(), t("17:00")),
            Err(ClockError::NotClockedIn("a".into()))
        );
        assert_eq!(
            sheet.end_break("a", day(), t("13:00")),
            Err(ClockError::NotOnBreak("a".into()))
        );

        sheet.clock_in("a", day(), t("08:00")).unwrap();
        assert_eq!(
            sheet.clock_in("a", day(), t("08:05")),
            Err(ClockError::AlreadyClockedIn("a".into()))
        );

        // another day is independent
        let tomorrow = day().succ_opt().unwrap();
        assert!(sheet.clock_in("a", tomorrow, t("08:00")).is_ok());
    }

    #[test]
    fn second_shift_opens_after_clock_out() {
        let mut sheet = Timesheet::default();
        sheet.clock_in("a", day(), t("06:00")).unwrap();
        sheet.clock_out("a", day(), t("10:00")).unwrap();
        let second = sheet.clock_in("a", day(), t("18:00")).unwrap();

        assert_eq!(sheet.entry_for("a", day()).map(|e| e.id.clone()), Some(second.id));
    }

    #[test]
    fn day_lists_active_employees_with_counts_and_actions() {
        let roster = vec![
            employee("a", "Ana", "Ops", EmployeeStatus::Active),
            employee("b", "Bruno", "Sales", EmployeeStatus::Active),
            employee("c", "Carla", "Ops", EmployeeStatus::Active),
            employee("z", "Zeca", "Ops", EmployeeStatus::Inactive),
        ];
        let mut sheet = Timesheet::default();
        sheet.clock_in("a", day(), t("07:00")).unwrap();
        sheet.clock_out("a", day(), t("17:00")).unwrap();
        sheet.clock_in("b", day(), t("09:00")).unwrap();
        sheet.start_break("b", day(), t("12:00")).unwrap();

        let view = sheet.day(&roster, day(), None);
        assert_eq!(view.rows.len(), 3);
        assert_eq!((view.working, view.on_break, view.finished), (0, 1, 1));
        assert_eq!(view.extra_hours, 2.0);

        let ana = &view.rows[0];
        assert!(ana.can_clock_in && !ana.can_clock_out);
        let bruno = &view.rows[1];
        assert!(bruno.can_end_break && !bruno.can_clock_in && !bruno.can_start_break);
        let carla = &view.rows[2];
        assert!(carla.entry.is_none() && carla.can_clock_in);

        let ops = sheet.day(&roster, day(), Some(" OPS "));
        assert_eq!(ops.rows.len(), 2);
        let by_name = sheet.day(&roster, day(), Some("bru"));
        assert_eq!(by_name.rows[0].employee.id, "b");
    }
}
