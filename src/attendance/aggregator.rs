//! Period aggregation: roster + presence records + period → AttendanceView.
//!
//! Everything here is a pure function of its inputs and cheap enough to be
//! recomputed on every request.

use std::collections::HashMap;
use std::iter::Sum;
use std::ops::Add;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::calendar::Period;
use super::hours::{day_fraction, regular_hours};
use crate::model::employee::Employee;
use crate::model::presence::{PresenceRecord, PresenceStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub status: PresenceStatus,
    pub present: bool,
    pub day_fraction: f64,
    pub regular_hours: f64,
    pub extra_hours: f64,
}

impl DailyRecord {
    fn build(date: NaiveDate, record: Option<&PresenceRecord>) -> Self {
        match record {
            Some(r) => Self {
                date,
                status: r.status,
                present: r.status.counts_as_present(),
                day_fraction: day_fraction(r.status),
                regular_hours: regular_hours(
                    r.status,
                    r.clock_in.as_deref(),
                    r.clock_out.as_deref(),
                ),
                extra_hours: r.overtime_hours,
            },
            None => Self::unmarked(date),
        }
    }

    fn unmarked(date: NaiveDate) -> Self {
        Self {
            date,
            status: PresenceStatus::Unmarked,
            present: false,
            day_fraction: 0.0,
            regular_hours: 0.0,
            extra_hours: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PeriodTotals {
    /// Sum of day fractions, so half days show up as .5.
    pub days_present: f64,
    pub regular_hours: f64,
    pub extra_hours: f64,
    pub total_hours: f64,
}

impl Add for PeriodTotals {
    type Output = PeriodTotals;

    fn add(self, rhs: Self) -> Self::Output {
        PeriodTotals {
            days_present: self.days_present + rhs.days_present,
            regular_hours: self.regular_hours + rhs.regular_hours,
            extra_hours: self.extra_hours + rhs.extra_hours,
            total_hours: self.total_hours + rhs.total_hours,
        }
    }
}

impl Sum for PeriodTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(PeriodTotals::default(), Add::add)
    }
}

impl PeriodTotals {
    fn from_days(days: &[DailyRecord]) -> Self {
        let mut totals = PeriodTotals::default();
        for day in days {
            totals.days_present += day.day_fraction;
            totals.regular_hours += day.regular_hours;
            totals.extra_hours += day.extra_hours;
        }
        totals.total_hours = totals.regular_hours + totals.extra_hours;
        totals
    }

    /// Worked Sunday: double presence weight and double overtime, never any
    /// regular hours.
    fn credit_sunday(&mut self, fraction: f64, overtime: f64) {
        self.days_present += 2.0 * fraction;
        self.extra_hours += 2.0 * overtime;
        self.total_hours += 2.0 * overtime;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeAttendance {
    pub employee: Employee,
    pub daily_records: Vec<DailyRecord>,
    pub totals: PeriodTotals,
    pub sundays_worked: u32,
    pub has_absence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceView {
    pub period: Period,
    pub working_days: Vec<NaiveDate>,
    pub employees: Vec<EmployeeAttendance>,
    pub grand_totals: PeriodTotals,
}

impl AttendanceView {
    /// Employees counted present on `date`.
    pub fn present_on(&self, date: NaiveDate) -> usize {
        self.employees
            .iter()
            .filter(|e| e.daily_records.iter().any(|r| r.date == date && r.present))
            .count()
    }
}

/// (employee, date) lookup over the records that fall inside the period.
/// Duplicate keys resolve to the record that comes last in the input.
struct PresenceIndex<'a> {
    by_employee: HashMap<&'a str, HashMap<NaiveDate, &'a PresenceRecord>>,
}

impl<'a> PresenceIndex<'a> {
    fn build(records: &'a [PresenceRecord], period: &Period) -> Self {
        let mut by_employee: HashMap<&'a str, HashMap<NaiveDate, &'a PresenceRecord>> =
            HashMap::new();
        for record in records.iter().filter(|r| period.contains(r.date)) {
            let days = by_employee.entry(record.employee_id.as_str()).or_default();
            if let Some(previous) = days.insert(record.date, record) {
                warn!(
                    employee_id = %record.employee_id,
                    date = %record.date,
                    superseded = %previous.id,
                    kept = %record.id,
                    "Duplicate presence records for one day, keeping the last"
                );
            }
        }
        Self { by_employee }
    }

    fn get(&self, employee_id: &str, date: NaiveDate) -> Option<&'a PresenceRecord> {
        self.by_employee
            .get(employee_id)
            .and_then(|days| days.get(&date))
            .copied()
    }
}

pub fn aggregate(roster: &[Employee], records: &[PresenceRecord], period: &Period) -> AttendanceView {
    let working_days = period.working_days();
    let sundays = if period.sunday_bonus_applies() {
        period.sundays()
    } else {
        Vec::new()
    };
    let index = PresenceIndex::build(records, period);

    let employees: Vec<EmployeeAttendance> = roster
        .iter()
        .filter(|e| e.is_active())
        .map(|employee| {
            let daily_records: Vec<DailyRecord> = working_days
                .iter()
                .map(|day| DailyRecord::build(*day, index.get(&employee.id, *day)))
                .collect();

            let mut totals = PeriodTotals::from_days(&daily_records);
            let mut sundays_worked = 0;
            for sunday in &sundays {
                let Some(record) = index.get(&employee.id, *sunday) else {
                    continue;
                };
                let fraction = day_fraction(record.status);
                if fraction > 0.0 {
                    totals.credit_sunday(fraction, record.overtime_hours);
                    sundays_worked += 1;
                }
            }

            let has_absence = daily_records
                .iter()
                .any(|r| r.status == PresenceStatus::Absent);

            EmployeeAttendance {
                employee: employee.clone(),
                daily_records,
                totals,
                sundays_worked,
                has_absence,
            }
        })
        .collect();

    let grand_totals = employees.iter().map(|e| e.totals).sum();

    AttendanceView {
        period: *period,
        working_days,
        employees,
        grand_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::calendar::ViewType;
    use crate::model::employee::EmployeeStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn employee(id: &str, status: EmployeeStatus) -> Employee {
        Employee {
            id: id.into(),
            first_name: format!("First-{id}"),
            last_name: format!("Last-{id}"),
            tax_id: format!("NIF-{id}"),
            department: None,
            team_lead: None,
            status,
        }
    }

    fn record(id: &str, employee_id: &str, date: NaiveDate, status: PresenceStatus, overtime: f64) -> PresenceRecord {
        PresenceRecord {
            id: id.into(),
            employee_id: employee_id.into(),
            date,
            status,
            overtime_hours: overtime,
            absence_reason: None,
            justified: None,
            note: None,
            clock_in: None,
            clock_out: None,
        }
    }

    fn monthly() -> Period {
        Period::for_view(ViewType::Monthly, d(2025, 6, 15)).unwrap()
    }

    fn weekly() -> Period {
        Period::for_view(ViewType::Weekly, d(2025, 6, 18)).unwrap()
    }

    #[test]
    fn employee_without_records_has_zero_totals() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let view = aggregate(&roster, &[], &monthly());

        assert_eq!(view.employees.len(), 1);
        assert_eq!(view.employees[0].totals, PeriodTotals::default());
        assert_eq!(view.employees[0].daily_records.len(), view.working_days.len());
        assert!(
            view.employees[0]
                .daily_records
                .iter()
                .all(|r| r.status == PresenceStatus::Unmarked)
        );
        assert_eq!(view.grand_totals, PeriodTotals::default());
    }

    #[test]
    fn inactive_employees_are_left_out() {
        let roster = vec![
            employee("a", EmployeeStatus::Active),
            employee("b", EmployeeStatus::Inactive),
        ];
        let records = vec![record("r1", "b", d(2025, 6, 16), PresenceStatus::Present, 0.0)];
        let view = aggregate(&roster, &records, &weekly());

        assert_eq!(view.employees.len(), 1);
        assert_eq!(view.employees[0].employee.id, "a");
    }

    #[test]
    fn weekly_totals_use_fractions_and_hours() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let mut clocked = record("r1", "a", d(2025, 6, 16), PresenceStatus::Present, 1.5);
        clocked.clock_in = Some("08:00".into());
        clocked.clock_out = Some("17:00".into());
        let records = vec![
            clocked,
            record("r2", "a", d(2025, 6, 17), PresenceStatus::HalfDay, 0.0),
            record("r3", "a", d(2025, 6, 18), PresenceStatus::Absent, 0.0),
            record("r4", "a", d(2025, 6, 19), PresenceStatus::Present, 0.0),
        ];
        let view = aggregate(&roster, &records, &weekly());
        let totals = view.employees[0].totals;

        assert_eq!(totals.days_present, 2.5);
        assert_eq!(totals.regular_hours, 9.0 + 4.0 + 8.0);
        assert_eq!(totals.extra_hours, 1.5);
        assert_eq!(totals.total_hours, 22.5);
        assert!(view.employees[0].has_absence);
        assert_eq!(view.present_on(d(2025, 6, 17)), 1);
        assert_eq!(view.present_on(d(2025, 6, 18)), 0);
    }

    #[test]
    fn worked_sunday_doubles_presence_and_overtime() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let baseline = vec![record("r1", "a", d(2025, 6, 23), PresenceStatus::Present, 1.0)];
        let mut with_sunday = baseline.clone();
        with_sunday.push(record("r2", "a", d(2025, 6, 22), PresenceStatus::Present, 2.0));

        let before = aggregate(&roster, &baseline, &monthly()).employees[0].totals;
        let after_view = aggregate(&roster, &with_sunday, &monthly());
        let after = after_view.employees[0].totals;

        assert_eq!(after.days_present - before.days_present, 2.0);
        assert_eq!(after.extra_hours - before.extra_hours, 4.0);
        assert_eq!(after.total_hours - before.total_hours, 4.0);
        assert_eq!(after.regular_hours, before.regular_hours);
        assert_eq!(after_view.employees[0].sundays_worked, 1);
        assert!(after_view.working_days.iter().all(|day| *day != d(2025, 6, 22)));
    }

    #[test]
    fn custom_range_over_a_sunday_gets_the_bonus() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let period = Period::custom(d(2025, 6, 20), d(2025, 6, 24)).unwrap();
        let records = vec![
            record("r1", "a", d(2025, 6, 20), PresenceStatus::Present, 0.0),
            record("r2", "a", d(2025, 6, 22), PresenceStatus::Present, 2.0),
        ];
        let view = aggregate(&roster, &records, &period);
        let totals = view.employees[0].totals;

        assert_eq!(view.working_days, vec![d(2025, 6, 20), d(2025, 6, 23), d(2025, 6, 24)]);
        assert_eq!(totals.days_present, 3.0);
        assert_eq!(totals.regular_hours, 8.0);
        assert_eq!(totals.extra_hours, 4.0);
        assert_eq!(totals.total_hours, 12.0);
        assert_eq!(view.employees[0].sundays_worked, 1);
    }

    #[test]
    fn half_day_sunday_earns_one_day() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let records = vec![record("r1", "a", d(2025, 6, 29), PresenceStatus::HalfDay, 0.0)];
        let totals = aggregate(&roster, &records, &monthly()).employees[0].totals;
        assert_eq!(totals.days_present, 1.0);
        assert_eq!(totals.regular_hours, 0.0);
    }

    #[test]
    fn sunday_is_ignored_in_weekly_view() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let records = vec![record("r1", "a", d(2025, 6, 22), PresenceStatus::Present, 2.0)];
        let view = aggregate(&roster, &records, &weekly());
        assert_eq!(view.employees[0].totals, PeriodTotals::default());
        assert_eq!(view.employees[0].sundays_worked, 0);
    }

    #[test]
    fn records_outside_the_window_are_never_consulted() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let records = vec![
            record("r1", "a", d(2025, 6, 13), PresenceStatus::Present, 3.0),
            record("r2", "a", d(2025, 6, 23), PresenceStatus::Present, 3.0),
        ];
        let view = aggregate(&roster, &records, &weekly());
        assert_eq!(view.grand_totals, PeriodTotals::default());
    }

    #[test]
    fn duplicate_records_resolve_to_the_last_one() {
        let roster = vec![employee("a", EmployeeStatus::Active)];
        let records = vec![
            record("old", "a", d(2025, 6, 16), PresenceStatus::Present, 5.0),
            record("new", "a", d(2025, 6, 16), PresenceStatus::HalfDay, 1.0),
        ];
        let totals = aggregate(&roster, &records, &weekly()).employees[0].totals;
        assert_eq!(totals.days_present, 0.5);
        assert_eq!(totals.extra_hours, 1.0);
        assert_eq!(totals.regular_hours, 4.0);
    }

    #[test]
    fn grand_totals_are_the_sum_of_employee_totals() {
        let roster = vec![
            employee("a", EmployeeStatus::Active),
            employee("b", EmployeeStatus::Active),
            employee("c", EmployeeStatus::Active),
        ];
        let records = vec![
            record("r1", "a", d(2025, 6, 23), PresenceStatus::Present, 1.25),
            record("r2", "b", d(2025, 6, 24), PresenceStatus::HalfDay, 0.5),
            record("r3", "b", d(2025, 6, 29), PresenceStatus::Present, 3.0),
            record("r4", "c", d(2025, 7, 1), PresenceStatus::Absent, 0.0),
        ];
        let view = aggregate(&roster, &records, &monthly());
        let summed: PeriodTotals = view.employees.iter().map(|e| e.totals).sum();
        assert_eq!(view.grand_totals, summed);
        assert_eq!(view.grand_totals.days_present, 1.0 + 0.5 + 2.0);
    }
}
