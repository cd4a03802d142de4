//! Period report and dashboard figures derived from raw presence records.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use super::calendar::Period;
use super::hours::{day_fraction, regular_hours};
use crate::model::employee::Employee;
use crate::model::presence::{PresenceRecord, PresenceStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeReport {
    pub employee_id: String,
    pub name: String,
    pub tax_id: String,
    pub active: bool,
    pub days_recorded: u32,
    pub days_present: f64,
    pub regular_hours: f64,
    pub extra_hours: f64,
    pub total_hours: f64,
    /// Share of recorded days marked fully present, 0..=100.
    pub punctuality: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub employees: usize,
    pub active_employees: usize,
    pub regular_hours: f64,
    pub extra_hours: f64,
    pub total_hours: f64,
    pub average_punctuality: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodReport {
    pub period: Period,
    pub summary: ReportSummary,
    pub employees: Vec<EmployeeReport>,
}

/// Last record per (employee, date) inside the period, in input order.
fn latest_in_period<'a>(records: &'a [PresenceRecord], period: &Period) -> Vec<&'a PresenceRecord> {
    let mut latest: HashMap<(&str, NaiveDate), usize> = HashMap::new();
    let mut kept: Vec<&PresenceRecord> = Vec::new();
    for record in records.iter().filter(|r| period.contains(r.date)) {
        match latest.get(&(record.employee_id.as_str(), record.date)) {
            Some(&slot) => kept[slot] = record,
            None => {
                latest.insert((record.employee_id.as_str(), record.date), kept.len());
                kept.push(record);
            }
        }
    }
    kept
}

impl PeriodReport {
    pub fn build(roster: &[Employee], records: &[PresenceRecord], period: &Period) -> Self {
        let by_id: HashMap<&str, &Employee> = roster.iter().map(|e| (e.id.as_str(), e)).collect();

        let mut grouped: BTreeMap<&str, Vec<&PresenceRecord>> = BTreeMap::new();
        for record in latest_in_period(records, period) {
            if by_id.contains_key(record.employee_id.as_str()) {
                grouped.entry(record.employee_id.as_str()).or_default().push(record);
            }
        }

        let mut employees: Vec<EmployeeReport> = grouped
            .into_iter()
            .filter_map(|(employee_id, rows)| {
                let employee = *by_id.get(employee_id)?;
                let days_recorded = rows.len() as u32;
                let fully_present = rows
                    .iter()
                    .filter(|r| r.status == PresenceStatus::Present)
                    .count() as u32;
                let days_present = rows.iter().map(|r| day_fraction(r.status)).sum();
                let regular: f64 = rows
                    .iter()
                    .map(|r| regular_hours(r.status, r.clock_in.as_deref(), r.clock_out.as_deref()))
                    .sum();
                let extra: f64 = rows.iter().map(|r| r.overtime_hours).sum();

                Some(EmployeeReport {
                    employee_id: employee_id.to_string(),
                    name: employee.full_name(),
                    tax_id: employee.tax_id.clone(),
                    active: employee.is_active(),
                    days_recorded,
                    days_present,
                    regular_hours: regular,
                    extra_hours: extra,
                    total_hours: regular + extra,
                    punctuality: percentage(fully_present, days_recorded),
                })
            })
            .collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.employee_id.cmp(&b.employee_id)));

        let summary = ReportSummary {
            employees: employees.len(),
            active_employees: employees.iter().filter(|e| e.active).count(),
            regular_hours: employees.iter().map(|e| e.regular_hours).sum(),
            extra_hours: employees.iter().map(|e| e.extra_hours).sum(),
            total_hours: employees.iter().map(|e| e.total_hours).sum(),
            average_punctuality: if employees.is_empty() {
                0
            } else {
                let sum: u32 = employees.iter().map(|e| e.punctuality).sum();
                (f64::from(sum) / employees.len() as f64).round() as u32
            },
        };

        Self {
            period: *period,
            summary,
            employees,
        }
    }
}

fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * f64::from(part) / f64::from(whole)).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub today: Option<NaiveDate>,
    pub total_employees: usize,
    pub active_employees: usize,
    pub marked_today: usize,
    pub present_today: usize,
    pub absent_today: usize,
    pub justified_absences_today: usize,
    pub extra_hours_today: f64,
    pub sundays_worked: usize,
}

impl DashboardStats {
    /// Figures for `today` plus the Sundays worked across `period`.
    pub fn compute(
        roster: &[Employee],
        records: &[PresenceRecord],
        today: NaiveDate,
        period: &Period,
    ) -> Self {
        let rows = latest_in_period(records, period);
        let todays: Vec<&&PresenceRecord> = rows.iter().filter(|r| r.date == today).collect();

        Self {
            today: Some(today),
            total_employees: roster.len(),
            active_employees: roster.iter().filter(|e| e.is_active()).count(),
            marked_today: todays
                .iter()
                .filter(|r| r.status != PresenceStatus::Unmarked)
                .count(),
            present_today: todays.iter().filter(|r| r.status.counts_as_present()).count(),
            absent_today: todays
                .iter()
                .filter(|r| r.status == PresenceStatus::Absent)
                .count(),
            justified_absences_today: todays
                .iter()
                .filter(|r| r.status == PresenceStatus::Absent && r.justified == Some(true))
                .count(),
            extra_hours_today: todays.iter().map(|r| r.overtime_hours).sum(),
            sundays_worked: rows
                .iter()
                .filter(|r| r.date.weekday() == Weekday::Sun && day_fraction(r.status) > 0.0)
                .count(),
        }
    }
}
