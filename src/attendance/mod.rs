//! Attendance aggregation over a period.

pub mod aggregator;
pub mod calendar;
pub mod export;
pub mod hours;
pub mod report;
pub mod timesheet;

pub use aggregator::{AttendanceView, DailyRecord, EmployeeAttendance, PeriodTotals, aggregate};
pub use calendar::{Direction, Period, PeriodError, PeriodKind, ViewType, navigate};
