use crate::api::attendance::AttendanceResponse;
use crate::api::employee::EmployeeListResponse;
use crate::api::sheet::{NavigateRequest, SelectionRequest, SheetPresenceResponse, SheetResponse};
use crate::attendance::export::ExportFormat;
use crate::attendance::report::{DashboardStats, EmployeeReport, PeriodReport, ReportSummary};
use crate::attendance::timesheet::{TimesheetDay, TimesheetRow};
use crate::attendance::{
    AttendanceView, DailyRecord, Direction, EmployeeAttendance, Period, PeriodKind, PeriodTotals,
    ViewType,
};
use crate::model::employee::{Employee, EmployeeStatus, EmployeeUpdate, NewEmployee};
use crate::model::presence::{PresenceRecord, PresenceStatus, PresenceUpsert};
use crate::model::time_entry::{TimeEntry, TimeEntryStatus};
use crate::state::Selection;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presence Sheet API",
        version = "1.0.0",
        description = r#"
## Presence Sheet

Weekly, payroll-month and custom-period attendance over the employee roster.

### 🔹 Key Features
- **Attendance views**
  - Working-day grid per employee with days present, regular, extra and total hours
  - Payroll months run from the 20th to the 21st of the next month; worked Sundays count double
- **Presence sheet sessions**
  - Keep a selection between requests, step through periods and record presences
- **Presence records**
  - One record per employee and day, a new submission replaces the old one
- **Exports and reports**
  - CSV and xlsx exports, period reports and a daily dashboard
- **Timesheet**
  - Clock in and out with one break per shift; hours past a full day count as extra

### 🔐 Security
Every endpoint under `/api` expects a **JWT Bearer** token issued by the identity service.
Only **ADMIN** and **ROOT** profiles can change the employee directory.
"#,
    ),
    paths(
        crate::api::attendance::attendance_view,
        crate::api::attendance::export_attendance,

        crate::api::sheet::get_sheet,
        crate::api::sheet::select_period,
        crate::api::sheet::navigate_period,
        crate::api::sheet::record_presence,
        crate::api::sheet::export_sheet,

        crate::api::presence::list_presences,
        crate::api::presence::upsert_presence,
        crate::api::presence::delete_presence,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::report::period_report,
        crate::api::report::dashboard,

        crate::api::timesheet::timesheet_day,
        crate::api::timesheet::clock_in,
        crate::api::timesheet::clock_out,
        crate::api::timesheet::start_break,
        crate::api::timesheet::end_break
    ),
    components(
        schemas(
            AttendanceResponse,
            AttendanceView,
            EmployeeAttendance,
            DailyRecord,
            PeriodTotals,
            Period,
            PeriodKind,
            ViewType,
            Direction,
            ExportFormat,
            Selection,
            SelectionRequest,
            NavigateRequest,
            SheetResponse,
            SheetPresenceResponse,
            PresenceRecord,
            PresenceStatus,
            PresenceUpsert,
            Employee,
            EmployeeStatus,
            NewEmployee,
            EmployeeUpdate,
            EmployeeListResponse,
            PeriodReport,
            EmployeeReport,
            ReportSummary,
            DashboardStats,
            TimeEntry,
            TimeEntryStatus,
            TimesheetRow,
            TimesheetDay
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Period attendance views and exports"),
        (name = "Sheet", description = "Per-user presence sheet sessions"),
        (name = "Presence", description = "Daily presence records"),
        (name = "Employee", description = "Employee directory"),
        (name = "Reports", description = "Period reports and dashboard"),
        (name = "Timesheet", description = "Clock-in, breaks and clock-out"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
