use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::IntoParams;

use super::attendance::today;
use crate::attendance::timesheet::{ClockError, Timesheet, TimesheetDay};
use crate::auth::auth::AuthUser;
use crate::model::time_entry::{TimeEntry, parse_clock};
use crate::state::{AppState, lock};

type Punch = fn(&mut Timesheet, &str, NaiveDate, NaiveTime) -> Result<TimeEntry, ClockError>;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimesheetQuery {
    /// Day to show, defaults to today
    pub date: Option<NaiveDate>,
    /// Case-insensitive match on name or department
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClockQuery {
    /// Day of the entry, defaults to today
    pub date: Option<NaiveDate>,
    /// `HH:MM`, defaults to the current minute
    pub time: Option<String>,
}

impl ClockQuery {
    fn resolve(&self) -> Result<(NaiveDate, NaiveTime), ClockError> {
        let time = match self.time.as_deref() {
            Some(raw) => parse_clock(raw).ok_or_else(|| ClockError::InvalidTime(raw.to_string()))?,
            None => {
                let now = Local::now().time();
                NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
            }
        };
        Ok((self.date.unwrap_or_else(today), time))
    }
}

/// Timesheet of one day
#[utoipa::path(
    get,
    path = "/api/timesheet",
    params(TimesheetQuery),
    responses(
        (status = 200, description = "Active employees with their clock entry and open actions", body = TimesheetDay),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Timesheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn timesheet_day(
    state: web::Data<AppState>,
    query: web::Query<TimesheetQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(today);
    let roster = state.directory.list_employees().await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        e
    })?;
    let day = lock(&state.timesheet).day(&roster, date, query.search.as_deref());
    Ok(HttpResponse::Ok().json(day))
}

async fn punch(
    state: &AppState,
    auth: &AuthUser,
    employee_id: &str,
    query: &ClockQuery,
    action: &'static str,
    apply: Punch,
) -> actix_web::Result<HttpResponse> {
    let (date, at) = query.resolve()?;
    let employee = state.directory.get_employee(employee_id).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        e
    })?;
    if !employee.is_active() {
        return Err(ClockError::Inactive(employee.id).into());
    }

    let entry = apply(&mut lock(&state.timesheet), employee_id, date, at)?;
    info!(employee_id, %date, %at, action, user = %auth.user_id, "Timesheet updated");
    Ok(HttpResponse::Ok().json(entry))
}

/// Clock in
#[utoipa::path(
    post,
    path = "/api/timesheet/{employee_id}/clock-in",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ClockQuery
    ),
    responses(
        (status = 200, description = "Opened entry", body = TimeEntry),
        (status = 400, description = "Invalid time or inactive employee"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Already clocked in")
    ),
    tag = "Timesheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn clock_in(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ClockQuery>,
) -> actix_web::Result<HttpResponse> {
    punch(&state, &auth, &path, &query, "clock-in", Timesheet::clock_in).await
}

/// Clock out
#[utoipa::path(
    post,
    path = "/api/timesheet/{employee_id}/clock-out",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ClockQuery
    ),
    responses(
        (status = 200, description = "Closed entry with worked and extra hours", body = TimeEntry),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Not clocked in or on a break")
    ),
    tag = "Timesheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn clock_out(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ClockQuery>,
) -> actix_web::Result<HttpResponse> {
    punch(&state, &auth, &path, &query, "clock-out", Timesheet::clock_out).await
}

/// Start a break
#[utoipa::path(
    post,
    path = "/api/timesheet/{employee_id}/break/start",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ClockQuery
    ),
    responses(
        (status = 200, description = "Entry on break", body = TimeEntry),
        (status = 409, description = "Not clocked in or already on a break")
    ),
    tag = "Timesheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn start_break(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ClockQuery>,
) -> actix_web::Result<HttpResponse> {
    punch(&state, &auth, &path, &query, "break-start", Timesheet::start_break).await
}

/// End a break
#[utoipa::path(
    post,
    path = "/api/timesheet/{employee_id}/break/end",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ClockQuery
    ),
    responses(
        (status = 200, description = "Entry back to checked in", body = TimeEntry),
        (status = 409, description = "Not on a break")
    ),
    tag = "Timesheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn end_break(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ClockQuery>,
) -> actix_web::Result<HttpResponse> {
    punch(&state, &auth, &path, &query, "break-end", Timesheet::end_break).await
}
