use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;
use utoipa::IntoParams;

use super::attendance::{PeriodQuery, today};
use crate::attendance::Period;
use crate::attendance::report::{DashboardStats, PeriodReport};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Day to report on, defaults to today
    pub date: Option<NaiveDate>,
}

/// Per-employee report over a period
#[utoipa::path(
    get,
    path = "/api/reports",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Period report", body = PeriodReport),
        (status = 400, description = "Invalid period"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Reports",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn period_report(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let period = query.resolve(today())?;
    let (roster, records) = state.fetch_period(&period).await.map_err(|e| {
        error!(error = %e, start = %period.start, end = %period.end, "Failed to load report data");
        e
    })?;
    Ok(HttpResponse::Ok().json(PeriodReport::build(&roster, &records, &period)))
}

/// Figures for one day and its week
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Reports",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn dashboard(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    let day = query.date.unwrap_or_else(today);
    let week = Period::week_of(day)?;
    let (roster, records) = state.fetch_period(&week).await.map_err(|e| {
        error!(error = %e, day = %day, "Failed to load dashboard data");
        e
    })?;
    Ok(HttpResponse::Ok().json(DashboardStats::compute(&roster, &records, day, &week)))
}
