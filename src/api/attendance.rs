use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::attendance::export::{self, ExportFormat};
use crate::attendance::{
    AttendanceView, Direction, Period, PeriodError, ViewType, aggregate, navigate,
};
use crate::state::AppState;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Either a view type around a reference date, or an explicit `start`/`end`
/// range.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// `weekly` (default) or `monthly`
    #[param(inline)]
    pub view: Option<ViewType>,
    /// Reference date, defaults to today
    #[param(example = "2025-06-18")]
    pub date: Option<NaiveDate>,
    /// Custom period start, requires `end`
    pub start: Option<NaiveDate>,
    /// Custom period end, inclusive
    pub end: Option<NaiveDate>,
}

impl PeriodQuery {
    pub fn resolve(&self, today: NaiveDate) -> Result<Period, PeriodError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Period::custom(start, end),
            (None, None) => Period::for_view(self.view.unwrap_or_default(), self.reference(today)),
            _ => Err(PeriodError::Incomplete),
        }
    }

    /// Date the period was derived from; the start of a custom range.
    pub fn reference(&self, today: NaiveDate) -> NaiveDate {
        self.start.or(self.date).unwrap_or(today)
    }

    fn is_custom(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// `csv` (default) or `xlsx`
    #[param(inline)]
    pub format: Option<ExportFormat>,
}

/// An attendance view plus what a client needs to page through periods.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceResponse {
    #[schema(example = "16/06 - 22/06/2025")]
    pub label: String,
    pub working_day_count: usize,
    /// Reference date of the previous period; absent for custom ranges.
    pub previous: Option<NaiveDate>,
    /// Reference date of the next period; absent for custom ranges.
    pub next: Option<NaiveDate>,
    #[serde(flatten)]
    pub view: AttendanceView,
}

impl AttendanceResponse {
    pub fn new(view: AttendanceView, selection: Option<(ViewType, NaiveDate)>) -> Self {
        let step = |direction| selection.and_then(|(v, r)| navigate(v, r, direction).ok());
        Self {
            label: view.period.label(),
            working_day_count: view.working_days.len(),
            previous: step(Direction::Previous),
            next: step(Direction::Next),
            view,
        }
    }
}

/// Builds the file download for an export.
pub fn export_response(
    view: &AttendanceView,
    format: ExportFormat,
    reference: NaiveDate,
) -> actix_web::Result<HttpResponse> {
    let bytes = export::export(view, format).map_err(|e| {
        error!(error = %e, %format, "Failed to export presence sheet");
        e
    })?;
    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name(reference)),
        ))
        .body(bytes))
}

async fn load_view(state: &AppState, period: &Period) -> actix_web::Result<AttendanceView> {
    let (roster, records) = state.fetch_period(period).await.map_err(|e| {
        error!(error = %e, start = %period.start, end = %period.end, "Failed to load period");
        e
    })?;
    debug!(
        start = %period.start,
        end = %period.end,
        employees = roster.len(),
        records = records.len(),
        "Aggregating period"
    );
    Ok(aggregate(&roster, &records, period))
}

/// Attendance view for a period
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Aggregated attendance for the period", body = AttendanceResponse),
        (status = 400, description = "Invalid period", body = Object, example = json!({
            "message": "period start 2025-06-10 is after period end 2025-06-01"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn attendance_view(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let today = today();
    let period = query.resolve(today)?;
    let view = load_view(&state, &period).await?;

    let selection = (!query.is_custom())
        .then(|| (query.view.unwrap_or_default(), query.reference(today)));
    Ok(HttpResponse::Ok().json(AttendanceResponse::new(view, selection)))
}

/// Export an attendance view
#[utoipa::path(
    get,
    path = "/api/attendance/export",
    params(PeriodQuery, FormatQuery),
    responses(
        (status = 200, description = "CSV or xlsx file", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Export failed"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Attendance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_attendance(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
    format: web::Query<FormatQuery>,
) -> actix_web::Result<HttpResponse> {
    let today = today();
    let period = query.resolve(today)?;
    let view = load_view(&state, &period).await?;
    export_response(&view, format.format.unwrap_or_default(), query.reference(today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::PeriodKind;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn query_defaults_to_the_current_week() {
        let period = PeriodQuery::default().resolve(d(18)).unwrap();
        assert_eq!(period.kind, PeriodKind::Weekly);
        assert_eq!(period.start, d(16));
    }

    #[test]
    fn query_with_range_is_custom() {
        let query = PeriodQuery {
            start: Some(d(2)),
            end: Some(d(13)),
            ..PeriodQuery::default()
        };
        let period = query.resolve(d(18)).unwrap();
        assert_eq!(period.kind, PeriodKind::Custom);
        assert_eq!(query.reference(d(18)), d(2));

        let half = PeriodQuery {
            start: Some(d(2)),
            ..PeriodQuery::default()
        };
        assert_eq!(half.resolve(d(18)), Err(PeriodError::Incomplete));
    }

    #[test]
    fn response_links_neighbouring_periods() {
        let period = Period::week_of(d(18)).unwrap();
        let view = aggregate(&[], &[], &period);
        let response = AttendanceResponse::new(view, Some((ViewType::Weekly, d(18))));
        assert_eq!(response.label, "16/06 - 22/06/2025");
        assert_eq!(response.working_day_count, 5);
        assert_eq!(response.previous, Some(d(11)));
        assert_eq!(response.next, Some(d(25)));

        let custom = aggregate(&[], &[], &Period::custom(d(1), d(3)).unwrap());
        assert_eq!(AttendanceResponse::new(custom, None).next, None);
    }
}
