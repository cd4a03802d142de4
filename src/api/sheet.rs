//! The signed-in user's presence sheet: a selection that survives between
//! requests and a record set kept current by the user's own submissions.

use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::attendance::{AttendanceResponse, FormatQuery, export_response, today};
use crate::attendance::{Direction, ViewType};
use crate::auth::auth::AuthUser;
use crate::model::presence::{PresenceRecord, PresenceUpsert};
use crate::state::{AppState, FetchTicket, Selection, SharedSheet, SheetState, lock};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    pub view: ViewType,
    /// Reference date, defaults to today
    #[schema(example = "2025-06-18", format = "date", value_type = String)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NavigateRequest {
    pub direction: Direction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SheetResponse {
    pub selection: Selection,
    pub attendance: AttendanceResponse,
}

impl SheetResponse {
    fn of(sheet: &SheetState) -> Self {
        let selection = sheet.selection();
        Self {
            selection,
            attendance: AttendanceResponse::new(
                sheet.view(),
                Some((selection.view, selection.reference)),
            ),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SheetPresenceResponse {
    pub record: PresenceRecord,
    pub sheet: SheetResponse,
}

fn superseded() -> HttpResponse {
    HttpResponse::Conflict().json(json!({
        "message": "The selection changed while loading, the newer selection wins"
    }))
}

async fn open(state: &AppState, auth: &AuthUser) -> actix_web::Result<SharedSheet> {
    Ok(state.sessions.sheet(&auth.user_id, today()).await?)
}

/// Runs the fetch for `ticket`; `None` when a newer selection replaced it.
async fn fetch(
    state: &AppState,
    sheet: &SharedSheet,
    ticket: FetchTicket,
) -> actix_web::Result<Option<SheetResponse>> {
    let installed = state.load(sheet, ticket).await.map_err(|e| {
        error!(error = %e, "Failed to load presence sheet");
        e
    })?;
    if !installed {
        return Ok(None);
    }
    Ok(Some(SheetResponse::of(&lock(sheet))))
}

async fn respond(
    state: &AppState,
    sheet: &SharedSheet,
    ticket: FetchTicket,
) -> actix_web::Result<HttpResponse> {
    Ok(match fetch(state, sheet, ticket).await? {
        Some(body) => HttpResponse::Ok().json(body),
        None => superseded(),
    })
}

/// Ticket to load the sheet with, or `None` when its data is current.
fn pending(sheet: &SharedSheet) -> Option<FetchTicket> {
    let guard = lock(sheet);
    (!guard.is_loaded()).then(|| guard.ticket())
}

/// Current presence sheet
#[utoipa::path(
    get,
    path = "/api/sheet",
    responses(
        (status = 200, description = "The caller's presence sheet", body = SheetResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Superseded by a newer selection"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Sheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_sheet(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let sheet = open(&state, &auth).await?;
    match pending(&sheet) {
        Some(ticket) => respond(&state, &sheet, ticket).await,
        None => Ok(HttpResponse::Ok().json(SheetResponse::of(&lock(&sheet)))),
    }
}

/// Change view type and reference date
#[utoipa::path(
    put,
    path = "/api/sheet/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Sheet reloaded for the new selection", body = SheetResponse),
        (status = 400, description = "Invalid date"),
        (status = 409, description = "Superseded by a newer selection"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Sheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn select_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<SelectionRequest>,
) -> actix_web::Result<impl Responder> {
    let sheet = open(&state, &auth).await?;
    let selection = Selection {
        view: body.view,
        reference: body.date.unwrap_or_else(today),
    };
    let ticket = lock(&sheet).select(selection)?;
    respond(&state, &sheet, ticket).await
}

/// Step to the previous or next period
#[utoipa::path(
    post,
    path = "/api/sheet/navigate",
    request_body = NavigateRequest,
    responses(
        (status = 200, description = "Sheet reloaded for the new period", body = SheetResponse),
        (status = 409, description = "Superseded by a newer selection"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Sheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn navigate_period(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<NavigateRequest>,
) -> actix_web::Result<impl Responder> {
    let sheet = open(&state, &auth).await?;
    let ticket = lock(&sheet).navigate(body.direction)?;
    respond(&state, &sheet, ticket).await
}

/// Record a presence from the sheet
#[utoipa::path(
    post,
    path = "/api/sheet/presence",
    request_body = PresenceUpsert,
    responses(
        (status = 200, description = "Saved record and the recomputed sheet", body = SheetPresenceResponse),
        (status = 400, description = "Invalid submission"),
        (status = 404, description = "Employee not found"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Sheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn record_presence(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<PresenceUpsert>,
) -> actix_web::Result<impl Responder> {
    let upsert = body.into_inner();
    upsert.validate()?;
    let sheet = open(&state, &auth).await?;

    // On failure the sheet is left exactly as it was.
    let saved = state.presence.upsert_presence(upsert).await.map_err(|e| {
        warn!(error = %e, "Presence submission failed");
        e
    })?;
    info!(
        employee_id = %saved.employee_id,
        date = %saved.date,
        status = %saved.status,
        user = %auth.user_id,
        "Presence recorded"
    );

    let mut guard = lock(&sheet);
    guard.record(saved.clone());
    Ok(HttpResponse::Ok().json(SheetPresenceResponse {
        record: saved,
        sheet: SheetResponse::of(&guard),
    }))
}

/// Export the current presence sheet
#[utoipa::path(
    get,
    path = "/api/sheet/export",
    params(FormatQuery),
    responses(
        (status = 200, description = "CSV or xlsx file", content_type = "application/octet-stream"),
        (status = 409, description = "Superseded by a newer selection"),
        (status = 500, description = "Export failed")
    ),
    tag = "Sheet",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_sheet(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<FormatQuery>,
) -> actix_web::Result<HttpResponse> {
    let sheet = open(&state, &auth).await?;
    if let Some(ticket) = pending(&sheet) {
        if fetch(&state, &sheet, ticket).await?.is_none() {
            return Ok(superseded());
        }
    }
    let (view, reference) = {
        let guard = lock(&sheet);
        (guard.view(), guard.selection().reference)
    };
    export_response(&view, query.format.unwrap_or_default(), reference)
}
