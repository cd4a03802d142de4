use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::{error, info};

use super::attendance::{PeriodQuery, today};
use crate::auth::auth::AuthUser;
use crate::model::presence::{PresenceRecord, PresenceUpsert};
use crate::state::{AppState, lock};

/// Raw presence records
#[utoipa::path(
    get,
    path = "/api/presence",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Normalized presence records in the period", body = [PresenceRecord]),
        (status = 400, description = "Invalid period"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Presence",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_presences(
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let period = query.resolve(today())?;
    let records = state
        .presence
        .list_presences(period.start, period.end)
        .await
        .map_err(|e| {
            error!(error = %e, start = %period.start, end = %period.end, "Failed to list presences");
            e
        })?;
    Ok(HttpResponse::Ok().json(records))
}

/// Create or replace the presence of one employee on one day
#[utoipa::path(
    post,
    path = "/api/presence",
    request_body = PresenceUpsert,
    responses(
        (status = 200, description = "Record as saved", body = PresenceRecord),
        (status = 400, description = "Invalid submission", body = Object, example = json!({
            "message": "overtime_hours must be a non-negative number, got -1"
        })),
        (status = 404, description = "Employee not found"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Presence",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upsert_presence(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<PresenceUpsert>,
) -> actix_web::Result<impl Responder> {
    let upsert = body.into_inner();
    upsert.validate()?;

    let saved = state.presence.upsert_presence(upsert).await.map_err(|e| {
        error!(error = %e, "Failed to save presence");
        e
    })?;
    info!(
        employee_id = %saved.employee_id,
        date = %saved.date,
        status = %saved.status,
        user = %auth.user_id,
        "Presence saved"
    );

    if let Some(sheet) = state.sessions.existing(&auth.user_id).await {
        lock(&sheet).record(saved.clone());
    }
    Ok(HttpResponse::Ok().json(saved))
}

/// Delete a presence record
#[utoipa::path(
    delete,
    path = "/api/presence/{presence_id}",
    params(
        ("presence_id", Path, description = "Presence record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Presence record not found"),
        (status = 502, description = "Presence service unavailable")
    ),
    tag = "Presence",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_presence(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let presence_id = path.into_inner();

    state.presence.delete_presence(&presence_id).await.map_err(|e| {
        error!(error = %e, presence_id = %presence_id, "Failed to delete presence");
        e
    })?;

    if let Some(sheet) = state.sessions.existing(&auth.user_id).await {
        lock(&sheet).forget(&presence_id);
    }
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
