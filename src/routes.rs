use crate::{
    api::{attendance, employee, presence, report, sheet, timesheet},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, get, middleware::from_fn, web};
use anyhow::anyhow;
use serde_json::json;
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with a full-minute burst.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = 60_000 / u64::from(requests_per_min.clamp(1, 60_000));
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min} requests per minute"))?;
    Ok(Governor::new(&cfg))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Arc<Limiter>) {
    // Public routes
    cfg.service(health);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::attendance_view)))
                    // /attendance/export
                    .service(
                        web::resource("/export")
                            .route(web::get().to(attendance::export_attendance)),
                    ),
            )
            .service(
                web::scope("/sheet")
                    .service(web::resource("").route(web::get().to(sheet::get_sheet)))
                    .service(web::resource("/selection").route(web::put().to(sheet::select_period)))
                    .service(
                        web::resource("/navigate").route(web::post().to(sheet::navigate_period)),
                    )
                    .service(
                        web::resource("/presence").route(web::post().to(sheet::record_presence)),
                    )
                    .service(web::resource("/export").route(web::get().to(sheet::export_sheet))),
            )
            .service(
                web::scope("/presence")
                    // /presence
                    .service(
                        web::resource("")
                            .route(web::get().to(presence::list_presences))
                            .route(web::post().to(presence::upsert_presence)),
                    )
                    // /presence/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(presence::delete_presence)),
                    ),
            )
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/timesheet")
                    // /timesheet
                    .service(web::resource("").route(web::get().to(timesheet::timesheet_day)))
                    // /timesheet/{id}/...
                    .service(
                        web::resource("/{id}/clock-in").route(web::post().to(timesheet::clock_in)),
                    )
                    .service(
                        web::resource("/{id}/clock-out")
                            .route(web::post().to(timesheet::clock_out)),
                    )
                    .service(
                        web::resource("/{id}/break/start")
                            .route(web::post().to(timesheet::start_break)),
                    )
                    .service(
                        web::resource("/{id}/break/end").route(web::post().to(timesheet::end_break)),
                    ),
            )
            .service(web::resource("/reports").route(web::get().to(report::period_report)))
            .service(web::resource("/dashboard").route(web::get().to(report::dashboard))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_accepts_any_quota() {
        assert!(build_limiter(1000).is_ok());
        assert!(build_limiter(0).is_ok());
        assert!(build_limiter(u32::MAX).is_ok());
    }
}
