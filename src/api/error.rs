//! HTTP mapping of the domain errors. Every error body is
//! `{"message": ...}`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::attendance::PeriodError;
use crate::attendance::export::ExportError;
use crate::attendance::timesheet::ClockError;
use crate::model::presence::InvalidPresence;
use crate::store::StoreError;

const UPSTREAM_MESSAGE: &str = "The presence service is unavailable, try again later";

fn message_body(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": message }))
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Api { status, .. } if (400..500).contains(status) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            StoreError::NotFound(what) => format!("{what} not found"),
            StoreError::Api { status, message } if (400..500).contains(status) => message.clone(),
            _ => UPSTREAM_MESSAGE.to_string(),
        };
        message_body(self.status_code(), message)
    }
}

impl ResponseError for ExportError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        message_body(self.status_code(), "Export failed".to_string())
    }
}

impl ResponseError for PeriodError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        message_body(self.status_code(), self.to_string())
    }
}

impl ResponseError for InvalidPresence {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        message_body(self.status_code(), self.to_string())
    }
}

impl ResponseError for ClockError {
    fn status_code(&self) -> StatusCode {
        match self {
            ClockError::Inactive(_) | ClockError::InvalidTime(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        message_body(self.status_code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_http_statuses() {
        assert_eq!(
            StoreError::NotFound("employee e1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::Api { status: 422, message: "bad".into() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::Api { status: 500, message: "boom".into() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            StoreError::Transport("timed out".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn period_errors_are_bad_requests() {
        assert_eq!(PeriodError::Incomplete.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn clock_errors_split_between_conflict_and_bad_request() {
        assert_eq!(
            ClockError::AlreadyClockedIn("e1".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ClockError::OnBreak("e1".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ClockError::InvalidTime("25:00".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
