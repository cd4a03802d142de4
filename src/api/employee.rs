use crate::{
    auth::auth::AuthUser,
    model::employee::{Employee, EmployeeStatus, EmployeeUpdate, NewEmployee},
    state::AppState,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    /// `active` or `inactive`
    #[param(inline)]
    pub status: Option<EmployeeStatus>,
    /// Case-insensitive match on name or tax id
    pub search: Option<String>,
}

impl EmployeeQuery {
    fn matches(&self, employee: &Employee) -> bool {
        if self.status.is_some_and(|s| s != employee.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                employee.full_name().to_lowercase().contains(&needle)
                    || employee.tax_id.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 10)]
    pub total: usize,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee created successfully", body = Employee),
        (status = 403, description = "Admin only"),
        (status = 502, description = "Presence service unavailable", body = Object, example = json!({
            "message": "The presence service is unavailable, try again later"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let created = state
        .directory
        .create_employee(payload.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create employee");
            e
        })?;
    info!(employee_id = %created.id, user = %auth.user_id, "Employee created");
    Ok(HttpResponse::Ok().json(created))
}

#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Filtered employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    state: web::Data<AppState>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let employees = state.directory.list_employees().await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        e
    })?;
    let data: Vec<Employee> = employees.into_iter().filter(|e| query.matches(e)).collect();
    debug!(status = ?query.status, search = ?query.search, total = data.len(), "Listing employees");

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        total: data.len(),
        data,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Nothing to update", body = Object, example = json!({
            "message": "Nothing to update"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 6650f1c2a1b2c3d4e5f60718 not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<EmployeeUpdate>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;
    let employee_id = path.into_inner();
    let update = body.into_inner();

    if update.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Nothing to update"
        })));
    }

    let updated = state
        .directory
        .update_employee(&employee_id, update)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = %employee_id, "Failed to update employee");
            e
        })?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;
    let employee_id = path.into_inner();

    state
        .directory
        .delete_employee(&employee_id)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = %employee_id, "Failed to delete employee");
            e
        })?;
    info!(employee_id = %employee_id, user = %auth.user_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 6650f1c2a1b2c3d4e5f60718 not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = state.directory.get_employee(&employee_id).await.map_err(|e| {
        tracing::error!(error = %e, employee_id = %employee_id, "Failed to fetch employee");
        e
    })?;
    Ok(HttpResponse::Ok().json(employee))
}
