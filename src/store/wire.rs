//! JSON shapes spoken by the remote REST API and their mapping onto the
//! canonical model.
//!
//! The API is loose about shapes: list bodies come bare or wrapped, the
//! employee reference inside a presence is either an id or the embedded
//! employee, dates may carry a time part and numbers may arrive as strings.
//! All of that is resolved here so nothing past the store sees it.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use super::StoreError;
use crate::model::employee::{Employee, EmployeeStatus, EmployeeUpdate, NewEmployee};
use crate::model::presence::{PresenceRecord, PresenceStatus, PresenceUpsert};

/// List envelopes in the order they are looked for.
const LIST_KEYS: [&str; 3] = ["presencas", "serializes", "data"];
/// Single-item envelopes.
const ITEM_KEYS: [&str; 3] = ["presenca", "funcionario", "data"];
/// Reason the remote API expects on an absence submitted without one.
const UNJUSTIFIED_REASON: &str = "Sem justificativa";

#[derive(Debug, Deserialize)]
struct WireEmployee {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    nome: String,
    #[serde(default)]
    sobrenome: String,
    #[serde(default)]
    nif: Option<Value>,
    #[serde(default)]
    departamento: Option<String>,
    #[serde(default, rename = "chefeDeEquipa")]
    chefe_de_equipa: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "isActive")]
    is_active: Option<bool>,
}

impl WireEmployee {
    /// Active when either the status or the legacy `isActive` flag says so.
    fn into_employee(self) -> Employee {
        let parsed = self.status.as_deref().and_then(parse_employee_status);
        let status = match (parsed, self.is_active) {
            (Some(EmployeeStatus::Active), _) | (_, Some(true)) => EmployeeStatus::Active,
            (Some(EmployeeStatus::Inactive), _) | (None, Some(false)) => EmployeeStatus::Inactive,
            (None, None) => EmployeeStatus::default(),
        };

        Employee {
            id: self.id,
            first_name: self.nome,
            last_name: self.sobrenome,
            tax_id: self.nif.as_ref().and_then(scalar_string).unwrap_or_default(),
            department: non_blank(self.departamento),
            team_lead: non_blank(self.chefe_de_equipa),
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePresence {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default, rename = "funcionarioId", alias = "funcionario")]
    employee: Option<Value>,
    data: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "horasExtras")]
    overtime: Option<Value>,
    #[serde(default, rename = "motivoFalta")]
    absence_reason: Option<String>,
    #[serde(default, rename = "faltaJustificada")]
    justified: Option<bool>,
    #[serde(default)]
    observacoes: Option<String>,
    #[serde(default)]
    entrada: Option<String>,
    #[serde(default)]
    saida: Option<String>,
}

impl WirePresence {
    fn into_record(self) -> Result<PresenceRecord, String> {
        let employee_id = self
            .employee
            .as_ref()
            .and_then(employee_ref)
            .ok_or_else(|| "missing employee reference".to_string())?;
        let date = parse_date(&self.data).ok_or_else(|| format!("bad date {:?}", self.data))?;

        Ok(PresenceRecord {
            id: self.id,
            employee_id,
            date,
            status: self.status.as_deref().map(parse_status).unwrap_or_default(),
            overtime_hours: self.overtime.as_ref().map(parse_hours).unwrap_or(0.0),
            absence_reason: non_blank(self.absence_reason),
            justified: self.justified,
            note: non_blank(self.observacoes),
            clock_in: non_blank(self.entrada),
            clock_out: non_blank(self.saida),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_employee_status(raw: &str) -> Option<EmployeeStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ativo" => Some(EmployeeStatus::Active),
        "inativo" => Some(EmployeeStatus::Inactive),
        other => other.parse().ok(),
    }
}

/// Unknown codes read as unmarked.
pub fn parse_status(raw: &str) -> PresenceStatus {
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(status = raw, "Unknown presence status, treating as unmarked");
        PresenceStatus::Unmarked
    })
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date is taken as is.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(day) = raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.date_naive())
}

/// Overtime as a number or a numeric string; anything else counts as zero.
pub fn parse_hours(value: &Value) -> f64 {
    let hours = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    hours.filter(|h| h.is_finite()).unwrap_or(0.0)
}

fn employee_ref(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        Value::Object(embedded) => embedded
            .get("_id")
            .or_else(|| embedded.get("id"))
            .and_then(scalar_string),
        _ => None,
    }
}

fn list_items(body: Value) -> Result<Vec<Value>, StoreError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut envelope) => LIST_KEYS
            .iter()
            .find_map(|key| match envelope.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| StoreError::Decode("no list found in response body".into())),
        other => Err(StoreError::Decode(format!("expected a list, got {other}"))),
    }
}

fn unwrap_item(body: Value) -> Value {
    match body {
        Value::Object(mut envelope) => {
            let key = ITEM_KEYS
                .iter()
                .find(|key| matches!(envelope.get(**key), Some(Value::Object(_))));
            match key.and_then(|key| envelope.remove(*key)) {
                Some(inner) => inner,
                None => Value::Object(envelope),
            }
        }
        other => other,
    }
}

pub fn employees(body: Value) -> Result<Vec<Employee>, StoreError> {
    let items = list_items(body)?;
    let total = items.len();
    let employees: Vec<Employee> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<WireEmployee>(item) {
            Ok(wire) => Some(wire.into_employee()),
            Err(e) => {
                warn!(error = %e, "Skipping malformed employee");
                None
            }
        })
        .collect();
    if employees.len() < total {
        warn!(kept = employees.len(), total, "Some employees were dropped while decoding");
    }
    Ok(employees)
}

pub fn employee(body: Value) -> Result<Employee, StoreError> {
    let wire: WireEmployee = serde_json::from_value(unwrap_item(body))?;
    Ok(wire.into_employee())
}

pub fn presences(body: Value) -> Result<Vec<PresenceRecord>, StoreError> {
    let items = list_items(body)?;
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let decoded = serde_json::from_value::<WirePresence>(item)
                .map_err(|e| e.to_string())
                .and_then(WirePresence::into_record);
            match decoded {
                Ok(record) => Some(record),
                Err(reason) => {
                    warn!(reason = %reason, "Skipping presence record");
                    None
                }
            }
        })
        .collect())
}

/// The record as saved. The submission's employee and date are kept since
/// the API may echo the employee embedded or the date with a time part.
pub fn saved_presence(body: Value, submitted: PresenceUpsert) -> Result<PresenceRecord, StoreError> {
    let item = unwrap_item(body);
    let id = item
        .get("_id")
        .or_else(|| item.get("id"))
        .and_then(scalar_string)
        .ok_or_else(|| StoreError::Decode("saved presence carries no id".into()))?;

    let mut record = submitted.into_record(id);
    if let Some(status) = item.get("status").and_then(Value::as_str) {
        record.status = parse_status(status);
    }
    if let Some(hours) = item.get("horasExtras") {
        record.overtime_hours = parse_hours(hours);
    }
    if let Some(justified) = item.get("faltaJustificada").and_then(Value::as_bool) {
        record.justified = Some(justified);
    }
    Ok(record)
}

pub fn new_employee_body(employee: &NewEmployee) -> Value {
    json!({
        "nome": employee.first_name,
        "sobrenome": employee.last_name,
        "nif": employee.tax_id,
        "departamento": employee.department,
        "chefeDeEquipa": employee.team_lead,
        "status": employee.status.to_string(),
    })
}

/// Only the fields present in the update are sent.
pub fn employee_update_body(update: &EmployeeUpdate) -> Value {
    let mut body = Map::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            body.insert(key.to_string(), Value::String(v));
        }
    };
    put("nome", update.first_name.clone());
    put("sobrenome", update.last_name.clone());
    put("nif", update.tax_id.clone());
    put("departamento", update.department.clone());
    put("chefeDeEquipa", update.team_lead.clone());
    put("status", update.status.map(|s| s.to_string()));
    Value::Object(body)
}

pub fn presence_body(upsert: &PresenceUpsert) -> Value {
    let absence_reason = match (&upsert.absence_reason, upsert.status) {
        (None, PresenceStatus::Absent) => Some(UNJUSTIFIED_REASON.to_string()),
        (reason, _) => reason.clone(),
    };
    json!({
        "funcionarioId": upsert.employee_id,
        "data": format!("{}T00:00:00.000Z", upsert.date.format("%Y-%m-%d")),
        "status": upsert.status.wire_code(),
        "horasExtras": upsert.overtime_hours,
        "motivoFalta": absence_reason,
        "faltaJustificada": upsert.justified.unwrap_or(false),
        "observacoes": upsert.note,
        "entrada": upsert.clock_in,
        "saida": upsert.clock_out,
    })
}
