//! Client for the remote REST API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use super::{EmployeeDirectory, PresenceStore, StoreError, wire};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::model::presence::{PresenceRecord, PresenceUpsert};

const FALLBACK_MESSAGE: &str = "request to the presence API failed";

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and returns the JSON body; an empty body reads as
    /// `null`.
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Value, StoreError> {
        let response = builder.send().await.map_err(|e| {
            error!(error = %e, what, "Presence API unreachable");
            StoreError::from(e)
        })?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), what, bytes = text.len(), "Presence API answered");

        if !status.is_success() {
            return Err(api_error(status, &text, what));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn api_error(status: StatusCode, body: &str, what: &str) -> StoreError {
    if status == StatusCode::NOT_FOUND {
        return StoreError::NotFound(what.to_string());
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
    error!(status = status.as_u16(), message = %message, what, "Presence API rejected request");
    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl EmployeeDirectory for RestStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let body = self
            .send(self.request(Method::GET, "funcionarios"), "employee list")
            .await?;
        wire::employees(body)
    }

    async fn get_employee(&self, id: &str) -> Result<Employee, StoreError> {
        let what = format!("employee {id}");
        let body = self
            .send(self.request(Method::GET, &format!("funcionarios/{id}")), &what)
            .await?;
        wire::employee(body)
    }

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let request = self
            .request(Method::POST, "funcionarios")
            .json(&wire::new_employee_body(&employee));
        let body = self.send(request, "employee").await?;
        wire::employee(body)
    }

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        if update.is_empty() {
            return self.get_employee(id).await;
        }
        let what = format!("employee {id}");
        let request = self
            .request(Method::PUT, &format!("funcionarios/{id}"))
            .json(&wire::employee_update_body(&update));
        let body = self.send(request, &what).await?;
        wire::employee(body)
    }

    async fn delete_employee(&self, id: &str) -> Result<(), StoreError> {
        let what = format!("employee {id}");
        self.send(self.request(Method::DELETE, &format!("funcionarios/{id}")), &what)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for RestStore {
    async fn list_presences(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PresenceRecord>, StoreError> {
        let request = self.request(Method::GET, "presencas/semana").query(&[
            ("inicio", start.format("%Y-%m-%d").to_string()),
            ("fim", end.format("%Y-%m-%d").to_string()),
        ]);
        let body = self.send(request, "presence list").await?;
        let records = wire::presences(body)?;
        debug!(%start, %end, count = records.len(), "Loaded presence records");
        Ok(records)
    }

    async fn upsert_presence(&self, upsert: PresenceUpsert) -> Result<PresenceRecord, StoreError> {
        let request = self
            .request(Method::POST, "presencas")
            .json(&wire::presence_body(&upsert));
        let body = self.send(request, "presence").await?;
        wire::saved_presence(body, upsert)
    }

    async fn delete_presence(&self, id: &str) -> Result<(), StoreError> {
        let what = format!("presence {id}");
        self.send(
            self.request(Method::DELETE, &format!("presencas/excluir/{id}")),
            &what,
        )
        .await?;
        Ok(())
    }
}
