//! Access to the employee roster and the presence records.
//!
//! The remote REST API is the system of record; [`MemoryStore`] stands in
//! for it when no API is configured.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::model::presence::{PresenceRecord, PresenceUpsert};

pub mod cached;
pub mod memory;
pub mod rest;
pub mod wire;

pub use cached::CachedDirectory;
pub use memory::MemoryStore;
pub use rest::RestStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Transport(String),
    #[error("store answered {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected store payload: {0}")]
    Decode(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;

    async fn get_employee(&self, id: &str) -> Result<Employee, StoreError>;

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, StoreError>;

    async fn delete_employee(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Records dated within `[start, end]`.
    async fn list_presences(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PresenceRecord>, StoreError>;

    /// Creates or replaces the record for the submission's (employee, date)
    /// and returns it as saved.
    async fn upsert_presence(&self, upsert: PresenceUpsert) -> Result<PresenceRecord, StoreError>;

    async fn delete_presence(&self, id: &str) -> Result<(), StoreError>;
}
