//! In-process stores, used when no remote API is configured.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::{EmployeeDirectory, PresenceStore, StoreError};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::model::presence::{PresenceRecord, PresenceUpsert};

#[derive(Default)]
struct Tables {
    employees: Vec<Employee>,
    presences: Vec<PresenceRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(employees: Vec<Employee>, presences: Vec<PresenceRecord>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                employees,
                presences,
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.tables().employees.clone())
    }

    async fn get_employee(&self, id: &str) -> Result<Employee, StoreError> {
        self.tables()
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("employee {id}")))
    }

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let created = employee.into_employee(new_id());
        self.tables().employees.push(created.clone());
        info!(employee_id = %created.id, "Employee created");
        Ok(created)
    }

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        let mut tables = self.tables();
        let employee = tables
            .employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("employee {id}")))?;
        update.apply(employee);
        Ok(employee.clone())
    }

    async fn delete_employee(&self, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let before = tables.employees.len();
        tables.employees.retain(|e| e.id != id);
        if tables.employees.len() == before {
            return Err(StoreError::NotFound(format!("employee {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn list_presences(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PresenceRecord>, StoreError> {
        Ok(self
            .tables()
            .presences
            .iter()
            .filter(|r| start <= r.date && r.date <= end)
            .cloned()
            .collect())
    }

    async fn upsert_presence(&self, upsert: PresenceUpsert) -> Result<PresenceRecord, StoreError> {
        let mut tables = self.tables();
        if !tables.employees.iter().any(|e| e.id == upsert.employee_id) {
            return Err(StoreError::NotFound(format!("employee {}", upsert.employee_id)));
        }

        let existing = tables
            .presences
            .iter()
            .position(|r| r.employee_id == upsert.employee_id && r.date == upsert.date);
        let saved = match existing {
            Some(pos) => {
                let id = tables.presences[pos].id.clone();
                let record = upsert.into_record(id);
                tables.presences[pos] = record.clone();
                record
            }
            None => {
                let record = upsert.into_record(new_id());
                tables.presences.push(record.clone());
                record
            }
        };
        Ok(saved)
    }

    async fn delete_presence(&self, id: &str) -> Result<(), StoreError> {
        let mut tables = self.tables();
        let before = tables.presences.len();
        tables.presences.retain(|r| r.id != id);
        if tables.presences.len() == before {
            return Err(StoreError::NotFound(format!("presence {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::model::presence::PresenceStatus;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn new_employee(first: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.into(),
            last_name: "Lopes".into(),
            tax_id: "1".into(),
            department: None,
            team_lead: None,
            status: EmployeeStatus::Active,
        }
    }

    fn submit(employee_id: &str, day: u32, status: PresenceStatus) -> PresenceUpsert {
        PresenceUpsert {
            employee_id: employee_id.into(),
            date: d(day),
            status,
            overtime_hours: 0.0,
            absence_reason: None,
            justified: None,
            note: None,
            clock_in: None,
            clock_out: None,
        }
    }

    #[actix_web::test]
    async fn employee_crud() {
        let store = MemoryStore::new();
        let ana = store.create_employee(new_employee("Ana")).await.unwrap();
        assert_eq!(store.get_employee(&ana.id).await.unwrap(), ana);

        let update = EmployeeUpdate {
            status: Some(EmployeeStatus::Inactive),
            ..EmployeeUpdate::default()
        };
        let updated = store.update_employee(&ana.id, update).await.unwrap();
        assert!(!updated.is_active());

        store.delete_employee(&ana.id).await.unwrap();
        assert!(matches!(
            store.get_employee(&ana.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.delete_employee(&ana.id).await.is_err());
    }

    #[actix_web::test]
    async fn upsert_replaces_the_day_and_keeps_identity() {
        let store = MemoryStore::new();
        let ana = store.create_employee(new_employee("Ana")).await.unwrap();

        let first = store
            .upsert_presence(submit(&ana.id, 18, PresenceStatus::Present))
            .await
            .unwrap();
        let second = store
            .upsert_presence(submit(&ana.id, 18, PresenceStatus::Absent))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        let records = store.list_presences(d(16), d(22)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, PresenceStatus::Absent);

        assert!(store.list_presences(d(23), d(29)).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn upsert_for_unknown_employee_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .upsert_presence(submit("ghost", 18, PresenceStatus::Present))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
