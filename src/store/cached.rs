use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::{EmployeeDirectory, StoreError};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};

const ROSTER_KEY: &str = "roster";

/// Roster cache in front of any directory. Every write through it drops the
/// cached roster.
pub struct CachedDirectory {
    inner: Arc<dyn EmployeeDirectory>,
    roster: Cache<&'static str, Arc<Vec<Employee>>>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn EmployeeDirectory>, ttl: Duration) -> Self {
        let roster = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { inner, roster }
    }

    pub async fn invalidate(&self) {
        self.roster.invalidate(ROSTER_KEY).await;
    }
}

#[async_trait]
impl EmployeeDirectory for CachedDirectory {
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        if let Some(cached) = self.roster.get(ROSTER_KEY).await {
            debug!(count = cached.len(), "Roster served from cache");
            return Ok(cached.as_ref().clone());
        }
        let fresh = self.inner.list_employees().await?;
        self.roster.insert(ROSTER_KEY, Arc::new(fresh.clone())).await;
        Ok(fresh)
    }

    async fn get_employee(&self, id: &str) -> Result<Employee, StoreError> {
        self.inner.get_employee(id).await
    }

    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let created = self.inner.create_employee(employee).await?;
        self.invalidate().await;
        Ok(created)
    }

    async fn update_employee(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        let updated = self.inner.update_employee(id, update).await?;
        self.invalidate().await;
        Ok(updated)
    }

    async fn delete_employee(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete_employee(id).await?;
        self.invalidate().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::store::MemoryStore;

    fn new_employee(first: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.into(),
            last_name: "Reis".into(),
            tax_id: "9".into(),
            department: None,
            team_lead: None,
            status: EmployeeStatus::Active,
        }
    }

    #[actix_web::test]
    async fn writes_through_the_cache_invalidate_it() {
        let backing = Arc::new(MemoryStore::new());
        let cached = CachedDirectory::new(backing.clone(), Duration::from_secs(60));

        assert!(cached.list_employees().await.unwrap().is_empty());
        cached.create_employee(new_employee("Ana")).await.unwrap();
        assert_eq!(cached.list_employees().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn reads_are_served_from_cache_until_ttl() {
        let backing = Arc::new(MemoryStore::new());
        let cached = CachedDirectory::new(backing.clone(), Duration::from_secs(60));

        assert!(cached.list_employees().await.unwrap().is_empty());
        // written behind the cache's back
        backing.create_employee(new_employee("Rui")).await.unwrap();
        assert!(cached.list_employees().await.unwrap().is_empty());

        cached.invalidate().await;
        assert_eq!(cached.list_employees().await.unwrap().len(), 1);
    }
}
