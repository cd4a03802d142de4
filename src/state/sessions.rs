use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use moka::future::Cache;
use tracing::debug;

use super::sheet::SheetState;
use crate::attendance::PeriodError;

pub type SharedSheet = Arc<Mutex<SheetState>>;

/// One presence sheet per signed-in user, dropped after sitting idle.
#[derive(Clone)]
pub struct Sessions {
    sheets: Cache<String, SharedSheet>,
}

impl Sessions {
    pub fn new(idle: Duration) -> Self {
        let sheets = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(idle)
            .build();
        Self { sheets }
    }

    /// The user's sheet, opened on the week of `today` if there is none yet.
    pub async fn sheet(&self, user: &str, today: NaiveDate) -> Result<SharedSheet, PeriodError> {
        if let Some(sheet) = self.sheets.get(user).await {
            return Ok(sheet);
        }
        let fresh = Arc::new(Mutex::new(SheetState::new(today)?));
        debug!(user, "Opening presence sheet session");
        Ok(self.sheets.get_with(user.to_string(), async move { fresh }).await)
    }

    /// The user's sheet if one is open; never opens one.
    pub async fn existing(&self, user: &str) -> Option<SharedSheet> {
        self.sheets.get(user).await
    }
}

/// Locks shared session data, recovering the guard from a poisoned mutex.
pub fn lock<T>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn same_user_gets_the_same_sheet() {
        let sessions = Sessions::new(Duration::from_secs(60));
        let today = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();

        let first = sessions.sheet("ana", today).await.unwrap();
        let again = sessions.sheet("ana", today).await.unwrap();
        let other = sessions.sheet("rui", today).await.unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert!(sessions.existing("eva").await.is_none());
        assert!(sessions.existing("ana").await.is_some());
        assert_eq!(lock(&first).period().start, NaiveDate::from_ymd_opt(2025, 6, 16).unwrap());
    }
}
