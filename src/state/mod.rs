//! Shared application state handed to every handler.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing::{info, warn};

use crate::attendance::Period;
use crate::attendance::timesheet::Timesheet;
use crate::config::Config;
use crate::model::employee::Employee;
use crate::model::presence::PresenceRecord;
use crate::store::{
    CachedDirectory, EmployeeDirectory, MemoryStore, PresenceStore, RestStore, StoreError,
};

pub mod book;
pub mod sessions;
pub mod sheet;

pub use book::PresenceBook;
pub use sessions::{Sessions, SharedSheet, lock};
pub use sheet::{FetchTicket, Selection, SheetState};

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn EmployeeDirectory>,
    pub presence: Arc<dyn PresenceStore>,
    pub sessions: Sessions,
    /// Clock entries live only in this process.
    pub timesheet: Arc<Mutex<Timesheet>>,
}

impl AppState {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        presence: Arc<dyn PresenceStore>,
        sessions: Sessions,
    ) -> Self {
        Self {
            directory,
            presence,
            sessions,
            timesheet: Arc::new(Mutex::new(Timesheet::default())),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let sessions = Sessions::new(config.session_ttl);

        let (directory, presence): (Arc<dyn EmployeeDirectory>, Arc<dyn PresenceStore>) =
            match &config.api_base_url {
                Some(base_url) => {
                    let rest = Arc::new(
                        RestStore::new(base_url, config.api_token.clone(), config.api_timeout)
                            .context("failed to build the presence API client")?,
                    );
                    info!(base_url = %base_url, "Using remote presence API");
                    let directory: Arc<dyn EmployeeDirectory> = rest.clone();
                    let presence: Arc<dyn PresenceStore> = rest;
                    (directory, presence)
                }
                None => {
                    warn!("API_BASE_URL is not set, keeping employees and presences in memory");
                    let memory = Arc::new(MemoryStore::new());
                    let directory: Arc<dyn EmployeeDirectory> = memory.clone();
                    let presence: Arc<dyn PresenceStore> = memory;
                    (directory, presence)
                }
            };

        let directory = Arc::new(CachedDirectory::new(directory, config.roster_cache_ttl));
        Ok(Self::new(directory, presence, sessions))
    }

    /// Roster and the period's presence records, fetched concurrently.
    pub async fn fetch_period(
        &self,
        period: &Period,
    ) -> Result<(Vec<Employee>, Vec<PresenceRecord>), StoreError> {
        futures::try_join!(
            self.directory.list_employees(),
            self.presence.list_presences(period.start, period.end),
        )
    }

    /// Fetches for `ticket` and installs the result into `sheet` unless a
    /// newer selection was made meanwhile. Returns whether it was installed.
    pub async fn load(&self, sheet: &Mutex<SheetState>, ticket: FetchTicket) -> Result<bool, StoreError> {
        let (roster, records) = self.fetch_period(&ticket.period()).await?;
        Ok(lock(sheet).apply(ticket, roster, records))
    }
}
