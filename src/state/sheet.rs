//! Per-session presence sheet: selection, loaded data and stale-fetch
//! protection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::book::PresenceBook;
use crate::attendance::{
    AttendanceView, Direction, Period, PeriodError, ViewType, aggregate, navigate,
};
use crate::model::employee::Employee;
use crate::model::presence::PresenceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Selection {
    pub view: ViewType,
    #[schema(example = "2025-06-18", value_type = String, format = "date")]
    pub reference: NaiveDate,
}

impl Selection {
    pub fn period(&self) -> Result<Period, PeriodError> {
        Period::for_view(self.view, self.reference)
    }
}

/// Issued when the selection changes; the fetch it starts may only install
/// its result while the selection is unchanged. `edit_mark` is the last local
/// edit the fetched data is guaranteed to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    edit_mark: u64,
    period: Period,
}

impl FetchTicket {
    pub fn period(&self) -> Period {
        self.period
    }
}

/// A save or delete made in this session, kept until every fetch that could
/// predate it has been installed or discarded.
#[derive(Debug, Clone)]
enum LocalEdit {
    Saved(PresenceRecord),
    Removed(String),
}

impl LocalEdit {
    fn replay(&self, book: &mut PresenceBook) {
        match self {
            LocalEdit::Saved(record) => book.upsert(record.clone()),
            LocalEdit::Removed(id) => {
                book.remove(id);
            }
        }
    }
}

#[derive(Debug)]
pub struct SheetState {
    selection: Selection,
    period: Period,
    generation: u64,
    loaded_generation: Option<u64>,
    roster: Vec<Employee>,
    book: PresenceBook,
    edit_seq: u64,
    edits: Vec<(u64, LocalEdit)>,
    installed_mark: u64,
}

impl SheetState {
    /// Weekly view of the week containing `today`, nothing loaded.
    pub fn new(today: NaiveDate) -> Result<Self, PeriodError> {
        let selection = Selection {
            view: ViewType::Weekly,
            reference: today,
        };
        Ok(Self {
            period: selection.period()?,
            selection,
            generation: 0,
            loaded_generation: None,
            roster: Vec::new(),
            book: PresenceBook::default(),
            edit_seq: 0,
            edits: Vec::new(),
            installed_mark: 0,
        })
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn roster(&self) -> &[Employee] {
        &self.roster
    }

    pub fn book(&self) -> &PresenceBook {
        &self.book
    }

    /// Whether the installed data belongs to the current selection.
    pub fn is_loaded(&self) -> bool {
        self.loaded_generation == Some(self.generation)
    }

    /// Ticket for (re)loading the current selection.
    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            edit_mark: self.edit_seq,
            period: self.period,
        }
    }

    /// Switches view type and reference date. An unusable reference leaves
    /// the state untouched.
    pub fn select(&mut self, selection: Selection) -> Result<FetchTicket, PeriodError> {
        let period = selection.period()?;
        self.selection = selection;
        self.period = period;
        self.generation += 1;
        // every edit so far is in the store before the next fetch starts
        self.edits.clear();
        self.installed_mark = self.edit_seq;
        debug!(
            generation = self.generation,
            view = %selection.view,
            reference = %selection.reference,
            "Sheet selection changed"
        );
        Ok(self.ticket())
    }

    /// Steps one week or one payroll month.
    pub fn navigate(&mut self, direction: Direction) -> Result<FetchTicket, PeriodError> {
        let reference = navigate(self.selection.view, self.selection.reference, direction)?;
        self.select(Selection {
            view: self.selection.view,
            reference,
        })
    }

    /// Installs a fetch result, replaying the local edits made after the
    /// ticket was issued. Returns `false`, and changes nothing, when the
    /// selection has changed since. A result older than the installed one for
    /// the same selection is dropped and reported as `true`.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        roster: Vec<Employee>,
        records: Vec<PresenceRecord>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "Discarding stale sheet fetch"
            );
            return false;
        }
        if self.is_loaded() && ticket.edit_mark < self.installed_mark {
            debug!(
                mark = ticket.edit_mark,
                installed = self.installed_mark,
                "Dropping fetch older than the installed one"
            );
            return true;
        }

        let mut book = PresenceBook::new(records);
        for (_, edit) in self.edits.iter().filter(|(seq, _)| *seq > ticket.edit_mark) {
            edit.replay(&mut book);
        }
        self.edits.retain(|(seq, _)| *seq > ticket.edit_mark);

        self.roster = roster;
        self.book = book;
        self.installed_mark = ticket.edit_mark;
        self.loaded_generation = Some(ticket.generation);
        true
    }

    fn log(&mut self, edit: LocalEdit) {
        self.edit_seq += 1;
        self.edits.push((self.edit_seq, edit));
    }

    /// Puts a saved record into the loaded set, replacing its day.
    pub fn record(&mut self, saved: PresenceRecord) {
        self.log(LocalEdit::Saved(saved.clone()));
        self.book.upsert(saved);
    }

    pub fn forget(&mut self, presence_id: &str) -> bool {
        self.log(LocalEdit::Removed(presence_id.to_string()));
        self.book.remove(presence_id)
    }

    /// Recomputed from the current roster and records on every call.
    pub fn view(&self) -> AttendanceView {
        aggregate(&self.roster, self.book.records(), &self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::EmployeeStatus;
    use crate::model::presence::PresenceStatus;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn ana() -> Employee {
        Employee {
            id: "a".into(),
            first_name: "Ana".into(),
            last_name: "Melo".into(),
            tax_id: "1".into(),
            department: None,
            team_lead: None,
            status: EmployeeStatus::Active,
        }
    }

    fn rec(id: &str, date: NaiveDate, status: PresenceStatus) -> PresenceRecord {
        PresenceRecord {
            id: id.into(),
            employee_id: "a".into(),
            date,
            status,
            overtime_hours: 0.0,
            absence_reason: None,
            justified: None,
            note: None,
            clock_in: None,
            clock_out: None,
        }
    }

    #[test]
    fn starts_on_the_current_week_unloaded() {
        let sheet = SheetState::new(d(6, 18)).unwrap();
        assert_eq!(sheet.selection().view, ViewType::Weekly);
        assert_eq!(sheet.period().start, d(6, 16));
        assert!(!sheet.is_loaded());
        assert!(sheet.view().employees.is_empty());
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        let weekly = sheet.ticket();
        let monthly = sheet
            .select(Selection {
                view: ViewType::Monthly,
                reference: d(6, 18),
            })
            .unwrap();

        assert!(!sheet.apply(weekly, vec![ana()], vec![]));
        assert!(!sheet.is_loaded());
        assert!(sheet.roster().is_empty());

        assert!(sheet.apply(monthly, vec![ana()], vec![]));
        assert!(sheet.is_loaded());
        assert_eq!(sheet.view().period.start, d(6, 20));
    }

    #[test]
    fn navigation_refetches_and_reanchors() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        sheet
            .select(Selection {
                view: ViewType::Monthly,
                reference: d(6, 18),
            })
            .unwrap();
        let ticket = sheet.navigate(Direction::Next).unwrap();

        assert_eq!(ticket.period().start, d(7, 20));
        assert_eq!(ticket.period().end, d(8, 21));
        assert!(!sheet.is_loaded());
    }

    #[test]
    fn recorded_presence_shows_in_the_next_view() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        let ticket = sheet.ticket();
        sheet.apply(ticket, vec![ana()], vec![rec("1", d(6, 18), PresenceStatus::Absent)]);
        assert_eq!(sheet.view().grand_totals.days_present, 0.0);

        sheet.record(rec("2", d(6, 18), PresenceStatus::Present));
        assert_eq!(sheet.book().len(), 1);
        assert_eq!(sheet.view().grand_totals.days_present, 1.0);

        assert!(sheet.forget("2"));
        assert_eq!(sheet.view().grand_totals.days_present, 0.0);
    }

    #[test]
    fn save_during_a_fetch_survives_the_install() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        let ticket = sheet.ticket();
        sheet.record(rec("2", d(6, 18), PresenceStatus::Present));

        // the fetch read the store before the save landed
        assert!(sheet.apply(ticket, vec![ana()], vec![]));
        assert_eq!(sheet.book().len(), 1);
        assert_eq!(sheet.view().grand_totals.days_present, 1.0);
    }

    #[test]
    fn delete_during_a_fetch_survives_the_install() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        let ticket = sheet.ticket();
        assert!(!sheet.forget("1"));

        let fetched = vec![rec("1", d(6, 18), PresenceStatus::Present)];
        assert!(sheet.apply(ticket, vec![ana()], fetched));
        assert!(sheet.book().is_empty());
    }

    #[test]
    fn older_fetch_never_replaces_a_newer_install() {
        let mut sheet = SheetState::new(d(6, 18)).unwrap();
        let first = sheet.ticket();
        sheet.record(rec("2", d(6, 18), PresenceStatus::Present));
        let second = sheet.ticket();
        sheet.record(rec("3", d(6, 17), PresenceStatus::HalfDay));

        let fresh = vec![rec("2", d(6, 18), PresenceStatus::Present)];
        assert!(sheet.apply(second, vec![ana()], fresh));
        assert_eq!(sheet.view().grand_totals.days_present, 1.5);

        assert!(sheet.apply(first, vec![], vec![]));
        assert_eq!(sheet.roster().len(), 1);
        assert_eq!(sheet.view().grand_totals.days_present, 1.5);
    }
}
