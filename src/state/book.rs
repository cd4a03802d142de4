use crate::model::presence::PresenceRecord;

/// The presence records a sheet session has loaded, kept in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresenceBook {
    records: Vec<PresenceRecord>,
}

impl PresenceBook {
    pub fn new(records: Vec<PresenceRecord>) -> Self {
        Self { records }
    }

    /// Drops every record for the saved record's (employee, date) and
    /// appends the saved one. Nothing of the old records is carried over.
    pub fn upsert(&mut self, saved: PresenceRecord) {
        self.records
            .retain(|r| !(r.employee_id == saved.employee_id && r.date == saved.date));
        self.records.push(saved);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn records(&self) -> &[PresenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::presence::PresenceStatus;
    use chrono::NaiveDate;

    fn rec(id: &str, employee_id: &str, day: u32, status: PresenceStatus) -> PresenceRecord {
        PresenceRecord {
            id: id.into(),
            employee_id: employee_id.into(),
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            status,
            overtime_hours: 3.0,
            absence_reason: Some("old".into()),
            justified: None,
            note: None,
            clock_in: None,
            clock_out: None,
        }
    }

    #[test]
    fn upsert_replaces_instead_of_merging() {
        let mut book = PresenceBook::new(vec![
            rec("1", "a", 18, PresenceStatus::Absent),
            rec("2", "b", 18, PresenceStatus::Present),
            rec("3", "a", 18, PresenceStatus::Absent),
        ]);
        let mut saved = rec("9", "a", 18, PresenceStatus::Present);
        saved.overtime_hours = 0.0;
        saved.absence_reason = None;
        book.upsert(saved.clone());

        let for_a: Vec<&PresenceRecord> =
            book.records().iter().filter(|r| r.employee_id == "a").collect();
        assert_eq!(for_a, vec![&saved]);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn remove_by_id() {
        let mut book = PresenceBook::new(vec![rec("1", "a", 18, PresenceStatus::Absent)]);
        assert!(!book.remove("2"));
        assert!(book.remove("1"));
        assert!(book.is_empty());
    }
}
