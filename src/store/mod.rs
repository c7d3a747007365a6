//! Read-only record store backed by seed data.
//!
//! Stands in for a future persistence API: creates and deletes are simulated
//! by the handlers and never reach this store.

mod seed;

pub use seed::*;

use std::cmp::Reverse;

use crate::models::{Award, Certificate, ListRecord, Record};

/// Snapshot of every record collection.
#[derive(Debug, Clone)]
pub struct RecordStore {
    certificates: Vec<Certificate>,
    awards: Vec<Award>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl RecordStore {
    pub fn new(certificates: Vec<Certificate>, awards: Vec<Award>) -> Self {
        Self {
            certificates,
            awards,
        }
    }

    /// Store populated with the demo records.
    pub fn seeded() -> Self {
        Self::new(seed_certificates(), seed_awards())
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn awards(&self) -> &[Award] {
        &self.awards
    }

    /// The `limit` most recently issued or received records of either kind.
    pub fn recent(&self, limit: usize) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .certificates
            .iter()
            .cloned()
            .map(Record::Certificate)
            .chain(self.awards.iter().cloned().map(Record::Award))
            .collect();
        records.sort_by_cached_key(|r| Reverse(r.primary_date()));
        records.truncate(limit);
        records
    }
}

/// Collections the store can hand to a generic listing.
pub trait RecordSource<R: ListRecord> {
    fn records(&self) -> &[R];

    fn find(&self, id: i64) -> Option<&R> {
        self.records().iter().find(|r| r.id() == id)
    }

    /// Id a newly created record would receive.
    fn next_id(&self) -> i64 {
        self.records().iter().map(|r| r.id()).max().unwrap_or(0) + 1
    }
}

impl RecordSource<Certificate> for RecordStore {
    fn records(&self) -> &[Certificate] {
        &self.certificates
    }
}

impl RecordSource<Award> for RecordStore {
    fn records(&self) -> &[Award] {
        &self.awards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_are_unique() {
        let store = RecordStore::seeded();
        let mut ids: Vec<i64> = store.certificates().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), store.certificates().len());

        let mut ids: Vec<i64> = store.awards().iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), store.awards().len());
    }

    #[test]
    fn test_seed_tags_are_lowercase() {
        let store = RecordStore::seeded();
        for cert in store.certificates() {
            assert!(cert.tags.iter().all(|t| *t == t.to_lowercase()));
        }
        for award in store.awards() {
            assert!(award.tags.iter().all(|t| *t == t.to_lowercase()));
        }
    }

    #[test]
    fn test_recent_mixes_kinds_newest_first() {
        let store = RecordStore::seeded();
        let recent = store.recent(3);
        let names: Vec<&str> = recent.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "Employee of the Month",
                "UI/UX Design Fundamentals",
                "Best Speaker"
            ]
        );
        assert_eq!(store.recent(100).len(), 10);
    }

    #[test]
    fn test_find_and_next_id() {
        let store = RecordStore::seeded();
        let cert: Option<&Certificate> = store.find(2);
        assert_eq!(cert.map(|c| c.name.as_str()), Some("React Advanced"));
        let award: Option<&Award> = store.find(99);
        assert!(award.is_none());
        assert_eq!(RecordSource::<Certificate>::next_id(&store), 6);
        assert_eq!(RecordSource::<Award>::next_id(&store), 6);

        let empty = RecordStore::new(Vec::new(), Vec::new());
        assert_eq!(RecordSource::<Award>::next_id(&empty), 1);
    }
}
