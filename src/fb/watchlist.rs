//! Watched companies and the change detector.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::FnNr;

use super::error::FbError;
use super::{CompanyExtract, RegisterClient};

/// One watched company with its check metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub number: FnNr,
    pub note: Option<String>,
    pub enabled: bool,
    pub added_at: NaiveDateTime,
    pub last_checked_at: Option<NaiveDateTime>,
    /// Company status observed at the last check.
    pub last_status: Option<String>,
    /// Canonical snapshot the next check diffs against.
    pub last_snapshot: Option<Value>,
}

/// A detected difference between two canonical snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub number: FnNr,
    pub checked_at: NaiveDateTime,
    pub previous: Value,
    pub current: Value,
}

/// Result of a watchlist sweep. Fetch failures never abort the sweep; they
/// are collected per company.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub changes: Vec<ChangeRecord>,
    pub failures: Vec<(FnNr, FbError)>,
}

/// The per-tenant set of watched companies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    entries: Vec<WatchEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn get(&self, number: &FnNr) -> Option<&WatchEntry> {
        self.entries.iter().find(|e| &e.number == number)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add a company, or update the note of an existing entry. Check state
    /// of an existing entry is kept.
    pub fn add(&mut self, number: FnNr, note: Option<String>) -> &WatchEntry {
        if let Some(pos) = self.entries.iter().position(|e| e.number == number) {
            self.entries[pos].note = note;
            self.entries[pos].enabled = true;
            return &self.entries[pos];
        }
        self.entries.push(WatchEntry {
            number,
            note,
            enabled: true,
            added_at: Utc::now().naive_utc(),
            last_checked_at: None,
            last_status: None,
            last_snapshot: None,
        });
        self.entries.last().expect("just pushed")
    }

    /// Remove a company. Reports whether an entry was actually deleted.
    pub fn remove(&mut self, number: &FnNr) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.number != number);
        self.entries.len() != before
    }

    /// Disable an entry without losing its history.
    pub fn set_enabled(&mut self, number: &FnNr, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| &e.number == number) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Fetch a fresh extract for every enabled entry and diff it against
    /// the stored snapshot. A change is recorded only when a previous
    /// snapshot existed and differs; the first sighting just seeds the
    /// baseline. Check timestamp and status refresh on every successful
    /// fetch, changed or not.
    pub async fn check_all(&mut self, client: &impl RegisterClient) -> CheckReport {
        let mut report = CheckReport::default();
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            let extract = match client.fetch_extract(&entry.number).await {
                Ok(extract) => extract,
                Err(err) => {
                    tracing::warn!(number = %entry.number, error = %err, "register fetch failed");
                    report.failures.push((entry.number.clone(), err));
                    continue;
                }
            };
            let checked_at = Utc::now().naive_utc();
            let current = match canonicalize(&extract) {
                Ok(value) => value,
                Err(err) => {
                    report.failures.push((entry.number.clone(), err));
                    continue;
                }
            };

            if let Some(previous) = &entry.last_snapshot {
                if !snapshots_equal(previous, &current) {
                    tracing::info!(number = %entry.number, "company extract changed");
                    report.changes.push(ChangeRecord {
                        number: entry.number.clone(),
                        checked_at,
                        previous: previous.clone(),
                        current: current.clone(),
                    });
                }
            }

            entry.last_checked_at = Some(checked_at);
            entry.last_status = Some(extract.status.clone());
            entry.last_snapshot = Some(current);
        }
        report
    }
}

/// Canonical form of an extract: re-marshalled through `serde_json::Value`,
/// which sorts object keys, so equal data always serializes to equal bytes.
pub fn canonicalize(extract: &CompanyExtract) -> Result<Value, FbError> {
    Ok(serde_json::to_value(extract)?)
}

fn snapshots_equal(a: &Value, b: &Value) -> bool {
    // byte compare of the canonical serialization
    match (serde_json::to_vec(a), serde_json::to_vec(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn fnnr(s: &str) -> FnNr {
        FnNr::parse(s).unwrap()
    }

    fn extract(number: &str, name: &str, status: &str) -> CompanyExtract {
        CompanyExtract {
            number: fnnr(number),
            name: name.into(),
            legal_form: "GmbH".into(),
            seat: "Wien".into(),
            address: "Musterstraße 1, 1010 Wien".into(),
            status: status.into(),
        }
    }

    struct FakeRegister {
        extracts: Mutex<HashMap<String, Result<CompanyExtract, FbError>>>,
    }

    impl FakeRegister {
        fn new(entries: Vec<(&str, Result<CompanyExtract, FbError>)>) -> Self {
            Self {
                extracts: Mutex::new(
                    entries
                        .into_iter()
                        .map(|(k, v)| (fnnr(k).to_string(), v))
                        .collect(),
                ),
            }
        }

        fn set(&self, number: &str, result: Result<CompanyExtract, FbError>) {
            self.extracts
                .lock()
                .unwrap()
                .insert(fnnr(number).to_string(), result);
        }
    }

    impl RegisterClient for FakeRegister {
        async fn fetch_extract(&self, number: &FnNr) -> Result<CompanyExtract, FbError> {
            // take the value out before matching so the lock is released
            let taken = self.extracts.lock().unwrap().remove(&number.to_string());
            match taken {
                Some(Ok(extract)) => {
                    // keep the snapshot available for repeat checks
                    self.extracts
                        .lock()
                        .unwrap()
                        .insert(number.to_string(), Ok(extract.clone()));
                    Ok(extract)
                }
                Some(Err(err)) => Err(err),
                None => Err(FbError::NotFound(number.to_string())),
            }
        }
    }

    #[test]
    fn add_is_an_upsert() {
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), Some("client A".into()));
        list.add(fnnr("FN123456a"), Some("renamed".into()));
        assert_eq!(list.len(), 1);
        assert_eq!(
            list.get(&fnnr("FN123456a")).unwrap().note.as_deref(),
            Some("renamed")
        );
    }

    #[test]
    fn remove_reports_deletion() {
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);
        assert!(list.remove(&fnnr("FN123456a")));
        assert!(!list.remove(&fnnr("FN123456a")));
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn first_check_seeds_the_baseline_without_a_change() {
        let register = FakeRegister::new(vec![(
            "FN123456a",
            Ok(extract("FN123456a", "Muster GmbH", "aktiv")),
        )]);
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);

        let report = list.check_all(&register).await;
        assert!(report.changes.is_empty());
        assert!(report.failures.is_empty());

        let entry = list.get(&fnnr("FN123456a")).unwrap();
        assert!(entry.last_checked_at.is_some());
        assert_eq!(entry.last_status.as_deref(), Some("aktiv"));
        assert!(entry.last_snapshot.is_some());
    }

    #[tokio::test]
    async fn changed_extract_produces_a_record() {
        let register = FakeRegister::new(vec![(
            "FN123456a",
            Ok(extract("FN123456a", "Muster GmbH", "aktiv")),
        )]);
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);
        list.check_all(&register).await;

        register.set(
            "FN123456a",
            Ok(extract("FN123456a", "Muster GmbH", "in Liquidation")),
        );
        let report = list.check_all(&register).await;
        assert_eq!(report.changes.len(), 1);
        let change = &report.changes[0];
        assert_eq!(change.number, fnnr("FN123456a"));
        assert_eq!(change.previous["status"], "aktiv");
        assert_eq!(change.current["status"], "in Liquidation");
        assert_eq!(
            list.get(&fnnr("FN123456a")).unwrap().last_status.as_deref(),
            Some("in Liquidation")
        );
    }

    #[tokio::test]
    async fn unchanged_extract_refreshes_metadata_only() {
        let register = FakeRegister::new(vec![(
            "FN123456a",
            Ok(extract("FN123456a", "Muster GmbH", "aktiv")),
        )]);
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);
        list.check_all(&register).await;
        let first_checked = list.get(&fnnr("FN123456a")).unwrap().last_checked_at;

        let report = list.check_all(&register).await;
        assert!(report.changes.is_empty());
        let entry = list.get(&fnnr("FN123456a")).unwrap();
        assert!(entry.last_checked_at >= first_checked);
    }

    #[tokio::test]
    async fn fetch_failure_does_not_abort_the_sweep() {
        let register = FakeRegister::new(vec![(
            "FN999999i",
            Ok(extract("FN999999i", "Andere GmbH", "aktiv")),
        )]);
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);
        list.add(fnnr("FN999999i"), None);

        let report = list.check_all(&register).await;
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].1, FbError::NotFound(_)));
        // the healthy company still got its baseline
        assert!(list.get(&fnnr("FN999999i")).unwrap().last_snapshot.is_some());
    }

    #[tokio::test]
    async fn disabled_entries_are_skipped() {
        let register = FakeRegister::new(vec![]);
        let mut list = Watchlist::new();
        list.add(fnnr("FN123456a"), None);
        list.set_enabled(&fnnr("FN123456a"), false);

        let report = list.check_all(&register).await;
        assert!(report.failures.is_empty());
        assert!(list.get(&fnnr("FN123456a")).unwrap().last_checked_at.is_none());
    }

    #[test]
    fn canonical_form_is_order_insensitive() {
        let a = extract("FN123456a", "Muster GmbH", "aktiv");
        let canonical = canonicalize(&a).unwrap();
        // rebuilt from a differently-ordered JSON text, the bytes still match
        let text = serde_json::to_string(&canonical).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert!(snapshots_equal(&canonical, &reparsed));
    }
}
