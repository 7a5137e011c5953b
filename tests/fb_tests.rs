#![cfg(feature = "fb")]

use std::collections::HashMap;
use std::sync::Mutex;

use fiskal::core::FnNr;
use fiskal::fb::{CompanyExtract, FbError, RegisterClient, Watchlist, WatchlistStore};

struct FakeRegister {
    extracts: Mutex<HashMap<String, CompanyExtract>>,
}

impl FakeRegister {
    fn new(extracts: Vec<CompanyExtract>) -> Self {
        let extracts = extracts
            .into_iter()
            .map(|e| (e.number.to_string(), e))
            .collect();
        Self {
            extracts: Mutex::new(extracts),
        }
    }

    fn update(&self, extract: CompanyExtract) {
        self.extracts
            .lock()
            .unwrap()
            .insert(extract.number.to_string(), extract);
    }
}

impl RegisterClient for FakeRegister {
    async fn fetch_extract(&self, number: &FnNr) -> Result<CompanyExtract, FbError> {
        self.extracts
            .lock()
            .unwrap()
            .get(&number.to_string())
            .cloned()
            .ok_or_else(|| FbError::NotFound(number.to_string()))
    }
}

fn fnnr(s: &str) -> FnNr {
    FnNr::parse(s).unwrap()
}

fn extract(number: &str, status: &str) -> CompanyExtract {
    CompanyExtract {
        number: fnnr(number),
        name: "Muster GmbH".to_string(),
        legal_form: "GmbH".to_string(),
        seat: "Wien".to_string(),
        address: "Opernring 1, 1010 Wien".to_string(),
        status: status.to_string(),
    }
}

#[tokio::test]
async fn first_check_seeds_the_baseline() {
    let register = FakeRegister::new(vec![extract("FN123456a", "aktiv")]);
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN123456a"), Some("Hauptkunde".to_string()));

    let report = watchlist.check_all(&register).await;
    assert!(report.changes.is_empty());
    assert!(report.failures.is_empty());

    let entry = watchlist.get(&fnnr("FN123456a")).unwrap();
    assert_eq!(entry.last_status.as_deref(), Some("aktiv"));
    assert!(entry.last_snapshot.is_some());
    assert!(entry.last_checked_at.is_some());
}

#[tokio::test]
async fn status_change_is_reported_once() {
    let register = FakeRegister::new(vec![extract("FN123456a", "aktiv")]);
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN123456a"), None);
    watchlist.check_all(&register).await;

    register.update(extract("FN123456a", "in Liquidation"));
    let report = watchlist.check_all(&register).await;
    assert_eq!(report.changes.len(), 1);
    let change = &report.changes[0];
    assert_eq!(change.number, fnnr("FN123456a"));
    assert_eq!(change.previous["status"], "aktiv");
    assert_eq!(change.current["status"], "in Liquidation");

    // unchanged on the next sweep
    let report = watchlist.check_all(&register).await;
    assert!(report.changes.is_empty());
}

#[tokio::test]
async fn fetch_failures_do_not_abort_the_sweep() {
    let register = FakeRegister::new(vec![extract("FN123456a", "aktiv")]);
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN999999i"), None);
    watchlist.add(fnnr("FN123456a"), None);

    let report = watchlist.check_all(&register).await;
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, fnnr("FN999999i"));
    assert_eq!(report.failures[0].1.kind(), "not-found");
    assert!(
        watchlist
            .get(&fnnr("FN123456a"))
            .unwrap()
            .last_snapshot
            .is_some()
    );
}

#[tokio::test]
async fn disabled_entries_are_skipped() {
    let register = FakeRegister::new(vec![extract("FN123456a", "aktiv")]);
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN123456a"), None);
    assert!(watchlist.set_enabled(&fnnr("FN123456a"), false));

    watchlist.check_all(&register).await;
    assert!(watchlist.get(&fnnr("FN123456a")).unwrap().last_checked_at.is_none());
}

#[test]
fn add_is_an_upsert_and_remove_reports() {
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN123456a"), None);
    watchlist.add(fnnr("FN123456a"), Some("neu".to_string()));
    assert_eq!(watchlist.len(), 1);
    assert_eq!(
        watchlist.get(&fnnr("FN123456a")).unwrap().note.as_deref(),
        Some("neu")
    );

    assert!(watchlist.remove(&fnnr("FN123456a")));
    assert!(!watchlist.remove(&fnnr("FN123456a")));
    assert!(watchlist.is_empty());
}

#[tokio::test]
async fn store_round_trip_preserves_check_state() {
    let register = FakeRegister::new(vec![extract("FN123456a", "aktiv")]);
    let mut watchlist = Watchlist::new();
    watchlist.add(fnnr("FN123456a"), Some("Hauptkunde".to_string()));
    watchlist.check_all(&register).await;

    let path = std::env::temp_dir().join(format!("fb-watchlist-{}.json", std::process::id()));
    let store = WatchlistStore::new(path.as_path());
    store.save(&watchlist).unwrap();
    let loaded = store.load().unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, watchlist);
}

#[test]
fn missing_store_file_yields_an_empty_list() {
    let store = WatchlistStore::new("/nonexistent/dir/does-not-exist.json");
    let loaded = store.load().unwrap();
    assert!(loaded.is_empty());
}
