//! Tracking Set Integration Tests
//!
//! Merges against a file-backed SQLite database shared by several pools,
//! the way separate processes would see it.

use std::sync::Arc;

use avagama_backend::services::tracking::{
    merge_discovered_names, SqliteTrackingStore, TrackingStore,
};
use avagama_backend::storage::database::Database;
use avagama_backend::{DiscoveryType, NameList};

fn names(items: &[&str]) -> NameList {
    items.iter().collect()
}

#[test]
fn test_union_survives_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("avagama.db");

    {
        let store = SqliteTrackingStore::new(Database::open(&path).unwrap());
        merge_discovered_names(&store, "owner-1", DiscoveryType::Company, &names(&["A", "B"]))
            .unwrap();
    }

    let store = SqliteTrackingStore::new(Database::open(&path).unwrap());
    let added =
        merge_discovered_names(&store, "owner-1", DiscoveryType::Company, &names(&["B", "C"]))
            .unwrap();
    assert_eq!(added, 1);

    let members = store.members("owner-1", DiscoveryType::Company).unwrap();
    assert_eq!(members.into_vec(), ["A", "B", "C"]);
}

#[test]
fn test_empty_merge_leaves_set_unchanged() {
    let store = SqliteTrackingStore::new(Database::new_in_memory().unwrap());
    merge_discovered_names(&store, "owner-1", DiscoveryType::Domain, &names(&["A"])).unwrap();

    let added =
        merge_discovered_names(&store, "owner-1", DiscoveryType::Domain, &NameList::new()).unwrap();
    assert_eq!(added, 0);
    assert_eq!(
        store.members("owner-1", DiscoveryType::Domain).unwrap().into_vec(),
        ["A"]
    );
}

#[test]
fn test_concurrent_merges_from_separate_pools() {
    let tmp = tempfile::tempdir().unwrap();
    let path = Arc::new(tmp.path().join("avagama.db"));
    Database::open(&path).unwrap();

    let handles: Vec<_> = ["A", "B", "C", "D"]
        .into_iter()
        .map(|name| {
            let path = Arc::clone(&path);
            std::thread::spawn(move || {
                let store = SqliteTrackingStore::new(Database::open(&path).unwrap());
                for round in 0..10 {
                    let numbered = format!("{}-{}", name, round);
                    let batch = names(&[name, numbered.as_str()]);
                    merge_discovered_names(&store, "owner-1", DiscoveryType::Domain, &batch)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let store = SqliteTrackingStore::new(Database::open(&path).unwrap());
    let members = store.members("owner-1", DiscoveryType::Domain).unwrap();
    assert_eq!(members.len(), 44);
    for name in ["A", "B", "C", "D"] {
        assert!(members.contains(name));
        assert!(members.contains(&format!("{}-9", name)));
    }
}
