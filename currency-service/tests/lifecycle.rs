//! End-to-end lifecycle tests over the in-memory store

use currency_service::{Currency, CurrencyCatalog, Denomination, DenominationSpec, Error};
use revision_store::{MemoryStore, RevisionAction, Versioned};
use rust_decimal::Decimal;

fn catalog() -> CurrencyCatalog<MemoryStore<Currency>, MemoryStore<Denomination>> {
    CurrencyCatalog::new(MemoryStore::new(), MemoryStore::new())
}

fn euro() -> Currency {
    Currency {
        name: "Euro".to_string(),
        code: "EUR".to_string(),
        symbol: Some("€".to_string()),
    }
}

fn spec(cents: i64, description: Option<&str>) -> DenominationSpec {
    DenominationSpec {
        value: Decimal::new(cents, 2),
        description: description.map(str::to_string),
    }
}

fn by_value(
    denominations: &[Versioned<Denomination>],
    cents: i64,
) -> &Versioned<Denomination> {
    denominations
        .iter()
        .find(|d| d.entity.value == Decimal::new(cents, 2))
        .unwrap_or_else(|| panic!("no denomination with value {cents}"))
}

#[tokio::test]
async fn repeated_identical_update_is_a_noop() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, Some("one")), spec(200, None)])
        .await
        .unwrap();
    let key = created.currency.key();

    let snapshot = catalog
        .update(key, euro(), vec![spec(100, Some("one")), spec(200, None)])
        .await
        .unwrap();

    assert_eq!(
        snapshot.currency.revision.action,
        RevisionAction::Unmodified
    );
    assert!(snapshot
        .denominations
        .iter()
        .all(|d| d.revision.action == RevisionAction::Unmodified));
    // No revision was written anywhere: everything is still at number 1.
    assert_eq!(snapshot.currency.revision.number, 1);
    assert!(snapshot
        .denominations
        .iter()
        .all(|d| d.revision.number == 1));
}

#[tokio::test]
async fn description_change_updates_and_new_value_creates() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, Some("one"))])
        .await
        .unwrap();
    let key = created.currency.key();

    let snapshot = catalog
        .update(
            key,
            euro(),
            vec![spec(100, Some("one coin")), spec(200, None)],
        )
        .await
        .unwrap();

    assert_eq!(snapshot.denominations.len(), 2);

    let one = by_value(&snapshot.denominations, 100);
    assert_eq!(one.revision.action, RevisionAction::Updated);
    assert_eq!(one.revision.number, 2);
    assert_eq!(one.entity.description.as_deref(), Some("one coin"));
    // The logical key survives the update
    assert_eq!(one.key(), by_value(&created.denominations, 100).key());

    let two = by_value(&snapshot.denominations, 200);
    assert_eq!(two.revision.action, RevisionAction::Created);
    assert_eq!(two.revision.number, 1);
}

#[tokio::test]
async fn missing_value_deletes_and_survivor_is_unmodified() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();
    let key = created.currency.key();

    let snapshot = catalog.update(key, euro(), vec![spec(100, None)]).await.unwrap();

    let one = by_value(&snapshot.denominations, 100);
    assert_eq!(one.revision.action, RevisionAction::Unmodified);

    let two = by_value(&snapshot.denominations, 200);
    assert_eq!(two.revision.action, RevisionAction::Deleted);
    assert_eq!(two.revision.number, 2);
}

#[tokio::test]
async fn resupplied_value_is_restored_under_its_original_key() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();
    let key = created.currency.key();
    let original_two_key = by_value(&created.denominations, 200).key();

    // Drop 2.00, then supply it again.
    catalog
        .update(key, euro(), vec![spec(100, None)])
        .await
        .unwrap();
    let snapshot = catalog
        .update(key, euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();

    let two = by_value(&snapshot.denominations, 200);
    assert_eq!(two.revision.action, RevisionAction::Restored);
    assert_eq!(two.key(), original_two_key);
    assert_eq!(two.revision.number, 3);
}

#[tokio::test]
async fn values_match_regardless_of_trailing_zeros() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, None)])
        .await
        .unwrap();
    let key = created.currency.key();

    // "1" and "1.00" are the same monetary value.
    let snapshot = catalog
        .update(
            key,
            euro(),
            vec![DenominationSpec {
                value: Decimal::new(1, 0),
                description: None,
            }],
        )
        .await
        .unwrap();

    assert_eq!(snapshot.denominations.len(), 1);
    assert_eq!(
        snapshot.denominations[0].revision.action,
        RevisionAction::Unmodified
    );
}

#[tokio::test]
async fn point_in_time_lookup_resolves_the_earlier_state() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, Some("first"))])
        .await
        .unwrap();
    let key = created.currency.key();
    let created_at = created.currency.revision.created_at;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    catalog
        .update(key, euro(), vec![spec(100, Some("second")), spec(200, None)])
        .await
        .unwrap();

    let at_creation = catalog.get_revision(key, created_at).await.unwrap();
    assert_eq!(at_creation.denominations.len(), 1);
    assert_eq!(
        at_creation.denominations[0].entity.description.as_deref(),
        Some("first")
    );

    let now = chrono::Utc::now();
    let latest = catalog.get_revision(key, now).await.unwrap();
    assert_eq!(latest.denominations.len(), 2);

    let before = catalog
        .get_revision(key, created_at - chrono::Duration::seconds(1))
        .await;
    assert!(matches!(before, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn history_has_one_slice_per_transaction() {
    let catalog = catalog();
    let created = catalog.create(euro(), vec![spec(100, None)]).await.unwrap();
    let key = created.currency.key();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    catalog
        .update(key, euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    catalog
        .update(key, euro(), vec![spec(200, None)])
        .await
        .unwrap();

    let history = catalog.get_all_revisions(key).await.unwrap();
    assert_eq!(history.len(), 3);

    // Newest slice: 1.00 was deleted here, 2.00 carried forward.
    let newest = &history[0];
    assert_eq!(
        newest.currency.revision.action,
        RevisionAction::Unmodified
    );
    assert_eq!(
        by_value(&newest.denominations, 100).revision.action,
        RevisionAction::Deleted
    );
    assert_eq!(
        by_value(&newest.denominations, 200).revision.action,
        RevisionAction::Unmodified
    );

    // Middle slice: 2.00 appeared here.
    let middle = &history[1];
    assert_eq!(
        by_value(&middle.denominations, 200).revision.action,
        RevisionAction::Created
    );
    assert_eq!(
        by_value(&middle.denominations, 100).revision.action,
        RevisionAction::Unmodified
    );

    // Oldest slice reads exactly as persisted.
    let oldest = &history[2];
    assert_eq!(oldest.currency.revision.action, RevisionAction::Created);
    assert_eq!(oldest.denominations.len(), 1);
    assert_eq!(
        oldest.denominations[0].revision.action,
        RevisionAction::Created
    );
}

#[tokio::test]
async fn sequential_renames_read_back_with_decreasing_numbers() {
    let catalog = catalog();
    let created = catalog.create(euro(), vec![]).await.unwrap();
    let key = created.currency.key();

    for name in ["Euro A", "Euro B", "Euro C"] {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        catalog
            .update(
                key,
                Currency {
                    name: name.to_string(),
                    code: "EUR".to_string(),
                    symbol: None,
                },
                vec![],
            )
            .await
            .unwrap();
    }

    let history = catalog.get_all_revisions(key).await.unwrap();
    assert_eq!(history.len(), 4);

    let numbers: Vec<i32> = history
        .iter()
        .map(|s| s.currency.revision.number)
        .collect();
    assert_eq!(numbers, vec![4, 3, 2, 1]);

    assert_eq!(history[0].currency.entity.name, "Euro C");
    assert_eq!(history[0].currency.revision.action, RevisionAction::Updated);
    assert_eq!(history[3].currency.entity.name, "Euro");
    assert_eq!(history[3].currency.revision.action, RevisionAction::Created);
}

#[tokio::test]
async fn delete_cascades_and_history_remains_queryable() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();
    let key = created.currency.key();
    let denom_key = by_value(&created.denominations, 100).key();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let deleted = catalog.delete(key).await.unwrap();

    assert_eq!(deleted.currency.revision.action, RevisionAction::Deleted);
    assert_eq!(deleted.denominations.len(), 2);

    // The live read surface refuses the deleted aggregate...
    assert!(matches!(catalog.get(key).await, Err(Error::NotFound(_))));
    assert!(catalog.get_all().await.unwrap().is_empty());

    // ...but the audit surfaces still serve it.
    let history = catalog.get_all_revisions(key).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].currency.revision.action, RevisionAction::Deleted);

    let revisions = catalog.get_denomination_revisions(denom_key).await.unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].revision.action, RevisionAction::Deleted);
    assert_eq!(revisions[1].revision.action, RevisionAction::Created);
}

#[tokio::test]
async fn rocksdb_backed_catalog_survives_reopen() {
    use revision_store::RocksStore;
    use tempfile::TempDir;

    let temp = TempDir::new().unwrap();
    let currency_path = temp.path().join("currencies");
    let denomination_path = temp.path().join("denominations");
    let key;

    {
        let catalog = CurrencyCatalog::new(
            RocksStore::open(&currency_path).unwrap(),
            RocksStore::open(&denomination_path).unwrap(),
        );
        let created = catalog
            .create(euro(), vec![spec(100, None), spec(200, None)])
            .await
            .unwrap();
        key = created.currency.key();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let snapshot = catalog
            .update(key, euro(), vec![spec(100, Some("one")), spec(500, None)])
            .await
            .unwrap();

        assert_eq!(
            by_value(&snapshot.denominations, 100).revision.action,
            RevisionAction::Updated
        );
        assert_eq!(
            by_value(&snapshot.denominations, 200).revision.action,
            RevisionAction::Deleted
        );
        assert_eq!(
            by_value(&snapshot.denominations, 500).revision.action,
            RevisionAction::Created
        );
    }

    // Reopen from disk: the current state and the full history survive.
    let catalog = CurrencyCatalog::new(
        RocksStore::open(&currency_path).unwrap(),
        RocksStore::open(&denomination_path).unwrap(),
    );

    let current = catalog.get(key).await.unwrap();
    assert_eq!(current.currency.entity.code, "EUR");

    let history = catalog.get_all_revisions(key).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        by_value(&history[0].denominations, 500).revision.action,
        RevisionAction::Created
    );
    assert_eq!(
        history[1].currency.revision.action,
        RevisionAction::Created
    );
}

#[tokio::test]
async fn every_revision_of_one_request_shares_its_timestamp() {
    let catalog = catalog();
    let created = catalog
        .create(euro(), vec![spec(100, None), spec(200, None)])
        .await
        .unwrap();
    let key = created.currency.key();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let renamed = Currency {
        name: "Common Euro".to_string(),
        code: "EUR".to_string(),
        symbol: None,
    };
    let snapshot = catalog
        .update(key, renamed, vec![spec(100, Some("one")), spec(500, None)])
        .await
        .unwrap();

    let ts = snapshot.currency.revision.created_at;
    assert!(snapshot
        .denominations
        .iter()
        .filter(|d| d.revision.action != RevisionAction::Unmodified)
        .all(|d| d.revision.created_at == ts));
}
