//! Migration between two tenants of the filesystem store.
//!
//! Run with `cargo test -p nodb-helpers --test migration_test`.

use nodb_helpers::{DataMigrator, DataMigratorOptions, MigrationError};
use nodb_storage::{
    create_nodb, BasicQueries, CancellationToken, CreateCommand, NoDbConfig, NoDbServices,
    StoreErrorKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entry {
    id: String,
    v: i64,
}

fn entry(id: &str, v: i64) -> Entry {
    Entry {
        id: id.to_string(),
        v,
    }
}

async fn seeded_store() -> (TempDir, NoDbServices<Entry>) {
    let dir = tempdir().unwrap();
    let services = create_nodb::<Entry>(&NoDbConfig::new(dir.path())).services();
    let cancel = CancellationToken::new();
    for e in [entry("k1", 1), entry("k2", 2)] {
        services
            .create_command()
            .create("A", &e.id, &e, &cancel)
            .await
            .unwrap();
    }
    (dir, services)
}

fn migrator(services: &NoDbServices<Entry>, continue_after_error: bool) -> DataMigrator<Entry> {
    DataMigrator::new(
        Arc::new(|e: &Entry| e.id.clone()),
        services.get_all_query(),
        services.create_command(),
    )
    .with_options(DataMigratorOptions {
        continue_after_error,
    })
}

#[tokio::test]
async fn migrates_into_empty_tenant() {
    let (_dir, services) = seeded_store().await;
    let cancel = CancellationToken::new();

    let ok = migrator(&services, false).migrate_data("A", "B").await.unwrap();
    assert!(ok);

    let queries = services.queries();
    assert_eq!(queries.fetch("B", "k1", &cancel).await.unwrap(), Some(entry("k1", 1)));
    assert_eq!(queries.fetch("B", "k2", &cancel).await.unwrap(), Some(entry("k2", 2)));
    assert_eq!(queries.count("A", &cancel).await.unwrap(), 2);
}

#[tokio::test]
async fn continue_after_error_migrates_the_rest() {
    let (_dir, services) = seeded_store().await;
    let cancel = CancellationToken::new();
    services
        .create_command()
        .create("B", "k1", &entry("k1", 100), &cancel)
        .await
        .unwrap();

    let report = migrator(&services, true).migrate("A", "B").await.unwrap();
    assert!(report.had_errors());
    assert_eq!(report.migrated_count(), 1);
    assert_eq!(report.failed_count(), 1);

    let ok = migrator(&services, true).migrate_data("A", "B").await.unwrap();
    assert!(!ok);

    let queries = services.queries();
    assert_eq!(queries.fetch("B", "k2", &cancel).await.unwrap(), Some(entry("k2", 2)));
    // The pre-existing destination item is left untouched.
    assert_eq!(
        queries.fetch("B", "k1", &cancel).await.unwrap(),
        Some(entry("k1", 100))
    );
}

#[tokio::test]
async fn abort_on_error_leaves_later_items_unmigrated() {
    let dir = tempdir().unwrap();
    let services = create_nodb::<Entry>(&NoDbConfig::new(dir.path())).services();
    let cancel = CancellationToken::new();
    let create = services.create_command();
    create.create("A", "k1", &entry("k1", 1), &cancel).await.unwrap();
    create.create("B", "k1", &entry("k1", 100), &cancel).await.unwrap();
    create.create("A", "k2", &entry("k2", 2), &cancel).await.unwrap();

    // get_all order is unspecified, so feed the migrator a source that lists k1 first.
    let items = services.get_all_query();
    let source = Arc::new(OrderedSource { inner: items });
    let migrator = DataMigrator::new(
        Arc::new(|e: &Entry| e.id.clone()),
        source,
        services.create_command(),
    );

    let result = migrator.migrate_data("A", "B").await;
    match result {
        Err(MigrationError::ItemFailed { key, source }) => {
            assert_eq!(key, "k1");
            assert_eq!(source.kind(), StoreErrorKind::AlreadyExists);
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert_eq!(services.queries().fetch("B", "k2", &cancel).await.unwrap(), None);
}

struct OrderedSource {
    inner: Arc<dyn nodb_storage::GetAllQuery<Entry>>,
}

#[async_trait::async_trait]
impl nodb_storage::GetAllQuery<Entry> for OrderedSource {
    async fn get_all(
        &self,
        project_id: &str,
        cancel: &CancellationToken,
    ) -> nodb_storage::StoreResult<Vec<Entry>> {
        let mut items = self.inner.get_all(project_id, cancel).await?;
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
