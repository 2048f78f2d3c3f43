//! Persistence for uploaded OpenAPI documents.
//!
//! ```rust
//! use fstore::{NewSpec, SpecStore, StoreConfig, create_spec_store};
//! use serde_json::json;
//!
//! let store = create_spec_store(StoreConfig::InMemory).expect("store should open");
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//!
//! runtime.block_on(async {
//!     let stored = store
//!         .create(NewSpec::new("petstore", json!({"openapi": "3.0.0"})))
//!         .await
//!         .expect("spec should save");
//!     let found = store.find(&stored.id).await.expect("lookup should work");
//!     assert_eq!(found.map(|spec| spec.name), Some("petstore".to_string()));
//! });
//! ```

mod backends;
mod error;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        FilesystemSpecStore, InMemorySpecStore, NewSpec, SpecStore, SqliteSpecStore, StoreConfig,
        StoreError, StoreErrorKind, StoredSpec, create_default_spec_store, create_spec_store,
    };
}

pub use error::{StoreError, StoreErrorKind};
pub use store::{
    FilesystemSpecStore, InMemorySpecStore, SpecStore, SqliteSpecStore, StoreConfig,
    create_default_spec_store, create_spec_store, default_filesystem_root, default_sqlite_path,
};
pub use types::{NewSpec, StoredSpec};

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use fcommon::SpecId;
    use serde_json::json;

    use crate::{
        FilesystemSpecStore, InMemorySpecStore, NewSpec, SpecStore, SqliteSpecStore, StoreConfig,
        StoreErrorKind, create_spec_store,
    };

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("fstore-{prefix}-{unique}"))
    }

    fn petstore() -> serde_json::Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {
                "/pets": {"get": {"operationId": "listPets", "responses": {"200": {"description": "OK"}}}},
                "/pets/{petId}": {"get": {"operationId": "showPet", "responses": {"200": {"description": "OK"}}}}
            }
        })
    }

    async fn exercise_store(store: &dyn SpecStore) {
        let first = store
            .create(NewSpec::new("petstore", petstore()))
            .await
            .expect("first spec should save");
        let second = store
            .create(NewSpec::new("weather", json!({"openapi": "3.1.0"})))
            .await
            .expect("second spec should save");
        assert_ne!(first.id, second.id);

        let found = store
            .find(&first.id)
            .await
            .expect("find should succeed")
            .expect("first spec should exist");
        assert_eq!(found.name, "petstore");
        assert_eq!(found.document, petstore());
        assert_eq!(found.created_at, first.created_at);

        let listed = store.list().await.expect("list should succeed");
        let names = listed.iter().map(|spec| spec.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["petstore", "weather"]);

        store.delete(&first.id).await.expect("delete should succeed");
        store
            .delete(&first.id)
            .await
            .expect("repeated delete should succeed");
        assert!(
            store
                .find(&first.id)
                .await
                .expect("find should succeed")
                .is_none()
        );
        assert_eq!(store.list().await.expect("list should succeed").len(), 1);
    }

    #[tokio::test]
    async fn in_memory_store_round_trips_specs() {
        exercise_store(&InMemorySpecStore::new()).await;
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_specs() {
        let store = SqliteSpecStore::new_in_memory().expect("sqlite store should open");
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn filesystem_store_round_trips_specs() {
        let root = temp_dir("roundtrip");
        let store = FilesystemSpecStore::new(&root).expect("filesystem store should open");
        exercise_store(&store).await;
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn document_key_order_survives_persistence() {
        let path = temp_dir("order").join("specs.sqlite3");
        let store = SqliteSpecStore::new(&path).expect("sqlite store should open");
        let stored = store
            .create(NewSpec::new("petstore", petstore()))
            .await
            .expect("spec should save");
        drop(store);

        let reopened = SqliteSpecStore::new(&path).expect("sqlite store should reopen");
        let found = reopened
            .find(&stored.id)
            .await
            .expect("find should succeed")
            .expect("spec should survive reopen");
        let paths = found.document["paths"]
            .as_object()
            .expect("paths should be an object")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["/pets", "/pets/{petId}"]);

        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[tokio::test]
    async fn filesystem_store_lists_in_creation_order_after_reopen() {
        let root = temp_dir("reopen");
        let store = FilesystemSpecStore::new(&root).expect("filesystem store should open");
        for name in ["a", "b", "c"] {
            store
                .create(NewSpec::new(name, json!({})))
                .await
                .expect("spec should save");
        }
        drop(store);

        let reopened = FilesystemSpecStore::new(&root).expect("filesystem store should reopen");
        let names = reopened
            .list()
            .await
            .expect("list should succeed")
            .into_iter()
            .map(|spec| spec.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn ids_are_unique_uuids() {
        let store = create_spec_store(StoreConfig::InMemory).expect("store should open");
        let mut seen = HashSet::new();
        for _ in 0..16 {
            let stored = store
                .create(NewSpec::new("spec", json!({})))
                .await
                .expect("spec should save");
            assert_eq!(stored.id.as_str().len(), 36);
            assert!(seen.insert(stored.id));
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_names_and_find_misses_unknown_ids() {
        let store = InMemorySpecStore::new();
        let error = store
            .create(NewSpec::new("  ", json!({})))
            .await
            .expect_err("blank name should fail");
        assert_eq!(error.kind, StoreErrorKind::InvalidRequest);

        assert!(
            store
                .find(&SpecId::from("missing"))
                .await
                .expect("find should succeed")
                .is_none()
        );
    }
}
