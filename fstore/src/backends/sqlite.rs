use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use fcommon::{BoxFuture, SpecId};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::backends::{decode_system_time, encode_system_time};
use crate::error::StoreError;
use crate::store::{SpecStore, new_spec_id};
use crate::types::{NewSpec, StoredSpec};

type SpecRow = (String, String, String, i64, i64);

#[derive(Debug)]
pub struct SqliteSpecStore {
    connection: Mutex<Connection>,
}

impl SqliteSpecStore {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                StoreError::storage(format!("failed to create sqlite parent directory: {error}"))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            StoreError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    pub fn new_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            StoreError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                StoreError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            CREATE TABLE IF NOT EXISTS openapi_specs (
                position INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                document_json TEXT NOT NULL,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL
            );
            ",
        )
        .map_err(|error| {
            StoreError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }
}

impl SpecStore for SqliteSpecStore {
    fn create<'a>(&'a self, spec: NewSpec) -> BoxFuture<'a, Result<StoredSpec, StoreError>> {
        Box::pin(async move {
            spec.validate()?;
            let stored = StoredSpec::from_new(new_spec_id(), spec);
            let document_json = serde_json::to_string(&stored.document).map_err(|error| {
                StoreError::invalid_request(format!("failed to serialize spec document: {error}"))
            })?;
            let (secs, nanos) = encode_system_time(stored.created_at)?;

            let conn = self.connection()?;
            conn.execute(
                "
                INSERT INTO openapi_specs (
                    id,
                    name,
                    document_json,
                    created_at_secs,
                    created_at_nanos
                )
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
                params![stored.id.as_str(), &stored.name, document_json, secs, nanos],
            )
            .map_err(|error| StoreError::storage(format!("failed to insert spec: {error}")))?;

            Ok(stored)
        })
    }

    fn find<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<Option<StoredSpec>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    "
                    SELECT id, name, document_json, created_at_secs, created_at_nanos
                    FROM openapi_specs
                    WHERE id = ?1
                    ",
                    params![id.as_str()],
                    read_row,
                )
                .optional()
                .map_err(|error| StoreError::storage(format!("failed to load spec: {error}")))?;

            row.map(row_to_spec).transpose()
        })
    }

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StoredSpec>, StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut statement = conn
                .prepare(
                    "
                    SELECT id, name, document_json, created_at_secs, created_at_nanos
                    FROM openapi_specs
                    ORDER BY position ASC
                    ",
                )
                .map_err(|error| {
                    StoreError::storage(format!("failed to prepare spec list query: {error}"))
                })?;
            let rows = statement
                .query_map([], read_row)
                .map_err(|error| StoreError::storage(format!("failed to list specs: {error}")))?;

            let mut specs = Vec::new();
            for row in rows {
                let row = row
                    .map_err(|error| StoreError::storage(format!("failed to read spec row: {error}")))?;
                specs.push(row_to_spec(row)?);
            }
            Ok(specs)
        })
    }

    fn delete<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "DELETE FROM openapi_specs WHERE id = ?1",
                params![id.as_str()],
            )
            .map_err(|error| StoreError::storage(format!("failed to delete spec: {error}")))?;
            Ok(())
        })
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SpecRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn row_to_spec((id, name, document_json, secs, nanos): SpecRow) -> Result<StoredSpec, StoreError> {
    let document = serde_json::from_str::<Value>(&document_json).map_err(|error| {
        StoreError::corrupted(format!("failed to deserialize spec document '{id}': {error}"))
    })?;

    Ok(StoredSpec {
        id: SpecId::new(id),
        name,
        document,
        created_at: decode_system_time(secs, nanos)?,
    })
}

/// `FSTORE_SQLITE_PATH`, else `~/.specagent/fstore.sqlite3`.
pub fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("FSTORE_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".specagent").join("fstore.sqlite3");
    }

    PathBuf::from("fstore.sqlite3")
}
