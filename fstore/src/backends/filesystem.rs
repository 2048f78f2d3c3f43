use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use fcommon::{BoxFuture, SpecId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backends::{decode_system_time, encode_system_time};
use crate::error::StoreError;
use crate::store::{SpecStore, new_spec_id};
use crate::types::{NewSpec, StoredSpec};

/// Stores one JSON file per spec under `<root>/specs`.
#[derive(Debug)]
pub struct FilesystemSpecStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FilesystemSpecStore {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("specs")).map_err(|error| {
            StoreError::storage(format!("failed to create filesystem store root: {error}"))
        })?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::storage("filesystem store lock poisoned"))
    }

    fn specs_dir(&self) -> PathBuf {
        self.root.join("specs")
    }

    fn spec_path(&self, id: &SpecId) -> PathBuf {
        self.specs_dir()
            .join(format!("{}.json", hex_encode(id.as_str().as_bytes())))
    }

    fn load_file(path: &Path) -> Result<PersistedSpec, StoreError> {
        let bytes = fs::read(path)
            .map_err(|error| StoreError::storage(format!("failed to read spec file: {error}")))?;
        serde_json::from_slice::<PersistedSpec>(&bytes).map_err(|error| {
            StoreError::corrupted(format!(
                "failed to deserialize spec file '{}': {error}",
                path.display()
            ))
        })
    }

    fn load_all(&self) -> Result<Vec<PersistedSpec>, StoreError> {
        let entries = fs::read_dir(self.specs_dir()).map_err(|error| {
            StoreError::storage(format!("failed to read spec directory: {error}"))
        })?;

        let mut specs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| {
                StoreError::storage(format!("failed to read spec directory entry: {error}"))
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            specs.push(Self::load_file(&path)?);
        }
        specs.sort_by_key(|spec| spec.sequence);
        Ok(specs)
    }
}

impl SpecStore for FilesystemSpecStore {
    fn create<'a>(&'a self, spec: NewSpec) -> BoxFuture<'a, Result<StoredSpec, StoreError>> {
        Box::pin(async move {
            spec.validate()?;
            let _guard = self.lock()?;

            let sequence = self
                .load_all()?
                .last()
                .map_or(0, |spec| spec.sequence.saturating_add(1));
            let stored = StoredSpec::from_new(new_spec_id(), spec);
            let persisted = PersistedSpec::from_spec(&stored, sequence)?;
            let bytes = serde_json::to_vec_pretty(&persisted).map_err(|error| {
                StoreError::invalid_request(format!("failed to serialize spec: {error}"))
            })?;

            write_atomic(&self.spec_path(&stored.id), &bytes)?;
            Ok(stored)
        })
    }

    fn find<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<Option<StoredSpec>, StoreError>> {
        Box::pin(async move {
            let _guard = self.lock()?;
            let path = self.spec_path(id);
            if !path.exists() {
                return Ok(None);
            }
            Self::load_file(&path)?.into_spec().map(Some)
        })
    }

    fn list<'a>(&'a self) -> BoxFuture<'a, Result<Vec<StoredSpec>, StoreError>> {
        Box::pin(async move {
            let _guard = self.lock()?;
            self.load_all()?
                .into_iter()
                .map(PersistedSpec::into_spec)
                .collect()
        })
    }

    fn delete<'a>(&'a self, id: &'a SpecId) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let _guard = self.lock()?;
            let path = self.spec_path(id);
            if !path.exists() {
                return Ok(());
            }
            fs::remove_file(path)
                .map_err(|error| StoreError::storage(format!("failed to delete spec file: {error}")))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSpec {
    sequence: u64,
    id: String,
    name: String,
    document: Value,
    created_at_secs: i64,
    created_at_nanos: i64,
}

impl PersistedSpec {
    fn from_spec(spec: &StoredSpec, sequence: u64) -> Result<Self, StoreError> {
        let (created_at_secs, created_at_nanos) = encode_system_time(spec.created_at)?;
        Ok(Self {
            sequence,
            id: spec.id.as_str().to_string(),
            name: spec.name.clone(),
            document: spec.document.clone(),
            created_at_secs,
            created_at_nanos,
        })
    }

    fn into_spec(self) -> Result<StoredSpec, StoreError> {
        Ok(StoredSpec {
            id: SpecId::new(self.id),
            name: self.name,
            document: self.document,
            created_at: decode_system_time(self.created_at_secs, self.created_at_nanos)?,
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Err(StoreError::storage("spec file missing parent directory"));
    };
    fs::create_dir_all(parent).map_err(|error| {
        StoreError::storage(format!("failed to create parent directory: {error}"))
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).map_err(|error| {
        StoreError::storage(format!("failed to write temporary spec file: {error}"))
    })?;
    fs::rename(&tmp, path)
        .map_err(|error| StoreError::storage(format!("failed to finalize spec file: {error}")))
}

fn hex_encode(input: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push(HEX[usize::from(byte >> 4)] as char);
        output.push(HEX[usize::from(byte & 0x0f)] as char);
    }
    output
}

pub fn default_filesystem_root() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".specagent").join("fstore");
    }

    PathBuf::from("fstore")
}
