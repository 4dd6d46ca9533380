//! Persistence of user ingredients and placements.
//!
//! Storage is split into a raw [`BlobStore`] (string payloads by key) and the typed
//! [`BentoStorage`] facade on top of it. Every save overwrites the whole collection.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::warn;

use crate::model::{BentoBox, Item, PlacedItem};

/// Key under which user-created ingredients are stored.
pub const USER_ITEMS_KEY: &str = "user_ingredients";
/// Key under which the current placements are stored.
pub const PLACEMENTS_KEY: &str = "bento_state";
/// Key under which the served box is stored, so partition ids survive restarts.
pub const BOX_KEY: &str = "bento_box";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("could not serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw key/value persistence for JSON payloads.
pub trait BlobStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    fn read(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn write(&self, key: &str, payload: String)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

fn io_error(key: &str, source: io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl BlobStore for JsonFileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(key, err)),
        }
    }

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|err| io_error(key, err))?;

        // Write next to the target and rename so readers never see a partial file.
        let target = self.path_for(key);
        let staging = self.root.join(format!("{key}.json.tmp"));
        let result = match tokio::fs::write(&staging, payload).await {
            Ok(()) => tokio::fs::rename(&staging, &target).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            // the write error wins over a failed cleanup
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error(key, err));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(key, err)),
        }
    }
}

/// In-process store, mainly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError> {
        self.blobs.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

/// Runtime choice between the file and memory stores.
#[derive(Clone, Debug)]
pub enum StoreBackend {
    File(JsonFileStore),
    Memory(MemoryStore),
}

impl BlobStore for StoreBackend {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            StoreBackend::File(store) => store.read(key).await,
            StoreBackend::Memory(store) => store.read(key).await,
        }
    }

    async fn write(&self, key: &str, payload: String) -> Result<(), StoreError> {
        match self {
            StoreBackend::File(store) => store.write(key, payload).await,
            StoreBackend::Memory(store) => store.write(key, payload).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self {
            StoreBackend::File(store) => store.remove(key).await,
            StoreBackend::Memory(store) => store.remove(key).await,
        }
    }
}

/// Typed access to the persisted collections.
///
/// A missing or unreadable payload loads as an empty collection. Store failures
/// are returned unchanged.
#[derive(Clone, Debug)]
pub struct BentoStorage<S> {
    store: S,
}

impl<S: BlobStore> BentoStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn load_items(&self) -> Result<Vec<Item>, StoreError> {
        self.load_list(USER_ITEMS_KEY).await
    }

    pub async fn save_items(&self, items: &[Item]) -> Result<(), StoreError> {
        self.save_list(USER_ITEMS_KEY, items).await
    }

    /// Appends `item` to the stored user items and returns the new collection.
    pub async fn add_user_item(&self, item: Item) -> Result<Vec<Item>, StoreError> {
        let mut items = self.load_items().await?;
        items.push(item);
        self.save_items(&items).await?;
        Ok(items)
    }

    /// Returns `false` when no user item had the given id.
    pub async fn remove_user_item(&self, item_id: &str) -> Result<bool, StoreError> {
        let items = self.load_items().await?;
        let before = items.len();
        let remaining: Vec<Item> = items.into_iter().filter(|i| i.id != item_id).collect();
        if remaining.len() == before {
            return Ok(false);
        }
        self.save_items(&remaining).await?;
        Ok(true)
    }

    pub async fn load_placements(&self) -> Result<Vec<PlacedItem>, StoreError> {
        self.load_list(PLACEMENTS_KEY).await
    }

    pub async fn save_placements(&self, placements: &[PlacedItem]) -> Result<(), StoreError> {
        self.save_list(PLACEMENTS_KEY, placements).await
    }

    pub async fn clear_placements(&self) -> Result<(), StoreError> {
        self.store.remove(PLACEMENTS_KEY).await
    }

    /// Returns `None` when no box is stored or the stored box is unreadable.
    pub async fn load_box(&self) -> Result<Option<BentoBox>, StoreError> {
        let Some(payload) = self.store.read(BOX_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(bento) => Ok(Some(bento)),
            Err(err) => {
                warn!(key = BOX_KEY, error = %err, "stored box is unreadable, ignoring it");
                Ok(None)
            }
        }
    }

    pub async fn save_box(&self, bento: &BentoBox) -> Result<(), StoreError> {
        let payload = serde_json::to_string(bento).map_err(|source| StoreError::Serialize {
            key: BOX_KEY.to_string(),
            source,
        })?;
        self.store.write(BOX_KEY, payload).await
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let Some(payload) = self.store.read(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&payload) {
            Ok(list) => Ok(list),
            Err(err) => {
                warn!(key, error = %err, "stored payload is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(list).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.write(key, payload).await
    }
}
