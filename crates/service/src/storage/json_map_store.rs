use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::StorageError;

/// Generic key-value map store, optionally persisted to a JSON file.
///
/// With a file path every mutation rewrites the file while the write lock is
/// still held, so concurrent writers cannot persist snapshots out of order.
/// A mutation only becomes visible once its snapshot has been written.
/// Without a path the store lives purely in memory.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: Option<PathBuf>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                let data = serde_json::to_vec(&empty).map_err(|e| StorageError::Encode(e.to_string()))?;
                fs::write(&file_path, data).await.map_err(|e| StorageError::Io(e.to_string()))?;
                empty
            }
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        debug!(path = %file_path.display(), entries = map.len(), "json map store opened");

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path: Some(file_path) }))
    }

    /// A store that is never written to disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: RwLock::new(HashMap::new()), file_path: None })
    }

    async fn persist(&self, map: &HashMap<K, V>) -> Result<(), StorageError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let data = serde_json::to_vec_pretty(map).map_err(|e| StorageError::Encode(e.to_string()))?;
        fs::write(path, data).await.map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }

    /// First value matching the predicate.
    pub async fn find<P>(&self, predicate: P) -> Option<V>
    where
        P: Fn(&V) -> bool,
    {
        let map = self.inner.read().await;
        map.values().find(|v| predicate(v)).cloned()
    }

    /// Apply a mutation to a copy of the map, persist it under the same lock,
    /// and swap it in only after the write succeeded.
    pub async fn update_map<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<T, E>,
        E: From<StorageError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *map = next;
        Ok(out)
    }
}
