use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Directory of JSON documents, one per named collection.
///
/// `<data_dir>/<name>.json` holds `{"<name>": [record, ...]}`. Every call
/// re-reads or rewrites the whole file; nothing is cached between calls.
/// Writers to the same collection are serialized by a per-collection mutex,
/// readers never wait.
pub struct JsonCollectionStore {
    data_dir: PathBuf,
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl JsonCollectionStore {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Arc<Self> {
        Arc::new(Self { data_dir: data_dir.into(), write_locks: DashMap::new() })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Backing file of a collection.
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.data_dir.join(format!("{collection}.json"))
    }

    fn lock_for(&self, collection: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Read and parse the whole collection.
    pub async fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, ServiceError> {
        let path = self.path_for(collection);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(collection, path = %path.display(), "collection file missing");
                return Err(ServiceError::not_found(&format!("collection '{collection}'")));
            }
            Err(e) => return Err(ServiceError::Io(format!("{}: {e}", path.display()))),
        };

        let mut doc: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Format(format!("{}: {e}", path.display())))?;
        let records = doc
            .get_mut(collection)
            .map(Value::take)
            .ok_or_else(|| {
                ServiceError::Format(format!("{}: missing top-level field '{collection}'", path.display()))
            })?;
        let records: Vec<T> = serde_json::from_value(records)
            .map_err(|e| ServiceError::Format(format!("{}: {e}", path.display())))?;
        debug!(collection, count = records.len(), "collection loaded");
        Ok(records)
    }

    /// Overwrite the whole collection with `records`.
    pub async fn save<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), ServiceError> {
        let lock = self.lock_for(collection);
        let _guard = lock.lock().await;
        self.write_document(collection, records).await
    }

    /// Load, mutate and save under the collection's write lock.
    ///
    /// If `f` fails nothing is written.
    pub async fn update<T, R, F>(&self, collection: &str, f: F) -> Result<R, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let lock = self.lock_for(collection);
        let _guard = lock.lock().await;
        let mut records = self.load::<T>(collection).await?;
        let out = f(&mut records)?;
        self.write_document(collection, &records).await?;
        Ok(out)
    }

    /// Create an empty collection file when absent. Returns whether one was created.
    pub async fn ensure(&self, collection: &str) -> Result<bool, ServiceError> {
        let lock = self.lock_for(collection);
        let _guard = lock.lock().await;
        if fs::try_exists(self.path_for(collection))
            .await
            .map_err(|e| ServiceError::Io(e.to_string()))?
        {
            return Ok(false);
        }
        self.write_document::<Value>(collection, &[]).await?;
        Ok(true)
    }

    // Write-then-rename so readers never see a truncated document.
    async fn write_document<T: Serialize>(&self, collection: &str, records: &[T]) -> Result<(), ServiceError> {
        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");

        let records = serde_json::to_value(records).map_err(|e| ServiceError::Format(e.to_string()))?;
        let mut doc = Map::new();
        doc.insert(collection.to_string(), records);
        let data = serde_json::to_vec_pretty(&Value::Object(doc))
            .map_err(|e| ServiceError::Format(e.to_string()))?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", self.data_dir.display())))?;
        fs::write(&tmp, data)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", path.display())))?;
        debug!(collection, path = %path.display(), "collection saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn temp_store() -> Arc<JsonCollectionStore> {
        let dir = std::env::temp_dir().join(format!("json_collection_store_{}", Uuid::new_v4()));
        JsonCollectionStore::new(dir)
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let store = temp_store();
        let res = store.load::<Value>("books").await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn malformed_documents_are_format_errors() -> Result<(), anyhow::Error> {
        let store = temp_store();
        fs::create_dir_all(store.data_dir()).await?;

        fs::write(store.path_for("books"), b"{not json").await?;
        assert!(matches!(store.load::<Value>("books").await, Err(ServiceError::Format(_))));

        fs::write(store.path_for("books"), br#"{"reviews": []}"#).await?;
        assert!(matches!(store.load::<Value>("books").await, Err(ServiceError::Format(_))));

        fs::write(store.path_for("books"), br#"{"books": {"id": "b1"}}"#).await?;
        assert!(matches!(store.load::<Value>("books").await, Err(ServiceError::Format(_))));

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_writes_pretty_document_and_load_reads_it_back() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let records = vec![json!({"id": "b1", "title": "Dune"}), json!({"id": "b2", "title": "Emma"})];
        store.save("books", &records).await?;

        let text = fs::read_to_string(store.path_for("books")).await?;
        assert!(text.starts_with("{\n  \"books\": ["));
        assert!(text.contains("\"id\": \"b1\",\n      \"title\": \"Dune\""));
        assert!(!store.path_for("books").with_extension("json.tmp").exists());

        let loaded: Vec<Value> = store.load("books").await?;
        assert_eq!(loaded, records);

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_update_leaves_file_untouched() -> Result<(), anyhow::Error> {
        let store = temp_store();
        store.save("reviews", &[json!({"id": "r1"})]).await?;
        let before = fs::read(store.path_for("reviews")).await?;

        let res = store
            .update::<Value, (), _>("reviews", |records| {
                records.push(json!({"id": "r2"}));
                Err(ServiceError::Conflict("nope".into()))
            })
            .await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        assert_eq!(fs::read(store.path_for("reviews")).await?, before);

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_into_unusable_data_dir_is_io_error() -> Result<(), anyhow::Error> {
        let store = temp_store();
        fs::write(store.data_dir(), b"not a directory").await?;

        let res = store.save("books", &[json!({"id": "b1"})]).await;
        assert!(matches!(res, Err(ServiceError::Io(_))), "got {res:?}");

        let _ = fs::remove_file(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_document() -> Result<(), anyhow::Error> {
        let store = temp_store();
        store.save("books", &[json!({"id": "b1"})]).await?;
        let before = fs::read(store.path_for("books")).await?;
        // A directory squatting on the temp path makes the write fail.
        fs::create_dir_all(store.path_for("books").with_extension("json.tmp")).await?;

        let res = store
            .update::<Value, (), _>("books", |records| {
                records.push(json!({"id": "b2"}));
                Ok(())
            })
            .await;
        assert!(matches!(res, Err(ServiceError::Io(_))), "got {res:?}");
        assert_eq!(fs::read(store.path_for("books")).await?, before);
        assert_eq!(store.load::<Value>("books").await?, vec![json!({"id": "b1"})]);

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_do_not_lose_records() -> Result<(), anyhow::Error> {
        let store = temp_store();
        store.ensure("books").await?;

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update::<Value, (), _>("books", |records| {
                        records.push(json!({ "id": format!("b{i}") }));
                        Ok(())
                    })
                    .await
            }));
        }
        for h in handles {
            h.await??;
        }

        let loaded: Vec<Value> = store.load("books").await?;
        assert_eq!(loaded.len(), 16);

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }

    #[tokio::test]
    async fn ensure_creates_once() -> Result<(), anyhow::Error> {
        let store = temp_store();
        assert!(store.ensure("reviews").await?);
        store.save("reviews", &[json!({"id": "r1"})]).await?;
        assert!(!store.ensure("reviews").await?);
        assert_eq!(store.load::<Value>("reviews").await?.len(), 1);

        let _ = fs::remove_dir_all(store.data_dir()).await;
        Ok(())
    }
}
