//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::validate_key;
use crate::{ObjectMeta, StorageBackend};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    meta: Option<ObjectMeta>,
}

/// In-memory storage backend for testing.
///
/// Objects are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation. Every successful
/// write is also appended to a log, so tests can assert on exactly which
/// uploads happened (and in which order).
///
/// # Examples
///
/// ```
/// use photopress_storage::backend::{MockBackend, StorageBackend};
/// use photopress_storage::ObjectMeta;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("uploads/IMG_0001.jpg", b"not really a jpeg"),
/// ]);
/// assert_eq!(backend.read("uploads/IMG_0001.jpg").await?, b"not really a jpeg");
///
/// backend.write("uploads/IMG_0001-thumb.jpg", b"thumb", &ObjectMeta::immutable_jpeg()).await?;
/// assert_eq!(backend.written().await.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<String, StoredObject>>,
    written: RwLock<Vec<String>>,
    failing_reads: HashSet<String>,
    failing_writes: HashSet<String>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with objects.
    ///
    /// Panics if any key fails validation. If test setup is wrong, then
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (key, data) in files {
            map.insert(Self::validated(key.into()), StoredObject { data: data.into(), meta: None });
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            written: RwLock::new(Vec::new()),
            failing_reads: HashSet::new(),
            failing_writes: HashSet::new(),
        }
    }

    /// Make every read of `key` fail with a network error.
    pub fn with_failing_read(mut self, key: impl Into<String>) -> Self {
        self.failing_reads.insert(Self::validated(key.into()));
        self
    }

    /// Make every write of `key` fail with a network error.
    pub fn with_failing_write(mut self, key: impl Into<String>) -> Self {
        self.failing_writes.insert(Self::validated(key.into()));
        self
    }

    /// Contents of an object, if present.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.storage.read().await.get(key).map(|o| o.data.clone())
    }

    /// Metadata an object was uploaded with. Pre-populated objects have none.
    pub async fn meta(&self, key: &str) -> Option<ObjectMeta> {
        self.storage.read().await.get(key).and_then(|o| o.meta.clone())
    }

    /// Keys of every successful write, in the order they happened.
    pub async fn written(&self) -> Vec<String> {
        self.written.read().await.clone()
    }

    fn validated(key: String) -> String {
        // The panic here is DELIBERATE. MockBackend is intended to be used in
        // tests; panics are expected. There is no error result.
        if validate_key(&key).is_err() {
            panic!("MockBackend: invalid key {key:?}");
        }
        key
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let key = validate_key(key)?;
        if self.failing_reads.contains(key) {
            exn::bail!(ErrorKind::Network(format!("injected read failure: {key}")));
        }
        let object = self
            .storage
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key.to_string())))?;
        Ok(object.data)
    }

    async fn write(&self, key: &str, data: &[u8], meta: &ObjectMeta) -> Result<()> {
        let key = validate_key(key)?;
        if self.failing_writes.contains(key) {
            exn::bail!(ErrorKind::Network(format!("injected write failure: {key}")));
        }
        let object = StoredObject { data: data.to_vec(), meta: Some(meta.clone()) };
        self.storage.write().await.insert(key.to_string(), object);
        self.written.write().await.push(key.to_string());
        Ok(())
    }
}
