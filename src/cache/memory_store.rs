use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::LocalStore;
use crate::utils::errors::LocalStoreError;

/// Almacenamiento en memoria (tests y modo efímero)
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula un disco lleno: las escrituras fallan hasta desactivarlo
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn key_count(&self) -> usize {
        self.entries.read().await.len()
    }

    fn check_writable(&self, key: &str) -> Result<(), LocalStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LocalStoreError::Unavailable(format!(
                "writes disabled for key '{}'",
                key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.check_writable(key)?;
        self.entries.write().await.insert(key.to_string(), value.to_string());
        debug!("💾 Memoria SET para clave: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.check_writable(key)?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
