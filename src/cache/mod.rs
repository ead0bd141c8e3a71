//! Cache
//!
//! Almacenamiento local clave → string. Es el bloque más básico del
//! sistema: sin lógica, solo durabilidad. El coordinador lo recibe
//! inyectado, nunca como estado global.

pub mod cache_config;
pub mod file_store;
pub mod memory_store;
pub mod redis_store;

pub use cache_config::{CacheConfig, StoreBackend};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::utils::errors::LocalStoreError;

/// Operaciones del almacenamiento local
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError>;

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
}

/// Construye el almacenamiento según la configuración
pub async fn build_store(config: &CacheConfig) -> Result<Arc<dyn LocalStore>, LocalStoreError> {
    let store: Arc<dyn LocalStore> = match config.backend {
        StoreBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
        StoreBackend::Redis => Arc::new(RedisStore::connect(config).await?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}
