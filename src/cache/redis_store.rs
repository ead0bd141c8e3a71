use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, info};

use super::{CacheConfig, LocalStore};
use crate::utils::errors::LocalStoreError;

/// Almacenamiento local sobre Redis, sin TTL: las cachés son durables
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Conectar a Redis y verificar con PING
    pub async fn connect(config: &CacheConfig) -> Result<Self, LocalStoreError> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let redis_err = |source| LocalStoreError::Redis {
            key: config.redis_url.clone(),
            source,
        };

        let client = redis::Client::open(config.redis_url.clone()).map_err(redis_err)?;
        let manager = ConnectionManager::new(client).await.map_err(redis_err)?;

        let mut conn = manager.clone();
        let _: () = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_err)?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self {
            manager,
            key_prefix: config.key_prefix.clone(),
        })
    }

    /// Generar clave con prefijo
    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl LocalStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let mut conn = self.manager.clone();
        let full_key = self.make_key(key);

        let value: Option<String> = conn
            .get(&full_key)
            .await
            .map_err(|source| LocalStoreError::Redis { key: full_key.clone(), source })?;

        match &value {
            Some(_) => debug!("📥 Redis HIT para clave: {}", full_key),
            None => debug!("❌ Redis MISS para clave: {}", full_key),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let mut conn = self.manager.clone();
        let full_key = self.make_key(key);

        let _: () = conn
            .set(&full_key, value)
            .await
            .map_err(|source| LocalStoreError::Redis { key: full_key.clone(), source })?;

        debug!("💾 Redis SET para clave: {}", full_key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let mut conn = self.manager.clone();
        let full_key = self.make_key(key);

        let count: i64 = conn
            .del(&full_key)
            .await
            .map_err(|source| LocalStoreError::Redis { key: full_key.clone(), source })?;

        debug!("🗑️ Redis DELETE para clave: {} (eliminados: {})", full_key, count);
        Ok(())
    }
}
