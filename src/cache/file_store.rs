//! Almacenamiento local en disco
//!
//! Un archivo por clave dentro de un directorio. Las escrituras van a un
//! archivo temporal y luego se renombran, así una caída a mitad de
//! escritura nunca deja un array JSON truncado.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::LocalStore;
use crate::utils::errors::LocalStoreError;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Abre (y crea si hace falta) el directorio de datos
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, LocalStoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| LocalStoreError::Io {
                key: dir.display().to_string(),
                source,
            })?;
        info!("📁 Almacenamiento local en {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LocalStoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == ':');
        if !valid {
            return Err(LocalStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key.replace(':', "__"))))
    }
}

#[async_trait]
impl LocalStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!("📥 Disco HIT para clave: {}", key);
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("❌ Disco MISS para clave: {}", key);
                Ok(None)
            }
            Err(source) => Err(LocalStoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| LocalStoreError::Io {
            key: key.to_string(),
            source,
        };

        tokio::fs::write(&tmp, value).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;

        debug!("💾 Disco SET para clave: {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LocalStoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
