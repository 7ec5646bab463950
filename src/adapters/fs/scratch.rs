use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::application::ports::ScratchStoragePort;
use crate::domain::errors::{DomainError, DomainResult};

/// Directorio local donde viven las subidas mientras dura la petición.
pub struct LocalScratchStorage {
    dir: PathBuf,
    seq: AtomicU64,
}

impl LocalScratchStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), seq: AtomicU64::new(0) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<millis>_<seq>_<name>`: el contador evita colisiones dentro del mismo milisegundo.
    fn unique_name(&self, filename: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{millis}_{seq}_{filename}")
    }
}

#[async_trait]
impl ScratchStoragePort for LocalScratchStorage {
    async fn save(&self, filename: &str, bytes: &[u8]) -> DomainResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DomainError::OperationFailed(format!("creando {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(self.unique_name(filename));
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            DomainError::OperationFailed(format!("escribiendo {}: {e}", path.display()))
        })?;
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> DomainResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DomainError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(DomainError::OperationFailed(format!("borrando {}: {e}", path.display()))),
        }
    }
}
