use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::domain::{detection::Detection, errors::DomainResult, model::{ModelId, YoloParams}};

/// Modelo de detección preentrenado: imagen RGB → regiones detectadas.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: RgbImage, params: &YoloParams) -> DomainResult<Vec<Detection>>;
}

/// Almacenamiento temporal de las imágenes subidas durante una petición.
#[async_trait]
pub trait ScratchStoragePort: Send + Sync {
    /// Guarda los bytes bajo un nombre único derivado de `filename` y devuelve la ruta.
    async fn save(&self, filename: &str, bytes: &[u8]) -> DomainResult<PathBuf>;
    async fn remove(&self, path: &Path) -> DomainResult<()>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}
