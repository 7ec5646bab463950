use async_trait::async_trait;
use std::path::Path;

use crate::application::ports::ModelCatalogPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::ModelId;

/// Comprueba que los ficheros del modelo existan antes de construir la sesión.
pub struct OnnxModelCatalog;

impl OnnxModelCatalog {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl ModelCatalogPort for OnnxModelCatalog {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
        if model.onnx_path.trim().is_empty() {
            return Err(DomainError::InvalidInput("onnx_path empty".into()));
        }
        if !Path::new(&model.onnx_path).is_file() {
            return Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)));
        }
        if let Some(labels) = &model.labels_path {
            if !Path::new(labels).is_file() {
                return Err(DomainError::NotFound(format!("labels file not found: {labels}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(onnx_path: &str, labels_path: Option<&str>) -> ModelId {
        ModelId { name: "best".into(), onnx_path: onnx_path.into(), labels_path: labels_path.map(String::from) }
    }

    #[tokio::test]
    async fn rejects_empty_path() {
        let err = OnnxModelCatalog::new().validate_model(&model("  ", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn rejects_missing_files() {
        let catalog = OnnxModelCatalog::new();
        let err = catalog.validate_model(&model("/nonexistent/best.onnx", None)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let onnx = tempfile::NamedTempFile::new().unwrap();
        let path = onnx.path().to_str().unwrap();
        let err = catalog.validate_model(&model(path, Some("/nonexistent/labels.txt"))).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn accepts_existing_files() {
        let onnx = tempfile::NamedTempFile::new().unwrap();
        let path = onnx.path().to_str().unwrap();
        OnnxModelCatalog::new().validate_model(&model(path, None)).await.unwrap();
    }
}
