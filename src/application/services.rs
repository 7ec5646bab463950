use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    application::ports::{DetectorPort, ScratchStoragePort},
    domain::{
        detection::DetectionRecord,
        errors::{DetectError, DomainError, DomainResult},
        model::YoloParams,
        upload::{sanitize_filename, UploadedImage},
    },
};

/// Caso de uso principal: imagen subida → lista de registros de detección.
///
/// Flujo lineal: guardar en disco temporal, decodificar, inferir, borrar,
/// responder. El fichero temporal se borra siempre que llegó a escribirse,
/// tanto si la inferencia termina bien como si falla.
#[derive(Clone)]
pub struct DetectionService {
    detector: Arc<dyn DetectorPort>,
    storage: Arc<dyn ScratchStoragePort>,
    params: YoloParams,
}

impl DetectionService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        storage: Arc<dyn ScratchStoragePort>,
        params: YoloParams,
    ) -> Self {
        Self { detector, storage, params }
    }

    pub async fn detect_upload(&self, upload: UploadedImage) -> Result<Vec<DetectionRecord>, DetectError> {
        if upload.filename.is_empty() {
            return Err(DetectError::NoSelectedFile);
        }

        let filename = sanitize_filename(&upload.filename);
        let path = self.storage.save(&filename, &upload.bytes).await.map_err(|e| {
            error!("No se pudo guardar la subida '{}': {}", filename, e);
            DetectError::Processing(e)
        })?;
        debug!("Subida guardada en {}", path.display());

        let outcome = self.infer_file(&path).await;

        // Limpieza incondicional; un fallo aquí no cambia la respuesta.
        if let Err(e) = self.storage.remove(&path).await {
            warn!("No se pudo borrar el fichero temporal {}: {}", path.display(), e);
        }

        let records = outcome.map_err(|e| {
            error!("Excepción durante el procesamiento de '{}': {}", filename, e);
            DetectError::Processing(e)
        })?;

        info!("'{}': {} objetos detectados", filename, records.len());
        if records.is_empty() {
            return Err(DetectError::NoDetections);
        }
        Ok(records)
    }

    async fn infer_file(&self, path: &Path) -> DomainResult<Vec<DetectionRecord>> {
        let owned: PathBuf = path.to_path_buf();
        let rgb = tokio::task::spawn_blocking(move || load_rgb(&owned))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("tarea de decodificación abortada: {e}")))??;

        let detections = self.detector.detect(rgb, &self.params).await?;
        Ok(detections.into_iter().map(DetectionRecord::from).collect())
    }
}

/// Decodifica la imagen adivinando el formato por su contenido, no por la extensión.
fn load_rgb(path: &Path) -> DomainResult<RgbImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| DomainError::OperationFailed(format!("abriendo {}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| DomainError::OperationFailed(format!("leyendo {}: {e}", path.display())))?;

    let img = reader
        .decode()
        .map_err(|e| DomainError::InvalidInput(format!("imagen no decodificable: {e}")))?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fs::scratch::LocalScratchStorage;
    use crate::test_support::{png_bytes, FailingDetector, FixedDetector};

    fn service(detector: Arc<dyn DetectorPort>, dir: &Path) -> DetectionService {
        let storage = Arc::new(LocalScratchStorage::new(dir.join("uploads")));
        DetectionService::new(detector, storage, YoloParams::default())
    }

    fn upload(name: &str, bytes: Vec<u8>) -> UploadedImage {
        UploadedImage { filename: name.into(), bytes }
    }

    fn leftover_files(dir: &Path) -> usize {
        std::fs::read_dir(dir.join("uploads")).map(|rd| rd.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn returns_one_record_per_detection_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FixedDetector::dog_and_cat()), tmp.path());

        let records = svc.detect_upload(upload("pets.png", png_bytes())).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].class_name, "dog");
        assert!(records.iter().all(|r| (0.0..=1.0).contains(&r.confidence)));
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn empty_result_is_no_detections() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FixedDetector::empty()), tmp.path());

        let err = svc.detect_upload(upload("empty.png", png_bytes())).await.unwrap_err();
        assert!(matches!(err, DetectError::NoDetections));
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn corrupt_image_is_processing_error_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FixedDetector::dog_and_cat()), tmp.path());

        let err = svc
            .detect_upload(upload("broken.jpg", b"definitely not an image".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::Processing(DomainError::InvalidInput(_))));
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn model_failure_is_processing_error_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FailingDetector), tmp.path());

        let err = svc.detect_upload(upload("pets.png", png_bytes())).await.unwrap_err();
        assert!(matches!(err, DetectError::Processing(DomainError::OperationFailed(_))));
        assert_eq!(leftover_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn empty_filename_is_rejected_before_touching_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FixedDetector::dog_and_cat()), tmp.path());

        let err = svc.detect_upload(upload("", png_bytes())).await.unwrap_err();
        assert!(matches!(err, DetectError::NoSelectedFile));
        assert!(!tmp.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn same_image_twice_gives_same_predictions() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(Arc::new(FixedDetector::dog_and_cat()), tmp.path());

        let first = svc.detect_upload(upload("pets.png", png_bytes())).await.unwrap();
        let second = svc.detect_upload(upload("pets.png", png_bytes())).await.unwrap();
        assert_eq!(first, second);
    }
}
