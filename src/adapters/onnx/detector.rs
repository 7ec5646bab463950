use async_trait::async_trait;
use image::RgbImage;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::YoloParams,
};

/// Adaptador del motor YOLO al puerto de detección.
/// Una única sesión compartida; `Session::run` necesita `&mut`, así que se serializa con un mutex.
#[derive(Clone)]
pub struct OnnxDetector {
    engine: Arc<Mutex<OnnxYoloEngine>>,
}

impl OnnxDetector {
    pub fn new(engine: OnnxYoloEngine) -> Self {
        Self { engine: Arc::new(Mutex::new(engine)) }
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: RgbImage, params: &YoloParams) -> DomainResult<Vec<Detection>> {
        let engine = self.engine.clone();
        let params = params.clone();

        tokio::task::spawn_blocking(move || {
            let mut eng = lock_engine(&engine);
            eng.infer(&image, &params)
                .map_err(|e| DomainError::OperationFailed(format!("inferencia YOLO: {e:#}")))
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("tarea de inferencia abortada: {e}")))?
    }
}

/// Un pánico dentro de `infer` envenena el mutex; la sesión sigue siendo
/// utilizable, así que se recupera el guard y se limpia la marca.
fn lock_engine<T>(engine: &Mutex<T>) -> MutexGuard<'_, T> {
    engine.lock().unwrap_or_else(|poisoned| {
        error!("Mutex del motor ONNX envenenado por un pánico previo; se recupera");
        engine.clear_poison();
        poisoned.into_inner()
    })
}
