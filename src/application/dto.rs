use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::detection::DetectionRecord;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionsResponse {
    pub predictions: Vec<DetectionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "No objects detected")]
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Formulario multipart de las rutas de detección (solo para la documentación).
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// Imagen a analizar (JPEG, PNG, WebP, ...).
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
