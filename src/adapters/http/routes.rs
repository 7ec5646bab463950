use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use tracing::warn;

use crate::adapters::http::state::HttpState;
use crate::application::dto::{ErrorResponse, HealthResponse, PredictionsResponse, UploadForm};
use crate::domain::{
    errors::{DetectError, DomainError},
    upload::UploadedImage,
};

const FILE_FIELD: &str = "file";

/// Detecta objetos en la imagen subida en el campo `file`.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "detection",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Objetos detectados", body = PredictionsResponse),
        (status = 400, description = "Falta el fichero o su nombre", body = ErrorResponse),
        (status = 404, description = "El modelo no detectó nada", body = ErrorResponse),
        (status = 413, description = "Fichero demasiado grande", body = ErrorResponse),
        (status = 500, description = "Error interno", body = ErrorResponse),
    )
)]
pub async fn upload(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionsResponse>, DetectError> {
    detect_from_multipart(st, multipart).await
}

/// Alias de `/upload`.
#[utoipa::path(
    post,
    path = "/predict",
    tag = "detection",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Objetos detectados", body = PredictionsResponse),
        (status = 400, description = "Falta el fichero o su nombre", body = ErrorResponse),
        (status = 404, description = "El modelo no detectó nada", body = ErrorResponse),
        (status = 413, description = "Fichero demasiado grande", body = ErrorResponse),
        (status = 500, description = "Error interno", body = ErrorResponse),
    )
)]
pub async fn predict(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionsResponse>, DetectError> {
    detect_from_multipart(st, multipart).await
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Servicio activo", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into() })
}

pub async fn root() -> Redirect {
    Redirect::temporary("/docs/")
}

async fn detect_from_multipart(
    st: HttpState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionsResponse>, DetectError> {
    // Un cuerpo que no es multipart equivale a no haber enviado fichero.
    let multipart = multipart.map_err(|e| {
        warn!("Petición sin cuerpo multipart válido: {}", e);
        DetectError::NoFilePart
    })?;

    let upload = read_file_field(multipart).await?;
    let predictions = st.detection.detect_upload(upload).await?;
    Ok(Json(PredictionsResponse { predictions }))
}

async fn read_file_field(mut multipart: Multipart) -> Result<UploadedImage, DetectError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(DetectError::NoFilePart),
            Err(e) => return Err(classify_multipart_error(e, DetectError::NoFilePart)),
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // Sin atributo `filename` la parte es un campo de texto, no un fichero.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(DetectError::NoSelectedFile);
        }

        let bytes = field.bytes().await.map_err(|e| {
            let detail = e.body_text();
            classify_multipart_error(e, DetectError::Processing(DomainError::OperationFailed(detail)))
        })?;

        return Ok(UploadedImage { filename, bytes: bytes.to_vec() });
    }
}

fn classify_multipart_error(err: MultipartError, otherwise: DetectError) -> DetectError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Subida rechazada por tamaño: {}", err);
        DetectError::PayloadTooLarge
    } else {
        warn!("Cuerpo multipart ilegible: {}", err);
        otherwise
    }
}
