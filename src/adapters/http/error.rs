use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};

use crate::application::dto::ErrorResponse;
use crate::domain::errors::DetectError;

impl DetectError {
    pub fn status(&self) -> StatusCode {
        match self {
            DetectError::NoFilePart | DetectError::NoSelectedFile => StatusCode::BAD_REQUEST,
            DetectError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            DetectError::NoDetections => StatusCode::NOT_FOUND,
            DetectError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DetectError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
