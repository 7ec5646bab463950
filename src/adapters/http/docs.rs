use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::adapters::http::routes;
use crate::application::dto::{ErrorResponse, HealthResponse, PredictionsResponse, UploadForm};
use crate::domain::detection::DetectionRecord;

pub const SWAGGER_PATH: &str = "/docs";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "YOLO ONNX Detect API",
        version = "0.1.0",
        description = "Sube una imagen y obtén las clases detectadas por el modelo YOLO."
    ),
    paths(routes::upload, routes::predict, routes::health),
    components(schemas(PredictionsResponse, DetectionRecord, ErrorResponse, HealthResponse, UploadForm)),
    tags(
        (name = "detection", description = "Detección de objetos"),
        (name = "system", description = "Estado del servicio")
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi())
}
