mod domain;
mod application;
mod adapters;
mod settings;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use crate::application::{ports::ModelCatalogPort, services::DetectionService};
use crate::adapters::{
    fs::scratch::LocalScratchStorage,
    onnx::{detector::OnnxDetector, model_catalog::OnnxModelCatalog, yolo_engine::OnnxYoloEngine},
    http::{state::HttpState, router},
};
use crate::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let infer = settings.inference();

    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Validar y cargar el modelo una sola vez; se comparte entre todas las peticiones.
    OnnxModelCatalog::new().validate_model(&infer.model).await?;
    let model = infer.model.clone();
    let engine = tokio::task::spawn_blocking(move || OnnxYoloEngine::load(&model, infer.intra_threads)).await??;
    tracing::info!("🧠 {} etiquetas disponibles", engine.labels().len());

    // 3. Adaptadores y caso de uso
    let detector = Arc::new(OnnxDetector::new(engine));
    let storage = Arc::new(LocalScratchStorage::new(&settings.uploads_dir));
    tracing::info!("📂 Subidas temporales en '{}'", storage.dir().display());
    let detection = Arc::new(DetectionService::new(detector, storage, infer.params));

    // 4. Router de Axum (detección, CORS y documentación)
    let app = router(HttpState { detection }, settings.body_limit_bytes);

    // 5. Lanzar el Servidor
    let addr = settings.bind_addr();
    tracing::info!("🚀 Servidor YOLO iniciado en http://{}", addr);
    tracing::info!("📚 Documentación interactiva en http://{}/docs/", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
