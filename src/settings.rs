use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::model::{InferenceConfig, ModelId, YoloParams};

const ENV_PREFIX: &str = "DETECTOR";

/// Configuración del servicio: valores por defecto → variables `DETECTOR_*` → `PORT`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub body_limit_bytes: usize,
    pub model_path: String,
    pub labels_path: Option<String>,
    pub input_size: u32,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .try_parsing(true);
        Self::from_sources(env, std::env::var("PORT").ok())
    }

    pub fn from_sources(env: config::Environment, port: Option<String>) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("uploads_dir", "uploads")?
            .set_default("body_limit_bytes", 16 * 1024 * 1024)?
            .set_default("model_path", "models/best.onnx")?
            .set_default("input_size", 640)?
            .set_default("conf_threshold", 0.25)?
            .set_default("iou_threshold", 0.45)?
            .set_default("max_detections", 300)?
            .set_default("intra_threads", 4)?
            .add_source(env)
            .set_override_option("port", port)?
            .build()?
            .try_deserialize()
            .context("configuración inválida")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            bail!("conf_threshold fuera de [0, 1]: {}", self.conf_threshold);
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            bail!("iou_threshold fuera de [0, 1]: {}", self.iou_threshold);
        }
        if self.input_size == 0 {
            bail!("input_size debe ser mayor que 0");
        }
        if self.max_detections == 0 {
            bail!("max_detections debe ser mayor que 0");
        }
        if self.body_limit_bytes == 0 {
            bail!("body_limit_bytes debe ser mayor que 0");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn yolo_params(&self) -> YoloParams {
        YoloParams {
            input_size: self.input_size,
            conf_threshold: self.conf_threshold,
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
        }
    }

    pub fn inference(&self) -> InferenceConfig {
        let name = std::path::Path::new(&self.model_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "yolo".into());

        InferenceConfig {
            model: ModelId {
                name,
                onnx_path: self.model_path.clone(),
                labels_path: self.labels_path.clone().filter(|p| !p.trim().is_empty()),
            },
            params: self.yolo_params(),
            intra_threads: self.intra_threads,
        }
    }
}
