//! Dobles de prueba compartidos por los tests de servicio y de HTTP.

use async_trait::async_trait;
use image::RgbImage;
use std::io::Cursor;

use crate::application::ports::DetectorPort;
use crate::domain::{
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::YoloParams,
};

/// PNG válido de 8x8 generado en memoria.
pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

/// Detector determinista que siempre devuelve las mismas cajas.
pub struct FixedDetector {
    detections: Vec<Detection>,
}

impl FixedDetector {
    pub fn empty() -> Self {
        Self { detections: vec![] }
    }

    pub fn dog_and_cat() -> Self {
        Self {
            detections: vec![
                Detection { x1: 0.0, y1: 0.0, x2: 4.0, y2: 4.0, score: 0.91, class_id: 16, label: "dog".into() },
                Detection { x1: 4.0, y1: 4.0, x2: 8.0, y2: 8.0, score: 0.42, class_id: 15, label: "cat".into() },
            ],
        }
    }
}

#[async_trait]
impl DetectorPort for FixedDetector {
    async fn detect(&self, _image: RgbImage, _params: &YoloParams) -> DomainResult<Vec<Detection>> {
        Ok(self.detections.clone())
    }
}

pub struct FailingDetector;

#[async_trait]
impl DetectorPort for FailingDetector {
    async fn detect(&self, _image: RgbImage, _params: &YoloParams) -> DomainResult<Vec<Detection>> {
        Err(DomainError::OperationFailed("onnx session run failed".into()))
    }
}
