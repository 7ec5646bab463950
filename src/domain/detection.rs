use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Salida cruda del detector, en píxeles de la imagen original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

impl Detection {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersección sobre unión con otra caja.
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

/// Registro que se devuelve al cliente: etiqueta y confianza, sin coordenadas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetectionRecord {
    #[schema(example = "person")]
    pub class_name: String,
    #[schema(example = 0.87)]
    pub confidence: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(d: Detection) -> Self {
        Self { class_name: d.label, confidence: d.score }
    }
}
