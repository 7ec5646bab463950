use anyhow::{anyhow, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayView2, ArrayViewD, Axis, IxDyn, Ix2};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use tracing::info;

use crate::adapters::onnx::labels::LabelTable;
use crate::domain::detection::Detection;
use crate::domain::model::{ModelId, YoloParams};

pub struct OnnxYoloEngine {
    session: Session,
    labels: LabelTable,
}

impl OnnxYoloEngine {
    pub fn load(model: &ModelId, intra_threads: usize) -> Result<Self> {
        let mut builder = Session::builder()?.with_intra_threads(intra_threads.max(1))?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        let model_bytes = fs::read(&model.onnx_path)?;
        let session = builder.commit_from_memory(&model_bytes)?;
        let labels = resolve_labels(&session, model)?;

        info!(
            "Modelo '{}' cargado desde {} ({} clases, origen {:?})",
            model.name,
            model.onnx_path,
            labels.len(),
            labels.source()
        );
        Ok(Self { session, labels })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn infer(&mut self, rgb: &RgbImage, params: &YoloParams) -> Result<Vec<Detection>> {
        let imgsz = params.input_size as usize;
        let input = to_input_tensor(rgb, imgsz);

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (raw, _) = input.into_raw_vec_and_offset();
        let input_tensor = Value::from_array((input_shape, raw))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        if array_view.ndim() != 3 {
            return Err(anyhow!("salida inesperada del modelo: {:?}", dims));
        }
        let view = array_view.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;

        let scale = (rgb.width() as f32 / imgsz as f32, rgb.height() as f32 / imgsz as f32);
        let candidates = decode_candidates(view, scale, params.conf_threshold, &self.labels);
        Ok(non_max_suppression(candidates, params.iou_threshold, params.max_detections))
    }
}

fn resolve_labels(session: &Session, model: &ModelId) -> Result<LabelTable> {
    let names = session
        .metadata()
        .ok()
        .and_then(|meta| meta.custom("names").ok().flatten());
    LabelTable::resolve(names.as_deref(), model.labels_path.as_deref())
}

/// NCHW normalizado a [0, 1].
fn to_input_tensor(rgb: &RgbImage, imgsz: usize) -> Array4<f32> {
    let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Nearest);

    let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
    for (x, y, pixel) in resized.enumerate_pixels() {
        input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
        input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
        input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
    }
    input
}

/// Salida `[4 + clases, candidatos]`: filas 0..4 son `cx, cy, w, h`, el resto puntuaciones.
pub(crate) fn decode_candidates(
    view: ArrayView2<f32>,
    (sx, sy): (f32, f32),
    conf_threshold: f32,
    labels: &LabelTable,
) -> Vec<Detection> {
    if view.shape()[0] <= 4 {
        return Vec::new();
    }
    let num_candidates = view.shape()[1];
    let mut detections = Vec::new();

    for i in 0..num_candidates {
        let scores = view.slice(s![4.., i]);
        let Some((class_id, &max_score)) = scores
            .indexed_iter()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
        else {
            continue;
        };

        if max_score > conf_threshold {
            let cx = view[[0, i]];
            let cy = view[[1, i]];
            let w = view[[2, i]];
            let h = view[[3, i]];

            detections.push(Detection {
                x1: (cx - w / 2.0) * sx,
                y1: (cy - h / 2.0) * sy,
                x2: (cx + w / 2.0) * sx,
                y2: (cy + h / 2.0) * sy,
                score: max_score,
                class_id,
                label: labels.name(class_id).to_string(),
            });
        }
    }
    detections
}

/// NMS por clase; devuelve como mucho `max_detections`, de mayor a menor puntuación.
pub(crate) fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32, max_detections: usize) -> Vec<Detection> {
    candidates.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::new();
    for cand in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == cand.class_id && k.iou(&cand) > iou_threshold);
        if !suppressed {
            kept.push(cand);
        }
    }
    kept
}
