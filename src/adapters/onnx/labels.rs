use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use tracing::warn;

/// Nombre usado para índices fuera de la tabla.
pub const UNKNOWN_LABEL: &str = "object";

/// Índice de clase máximo aceptado en los metadatos `names`.
const MAX_CLASS_INDEX: usize = 10_000;

const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    ModelMetadata,
    File,
    Coco,
}

/// Tabla índice de clase → nombre legible.
#[derive(Debug, Clone)]
pub struct LabelTable {
    names: Vec<String>,
    source: LabelSource,
}

impl LabelTable {
    /// Elige la tabla de un modelo: metadatos `names`, luego el fichero de
    /// etiquetas configurado y, si no hay ninguno, COCO.
    /// Unos metadatos ilegibles no son fatales; un fichero configurado que no se puede leer sí.
    pub fn resolve(names_metadata: Option<&str>, labels_path: Option<&str>) -> Result<Self> {
        if let Some(raw) = names_metadata {
            match Self::from_names_metadata(raw) {
                Some(table) => return Ok(table),
                None => warn!("Metadatos 'names' ilegibles en el modelo; se ignoran"),
            }
        }

        if let Some(path) = labels_path {
            return Self::from_file(path);
        }

        warn!("El modelo no incluye nombres de clase; se usan las 80 clases COCO");
        Ok(Self::coco())
    }

    pub fn coco() -> Self {
        Self { names: COCO_CLASSES.iter().map(|s| s.to_string()).collect(), source: LabelSource::Coco }
    }

    /// Formato que escribe ultralytics en los metadatos `names` del ONNX:
    /// `{0: 'person', 1: 'bicycle', ...}`.
    pub fn from_names_metadata(raw: &str) -> Option<Self> {
        parse_names_dict(raw).map(|names| Self { names, source: LabelSource::ModelMetadata })
    }

    /// Un nombre por línea; las líneas vacías se ignoran.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("leyendo etiquetas {path}"))?;
        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            bail!("fichero de etiquetas vacío: {path}");
        }
        Ok(Self { names, source: LabelSource::File })
    }

    pub fn name(&self, class_id: usize) -> &str {
        self.names.get(class_id).map(String::as_str).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn source(&self) -> LabelSource {
        self.source
    }
}

fn parse_names_dict(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut map = BTreeMap::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }
        let colon = rest.find(':')?;
        let idx: usize = rest[..colon].trim().parse().ok()?;
        if idx > MAX_CLASS_INDEX {
            return None;
        }
        rest = rest[colon + 1..].trim_start();

        let quote = rest.chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let quoted = &rest[1..];
        let end = quoted.find(quote)?;
        map.insert(idx, quoted[..end].to_string());
        rest = &quoted[end + 1..];
    }

    let len = map.keys().next_back()? + 1;
    let mut names = vec![UNKNOWN_LABEL.to_string(); len];
    for (idx, name) in map {
        names[idx] = name;
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_ultralytics_names() {
        let table = LabelTable::from_names_metadata("{0: 'person', 1: 'traffic light', 2: \"it's\"}").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(1), "traffic light");
        assert_eq!(table.name(2), "it's");
        assert_eq!(table.source(), LabelSource::ModelMetadata);
    }

    #[test]
    fn gaps_and_out_of_range_map_to_unknown() {
        let table = LabelTable::from_names_metadata("{0: 'helmet', 2: 'vest'}").unwrap();
        assert_eq!(table.name(1), UNKNOWN_LABEL);
        assert_eq!(table.name(2), "vest");
        assert_eq!(table.name(99), UNKNOWN_LABEL);
    }

    #[test]
    fn rejects_malformed_metadata() {
        assert!(LabelTable::from_names_metadata("person, bicycle").is_none());
        assert!(LabelTable::from_names_metadata("{}").is_none());
        assert!(LabelTable::from_names_metadata("{0: person}").is_none());
    }

    #[test]
    fn rejects_huge_class_index() {
        assert!(LabelTable::from_names_metadata("{4294967295: 'x'}").is_none());
        assert!(LabelTable::from_names_metadata("{0: 'a', 10001: 'b'}").is_none());
        let edge = LabelTable::from_names_metadata("{10000: 'last'}").unwrap();
        assert_eq!(edge.len(), 10_001);
        assert_eq!(edge.name(10_000), "last");
    }

    fn labels_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn resolve_prefers_model_metadata_over_file() {
        let file = labels_file("crack\npothole\n");
        let table = LabelTable::resolve(Some("{0: 'helmet'}"), file.path().to_str()).unwrap();
        assert_eq!(table.source(), LabelSource::ModelMetadata);
        assert_eq!(table.name(0), "helmet");
    }

    #[test]
    fn resolve_falls_back_to_file_on_malformed_metadata() {
        let file = labels_file("crack\npothole\n");
        let table = LabelTable::resolve(Some("not a dict"), file.path().to_str()).unwrap();
        assert_eq!(table.source(), LabelSource::File);
        assert_eq!(table.name(1), "pothole");
    }

    #[test]
    fn resolve_uses_coco_without_metadata_or_file() {
        let table = LabelTable::resolve(None, None).unwrap();
        assert_eq!(table.source(), LabelSource::Coco);

        let table = LabelTable::resolve(Some("{4294967295: 'x'}"), None).unwrap();
        assert_eq!(table.source(), LabelSource::Coco);
    }

    #[test]
    fn resolve_fails_on_unreadable_labels_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.txt");
        assert!(LabelTable::resolve(None, missing.to_str()).is_err());
    }

    #[test]
    fn reads_labels_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "crack\n\n  pothole  \nmanhole").unwrap();

        let table = LabelTable::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.name(1), "pothole");
        assert_eq!(table.source(), LabelSource::File);
    }

    #[test]
    fn coco_has_eighty_classes() {
        let table = LabelTable::coco();
        assert_eq!(table.len(), 80);
        assert_eq!(table.name(0), "person");
        assert_eq!(table.name(79), "toothbrush");
    }
}
