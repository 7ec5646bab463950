use sanitize_filename::{sanitize_with_options, Options};
use unicode_normalization::UnicodeNormalization;

/// Fichero recibido en el campo `file` de la petición multipart.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Nombre usado cuando el original no conserva ningún carácter válido.
pub const FALLBACK_FILENAME: &str = "upload";

/// Convierte un nombre enviado por el cliente en un segmento de ruta seguro.
///
/// Los acentos se pliegan a ASCII (NFKD) y el resto de caracteres no ASCII
/// se descarta. `/` y `\` cuentan como espacios; `sanitize-filename` quita
/// los caracteres ilegales, de control y los nombres `.`/`..`. Después los
/// bloques separados por espacios se unen con `_`, solo sobrevive
/// `[A-Za-z0-9_.-]` y se recortan los puntos y guiones bajos de los extremos.
/// Los nombres de dispositivo de Windows (`CON`, `NUL`, ...) reciben un `_` delante.
pub fn sanitize_filename(raw: &str) -> String {
    let folded: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    // Los nombres reservados de Windows se tratan abajo con prefijo, no se borran.
    let cleaned = sanitize_with_options(
        folded,
        Options { windows: false, truncate: true, replacement: "" },
    );

    let joined = cleaned.split_ascii_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}
