use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Resultado de una petición de detección que no termina en predicciones.
/// La capa HTTP decide el código de estado de cada variante.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("No file part")]
    NoFilePart,
    #[error("No selected file")]
    NoSelectedFile,
    #[error("File too large")]
    PayloadTooLarge,
    #[error("No objects detected")]
    NoDetections,
    #[error("Fallo de procesamiento: {0}")]
    Processing(#[from] DomainError),
}

impl DetectError {
    /// Mensaje apto para el cliente: nunca incluye detalles internos.
    pub fn public_message(&self) -> &'static str {
        match self {
            DetectError::NoFilePart => "No file part",
            DetectError::NoSelectedFile => "No selected file",
            DetectError::PayloadTooLarge => "File too large",
            DetectError::NoDetections => "No objects detected",
            DetectError::Processing(_) => "Internal server error",
        }
    }
}
