// Archivo: errors.rs
// Propósito: definir los errores de los colaboradores del navegador
// (cliente CRUD, accesores de campos) y el alias Result<T> del crate.
use thiserror::Error;
/// Errores comunes de la capa de registros.
///
/// - `NotFound`: registro no encontrado por clave.
/// - `Conflict`: la clave ya existe o la escritura choca con otra.
/// - `Transport`: la llamada remota no llegó a completarse (red, timeout).
/// - `Backend`: el backend respondió con un error no estructurado.
/// - `Other`: cualquier otro error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
  /// Registro no encontrado.
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Conflicto de clave o de escritura.
  #[error("Conflicto: {0}")]
  Conflict(String),
  /// Fallo de transporte hacia el backend.
  #[error("Error de transporte: {0}")]
  Transport(String),
  /// Error reportado por el backend.
  #[error("Error del backend: {0}")]
  Backend(String),
  /// Otro tipo de error.
  #[error("Otro: {0}")]
  Other(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, RecordError>;
