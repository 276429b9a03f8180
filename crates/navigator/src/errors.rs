// Archivo: errors.rs
// Propósito: errores del navegador y motivos de rechazo del guardián.
use crate::mode::Action;
use record::RecordKey;
use thiserror::Error;

/// Errores del navegador de registros.
///
/// Este enum centraliza lo que puede fallar al despachar una acción:
/// - rechazos del guardián: la acción no se ejecuta y el estado no cambia;
/// - fallos del backend: el estado queda exactamente como antes del intento;
/// - errores de los colaboradores y de configuración.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigatorError {
  /// La acción no es legal en el estado actual.
  #[error("Operación rechazada: {0}")]
  Guard(#[from] GuardRejection),

  /// El backend rechazó la operación o no respondió. `message` se
  /// muestra tal cual al usuario.
  #[error("Error del backend: {message}")]
  Backend { message: String },

  /// Errores originados por la capa de registros.
  #[error("Error de registros: {0}")]
  Record(#[from] record::RecordError),

  /// Configuración de formulario inválida.
  #[error("Error de configuración: {0}")]
  Config(String),

  /// El formulario no está abierto (antes de `open` o tras `close`).
  #[error("El formulario no está abierto")]
  NotOpen,
}

/// Motivo por el que el guardián rechaza una acción.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
  #[error("operación en curso: salve o descarte antes de continuar")]
  OperationInProgress,

  /// No hay registros: sólo se permite incluir.
  #[error("no hay registros; sólo se permite incluir")]
  EmptyRecordset,

  #[error("estado inválido para salvar")]
  InvalidStateToSave,

  #[error("no se detectaron cambios")]
  NoChangesDetected,

  #[error("no se ingresaron datos")]
  NoDataEntered,

  #[error("campos obligatorios sin completar: {}", .0.join(", "))]
  MissingRequiredFields(Vec<String>),

  #[error("validación fallida: {}", .0.join("; "))]
  ValidationFailed(Vec<String>),

  #[error("registro {0} no encontrado")]
  NotFound(RecordKey),

  /// Se pidió navegar con una acción que no mueve el cursor.
  #[error("{0} no es una acción de navegación")]
  NotNavigation(Action),
}

/// Alias de resultado del crate.
pub type Result<T> = std::result::Result<T, NavigatorError>;
