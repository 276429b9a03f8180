// Archivo: view.rs
// Propósito: contratos de la capa de presentación que el navegador usa:
// confirmación sí/no, salida de avisos y estado, y el punto de validación
// propio del formulario.
use crate::feedback::{ConfirmPrompt, NavigatorStatus, Notice};
use crate::mode::{Action, Mode};
use record::Record;

/// Pregunta interactiva sí/no.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Salida hacia la capa de presentación: avisos, botones activos, campos
/// resaltados y el indicador de posición.
pub trait FormView: Send + Sync {
    fn notify(&self, notice: &Notice);

    fn set_action_enabled(&self, action: Action, enabled: bool);

    /// Resalta los campos indicados. Un slice vacío quita el resaltado.
    fn highlight_fields(&self, names: &[String]);

    fn show_status(&self, _status: &NavigatorStatus) {}
}

/// Punto de invocación de validaciones propias del formulario. Se llama
/// durante `salvar`, después de las comprobaciones internas y antes de la
/// confirmación.
pub trait RecordValidator: Send + Sync {
    /// Devuelve los mensajes de error, si los hay.
    fn validate(&self, record: &Record, mode: Mode) -> Result<(), Vec<String>>;
}
