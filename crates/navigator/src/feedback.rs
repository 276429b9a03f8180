// Archivo: feedback.rs
// Propósito: tipos que el navegador emite hacia la capa de presentación
// (avisos, preguntas de confirmación, estado "registro x de y") y el
// resultado de cada acción despachada.
use crate::cursor::{Boundary, CursorPosition};
use crate::errors::GuardRejection;
use crate::mode::{Action, Mode};
use chrono::{DateTime, Utc};
use record::RecordKey;
use serde::Serialize;
use std::fmt;

/// Aviso para el usuario. Ningún rechazo es silencioso: todos pasan por
/// aquí.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// La navegación ya estaba en el límite.
    LimitReached { action: Action, boundary: Boundary },
    /// El guardián rechazó la acción.
    Rejected(GuardRejection),
    /// El backend falló; `message` es el texto del backend.
    BackendFailure { message: String },
    /// Divergencias no fatales (p.ej. reconciliación fallida).
    Warning(String),
    Saved { key: Option<RecordKey>, message: String },
    Deleted { key: RecordKey, message: String },
    Discarded,
    /// El usuario respondió "no" a una confirmación.
    Cancelled(Action),
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::LimitReached { boundary: Boundary::Start, .. } => f.write_str("primer registro"),
            Feedback::LimitReached { boundary: Boundary::End, .. } => f.write_str("último registro"),
            Feedback::Rejected(r) => write!(f, "{}", r),
            Feedback::BackendFailure { message } => write!(f, "error: {}", message),
            Feedback::Warning(w) => write!(f, "aviso: {}", w),
            Feedback::Saved { message, .. } | Feedback::Deleted { message, .. } => f.write_str(message),
            Feedback::Discarded => f.write_str("cambios descartados"),
            Feedback::Cancelled(a) => write!(f, "{} cancelado", a),
        }
    }
}

/// Aviso con marca de tiempo, tal como llega a la vista.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub at: DateTime<Utc>,
    pub feedback: Feedback,
}

impl Notice {
    pub fn now(feedback: Feedback) -> Self {
        Self { at: Utc::now(), feedback }
    }
}

/// Pregunta sí/no que el navegador hace antes de acciones destructivas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmPrompt {
    Save { mode: Mode },
    Delete { key: RecordKey },
    DiscardChanges { mode: Mode },
}

impl ConfirmPrompt {
    pub fn message(&self) -> String {
        match self {
            ConfirmPrompt::Save { mode: Mode::Insert } => "¿Confirma la inclusión del registro?".into(),
            ConfirmPrompt::Save { .. } => "¿Confirma la alteración del registro?".into(),
            ConfirmPrompt::Delete { key } => format!("¿Confirma la exclusión del registro {}?", key),
            ConfirmPrompt::DiscardChanges { mode: Mode::Insert } => "¿Descartar la inclusión en curso?".into(),
            ConfirmPrompt::DiscardChanges { .. } => "¿Descartar los cambios y salir de la edición?".into(),
        }
    }
}

/// Estado visible: "registro x de y" más el modo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigatorStatus {
    pub position: CursorPosition,
    pub total: usize,
    pub mode: Mode,
}

impl fmt::Display for NavigatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            CursorPosition::At(i) => write!(f, "registro {} de {} [{}]", i + 1, self.total, self.mode),
            CursorPosition::Empty => write!(f, "sin registros [{}]", self.mode),
        }
    }
}

/// Resultado de una acción despachada con éxito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Opened { total: usize },
    Moved(CursorPosition),
    /// Navegación sin efecto: ya se estaba en el límite.
    LimitReached(Boundary),
    ModeChanged(Mode),
    /// `reconciled == false` indica que la clave esperada no apareció en el
    /// conjunto refrescado y el cursor cayó al índice 0 (o vacío).
    Saved { position: CursorPosition, reconciled: bool },
    Deleted { position: CursorPosition },
    Refreshed { position: CursorPosition, reconciled: bool },
    Discarded,
    Cancelled,
    Closed,
}
