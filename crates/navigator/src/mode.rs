// Archivo: mode.rs
// Propósito: modos del formulario, acciones de los botones (con sus ids)
// y la tabla pura de acciones habilitadas por modo.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modo global del formulario. Exactamente uno está activo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Navegación con campos de sólo lectura.
    #[default]
    Browse,
    /// Alteración del registro actual.
    Edit,
    /// Inclusión de un registro nuevo.
    Insert,
}

impl Mode {
    /// `edit` e `insert` exigen `salvar` o `encerrar` para salir.
    pub fn is_dirty(self) -> bool {
        matches!(self, Mode::Edit | Mode::Insert)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Browse => "browse",
            Mode::Edit => "edit",
            Mode::Insert => "insert",
        };
        write!(f, "{}", s)
    }
}

/// Acciones que llegan desde los botones del formulario.
///
/// Los identificadores serializados son los ids de los botones
/// (`primeiro`, `anterior`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "primeiro")]
    First,
    #[serde(rename = "anterior")]
    Previous,
    #[serde(rename = "proximo")]
    Next,
    #[serde(rename = "ultimo")]
    Last,
    #[serde(rename = "editar")]
    Edit,
    #[serde(rename = "incluir")]
    Insert,
    #[serde(rename = "salvar")]
    Save,
    #[serde(rename = "deletar")]
    Delete,
    #[serde(rename = "encerrar")]
    Close,
}

impl Action {
    pub const ALL: [Action; 9] = [Action::First,
                                  Action::Previous,
                                  Action::Next,
                                  Action::Last,
                                  Action::Edit,
                                  Action::Insert,
                                  Action::Save,
                                  Action::Delete,
                                  Action::Close];

    pub fn is_navigation(self) -> bool {
        matches!(self, Action::First | Action::Previous | Action::Next | Action::Last)
    }

    /// Id del botón asociado.
    pub fn id(self) -> &'static str {
        match self {
            Action::First => "primeiro",
            Action::Previous => "anterior",
            Action::Next => "proximo",
            Action::Last => "ultimo",
            Action::Edit => "editar",
            Action::Insert => "incluir",
            Action::Save => "salvar",
            Action::Delete => "deletar",
            Action::Close => "encerrar",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error al interpretar un id de botón desconocido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(pub String);

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acción desconocida: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

impl FromStr for Action {
    type Err = UnknownAction;

    /// Acepta el id del botón o el nombre en inglés, sin distinguir
    /// mayúsculas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primeiro" | "first" => Ok(Action::First),
            "anterior" | "previous" | "prev" => Ok(Action::Previous),
            "proximo" | "próximo" | "next" => Ok(Action::Next),
            "ultimo" | "último" | "last" => Ok(Action::Last),
            "editar" | "edit" => Ok(Action::Edit),
            "incluir" | "insert" => Ok(Action::Insert),
            "salvar" | "save" => Ok(Action::Save),
            "deletar" | "delete" => Ok(Action::Delete),
            "encerrar" | "close" => Ok(Action::Close),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Acciones habilitadas para un modo dado (los botones activos).
///
/// Función pura: en `browse` la navegación, `editar` y `deletar` exigen un
/// conjunto no vacío; en `edit`/`insert` sólo `salvar` y `encerrar`.
pub fn available_actions(mode: Mode, cache_empty: bool) -> Vec<Action> {
    match mode {
        Mode::Browse => Action::ALL.iter()
                                   .copied()
                                   .filter(|a| match a {
                                       Action::Save => false,
                                       Action::Insert | Action::Close => true,
                                       _ => !cache_empty,
                                   })
                                   .collect(),
        Mode::Edit | Mode::Insert => vec![Action::Save, Action::Close],
    }
}
