// Archivo: guard.rs
// Propósito: el guardián de modo. Decide si una acción es legal dado el
// modo actual y el estado de la caché, y valida las precondiciones de
// `salvar` antes de que se emita cualquier petición al backend. Es el
// único punto que impide perder datos navegando en mitad de una edición.
use crate::config::FormConfig;
use crate::errors::GuardRejection;
use crate::mode::{Action, Mode};
use record::Record;

/// Veredicto del guardián.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    pub reason: Option<GuardRejection>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self { allowed: true, reason: None }
    }

    pub fn reject(reason: GuardRejection) -> Self {
        Self { allowed: false,
               reason: Some(reason) }
    }

    pub fn into_result(self) -> Result<(), GuardRejection> {
        match self.reason {
            Some(r) if !self.allowed => Err(r),
            _ => Ok(()),
        }
    }
}

/// Guardián sin estado: las reglas sólo dependen de sus argumentos.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeGuard;

impl ModeGuard {
    /// Reglas, en orden:
    /// 1. en `edit`/`insert` sólo `salvar` y `encerrar`;
    /// 2. en `browse` con caché vacía sólo `incluir` y `encerrar`;
    /// 3. lo demás se permite.
    pub fn can_perform(&self, action: Action, mode: Mode, cache_empty: bool) -> Verdict {
        if mode.is_dirty() && !matches!(action, Action::Save | Action::Close) {
            return Verdict::reject(GuardRejection::OperationInProgress);
        }
        if mode == Mode::Browse && cache_empty && !matches!(action, Action::Insert | Action::Close) {
            return Verdict::reject(GuardRejection::EmptyRecordset);
        }
        Verdict::allow()
    }

    /// Cualquier movimiento del cursor (botones de navegación, `locate`).
    pub fn can_navigate(&self, mode: Mode, cache_empty: bool) -> Verdict {
        self.can_perform(Action::First, mode, cache_empty)
    }

    /// Releer el conjunto sólo es seguro sin edición pendiente. Con la
    /// caché vacía el modo `insert` es forzado y no bloquea.
    pub fn can_refresh(&self, mode: Mode, cache_empty: bool) -> Verdict {
        match mode {
            Mode::Edit => Verdict::reject(GuardRejection::OperationInProgress),
            Mode::Insert if !cache_empty => Verdict::reject(GuardRejection::OperationInProgress),
            _ => Verdict::allow(),
        }
    }

    /// Precondiciones de `salvar` sobre los valores capturados `current`.
    ///
    /// En `edit` debe haber al menos un campo distinto de `baseline`; en
    /// `insert` al menos un campo no vacío. Después se exigen los campos
    /// obligatorios (salvo la clave cuando la genera el backend en un
    /// insert).
    pub fn check_commit(&self,
                        mode: Mode,
                        current: &Record,
                        baseline: Option<&Record>,
                        config: &FormConfig)
                        -> Result<(), GuardRejection> {
        match mode {
            Mode::Browse => return Err(GuardRejection::InvalidStateToSave),
            Mode::Edit => {
                let changed = match baseline {
                    Some(b) => !current.differing_fields(b).is_empty(),
                    None => !current.is_blank(),
                };
                if !changed {
                    return Err(GuardRejection::NoChangesDetected);
                }
            }
            Mode::Insert => {
                if current.is_blank() {
                    return Err(GuardRejection::NoDataEntered);
                }
            }
        }
        let missing = self.missing_required(mode, current, config);
        if !missing.is_empty() {
            return Err(GuardRejection::MissingRequiredFields(missing));
        }
        Ok(())
    }

    /// Nombres de los campos obligatorios vacíos.
    pub fn missing_required(&self, mode: Mode, current: &Record, config: &FormConfig) -> Vec<String> {
        config.fields
              .iter()
              .filter(|f| f.required)
              .filter(|f| !(mode == Mode::Insert && f.name == config.primary_key && config.key_assigned_by_backend))
              .filter(|f| current.value(&f.name).is_empty())
              .map(|f| f.name.clone())
              .collect()
    }

    /// `true` si descartar perdería datos: en `edit`, algún campo difiere
    /// de `baseline`; en `insert`, algún campo tiene valor.
    pub fn has_pending_changes(&self, mode: Mode, current: &Record, baseline: Option<&Record>) -> bool {
        match mode {
            Mode::Browse => false,
            Mode::Edit => baseline.map(|b| !current.differing_fields(b).is_empty())
                                  .unwrap_or(!current.is_blank()),
            Mode::Insert => !current.is_blank(),
        }
    }
}
