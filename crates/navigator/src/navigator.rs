// Archivo: navigator.rs
// Propósito: implementar `RecordNavigator`, el orquestador de la máquina
// de estados del formulario. Es dueño de la caché, el cursor, el modo y
// el registro base; despacha las acciones de los botones pasando siempre
// por el guardián, invoca al cliente CRUD y reconcilia el cursor con el
// conjunto refrescado tras cada escritura.
use crate::cache::RecordsetCache;
use crate::config::FormConfig;
use crate::cursor::{Cursor, CursorPosition, NoTarget};
use crate::errors::{GuardRejection, NavigatorError, Result};
use crate::feedback::{ConfirmPrompt, Feedback, NavigatorStatus, Notice, Outcome};
use crate::guard::{ModeGuard, Verdict};
use crate::mode::{available_actions, Action, Mode};
use crate::reconciler::{Reconciliation, WriteReconciler};
use crate::view::{Confirmer, FormView, RecordValidator};
use record::{CrudClient, FieldAccessor, Record, RecordError, RecordKey};
use std::sync::Arc;

/// Navegador de registros de un formulario.
///
/// Una instancia por formulario activo; todo el estado vive aquí (no hay
/// estado global). Las transiciones son síncronas salvo las llamadas al
/// backend; mientras una escritura está en curso el modo sigue siendo
/// `edit`/`insert`, y el guardián impide despachar otra.
///
/// Nota sobre errores:
/// - Los rechazos del guardián devuelven `NavigatorError::Guard` y no
///   mutan nada.
/// - Los fallos del backend devuelven `NavigatorError::Backend` y dejan
///   modo, cursor y caché exactamente como estaban.
/// - Responder "no" a una confirmación devuelve `Ok(Outcome::Cancelled)`.
pub struct RecordNavigator<C>
    where C: CrudClient + ?Sized
{
    config: FormConfig,
    client: Arc<C>,
    fields: Arc<dyn FieldAccessor>,
    view: Arc<dyn FormView>,
    confirmer: Arc<dyn Confirmer>,
    validator: Option<Arc<dyn RecordValidator>>,
    guard: ModeGuard,
    reconciler: WriteReconciler,
    cache: RecordsetCache,
    cursor: Cursor,
    /// Copia del registro en el cursor tomada en la última navegación o
    /// escritura. `None` si no hay registro actual.
    baseline: Option<Record>,
    open: bool,
}

impl<C> RecordNavigator<C> where C: CrudClient + ?Sized
{
    /// Crea el navegador inyectando sus colaboradores. La configuración se
    /// valida aquí; el formulario queda cerrado hasta `open`.
    pub fn new(config: FormConfig,
               client: Arc<C>,
               fields: Arc<dyn FieldAccessor>,
               view: Arc<dyn FormView>,
               confirmer: Arc<dyn Confirmer>)
               -> Result<Self> {
        let config = config.validated()?;
        let cache = RecordsetCache::new(&config.primary_key);
        Ok(Self { config,
                  client,
                  fields,
                  view,
                  confirmer,
                  validator: None,
                  guard: ModeGuard,
                  reconciler: WriteReconciler,
                  cache,
                  cursor: Cursor::default(),
                  baseline: None,
                  open: false })
    }

    /// Registra el validador que se invoca durante `salvar`.
    pub fn with_validator(mut self, validator: Arc<dyn RecordValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> Mode {
        self.cursor.mode()
    }

    pub fn position(&self) -> CursorPosition {
        self.cursor.position()
    }

    pub fn records(&self) -> &[Record] {
        self.cache.records()
    }

    pub fn baseline(&self) -> Option<&Record> {
        self.baseline.as_ref()
    }

    /// Registro en la posición del cursor.
    pub fn current_record(&self) -> Option<&Record> {
        self.cursor.index().and_then(|i| self.cache.get(i))
    }

    pub fn status(&self) -> NavigatorStatus {
        NavigatorStatus { position: self.cursor.position(),
                          total: self.cache.len(),
                          mode: self.cursor.mode() }
    }

    /// Acciones legales ahora mismo (los botones activos).
    pub fn enabled_actions(&self) -> Vec<Action> {
        if !self.open {
            return Vec::new();
        }
        available_actions(self.cursor.mode(), self.cache.is_empty())
    }

    // ----------------------------------------------------------------
    // Ciclo de vida
    // ----------------------------------------------------------------

    /// Carga inicial: trae el conjunto completo. Con registros, cursor en
    /// 0 y modo `browse`; sin registros, cursor vacío y modo `insert`.
    ///
    /// Reabrir un formulario abierto pasa por las mismas reglas que
    /// `refresh`: no se permite con una edición o inclusión con datos.
    pub async fn open(&mut self) -> Result<Outcome> {
        if self.open {
            self.ensure_reloadable()?;
        }
        let records = self.fetch_records().await?;
        self.cache.replace(records);
        self.cursor = Cursor::opened(self.cache.len());
        self.open = true;
        self.show_current();
        self.view.highlight_fields(&[]);
        self.apply_mode();
        log::debug!("form opened with {} records", self.cache.len());
        Ok(Outcome::Opened { total: self.cache.len() })
    }

    /// Cierra el formulario: vacía la caché, reinicia cursor y modo, deja
    /// los campos de sólo lectura y desactiva todos los botones.
    pub fn close(&mut self) -> Outcome {
        self.cache.clear();
        self.cursor = Cursor::default();
        self.baseline = None;
        self.open = false;
        for name in self.config.field_names() {
            self.fields.clear(name);
            self.fields.set_editable(name, false);
        }
        for action in Action::ALL {
            self.view.set_action_enabled(action, false);
        }
        self.view.highlight_fields(&[]);
        log::debug!("form closed");
        Outcome::Closed
    }

    // ----------------------------------------------------------------
    // Despacho
    // ----------------------------------------------------------------

    /// Punto de entrada único para los botones del formulario.
    pub async fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        self.ensure_open()?;
        log::debug!("dispatch {} in {} at {}", action, self.cursor.mode(), self.cursor.position());
        let outcome = match action {
            Action::First | Action::Previous | Action::Next | Action::Last => self.navigate(action),
            Action::Edit => self.edit(),
            Action::Insert => self.insert(),
            Action::Save => self.save().await,
            Action::Delete => self.delete().await,
            Action::Close => self.close_or_discard(),
        };
        if self.open {
            debug_assert!(self.cursor.is_consistent(self.cache.len()),
                          "cursor {:?} inconsistent with {} records",
                          self.cursor,
                          self.cache.len());
        }
        outcome
    }

    /// `primeiro`, `anterior`, `proximo`, `ultimo`. En el límite no hay
    /// error: sólo se avisa y nada cambia. Cualquier otra acción se
    /// rechaza.
    pub fn navigate(&mut self, action: Action) -> Result<Outcome> {
        self.ensure_open()?;
        if !action.is_navigation() {
            return Err(self.reject(GuardRejection::NotNavigation(action)));
        }
        self.admit(self.guard.can_navigate(self.cursor.mode(), self.cache.is_empty()))?;
        match self.cursor.target(action, self.cache.len()) {
            Err(NoTarget::Limit(boundary)) => {
                self.notify(Feedback::LimitReached { action, boundary });
                Ok(Outcome::LimitReached(boundary))
            }
            Err(NoTarget::NotNavigation) => Err(self.reject(GuardRejection::NotNavigation(action))),
            Ok(index) => {
                self.cursor.move_to(index);
                self.show_current();
                self.apply_mode();
                Ok(Outcome::Moved(self.cursor.position()))
            }
        }
    }

    /// Mueve el cursor al registro con la clave dada.
    pub fn locate(&mut self, key: &RecordKey) -> Result<Outcome> {
        self.ensure_open()?;
        self.admit(self.guard.can_navigate(self.cursor.mode(), self.cache.is_empty()))?;
        let index = match self.cache.position_of(key) {
            Some(i) => i,
            None => return Err(self.reject(GuardRejection::NotFound(key.clone()))),
        };
        self.cursor.move_to(index);
        self.show_current();
        self.apply_mode();
        Ok(Outcome::Moved(self.cursor.position()))
    }

    /// `editar`: `browse` -> `edit`. Con la caché vacía se avisa y se pasa
    /// a `insert`.
    pub fn edit(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        let verdict = self.guard.can_perform(Action::Edit, self.cursor.mode(), self.cache.is_empty());
        if verdict.reason == Some(GuardRejection::EmptyRecordset) {
            self.notify(Feedback::Rejected(GuardRejection::EmptyRecordset));
            self.enter_insert();
            return Ok(Outcome::ModeChanged(Mode::Insert));
        }
        self.admit(verdict)?;
        self.cursor.set_mode(Mode::Edit);
        self.apply_mode();
        Ok(Outcome::ModeChanged(Mode::Edit))
    }

    /// `incluir`: `browse` -> `insert` con los campos vacíos. El cursor se
    /// conserva para poder volver a él al descartar.
    pub fn insert(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        self.admit(self.guard.can_perform(Action::Insert, self.cursor.mode(), self.cache.is_empty()))?;
        self.enter_insert();
        Ok(Outcome::ModeChanged(Mode::Insert))
    }

    /// `encerrar`: en `browse` cierra el formulario; en `edit`/`insert`
    /// descarta la operación en curso.
    pub fn close_or_discard(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        self.admit(self.guard.can_perform(Action::Close, self.cursor.mode(), self.cache.is_empty()))?;
        if self.cursor.mode().is_dirty() {
            self.discard()
        } else {
            Ok(self.close())
        }
    }

    /// Descarta la edición o inclusión en curso. Si hay datos que se
    /// perderían se pide confirmación.
    pub fn discard(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        let mode = self.cursor.mode();
        if !mode.is_dirty() {
            return Ok(Outcome::Discarded);
        }
        let current = self.capture();
        if self.guard.has_pending_changes(mode, &current, self.baseline.as_ref())
           && !self.confirmer.confirm(&ConfirmPrompt::DiscardChanges { mode })
        {
            self.notify(Feedback::Cancelled(Action::Close));
            return Ok(Outcome::Cancelled);
        }
        match (mode, self.cursor.index()) {
            (Mode::Edit, _) => {
                if let Some(baseline) = self.baseline.clone() {
                    self.populate(&baseline);
                }
                self.cursor.set_mode(Mode::Browse);
            }
            (_, Some(index)) => {
                self.cursor.move_to(index);
                self.show_current();
            }
            // sin registros se permanece en `insert` con los campos vacíos
            (_, None) => self.clear_fields(),
        }
        self.view.highlight_fields(&[]);
        self.apply_mode();
        self.notify(Feedback::Discarded);
        log::debug!("discarded pending {}", mode);
        Ok(Outcome::Discarded)
    }

    // ----------------------------------------------------------------
    // Escrituras
    // ----------------------------------------------------------------

    /// `salvar`: valida, confirma, escribe y reconcilia.
    ///
    /// En `edit` se envía el registro base combinado con los valores
    /// actuales (la clave oculta sobrevive); en `insert`, sólo los valores
    /// capturados. Si el backend falla, modo y cursor no cambian.
    pub async fn save(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        self.admit(self.guard.can_perform(Action::Save, self.cursor.mode(), self.cache.is_empty()))?;
        let mode = self.cursor.mode();
        let current = self.capture();
        if let Err(rejection) = self.guard.check_commit(mode, &current, self.baseline.as_ref(), &self.config) {
            if let GuardRejection::MissingRequiredFields(missing) = &rejection {
                self.view.highlight_fields(missing);
            }
            return Err(self.reject(rejection));
        }

        let payload = match mode {
            Mode::Edit => self.baseline
                              .as_ref()
                              .map(|b| b.merged_with(&current))
                              .unwrap_or_else(|| current.clone()),
            _ => self.insert_payload(current),
        };
        if let Some(validator) = &self.validator {
            if let Err(messages) = validator.validate(&payload, mode) {
                return Err(self.reject(GuardRejection::ValidationFailed(messages)));
            }
        }
        if self.config.confirm_writes && !self.confirmer.confirm(&ConfirmPrompt::Save { mode }) {
            self.notify(Feedback::Cancelled(Action::Save));
            return Ok(Outcome::Cancelled);
        }

        let keys_before = self.cache.keys();
        let key_before = self.baseline
                             .as_ref()
                             .and_then(|b| b.key(&self.config.primary_key))
                             .or_else(|| self.cursor.index().and_then(|i| self.cache.key_at(i)));
        let response = match mode {
            Mode::Edit => self.client.update(&payload).await,
            _ => self.client.insert(&payload).await,
        };
        let response = match response {
            Ok(r) if r.success => r,
            Ok(r) => return Err(self.backend_failure(r.message)),
            Err(e) => return Err(self.backend_failure(e.to_string())),
        };

        // la escritura ya se hizo: un fallo al releer sólo es un aviso
        let refreshed = match response.refreshed_records {
            Some(records) => Some(records),
            None => match self.fetch_from_backend().await {
                Ok(records) => Some(records),
                Err(message) => {
                    self.warn(format!("no se pudo releer el conjunto tras salvar: {}", message));
                    None
                }
            },
        };
        if let Some(records) = refreshed {
            self.cache.replace(records);
        }
        let reconciliation = match mode {
            Mode::Edit => self.reconciler.after_update(key_before.as_ref(), &self.cache),
            _ => self.reconciler.after_insert(&keys_before, response.new_key.as_ref(), &self.cache),
        };
        let reconciled = self.settle(&reconciliation);
        self.view.highlight_fields(&[]);
        self.apply_mode();
        let saved_key = self.current_record().and_then(|r| r.key(&self.config.primary_key));
        log::info!("{} committed, key {:?}, cursor {}", mode, saved_key, self.cursor.position());
        self.notify(Feedback::Saved { key: saved_key,
                                      message: response.message });
        Ok(Outcome::Saved { position: self.cursor.position(),
                            reconciled })
    }

    /// `deletar`: confirma, elimina en el backend y quita el registro de la
    /// caché sin releer. El cursor retrocede uno (o queda en 0); si no
    /// quedan registros se pasa a `insert` con los campos vacíos.
    pub async fn delete(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        self.admit(self.guard.can_perform(Action::Delete, self.cursor.mode(), self.cache.is_empty()))?;
        let index = match self.cursor.index() {
            Some(i) => i,
            None => return Err(self.reject(GuardRejection::EmptyRecordset)),
        };
        let key = match self.cache.key_at(index) {
            Some(k) => k,
            None => {
                let err = RecordError::NotFound(format!("registro {} sin clave primaria", index));
                self.notify(Feedback::BackendFailure { message: err.to_string() });
                return Err(err.into());
            }
        };
        if self.config.confirm_writes && !self.confirmer.confirm(&ConfirmPrompt::Delete { key: key.clone() }) {
            self.notify(Feedback::Cancelled(Action::Delete));
            return Ok(Outcome::Cancelled);
        }
        let response = match self.client.delete(&key).await {
            Ok(r) if r.success => r,
            Ok(r) => return Err(self.backend_failure(r.message)),
            Err(e) => return Err(self.backend_failure(e.to_string())),
        };

        self.cache.remove_at(index);
        let next = if self.cache.is_empty() { None } else { Some(index.saturating_sub(1)) };
        self.cursor.settle(next, self.cache.len());
        self.show_current();
        self.apply_mode();
        log::info!("deleted key {}, cursor {}", key, self.cursor.position());
        self.notify(Feedback::Deleted { key, message: response.message });
        Ok(Outcome::Deleted { position: self.cursor.position() })
    }

    /// Relee el conjunto y mantiene el cursor sobre el mismo registro.
    pub async fn refresh(&mut self) -> Result<Outcome> {
        self.ensure_open()?;
        self.ensure_reloadable()?;
        let key = self.cursor.index().and_then(|i| self.cache.key_at(i));
        let records = self.fetch_records().await?;
        self.cache.replace(records);
        let reconciliation = match key {
            Some(k) => self.reconciler.after_update(Some(&k), &self.cache),
            None => Reconciliation { index: Some(0), miss: None },
        };
        let reconciled = self.settle(&reconciliation);
        self.apply_mode();
        Ok(Outcome::Refreshed { position: self.cursor.position(),
                                reconciled })
    }

    // ----------------------------------------------------------------
    // Auxiliares
    // ----------------------------------------------------------------

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(NavigatorError::NotOpen)
        }
    }

    /// Releer el conjunto no puede pisar una edición en curso ni un insert
    /// con datos.
    fn ensure_reloadable(&self) -> Result<()> {
        self.admit(self.guard.can_refresh(self.cursor.mode(), self.cache.is_empty()))?;
        if self.guard.has_pending_changes(self.cursor.mode(), &self.capture(), self.baseline.as_ref()) {
            return Err(self.reject(GuardRejection::OperationInProgress));
        }
        Ok(())
    }

    /// Convierte un veredicto negativo en error, avisando a la vista.
    fn admit(&self, verdict: Verdict) -> Result<()> {
        verdict.into_result().map_err(|r| self.reject(r))
    }

    fn reject(&self, rejection: GuardRejection) -> NavigatorError {
        log::debug!("rejected: {}", rejection);
        self.notify(Feedback::Rejected(rejection.clone()));
        NavigatorError::Guard(rejection)
    }

    fn backend_failure(&self, message: String) -> NavigatorError {
        log::warn!("backend failure: {}", message);
        self.notify(Feedback::BackendFailure { message: message.clone() });
        NavigatorError::Backend { message }
    }

    fn warn(&self, message: String) {
        log::warn!("{}", message);
        self.notify(Feedback::Warning(message));
    }

    fn notify(&self, feedback: Feedback) {
        self.view.notify(&Notice::now(feedback));
    }

    async fn fetch_records(&self) -> Result<Vec<Record>> {
        match self.fetch_from_backend().await {
            Ok(records) => Ok(records),
            Err(message) => Err(self.backend_failure(message)),
        }
    }

    /// `fetch_all` sin avisar a la vista; el error es el texto del backend.
    async fn fetch_from_backend(&self) -> std::result::Result<Vec<Record>, String> {
        match self.client.fetch_all().await {
            Ok(r) if r.success => Ok(r.records),
            Ok(r) => Err(r.message),
            Err(e) => Err(e.to_string()),
        }
    }

    /// Aplica una reconciliación al cursor y repuebla los campos. Devuelve
    /// `false` (y avisa) si hubo divergencia.
    fn settle(&mut self, reconciliation: &Reconciliation) -> bool {
        if let Some(miss) = &reconciliation.miss {
            self.warn(miss.to_string());
        }
        self.cursor.settle(reconciliation.index, self.cache.len());
        self.show_current();
        reconciliation.is_reconciled()
    }

    fn enter_insert(&mut self) {
        self.cursor.set_mode(Mode::Insert);
        self.clear_fields();
        self.view.highlight_fields(&[]);
        self.apply_mode();
    }

    /// Valores actuales de los campos configurados.
    fn capture(&self) -> Record {
        self.config
            .field_names()
            .map(|name| (name.to_string(), self.fields.get_value(name)))
            .collect()
    }

    /// En un insert la clave vacía no se envía: la asigna el backend.
    fn insert_payload(&self, mut captured: Record) -> Record {
        if captured.value(&self.config.primary_key).is_empty() {
            captured.remove(&self.config.primary_key);
        }
        captured
    }

    fn populate(&self, record: &Record) {
        for name in self.config.field_names() {
            self.fields.set_value(name, record.value(name));
        }
    }

    fn clear_fields(&self) {
        for name in self.config.field_names() {
            self.fields.clear(name);
        }
    }

    /// Muestra el registro del cursor y lo toma como nuevo registro base.
    fn show_current(&mut self) {
        match self.current_record().cloned() {
            Some(record) => {
                self.populate(&record);
                self.baseline = Some(record);
            }
            None => {
                self.clear_fields();
                self.baseline = None;
            }
        }
    }

    /// Empuja a la vista lo que depende del modo: campos editables, botones
    /// activos e indicador de posición.
    fn apply_mode(&self) {
        let mode = self.cursor.mode();
        for spec in &self.config.fields {
            self.fields.set_editable(&spec.name, self.config.editable_in(spec, mode));
        }
        let enabled = available_actions(mode, self.cache.is_empty());
        for action in Action::ALL {
            self.view.set_action_enabled(action, enabled.contains(&action));
        }
        self.view.show_status(&self.status());
    }
}
