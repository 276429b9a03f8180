// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un backend CRUD en memoria (`InMemoryCrudClient`) con inyección
// de fallos y reordenamiento configurable, y un formulario en memoria
// (`InMemoryFieldAccessor`). No son durables; se usan para demos o pruebas
// locales.
use crate::domain::{DeleteResponse, FetchResponse, FieldValue, Record, RecordKey, WriteResponse};
use crate::errors::{RecordError, Result};
use crate::repository::{CrudClient, FieldAccessor};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Estrategia con la que el backend en memoria asigna claves a los
/// inserts que llegan sin clave primaria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Enteros crecientes a partir del mayor existente.
    Sequential,
    /// `Uuid` v4.
    Uuid,
}

/// Fallo programado para la próxima llamada.
#[derive(Debug, Clone)]
enum InjectedFailure {
    /// Responde `success: false` con el mensaje dado.
    Rejected(String),
    /// Devuelve `Err(RecordError::Transport)`.
    Transport(String),
}

/// Backend CRUD en memoria.
///
/// Mantiene el conjunto ordenado de registros y devuelve el conjunto
/// refrescado tras cada escritura, opcionalmente reordenado por un campo
/// (para simular un backend que reordena o filtra).
pub struct InMemoryCrudClient {
    pk_field: String,
    records: Mutex<Vec<Record>>,
    order_by: Option<String>,
    key_strategy: KeyStrategy,
    report_new_key: bool,
    include_refreshed: bool,
    /// Fallos programados; con operación sólo los consume esa operación.
    failures: Mutex<VecDeque<(Option<String>, InjectedFailure)>>,
    /// Registro de llamadas recibidas (`"fetch_all"`, `"insert"`, ...).
    calls: Mutex<Vec<String>>,
}

impl InMemoryCrudClient {
    /// Crea un backend vacío cuya clave primaria es `pk_field`.
    pub fn new(pk_field: &str) -> Self {
        Self { pk_field: pk_field.to_string(),
               records: Mutex::new(Vec::new()),
               order_by: None,
               key_strategy: KeyStrategy::Sequential,
               report_new_key: false,
               include_refreshed: true,
               failures: Mutex::new(VecDeque::new()),
               calls: Mutex::new(Vec::new()) }
    }

    /// Crea un backend con registros iniciales (en ese orden).
    pub fn with_records(pk_field: &str, records: Vec<Record>) -> Self {
        let client = Self::new(pk_field);
        if let Ok(mut guard) = client.records.lock() {
            *guard = records;
        }
        client
    }

    /// Ordena el conjunto devuelto por el campo indicado.
    pub fn ordered_by(mut self, field: &str) -> Self {
        self.order_by = Some(field.to_string());
        self
    }

    pub fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.key_strategy = strategy;
        self
    }

    /// Si es `true`, los inserts informan la clave creada en `new_key`.
    pub fn reporting_new_key(mut self, report: bool) -> Self {
        self.report_new_key = report;
        self
    }

    /// Si es `false`, las escrituras no devuelven el conjunto refrescado y
    /// el cliente debe volver a pedirlo con `fetch_all`.
    pub fn including_refreshed(mut self, include: bool) -> Self {
        self.include_refreshed = include;
        self
    }

    /// La próxima llamada responde `success: false` con `message`.
    pub fn reject_next(&self, message: &str) {
        self.inject(None, InjectedFailure::Rejected(message.to_string()));
    }

    /// La próxima llamada falla con error de transporte.
    pub fn fail_transport_next(&self, message: &str) {
        self.inject(None, InjectedFailure::Transport(message.to_string()));
    }

    /// La próxima llamada a `call` (`"fetch_all"`, `"insert"`, `"update"`
    /// o `"delete"`) responde `success: false`; las demás no se ven
    /// afectadas.
    pub fn reject_next_on(&self, call: &str, message: &str) {
        self.inject(Some(call), InjectedFailure::Rejected(message.to_string()));
    }

    /// Como `reject_next_on` pero con error de transporte.
    pub fn fail_transport_next_on(&self, call: &str, message: &str) {
        self.inject(Some(call), InjectedFailure::Transport(message.to_string()));
    }

    fn inject(&self, call: Option<&str>, failure: InjectedFailure) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back((call.map(str::to_string), failure));
    }

    /// Reemplaza el contenido del backend sin pasar por el cliente, para
    /// simular cambios hechos por otros usuarios.
    pub fn replace_all(&self, records: Vec<Record>) {
        *self.records.lock().unwrap_or_else(|e| e.into_inner()) = records;
    }

    /// Copia del conjunto actual tal como lo devolvería el backend.
    pub fn snapshot(&self) -> Vec<Record> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        self.ordered(&records)
    }

    /// Llamadas recibidas hasta ahora, en orden.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Número de llamadas de escritura (`insert`, `update`, `delete`).
    pub fn write_calls(&self) -> usize {
        self.calls().iter().filter(|c| c.as_str() != "fetch_all").count()
    }

    fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> std::result::Result<MutexGuard<'a, T>, RecordError> {
        m.lock().map_err(|e| RecordError::Other(format!("mutex poisoned: {:?}", e)))
    }

    /// Anota la llamada y consume un fallo programado, si lo hay.
    fn enter(&self, call: &str) -> Result<Option<String>> {
        self.lock(&self.calls)?.push(call.to_string());
        let mut failures = self.lock(&self.failures)?;
        let slot = failures.iter().position(|(target, _)| target.as_deref().map_or(true, |t| t == call));
        let pending = slot.and_then(|i| failures.remove(i)).map(|(_, failure)| failure);
        match pending {
            Some(InjectedFailure::Transport(msg)) => Err(RecordError::Transport(msg)),
            Some(InjectedFailure::Rejected(msg)) => Ok(Some(msg)),
            None => Ok(None),
        }
    }

    fn ordered(&self, records: &[Record]) -> Vec<Record> {
        let mut out = records.to_vec();
        if let Some(field) = &self.order_by {
            out.sort_by(|a, b| compare_values(&a.value(field), &b.value(field)));
        }
        out
    }

    fn next_key(&self, records: &[Record]) -> FieldValue {
        match self.key_strategy {
            KeyStrategy::Uuid => FieldValue::Text(Uuid::new_v4().to_string()),
            KeyStrategy::Sequential => {
                let max = records.iter()
                                 .filter_map(|r| r.key(&self.pk_field))
                                 .filter_map(|k| k.as_str().parse::<i64>().ok())
                                 .max()
                                 .unwrap_or(0);
                FieldValue::from(max + 1)
            }
        }
    }

    fn refreshed(&self, records: &[Record]) -> Option<Vec<Record>> {
        if self.include_refreshed {
            Some(self.ordered(records))
        } else {
            None
        }
    }
}

/// Orden numérico cuando ambos valores son números, lexicográfico en otro
/// caso.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    let (sa, sb) = (a.normalized(), b.normalized());
    match (sa.parse::<f64>(), sb.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => sa.cmp(&sb),
    }
}

#[async_trait]
impl CrudClient for InMemoryCrudClient {
    async fn fetch_all(&self) -> Result<FetchResponse> {
        if let Some(message) = self.enter("fetch_all")? {
            return Ok(FetchResponse { success: false,
                                      message,
                                      records: Vec::new() });
        }
        let records = self.lock(&self.records)?;
        Ok(FetchResponse { success: true,
                           message: String::new(),
                           records: self.ordered(&records) })
    }

    /// Inserta el registro; si llega sin clave se asigna una según
    /// `KeyStrategy`. Una clave repetida se rechaza.
    async fn insert(&self, record: &Record) -> Result<WriteResponse> {
        if let Some(message) = self.enter("insert")? {
            return Ok(WriteResponse::failed(message));
        }
        let mut records = self.lock(&self.records)?;
        let mut stored = record.clone();
        let key = match record.key(&self.pk_field) {
            Some(k) => {
                if records.iter().any(|r| r.key(&self.pk_field).as_ref() == Some(&k)) {
                    return Ok(WriteResponse::failed(format!("clave duplicada: {}", k)));
                }
                k
            }
            None => {
                let value = self.next_key(&records);
                stored.set(&self.pk_field, value.clone());
                RecordKey::from_value(&value).ok_or(RecordError::Other("clave generada vacía".into()))?
            }
        };
        records.push(stored);
        log::debug!("in-memory insert {}={}", self.pk_field, key);
        Ok(WriteResponse { success: true,
                           message: format!("registro {} incluido", key),
                           refreshed_records: self.refreshed(&records),
                           new_key: if self.report_new_key { Some(key) } else { None } })
    }

    async fn update(&self, record: &Record) -> Result<WriteResponse> {
        if let Some(message) = self.enter("update")? {
            return Ok(WriteResponse::failed(message));
        }
        let key = match record.key(&self.pk_field) {
            Some(k) => k,
            None => return Ok(WriteResponse::failed("registro sin clave primaria")),
        };
        let mut records = self.lock(&self.records)?;
        let slot = match records.iter_mut().find(|r| r.key(&self.pk_field).as_ref() == Some(&key)) {
            Some(slot) => slot,
            None => return Ok(WriteResponse::failed(format!("registro {} no encontrado", key))),
        };
        *slot = slot.merged_with(record);
        log::debug!("in-memory update {}={}", self.pk_field, key);
        Ok(WriteResponse { success: true,
                           message: format!("registro {} alterado", key),
                           refreshed_records: self.refreshed(&records),
                           new_key: None })
    }

    async fn delete(&self, key: &RecordKey) -> Result<DeleteResponse> {
        if let Some(message) = self.enter("delete")? {
            return Ok(DeleteResponse { success: false, message });
        }
        let mut records = self.lock(&self.records)?;
        let before = records.len();
        records.retain(|r| r.key(&self.pk_field).as_ref() != Some(key));
        if records.len() == before {
            return Ok(DeleteResponse { success: false,
                                       message: format!("registro {} no encontrado", key) });
        }
        log::debug!("in-memory delete {}={}", self.pk_field, key);
        Ok(DeleteResponse { success: true,
                            message: format!("registro {} excluido", key) })
    }
}

/// Formulario en memoria: valores por nombre y bandera de edición.
#[derive(Debug, Default)]
pub struct InMemoryFieldAccessor {
    values: Mutex<IndexMap<String, FieldValue>>,
    editable: Mutex<HashMap<String, bool>>,
}

impl InMemoryFieldAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simula al usuario escribiendo en un control.
    pub fn type_value(&self, name: &str, value: impl Into<FieldValue>) {
        self.set_value(name, value.into());
    }

    /// `true` si el control está marcado como editable. Un control que
    /// nunca se configuró es de sólo lectura.
    pub fn is_editable(&self, name: &str) -> bool {
        *self.editable
             .lock()
             .unwrap_or_else(|e| e.into_inner())
             .get(name)
             .unwrap_or(&false)
    }

    /// Valores actuales de todos los controles tocados.
    pub fn snapshot(&self) -> Record {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl FieldAccessor for InMemoryFieldAccessor {
    fn get_value(&self, name: &str) -> FieldValue {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn set_value(&self, name: &str, value: FieldValue) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value);
    }

    fn set_editable(&self, name: &str, editable: bool) {
        self.editable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), editable);
    }
}
