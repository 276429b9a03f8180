// Archivo: repository.rs
// Propósito: definir los contratos de los colaboradores externos del
// navegador: el cliente CRUD remoto (`CrudClient`) y el accesor de campos
// del formulario (`FieldAccessor`). Las implementaciones concretas (HTTP,
// DOM, consola, memoria) viven fuera de este módulo.
use crate::domain::{DeleteResponse, FetchResponse, FieldValue, Record, RecordKey, WriteResponse};
use crate::errors::Result;
use async_trait::async_trait;

/// Contrato del cliente CRUD remoto.
///
/// Hay dos formas de fallo y el navegador trata ambas como fallo del
/// backend:
/// - `Err(RecordError::Transport)` cuando la llamada no se completa.
/// - `Ok(resp)` con `resp.success == false` cuando el backend rechaza la
///   operación; `resp.message` se muestra tal cual al usuario.
///
/// Para escrituras, `refreshed_records` trae el conjunto autoritativo tras
/// el cambio, en el orden del backend.
#[async_trait]
pub trait CrudClient: Send + Sync {
    /// Lee el conjunto completo de registros.
    async fn fetch_all(&self) -> Result<FetchResponse>;

    /// Inserta un registro nuevo con los valores capturados.
    async fn insert(&self, record: &Record) -> Result<WriteResponse>;

    /// Actualiza un registro existente. `record` lleva el registro completo
    /// (incluida la clave primaria).
    async fn update(&self, record: &Record) -> Result<WriteResponse>;

    /// Elimina el registro con la clave dada.
    async fn delete(&self, key: &RecordKey) -> Result<DeleteResponse>;
}

/// Acceso por nombre a los controles del formulario.
pub trait FieldAccessor: Send + Sync {
    /// Lee el valor actual del control. `Null` si el control no existe.
    fn get_value(&self, name: &str) -> FieldValue;

    /// Escribe un valor en el control.
    fn set_value(&self, name: &str, value: FieldValue);

    /// Marca el control como editable o de sólo lectura.
    fn set_editable(&self, name: &str, editable: bool);

    /// Vacía el control.
    fn clear(&self, name: &str) {
        self.set_value(name, FieldValue::Null);
    }
}
