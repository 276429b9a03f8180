// Archivo: domain.rs
// Propósito: tipos de datos compartidos entre el navegador de registros y
// sus colaboradores: valores escalares de campo, la clave primaria, el
// registro ordenado y los DTOs de respuesta del cliente CRUD remoto.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Valor escalar de un campo de formulario.
///
/// Se serializa sin etiqueta para que los escalares JSON del backend
/// (`"abc"`, `12`, `true`, `null`) se mapeen directamente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// `true` para `Null` y para texto vacío o sólo con espacios.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Representación normalizada usada para comparar valores de controles
    /// (siempre texto) contra valores tipados del backend. El texto se
    /// conserva tal cual: `"a"` y `"a "` son valores (y claves) distintos.
    pub fn normalized(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Igualdad campo a campo tal como la entiende el formulario: por
    /// forma normalizada (`"12"` igual a `12`), y dos valores vacíos en el
    /// sentido de `is_empty` son iguales entre sí.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        (self.is_empty() && other.is_empty()) || self.normalized() == other.normalized()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Identidad de un registro: valor normalizado de su clave primaria.
///
/// Dos registros son la misma entidad sii sus `RecordKey` son iguales.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Construye la clave a partir de un valor de campo. `None` si el valor
    /// está vacío.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.normalized()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registro: mapa ordenado nombre de campo -> valor escalar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: IndexMap::new() }
    }

    /// Registro con todos los campos indicados en `Null`.
    pub fn blank<'a, I>(names: I) -> Self
        where I: IntoIterator<Item = &'a str>
    {
        Self { fields: names.into_iter().map(|n| (n.to_string(), FieldValue::Null)).collect() }
    }

    /// Variante encadenable de `set`, cómoda para construir fixtures.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Devuelve el valor del campo o `Null` si no existe.
    pub fn value(&self, name: &str) -> FieldValue {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    /// Clave primaria del registro según el campo configurado.
    pub fn key(&self, pk_field: &str) -> Option<RecordKey> {
        self.fields.get(pk_field).and_then(RecordKey::from_value)
    }

    /// Copia de `self` con los campos de `overlay` sobrescritos. Los campos
    /// que sólo existen en `self` (p.ej. la clave oculta) se conservan.
    pub fn merged_with(&self, overlay: &Record) -> Record {
        let mut out = self.clone();
        for (name, value) in overlay.iter() {
            out.fields.insert(name.clone(), value.clone());
        }
        out
    }

    /// `true` si todos los campos están vacíos.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(FieldValue::is_empty)
    }

    /// Nombres de los campos de `self` cuyo valor difiere del de `other`.
    /// Un campo ausente en `other` se compara contra `Null`.
    pub fn differing_fields(&self, other: &Record) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(name, value)| !value.same_as(&other.value(name)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Respuesta de `fetch_all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Respuesta de `insert`/`update`. `refreshed_records` es el conjunto
/// autoritativo tras la escritura; `new_key` la clave creada por un insert
/// cuando el backend la informa explícitamente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub refreshed_records: Option<Vec<Record>>,
    #[serde(default)]
    pub new_key: Option<RecordKey>,
}

impl WriteResponse {
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false,
               message: message.into(),
               refreshed_records: None,
               new_key: None }
    }
}

/// Respuesta de `delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
