// Archivo: reconciler.rs
// Propósito: recalcular la posición del cursor tras una escritura
// exitosa. El backend puede reordenar o filtrar el conjunto, así que la
// posición se resuelve por identidad (clave primaria) y nunca por el
// índice anterior.
use crate::cache::RecordsetCache;
use indexmap::IndexSet;
use record::RecordKey;
use std::fmt;

/// Divergencia entre el backend y la caché: la clave esperada no pudo
/// resolverse en el conjunto refrescado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationMiss {
    /// La clave previa a la escritura no está en el conjunto nuevo.
    KeyNotFound(RecordKey),
    /// El registro escrito no tenía clave con la que buscarlo.
    MissingKey,
    /// Ninguna clave nueva tras un insert.
    NoNewKey,
    /// Más de una clave nueva tras un insert.
    AmbiguousNewKeys(Vec<RecordKey>),
}

impl fmt::Display for ReconciliationMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationMiss::KeyNotFound(k) => write!(f, "el registro {} no aparece en el conjunto refrescado", k),
            ReconciliationMiss::MissingKey => f.write_str("el registro escrito no tiene clave primaria"),
            ReconciliationMiss::NoNewKey => f.write_str("no se encontró el registro incluido en el conjunto refrescado"),
            ReconciliationMiss::AmbiguousNewKeys(keys) => {
                let list: Vec<&str> = keys.iter().map(RecordKey::as_str).collect();
                write!(f, "varias claves nuevas tras la inclusión: {}", list.join(", "))
            }
        }
    }
}

/// Resultado de reconciliar: índice resuelto (o `None` si el conjunto
/// quedó vacío) y, si hubo, la divergencia detectada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub index: Option<usize>,
    pub miss: Option<ReconciliationMiss>,
}

impl Reconciliation {
    fn found(index: usize) -> Self {
        Self { index: Some(index), miss: None }
    }

    /// Índice 0, o vacío si no hay registros.
    fn fallback(refreshed: &RecordsetCache, miss: ReconciliationMiss) -> Self {
        Self { index: if refreshed.is_empty() { None } else { Some(0) },
               miss: Some(miss) }
    }

    pub fn is_reconciled(&self) -> bool {
        self.miss.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteReconciler;

impl WriteReconciler {
    /// Tras un update (o un refetch): busca la clave previa a la escritura.
    pub fn after_update(&self, key: Option<&RecordKey>, refreshed: &RecordsetCache) -> Reconciliation {
        let key = match key {
            Some(k) => k,
            None => return Reconciliation::fallback(refreshed, ReconciliationMiss::MissingKey),
        };
        match refreshed.position_of(key) {
            Some(i) => Reconciliation::found(i),
            None => Reconciliation::fallback(refreshed, ReconciliationMiss::KeyNotFound(key.clone())),
        }
    }

    /// Tras un insert: usa la clave informada por el backend si aparece en
    /// el conjunto nuevo; si no, la única clave presente en `refreshed` y
    /// ausente en `before`.
    pub fn after_insert(&self,
                        before: &IndexSet<RecordKey>,
                        reported: Option<&RecordKey>,
                        refreshed: &RecordsetCache)
                        -> Reconciliation {
        if let Some(i) = reported.and_then(|k| refreshed.position_of(k)) {
            return Reconciliation::found(i);
        }
        let added: Vec<RecordKey> = refreshed.keys().difference(before).cloned().collect();
        match added.as_slice() {
            [only] => match refreshed.position_of(only) {
                Some(i) => Reconciliation::found(i),
                None => Reconciliation::fallback(refreshed, ReconciliationMiss::KeyNotFound(only.clone())),
            },
            [] => {
                let miss = match reported {
                    Some(k) => ReconciliationMiss::KeyNotFound(k.clone()),
                    None => ReconciliationMiss::NoNewKey,
                };
                Reconciliation::fallback(refreshed, miss)
            }
            many => Reconciliation::fallback(refreshed, ReconciliationMiss::AmbiguousNewKeys(many.to_vec())),
        }
    }
}
