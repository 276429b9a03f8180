// Archivo: cache.rs
// Propósito: copia ordenada en memoria del último conjunto de registros
// recibido del backend. Se reemplaza entera en cada fetch y en cada
// escritura; la única mutación local es la eliminación tras un delete.
use indexmap::IndexSet;
use record::{Record, RecordKey};

/// Caché del conjunto de registros, en el orden del backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordsetCache {
    pk_field: String,
    records: Vec<Record>,
}

impl RecordsetCache {
    pub fn new(pk_field: &str) -> Self {
        Self { pk_field: pk_field.to_string(),
               records: Vec::new() }
    }

    /// Reemplaza el contenido por completo.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Quita el registro en `index` y lo devuelve.
    pub fn remove_at(&mut self, index: usize) -> Option<Record> {
        if index < self.records.len() {
            Some(self.records.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Índice del registro cuya clave es `key`.
    pub fn position_of(&self, key: &RecordKey) -> Option<usize> {
        self.records.iter().position(|r| r.key(&self.pk_field).as_ref() == Some(key))
    }

    /// Claves del conjunto, en orden. Los registros sin clave se omiten.
    pub fn keys(&self) -> IndexSet<RecordKey> {
        self.records.iter().filter_map(|r| r.key(&self.pk_field)).collect()
    }

    /// Clave del registro en `index`.
    pub fn key_at(&self, index: usize) -> Option<RecordKey> {
        self.records.get(index).and_then(|r| r.key(&self.pk_field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> RecordsetCache {
        let mut c = RecordsetCache::new("id");
        c.replace(vec![Record::new().with("id", 10),
                       Record::new().with("id", "20"),
                       Record::new().with("nome", "sin clave")]);
        c
    }

    #[test]
    fn locates_by_normalized_key() {
        let c = cache();
        assert_eq!(c.position_of(&RecordKey::new("20")), Some(1));
        assert_eq!(c.position_of(&RecordKey::new("30")), None);
        assert_eq!(c.keys().len(), 2);
        assert_eq!(c.key_at(0), Some(RecordKey::new("10")));
        assert_eq!(c.key_at(2), None);
    }

    #[test]
    fn remove_at_out_of_range_is_none() {
        let mut c = cache();
        assert!(c.remove_at(5).is_none());
        assert!(c.remove_at(0).is_some());
        assert_eq!(c.len(), 2);
    }
}
