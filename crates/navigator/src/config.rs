// Archivo: config.rs
// Propósito: configuración del formulario que maneja el navegador: nombre
// de la clave primaria, campos visibles con sus reglas (obligatorio,
// editable, incluible) y políticas de confirmación. Se puede construir en
// código, desde JSON o desde variables de entorno (`.env` incluido).
use crate::errors::{NavigatorError, Result};
use crate::mode::Mode;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Reglas de un campo del formulario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Editable durante `edit`.
    #[serde(default = "default_true")]
    pub editable: bool,
    /// Editable durante `insert`.
    #[serde(default = "default_true")]
    pub insertable: bool,
}

impl FieldSpec {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(),
               label: None,
               required: false,
               editable: true,
               insertable: true }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self.insertable = false;
        self
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Etiqueta para mensajes; el nombre si no hay etiqueta.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Configuración de un formulario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub primary_key: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Pedir confirmación antes de salvar y excluir.
    #[serde(default = "default_true")]
    pub confirm_writes: bool,
    /// El backend genera la clave de los registros incluidos; la clave no
    /// es editable ni en `insert`.
    #[serde(default = "default_true")]
    pub key_assigned_by_backend: bool,
}

impl FormConfig {
    /// Configuración mínima: sólo la clave primaria, como campo de sólo
    /// lectura.
    pub fn new(primary_key: &str) -> Self {
        Self { primary_key: primary_key.to_string(),
               fields: vec![FieldSpec::new(primary_key)],
               confirm_writes: true,
               key_assigned_by_backend: true }
    }

    /// Añade (o reemplaza) un campo.
    pub fn with_field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    pub fn confirm_writes(mut self, confirm: bool) -> Self {
        self.confirm_writes = confirm;
        self
    }

    pub fn key_assigned_by_backend(mut self, assigned: bool) -> Self {
        self.key_assigned_by_backend = assigned;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: FormConfig = serde_json::from_str(raw).map_err(|e| NavigatorError::Config(format!("JSON de formulario inválido: {}", e)))?;
        cfg.validated()
    }

    /// Lee `FORMNAV_PRIMARY_KEY`, `FORMNAV_FIELDS` y
    /// `FORMNAV_CONFIRM_WRITES` del entorno (cargando `.env` si existe).
    ///
    /// `FORMNAV_FIELDS` es una lista separada por comas; el sufijo `*`
    /// marca un campo obligatorio y `!` uno de sólo lectura
    /// (`"codigo!,nome*,descricao"`).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Igual que `from_env` pero con una función de búsqueda inyectada.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
        where F: Fn(&str) -> Option<String>
    {
        let pk = lookup("FORMNAV_PRIMARY_KEY").ok_or_else(|| {
                                                   NavigatorError::Config("FORMNAV_PRIMARY_KEY no está definida".into())
                                               })?;
        let mut cfg = FormConfig::new(pk.trim());
        if let Some(list) = lookup("FORMNAV_FIELDS") {
            for raw in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                cfg = cfg.with_field(parse_field(raw));
            }
        }
        if let Some(flag) = lookup("FORMNAV_CONFIRM_WRITES") {
            cfg.confirm_writes = parse_bool(&flag)?;
        }
        cfg.validated()
    }

    /// Comprueba que la clave exista y que no haya campos repetidos.
    pub fn validated(self) -> Result<Self> {
        if self.primary_key.trim().is_empty() {
            return Err(NavigatorError::Config("el nombre de la clave primaria está vacío".into()));
        }
        if !self.fields.iter().any(|f| f.name == self.primary_key) {
            return Err(NavigatorError::Config(format!("la clave primaria '{}' no es un campo del formulario", self.primary_key)));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|g| g.name == f.name) {
                return Err(NavigatorError::Config(format!("campo repetido '{}'", f.name)));
            }
        }
        Ok(self)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Permiso de escritura de un campo: función pura del modo.
    pub fn editable_in(&self, field: &FieldSpec, mode: Mode) -> bool {
        let is_key = field.name == self.primary_key;
        match mode {
            Mode::Browse => false,
            Mode::Edit => field.editable && !is_key,
            Mode::Insert => field.insertable && !(is_key && self.key_assigned_by_backend),
        }
    }
}

fn parse_field(raw: &str) -> FieldSpec {
    let mut name = raw;
    let mut required = false;
    let mut read_only = false;
    while let Some(last) = name.chars().last() {
        match last {
            '*' => required = true,
            '!' => read_only = true,
            _ => break,
        }
        name = &name[..name.len() - 1];
    }
    let mut spec = FieldSpec::new(name.trim());
    if required {
        spec = spec.required();
    }
    if read_only {
        spec = spec.read_only();
    }
    spec
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(NavigatorError::Config(format!("valor booleano inválido '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_field_list_markers() {
        let vars = env(&[("FORMNAV_PRIMARY_KEY", "idgrupo"),
                         ("FORMNAV_FIELDS", "idgrupo!, nome*, descricao, criado!*"),
                         ("FORMNAV_CONFIRM_WRITES", "no")]);
        let cfg = FormConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(cfg.field_names().collect::<Vec<_>>(), vec!["idgrupo", "nome", "descricao", "criado"]);
        assert!(cfg.field("nome").unwrap().required);
        assert!(!cfg.field("idgrupo").unwrap().editable);
        let criado = cfg.field("criado").unwrap();
        assert!(criado.required && !criado.editable);
        assert!(!cfg.confirm_writes);
    }

    #[test]
    fn missing_primary_key_is_a_config_error() {
        let vars = env(&[("FORMNAV_FIELDS", "nome")]);
        assert!(matches!(FormConfig::from_lookup(|k| vars.get(k).cloned()), Err(NavigatorError::Config(_))));
        let vars = env(&[("FORMNAV_PRIMARY_KEY", "id"), ("FORMNAV_CONFIRM_WRITES", "talvez")]);
        let err = FormConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert_eq!(err.to_string(), "Error de configuración: valor booleano inválido 'talvez'");
    }

    #[test]
    fn from_json_applies_defaults_and_validates() {
        let cfg = FormConfig::from_json(r#"{"primary_key":"id","fields":[{"name":"id"},{"name":"nome","required":true}]}"#).unwrap();
        assert!(cfg.confirm_writes);
        assert!(cfg.key_assigned_by_backend);
        assert!(cfg.field("nome").unwrap().editable);
        let bad = FormConfig::from_json(r#"{"primary_key":"id","fields":[{"name":"nome"}]}"#);
        assert!(matches!(bad, Err(NavigatorError::Config(_))));
        let dup = FormConfig::from_json(r#"{"primary_key":"id","fields":[{"name":"id"},{"name":"id"}]}"#);
        assert_eq!(dup.unwrap_err(), NavigatorError::Config("campo repetido 'id'".into()));
    }

    #[test]
    fn editability_is_a_function_of_mode() {
        let cfg = FormConfig::new("id").with_field(FieldSpec::new("nome"))
                                       .with_field(FieldSpec::new("criado").read_only());
        let id = cfg.field("id").unwrap();
        let nome = cfg.field("nome").unwrap();
        let criado = cfg.field("criado").unwrap();
        assert!(!cfg.editable_in(nome, Mode::Browse));
        assert!(cfg.editable_in(nome, Mode::Edit));
        assert!(cfg.editable_in(nome, Mode::Insert));
        assert!(!cfg.editable_in(id, Mode::Edit));
        assert!(!cfg.editable_in(id, Mode::Insert));
        assert!(!cfg.editable_in(criado, Mode::Insert));
        let manual = cfg.clone().key_assigned_by_backend(false);
        assert!(manual.editable_in(manual.field("id").unwrap(), Mode::Insert));
    }
}
