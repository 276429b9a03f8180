#![allow(dead_code)]

use navigator::stubs::{RecordingView, ScriptedConfirmer};
use navigator::{FieldSpec, FormConfig, RecordNavigator};
use record::stubs::{InMemoryCrudClient, InMemoryFieldAccessor};
use record::{FieldValue, Record};
use std::sync::Arc;

pub struct Harness {
  pub nav: RecordNavigator<InMemoryCrudClient>,
  pub backend: Arc<InMemoryCrudClient>,
  pub form: Arc<InMemoryFieldAccessor>,
  pub view: Arc<RecordingView>,
  pub confirmer: Arc<ScriptedConfirmer>,
}

pub fn grupo(id: i64, nome: &str) -> Record {
  Record::new().with("idgrupo", id).with("nome", nome).with("descricao", format!("grupo {}", nome))
}

/// idgrupo (clave generada por el backend), nome (obligatorio), descricao.
pub fn grupo_config() -> FormConfig {
  FormConfig::new("idgrupo").with_field(FieldSpec::new("nome").required().labeled("Nome"))
                            .with_field(FieldSpec::new("descricao"))
}

pub fn harness(backend: InMemoryCrudClient) -> Harness {
  harness_with(backend, grupo_config(), ScriptedConfirmer::always(true))
}

pub fn harness_with(backend: InMemoryCrudClient, config: FormConfig, confirmer: ScriptedConfirmer) -> Harness {
  let backend = Arc::new(backend);
  let form = Arc::new(InMemoryFieldAccessor::new());
  let view = Arc::new(RecordingView::new());
  let confirmer = Arc::new(confirmer);
  let nav = RecordNavigator::new(config, backend.clone(), form.clone(), view.clone(), confirmer.clone()).expect("valid config");
  Harness { nav, backend, form, view, confirmer }
}

/// Backend con grupos 1, 2 y 3 en ese orden.
pub fn three_groups() -> InMemoryCrudClient {
  InMemoryCrudClient::with_records("idgrupo", vec![grupo(1, "alfa"), grupo(2, "beta"), grupo(3, "gama")])
}

pub async fn opened(backend: InMemoryCrudClient) -> Harness {
  let mut h = harness(backend);
  h.nav.open().await.expect("open");
  h
}

pub fn shown(h: &Harness, field: &str) -> FieldValue {
  use record::FieldAccessor;
  h.form.get_value(field)
}
