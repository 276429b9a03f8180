mod common;

use common::*;
use navigator::stubs::ScriptedConfirmer;
use navigator::{Action, ConfirmPrompt, CursorPosition, Feedback, GuardRejection, Mode, NavigatorError, Outcome,
                RecordValidator};
use record::{FieldValue, Record, RecordKey};
use std::sync::Arc;

#[tokio::test]
async fn save_edit_writes_merged_record_and_returns_to_browse() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Next).await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("descricao", "otra descripción");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(1),
                                   reconciled: true });
  assert_eq!(h.nav.mode(), Mode::Browse);
  assert!(!h.form.is_editable("descricao"));
  let stored = &h.backend.snapshot()[1];
  assert_eq!(stored.value("descricao"), FieldValue::from("otra descripción"));
  assert_eq!(stored.value("nome"), FieldValue::from("beta"));
  assert_eq!(h.nav.baseline().unwrap().value("descricao"), FieldValue::from("otra descripción"));
  assert_eq!(h.confirmer.asked(), vec![ConfirmPrompt::Save { mode: Mode::Edit }]);
  match h.view.last_feedback() {
    Some(Feedback::Saved { key, .. }) => assert_eq!(key, Some(RecordKey::new("2"))),
    other => panic!("unexpected feedback {:?}", other),
  }
}

#[tokio::test]
async fn cursor_follows_record_when_backend_reorders() {
  // Escenario E
  let mut h = opened(three_groups().ordered_by("nome")).await;
  h.nav.dispatch(Action::Next).await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "aaa");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(0),
                                   reconciled: true });
  assert_eq!(h.nav.current_record().unwrap().value("idgrupo"), FieldValue::from(2));
  assert_eq!(shown(&h, "nome"), FieldValue::from("aaa"));
}

#[tokio::test]
async fn save_insert_without_data_never_reaches_backend() {
  // Escenario D
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Insert).await.unwrap();
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert_eq!(err, NavigatorError::Guard(GuardRejection::NoDataEntered));
  assert_eq!(h.backend.write_calls(), 0);
  assert_eq!(h.nav.mode(), Mode::Insert);
  assert!(h.confirmer.asked().is_empty());
}

#[tokio::test]
async fn save_edit_without_changes_is_rejected() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Edit).await.unwrap();
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert_eq!(err, NavigatorError::Guard(GuardRejection::NoChangesDetected));
  assert_eq!(h.backend.write_calls(), 0);
  assert_eq!(h.nav.mode(), Mode::Edit);
}

#[tokio::test]
async fn missing_required_fields_are_highlighted() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("descricao", "sin nombre");
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert_eq!(err, NavigatorError::Guard(GuardRejection::MissingRequiredFields(vec!["nome".into()])));
  assert_eq!(h.view.highlighted(), vec!["nome".to_string()]);
  assert_eq!(h.backend.write_calls(), 0);

  h.form.type_value("nome", "delta");
  h.nav.dispatch(Action::Save).await.unwrap();
  assert!(h.view.highlighted().is_empty());
}

#[tokio::test]
async fn save_in_browse_is_rejected() {
  let mut h = opened(three_groups()).await;
  let err = h.nav.save().await.unwrap_err();
  assert_eq!(err, NavigatorError::Guard(GuardRejection::InvalidStateToSave));
}

#[tokio::test]
async fn save_insert_lands_on_new_record() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(3),
                                   reconciled: true });
  assert_eq!(h.nav.records().len(), 4);
  assert_eq!(shown(&h, "idgrupo"), FieldValue::from(4));
  assert_eq!(h.nav.mode(), Mode::Browse);
  // la clave vacía no viaja al backend
  assert_eq!(h.backend.calls(), vec!["fetch_all".to_string(), "insert".to_string()]);
}

#[tokio::test]
async fn first_insert_on_empty_set() {
  let mut h = opened(record::stubs::InMemoryCrudClient::new("idgrupo")).await;
  h.form.type_value("nome", "primero");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(0),
                                   reconciled: true });
  assert_eq!(h.nav.mode(), Mode::Browse);
  assert!(h.view.is_enabled(Action::Delete));
}

#[tokio::test]
async fn declined_confirmation_leaves_everything_untouched() {
  let mut h = harness_with(three_groups(), grupo_config(), ScriptedConfirmer::always(false));
  h.nav.open().await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "cambio");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Cancelled);
  assert_eq!(h.backend.write_calls(), 0);
  assert_eq!(h.nav.mode(), Mode::Edit);
  assert_eq!(shown(&h, "nome"), FieldValue::from("cambio"));
  assert_eq!(h.view.last_feedback(), Some(Feedback::Cancelled(Action::Save)));
}

#[tokio::test]
async fn writes_skip_confirmation_when_disabled() {
  let config = grupo_config().confirm_writes(false);
  let mut h = harness_with(three_groups(), config, ScriptedConfirmer::always(false));
  h.nav.open().await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "sin preguntar");
  h.nav.dispatch(Action::Save).await.unwrap();
  assert!(h.confirmer.asked().is_empty());
  assert_eq!(h.backend.snapshot()[0].value("nome"), FieldValue::from("sin preguntar"));
}

#[tokio::test]
async fn backend_rejection_keeps_mode_and_cursor() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Last).await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "rechazado");
  h.backend.reject_next("nome duplicado");
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert_eq!(err, NavigatorError::Backend { message: "nome duplicado".into() });
  assert_eq!(h.nav.mode(), Mode::Edit);
  assert_eq!(h.nav.position(), CursorPosition::At(2));
  assert_eq!(shown(&h, "nome"), FieldValue::from("rechazado"));
  assert_eq!(h.view.last_feedback(), Some(Feedback::BackendFailure { message: "nome duplicado".into() }));

  // el usuario puede reintentar
  h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(h.backend.snapshot()[2].value("nome"), FieldValue::from("rechazado"));
}

#[tokio::test]
async fn transport_failure_keeps_insert_in_progress() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  h.backend.fail_transport_next("conexión rechazada");
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert!(matches!(err, NavigatorError::Backend { .. }));
  assert_eq!(h.nav.mode(), Mode::Insert);
  assert_eq!(h.nav.records().len(), 3);
  assert_eq!(shown(&h, "nome"), FieldValue::from("delta"));
}

#[tokio::test]
async fn missing_refreshed_set_triggers_refetch() {
  let mut h = opened(three_groups().including_refreshed(false)).await;
  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(3),
                                   reconciled: true });
  assert_eq!(h.backend.calls(),
             vec!["fetch_all".to_string(), "insert".to_string(), "fetch_all".to_string()]);
}

#[tokio::test]
async fn failed_refetch_after_update_keeps_old_cache() {
  let mut h = opened(three_groups().including_refreshed(false)).await;
  h.nav.dispatch(Action::Next).await.unwrap();
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "beta editado");
  h.backend.reject_next_on("fetch_all", "lectura caída");
  h.view.clear_feedback();
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(1),
                                   reconciled: true });
  assert_eq!(h.nav.mode(), Mode::Browse);
  assert_eq!(h.nav.records()[1].value("nome"), FieldValue::from("beta"));
  assert_eq!(h.backend.snapshot()[1].value("nome"), FieldValue::from("beta editado"));
  assert_eq!(h.backend.calls(),
             vec!["fetch_all".to_string(), "update".to_string(), "fetch_all".to_string()]);

  let feedback = h.view.feedback();
  assert!(!feedback.iter().any(|f| matches!(f, Feedback::BackendFailure { .. })));
  assert!(matches!(&feedback[0], Feedback::Warning(w) if w.contains("lectura caída")));
  assert!(matches!(feedback.last(), Some(Feedback::Saved { .. })));
}

#[tokio::test]
async fn failed_refetch_after_insert_falls_back_to_browse() {
  let mut h = opened(three_groups().including_refreshed(false)).await;
  h.nav.dispatch(Action::Last).await.unwrap();
  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  h.backend.fail_transport_next_on("fetch_all", "conexión cerrada");
  h.view.clear_feedback();
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(0),
                                   reconciled: false });
  assert_eq!(h.nav.mode(), Mode::Browse);
  assert_eq!(h.nav.records().len(), 3);
  assert_eq!(h.backend.snapshot().len(), 4);
  assert_eq!(shown(&h, "nome"), FieldValue::from("alfa"));

  let feedback = h.view.feedback();
  assert!(!feedback.iter().any(|f| matches!(f, Feedback::BackendFailure { .. })));
  // uno por la relectura y otro por no encontrar el registro incluido
  assert_eq!(feedback.iter().filter(|f| matches!(f, Feedback::Warning(_))).count(), 2);
}

#[tokio::test]
async fn concurrent_insert_makes_reconciliation_ambiguous() {
  let mut h = opened(three_groups()).await;
  h.nav.dispatch(Action::Last).await.unwrap();
  // otro usuario incluye un registro mientras tanto
  let mut others = h.backend.snapshot();
  others.push(grupo(10, "externo"));
  h.backend.replace_all(others);

  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(0),
                                   reconciled: false });
  assert_eq!(h.nav.mode(), Mode::Browse);
  assert!(h.view.feedback().iter().any(|f| matches!(f, Feedback::Warning(_))));
}

#[tokio::test]
async fn reported_new_key_wins_over_set_difference() {
  let mut h = opened(three_groups().reporting_new_key(true)).await;
  let mut others = h.backend.snapshot();
  others.push(grupo(10, "externo"));
  h.backend.replace_all(others);

  h.nav.dispatch(Action::Insert).await.unwrap();
  h.form.type_value("nome", "delta");
  let out = h.nav.dispatch(Action::Save).await.unwrap();
  assert_eq!(out, Outcome::Saved { position: CursorPosition::At(4),
                                   reconciled: true });
  assert_eq!(shown(&h, "idgrupo"), FieldValue::from(11));
}

struct MinLength(usize);

impl RecordValidator for MinLength {
  fn validate(&self, record: &Record, _mode: Mode) -> Result<(), Vec<String>> {
    if record.value("nome").normalized().chars().count() < self.0 {
      Err(vec![format!("nome debe tener al menos {} caracteres", self.0)])
    } else {
      Ok(())
    }
  }
}

#[tokio::test]
async fn validator_runs_before_confirmation() {
  let mut h = opened(three_groups()).await;
  h.nav = h.nav.with_validator(Arc::new(MinLength(3)));
  h.nav.dispatch(Action::Edit).await.unwrap();
  h.form.type_value("nome", "ab");
  let err = h.nav.dispatch(Action::Save).await.unwrap_err();
  assert!(matches!(err, NavigatorError::Guard(GuardRejection::ValidationFailed(ref m)) if m.len() == 1));
  assert!(h.confirmer.asked().is_empty());
  assert_eq!(h.backend.write_calls(), 0);

  h.form.type_value("nome", "abc");
  assert!(h.nav.dispatch(Action::Save).await.is_ok());
}
