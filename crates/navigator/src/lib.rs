//! navigator: máquina de estados de formularios CRUD
//!
//! Crate que implementa el navegador de registros de un formulario de
//! entrada de datos respaldado por una API CRUD remota
//! (`record::CrudClient`). Mantiene un cursor sobre una copia local del
//! conjunto de registros, impone los modos excluyentes `browse`/`edit`/
//! `insert`, bloquea la navegación insegura y reconcilia el cursor con el
//! conjunto que devuelve el backend tras cada escritura.
//!
//! Ejemplo rápido:
//! ```rust
//! use navigator::stubs::{RecordingView, ScriptedConfirmer};
//! use navigator::{Action, FieldSpec, FormConfig, Mode, RecordNavigator};
//! use record::stubs::{InMemoryCrudClient, InMemoryFieldAccessor};
//! use record::Record;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(InMemoryCrudClient::with_records("id", vec![Record::new().with("id", 1).with("nome", "a")]));
//! let config = FormConfig::new("id").with_field(FieldSpec::new("nome").required());
//! let mut nav = RecordNavigator::new(config,
//!                                    backend,
//!                                    Arc::new(InMemoryFieldAccessor::new()),
//!                                    Arc::new(RecordingView::new()),
//!                                    Arc::new(ScriptedConfirmer::always(true))).unwrap();
//! tokio_test::block_on(async {
//!     nav.open().await.unwrap();
//!     nav.dispatch(Action::Edit).await.unwrap();
//! });
//! assert_eq!(nav.mode(), Mode::Edit);
//! ```

pub mod cache;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod feedback;
pub mod guard;
pub mod mode;
pub mod navigator;
pub mod reconciler;
pub mod stubs;
pub mod view;

pub use cache::RecordsetCache;
pub use config::{FieldSpec, FormConfig};
pub use cursor::{Boundary, Cursor, CursorPosition, NoTarget};
pub use errors::{GuardRejection, NavigatorError};
pub use feedback::{ConfirmPrompt, Feedback, NavigatorStatus, Notice, Outcome};
pub use guard::{ModeGuard, Verdict};
pub use mode::{available_actions, Action, Mode};
pub use navigator::RecordNavigator;
pub use reconciler::{Reconciliation, ReconciliationMiss, WriteReconciler};
pub use view::{Confirmer, FormView, RecordValidator};
