// Archivo: stubs.rs
// Propósito: implementaciones en memoria de la vista y del confirmador,
// para pruebas y wiring rápido. Registran todo lo que reciben para que
// las pruebas puedan inspeccionarlo.
use crate::feedback::{ConfirmPrompt, Feedback, NavigatorStatus, Notice};
use crate::mode::Action;
use crate::view::{Confirmer, FormView};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Vista que guarda avisos, botones activos, resaltados y estado.
#[derive(Debug, Default)]
pub struct RecordingView {
    notices: Mutex<Vec<Notice>>,
    enabled: Mutex<HashMap<Action, bool>>,
    highlighted: Mutex<Vec<String>>,
    status: Mutex<Option<NavigatorStatus>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Avisos recibidos, sin la marca de tiempo.
    pub fn feedback(&self) -> Vec<Feedback> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|n| n.feedback.clone())
            .collect()
    }

    pub fn last_feedback(&self) -> Option<Feedback> {
        self.feedback().pop()
    }

    pub fn clear_feedback(&self) {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        *self.enabled
             .lock()
             .unwrap_or_else(|e| e.into_inner())
             .get(&action)
             .unwrap_or(&false)
    }

    pub fn highlighted(&self) -> Vec<String> {
        self.highlighted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_status(&self) -> Option<NavigatorStatus> {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FormView for RecordingView {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).push(notice.clone());
    }

    fn set_action_enabled(&self, action: Action, enabled: bool) {
        self.enabled.lock().unwrap_or_else(|e| e.into_inner()).insert(action, enabled);
    }

    fn highlight_fields(&self, names: &[String]) {
        *self.highlighted.lock().unwrap_or_else(|e| e.into_inner()) = names.to_vec();
    }

    fn show_status(&self, status: &NavigatorStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = Some(*status);
    }
}

/// Confirmador con respuestas programadas. Cuando se agotan usa la
/// respuesta por defecto.
#[derive(Debug)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    asked: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedConfirmer {
    /// Responde siempre `answer`.
    pub fn always(answer: bool) -> Self {
        Self { answers: Mutex::new(VecDeque::new()),
               default_answer: answer,
               asked: Mutex::new(Vec::new()) }
    }

    /// Encola una respuesta para la próxima pregunta.
    pub fn then(self, answer: bool) -> Self {
        self.answers.lock().unwrap_or_else(|e| e.into_inner()).push_back(answer);
        self
    }

    /// Preguntas recibidas, en orden.
    pub fn asked(&self) -> Vec<ConfirmPrompt> {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        self.asked.lock().unwrap_or_else(|e| e.into_inner()).push(prompt.clone());
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(self.default_answer)
    }
}
