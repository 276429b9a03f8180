// Archivo: cursor.rs
// Propósito: posición del cursor sobre la caché y modo activo. Es el
// corazón de la máquina de estados: toda transición pasa por aquí y cada
// método deja el par (posición, modo) consistente con el tamaño de la
// caché.
use crate::mode::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Índice en la caché o centinela "vacío".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorPosition {
    Empty,
    At(usize),
}

impl CursorPosition {
    pub fn index(self) -> Option<usize> {
        match self {
            CursorPosition::Empty => None,
            CursorPosition::At(i) => Some(i),
        }
    }
}

impl fmt::Display for CursorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorPosition::Empty => f.write_str("vacío"),
            CursorPosition::At(i) => write!(f, "{}", i),
        }
    }
}

/// Límite alcanzado por una navegación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

/// Por qué `Cursor::target` no produce un índice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoTarget {
    /// Ya se está en el límite.
    Limit(Boundary),
    /// La acción no mueve el cursor.
    NotNavigation,
}

/// Cursor + modo.
///
/// Invariante: con caché no vacía y modo `browse`/`edit` la posición es un
/// índice válido; con caché vacía la posición es `Empty` y el modo
/// `insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: CursorPosition,
    mode: Mode,
}

impl Default for Cursor {
    fn default() -> Self {
        Self { position: CursorPosition::Empty,
               mode: Mode::Browse }
    }
}

impl Cursor {
    /// Cursor inicial para un conjunto de `len` registros.
    pub fn opened(len: usize) -> Self {
        if len == 0 {
            Self::emptied()
        } else {
            Self { position: CursorPosition::At(0),
                   mode: Mode::Browse }
        }
    }

    /// Único estado en el que se entra en `insert` sin acción del usuario.
    pub fn emptied() -> Self {
        Self { position: CursorPosition::Empty,
               mode: Mode::Insert }
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    pub fn index(&self) -> Option<usize> {
        self.position.index()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Destino de una navegación, o el motivo por el que no lo hay.
    pub fn target(&self, action: crate::mode::Action, len: usize) -> Result<usize, NoTarget> {
        use crate::mode::Action;
        if !action.is_navigation() {
            return Err(NoTarget::NotNavigation);
        }
        let current = self.index().ok_or(NoTarget::Limit(Boundary::Start))?;
        let last = len.checked_sub(1).ok_or(NoTarget::Limit(Boundary::Start))?;
        match action {
            Action::First | Action::Previous if current == 0 => Err(NoTarget::Limit(Boundary::Start)),
            Action::Last | Action::Next if current >= last => Err(NoTarget::Limit(Boundary::End)),
            Action::First => Ok(0),
            Action::Previous => Ok(current - 1),
            Action::Next => Ok(current + 1),
            Action::Last => Ok(last),
            _ => Err(NoTarget::NotNavigation),
        }
    }

    /// Mueve el cursor y fuerza `browse`.
    pub fn move_to(&mut self, index: usize) {
        self.position = CursorPosition::At(index);
        self.mode = Mode::Browse;
    }

    /// Cambia sólo el modo. El llamador garantiza que la transición es
    /// legal.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Recoloca el cursor tras un cambio de la caché de tamaño `len`:
    /// `Some(i)` válido deja `browse` en `i`; sin registros, vacío +
    /// `insert`.
    pub fn settle(&mut self, index: Option<usize>, len: usize) {
        match index {
            Some(i) if i < len => self.move_to(i),
            _ if len > 0 => self.move_to(0),
            _ => *self = Self::emptied(),
        }
    }

    /// `true` si se cumple la invariante para una caché de tamaño `len`.
    pub fn is_consistent(&self, len: usize) -> bool {
        match (self.position, len) {
            (CursorPosition::Empty, 0) => self.mode == Mode::Insert,
            (CursorPosition::At(i), n) => i < n,
            (CursorPosition::Empty, _) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Action;

    #[test]
    fn opened_on_empty_set_enters_insert() {
        let c = Cursor::opened(0);
        assert_eq!(c.position(), CursorPosition::Empty);
        assert_eq!(c.mode(), Mode::Insert);
        assert!(c.is_consistent(0));
        assert_eq!(Cursor::opened(3).position(), CursorPosition::At(0));
    }

    #[test]
    fn targets_respect_boundaries() {
        let mut c = Cursor::opened(3);
        assert_eq!(c.target(Action::First, 3), Err(NoTarget::Limit(Boundary::Start)));
        assert_eq!(c.target(Action::Previous, 3), Err(NoTarget::Limit(Boundary::Start)));
        assert_eq!(c.target(Action::Next, 3), Ok(1));
        assert_eq!(c.target(Action::Last, 3), Ok(2));
        c.move_to(2);
        assert_eq!(c.target(Action::Next, 3), Err(NoTarget::Limit(Boundary::End)));
        assert_eq!(c.target(Action::Last, 3), Err(NoTarget::Limit(Boundary::End)));
        assert_eq!(c.target(Action::Previous, 3), Ok(1));
        assert_eq!(c.target(Action::First, 3), Ok(0));
    }

    #[test]
    fn non_navigation_actions_have_no_target() {
        let c = Cursor::opened(3);
        for action in [Action::Save, Action::Edit, Action::Delete, Action::Close] {
            assert_eq!(c.target(action, 3), Err(NoTarget::NotNavigation));
        }
    }

    #[test]
    fn settle_falls_back_to_zero_or_empty() {
        let mut c = Cursor::opened(3);
        c.set_mode(Mode::Edit);
        c.settle(Some(7), 2);
        assert_eq!(c.position(), CursorPosition::At(0));
        assert_eq!(c.mode(), Mode::Browse);
        c.settle(None, 0);
        assert_eq!(c, Cursor::emptied());
    }
}
