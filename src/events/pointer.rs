use serde::{Deserialize, Serialize};
use std::fmt;

/// Кнопка указателя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Модификаторы клавиш, зажатые в момент события указателя
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    #[allow(dead_code)]
    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.super_key
    }

    pub fn has_any(&self) -> bool {
        !self.is_empty()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl { parts.push("ctrl"); }
        if self.alt { parts.push("alt"); }
        if self.shift { parts.push("shift"); }
        if self.super_key { parts.push("super"); }
        if parts.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

/// Событие указателя над кнопкой задачи, доставленное хост-панелью
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Press {
        button: Button,
        modifiers: Modifiers,
    },
    Release {
        button: Button,
        modifiers: Modifiers,
        /// Отпускание произошло внутри кнопки задачи
        inside: bool,
    },
    Scroll(ScrollDirection),
    DragEnter,
    DragLeave,
}

impl PointerEvent {
    pub fn press(button: Button) -> Self {
        PointerEvent::Press { button, modifiers: Modifiers::new() }
    }

    pub fn release(button: Button) -> Self {
        PointerEvent::Release { button, modifiers: Modifiers::new(), inside: true }
    }
}

impl fmt::Display for PointerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerEvent::Press { button, modifiers } => write!(f, "press {:?} [{}]", button, modifiers),
            PointerEvent::Release { button, modifiers, inside } => {
                write!(f, "release {:?} [{}] inside={}", button, modifiers, inside)
            }
            PointerEvent::Scroll(dir) => write!(f, "scroll {:?}", dir),
            PointerEvent::DragEnter => write!(f, "drag-enter"),
            PointerEvent::DragLeave => write!(f, "drag-leave"),
        }
    }
}
