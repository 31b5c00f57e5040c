use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор окна X11 (XID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Свойство окна, изменение которого интересует панель
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowProperty {
    Desktop,
    Title,
    Hints,
    State,
    Icon,
    WindowType,
}

/// Уведомление от оконного менеджера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    ClientListChanged,
    CurrentDesktopChanged,
    DesktopCountChanged,
    DesktopNamesChanged,
    ActiveWindowChanged,
    Property {
        window: WindowId,
        property: WindowProperty,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Property { window, property } => {
                write!(f, "{:?} @ {}", property, window)
            }
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId(0x1e00004).to_string(), "0x1e00004");
        assert_eq!(WindowId(42).to_string(), "0x2a");
    }

    #[test]
    fn test_notification_display() {
        let n = Notification::Property {
            window: WindowId(0x10),
            property: WindowProperty::Title,
        };
        assert_eq!(n.to_string(), "Title @ 0x10");
        assert_eq!(Notification::ClientListChanged.to_string(), "ClientListChanged");
    }
}
