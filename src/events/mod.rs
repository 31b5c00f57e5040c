pub mod pointer;
pub mod window;

pub use pointer::{Button, Modifiers, PointerEvent, ScrollDirection};
pub use window::{Notification, WindowId, WindowProperty};

use crate::services::taskbar::MenuAction;

/// Всё, что обрабатывает цикл событий панели, по одному событию за раз
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// Изменение свойства у оконного менеджера
    Notify(Notification),
    /// Действие указателя над кнопкой задачи
    Pointer { window: WindowId, event: PointerEvent },
    /// Выбран пункт контекстного меню
    MenuAction(MenuAction),
    /// Тик мигания срочной задачи
    FlashTick(WindowId),
    /// Истекла задержка наведения при перетаскивании
    DragSettled { window: WindowId, token: u64 },
    Shutdown,
}

impl From<Notification> for LoopEvent {
    fn from(notification: Notification) -> Self {
        LoopEvent::Notify(notification)
    }
}
