use crate::events::WindowId;
use crate::services::window_system::{Desktop, NetState, Subscription, WindowTypes};
use image::RgbaImage;
use std::fmt;

use super::flasher::UrgencyFlasher;
use super::pointer::PointerInput;

/// Подпись для окна без заголовка
pub const UNTITLED: &str = "(без имени)";

/// Задача: локальное отражение одного окна верхнего уровня
pub struct Task {
    pub window: WindowId,
    pub name: String,
    pub title: String,
    pub title_iconified: String,
    pub icon: RgbaImage,
    pub desktop: Desktop,
    pub state: NetState,
    pub window_type: WindowTypes,
    pub urgent: bool,
    pub focused: bool,
    pub visible: bool,
    /// Эпоха последнего прохода синхронизации, в котором окно было в списке
    pub(crate) last_seen: u64,
    pub(crate) flasher: UrgencyFlasher,
    pub(crate) pointer: PointerInput,
    subscription: Subscription,
}

impl Task {
    pub fn new(window: WindowId, subscription: Subscription, icon: RgbaImage, epoch: u64) -> Self {
        let mut task = Self {
            window,
            name: String::new(),
            title: String::new(),
            title_iconified: String::new(),
            icon,
            desktop: Desktop::All,
            state: NetState::empty(),
            window_type: WindowTypes::NORMAL,
            urgent: false,
            focused: false,
            visible: false,
            last_seen: epoch,
            flasher: UrgencyFlasher::default(),
            pointer: PointerInput::default(),
            subscription,
        };
        task.set_name(None);
        task
    }

    /// Обновить заголовок и производные подписи; `None` даёт заглушку
    pub fn set_name(&mut self, name: Option<String>) {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        self.title = format!(" {} ", name);
        self.title_iconified = format!("[{}]", name);
        self.name = name;
    }

    pub fn iconified(&self) -> bool {
        self.state.contains(NetState::HIDDEN)
    }

    /// Подпись кнопки с учётом свёрнутости
    pub fn label(&self) -> &str {
        if self.iconified() {
            &self.title_iconified
        } else {
            &self.title
        }
    }

    /// Кнопка подсвечена: фокус или «выделенная» фаза мигания
    pub fn highlighted(&self) -> bool {
        self.focused || self.flasher.phase()
    }

    pub fn is_flashing(&self) -> bool {
        self.flasher.is_flashing()
    }

    pub fn last_seen(&self) -> u64 {
        self.last_seen
    }

    #[cfg(test)]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Остановить все таймеры задачи перед удалением
    pub(crate) fn release(&mut self) {
        self.flasher.stop();
        self.pointer.cancel_drag();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("window", &self.window)
            .field("name", &self.name)
            .field("desktop", &self.desktop)
            .field("state", &self.state)
            .field("window_type", &self.window_type)
            .field("urgent", &self.urgent)
            .field("focused", &self.focused)
            .field("visible", &self.visible)
            .field("last_seen", &self.last_seen)
            .finish()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" (стол {})", self.window, self.name, self.desktop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let icon = RgbaImage::new(16, 16);
        Task::new(WindowId(7), Subscription::new(WindowId(7), |_| {}), icon, 1)
    }

    #[test]
    fn test_titles_are_derived_from_name() {
        let mut task = task();
        task.set_name(Some("Terminal".to_string()));

        assert_eq!(task.name, "Terminal");
        assert_eq!(task.title, " Terminal ");
        assert_eq!(task.title_iconified, "[Terminal]");
        assert_eq!(task.label(), " Terminal ");

        task.state |= NetState::HIDDEN;
        assert!(task.iconified());
        assert_eq!(task.label(), "[Terminal]");
    }

    #[test]
    fn test_missing_title_gets_placeholder() {
        let mut task = task();
        assert_eq!(task.name, UNTITLED);

        task.set_name(Some("   ".to_string()));
        assert_eq!(task.name, UNTITLED);
    }

    #[test]
    fn test_new_task_defaults() {
        let task = task();
        assert_eq!(task.desktop, Desktop::All);
        assert_eq!(task.last_seen(), 1);
        assert!(!task.is_flashing());
        assert!(!task.highlighted());
        assert_eq!(task.subscription().window(), WindowId(7));
        assert!(task.to_string().contains("0x7"));
    }
}
