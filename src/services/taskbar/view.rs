use crate::events::WindowId;
use tracing::{debug, info};

use super::menu::ContextMenu;
use super::task::Task;

/// Отображение панели: сюда движок сообщает обо всех изменениях задач.
/// Рисование кнопок остаётся на стороне хост-панели.
pub trait TaskbarView {
    fn task_added(&mut self, task: &Task);
    fn task_updated(&mut self, task: &Task);
    /// Видимость кнопки изменилась (сообщается только при смене)
    fn task_visibility(&mut self, task: &Task);
    fn task_removed(&mut self, window: WindowId);
    fn menu_rebuilt(&mut self, menu: &ContextMenu);
    fn popup_menu(&mut self, window: WindowId, menu: &ContextMenu);
    /// Событие указателя отдано хост-панели для её собственного меню
    fn forward_to_host(&mut self, window: WindowId);
}

/// Отображение в журнал: для запуска без хост-панели
#[derive(Debug, Default)]
pub struct LogView;

impl TaskbarView for LogView {
    fn task_added(&mut self, task: &Task) {
        info!("+ {} {}", task, if task.visible { "видима" } else { "скрыта" });
    }

    fn task_updated(&mut self, task: &Task) {
        debug!(
            "~ {} метка={:?} подсветка={} мигание={}",
            task,
            task.label(),
            task.highlighted(),
            task.is_flashing()
        );
    }

    fn task_visibility(&mut self, task: &Task) {
        info!("{} {}", if task.visible { "показана" } else { "скрыта" }, task);
    }

    fn task_removed(&mut self, window: WindowId) {
        info!("- {}", window);
    }

    fn menu_rebuilt(&mut self, menu: &ContextMenu) {
        let desktops: Vec<&str> = menu.desktops.iter().map(|item| item.label.as_str()).collect();
        debug!("Меню: столы {:?}", desktops);
    }

    fn popup_menu(&mut self, window: WindowId, menu: &ContextMenu) {
        info!("Контекстное меню для {} ({} пунктов)", window, menu.items.len() + menu.desktops.len());
    }

    fn forward_to_host(&mut self, window: WindowId) {
        info!("Событие над {} передано хост-панели", window);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ViewCall {
        Added(WindowId),
        Updated(WindowId),
        Visibility(WindowId, bool),
        Removed(WindowId),
        MenuRebuilt(usize),
        Popup(WindowId),
        Forwarded(WindowId),
    }

    /// Запоминает все вызовы; копия разделяет один журнал
    #[derive(Debug, Clone, Default)]
    pub struct RecordingView {
        calls: Arc<Mutex<Vec<ViewCall>>>,
    }

    impl RecordingView {
        pub fn take(&self) -> Vec<ViewCall> {
            std::mem::take(&mut *self.calls.lock())
        }

        fn push(&self, call: ViewCall) {
            self.calls.lock().push(call);
        }
    }

    impl TaskbarView for RecordingView {
        fn task_added(&mut self, task: &Task) {
            self.push(ViewCall::Added(task.window));
        }

        fn task_updated(&mut self, task: &Task) {
            self.push(ViewCall::Updated(task.window));
        }

        fn task_visibility(&mut self, task: &Task) {
            self.push(ViewCall::Visibility(task.window, task.visible));
        }

        fn task_removed(&mut self, window: WindowId) {
            self.push(ViewCall::Removed(window));
        }

        fn menu_rebuilt(&mut self, menu: &ContextMenu) {
            self.push(ViewCall::MenuRebuilt(menu.desktops.len()));
        }

        fn popup_menu(&mut self, window: WindowId, _menu: &ContextMenu) {
            self.push(ViewCall::Popup(window));
        }

        fn forward_to_host(&mut self, window: WindowId) {
            self.push(ViewCall::Forwarded(window));
        }
    }
}
