use crate::events::WindowId;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::task::Task;

/// Сколько проходов синхронизации подряд окно может отсутствовать в списке
/// клиентов и всё ещё оставаться в реестре
pub const GRACE_PASSES: u64 = 1;

/// Реестр задач: окно → задача, фокус и сведения о рабочих столах
#[derive(Debug)]
pub struct TaskRegistry {
    tasks: HashMap<WindowId, Task>,
    focused: Option<WindowId>,
    previously_focused: Option<WindowId>,
    pub current_desktop: u32,
    pub desktop_count: u32,
    pub desktop_names: Vec<String>,
    epoch: u64,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            focused: None,
            previously_focused: None,
            current_desktop: 0,
            desktop_count: 1,
            desktop_names: Vec::new(),
            epoch: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.tasks.contains_key(&window)
    }

    pub fn get(&self, window: WindowId) -> Option<&Task> {
        self.tasks.get(&window)
    }

    pub fn get_mut(&mut self, window: WindowId) -> Option<&mut Task> {
        self.tasks.get_mut(&window)
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn windows(&self) -> Vec<WindowId> {
        self.tasks.keys().copied().collect()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn insert(&mut self, task: Task) {
        debug_assert!(!self.tasks.contains_key(&task.window), "задача {} уже есть", task.window);
        self.tasks.insert(task.window, task);
    }

    /// Удалить задачу: останавливает её таймеры и снимает ссылки фокуса.
    /// Подписка на свойства снимается вместе с уничтожением задачи.
    pub fn remove(&mut self, window: WindowId) -> Option<Task> {
        let mut task = self.tasks.remove(&window)?;
        task.release();
        if self.focused == Some(window) {
            self.focused = None;
        }
        if self.previously_focused == Some(window) {
            self.previously_focused = None;
        }
        Some(task)
    }

    /// Начать проход синхронизации
    pub fn begin_pass(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Отметить окно как присутствующее в текущем проходе
    pub fn mark_seen(&mut self, window: WindowId) -> bool {
        let epoch = self.epoch;
        match self.tasks.get_mut(&window) {
            Some(task) => {
                task.last_seen = epoch;
                true
            }
            None => false,
        }
    }

    /// Задачи, не появлявшиеся в списке дольше льготного периода
    pub fn stale(&self) -> SmallVec<[WindowId; 8]> {
        self.tasks
            .values()
            .filter(|task| self.epoch.saturating_sub(task.last_seen) > GRACE_PASSES)
            .map(|task| task.window)
            .collect()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn previously_focused(&self) -> Option<WindowId> {
        self.previously_focused
    }

    /// Фокус перешёл к самой панели: запомнить, кто был в фокусе до этого
    pub fn remember_focus_for_panel(&mut self) {
        if self.focused.is_some() {
            self.previously_focused = self.focused;
        }
    }

    /// Передать фокус; возвращает прежнюю задачу, если фокус сменился
    pub fn set_focused(&mut self, window: Option<WindowId>) -> Option<Option<WindowId>> {
        let window = window.filter(|w| self.tasks.contains_key(w));
        self.previously_focused = None;
        if self.focused == window {
            return None;
        }

        let old = self.focused.take();
        if let Some(task) = old.and_then(|w| self.tasks.get_mut(&w)) {
            task.focused = false;
        }
        if let Some(task) = window.and_then(|w| self.tasks.get_mut(&w)) {
            task.focused = true;
        }
        self.focused = window;
        Some(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::window_system::Subscription;
    use image::RgbaImage;

    fn task(registry: &TaskRegistry, id: u32) -> Task {
        Task::new(
            WindowId(id),
            Subscription::new(WindowId(id), |_| {}),
            RgbaImage::new(16, 16),
            registry.epoch(),
        )
    }

    #[test]
    fn test_grace_period_is_one_pass() {
        let mut registry = TaskRegistry::new();
        registry.begin_pass();
        let t = task(&registry, 1);
        registry.insert(t);
        assert!(registry.stale().is_empty());

        // Первый проход без окна: ещё живо
        registry.begin_pass();
        assert!(registry.stale().is_empty());

        // Второй проход без окна: устарело
        registry.begin_pass();
        assert_eq!(registry.stale().as_slice(), &[WindowId(1)]);
    }

    #[test]
    fn test_mark_seen_refreshes_epoch() {
        let mut registry = TaskRegistry::new();
        registry.begin_pass();
        let t = task(&registry, 1);
        registry.insert(t);

        for _ in 0..5 {
            registry.begin_pass();
            assert!(registry.mark_seen(WindowId(1)));
            assert!(registry.stale().is_empty());
        }
        assert!(!registry.mark_seen(WindowId(2)));
    }

    #[test]
    fn test_single_focus() {
        let mut registry = TaskRegistry::new();
        for id in [1, 2] {
            let t = task(&registry, id);
            registry.insert(t);
        }

        assert_eq!(registry.set_focused(Some(WindowId(1))), Some(None));
        assert_eq!(registry.set_focused(Some(WindowId(1))), None);
        assert_eq!(registry.set_focused(Some(WindowId(2))), Some(Some(WindowId(1))));

        let focused: Vec<_> = registry.iter().filter(|t| t.focused).map(|t| t.window).collect();
        assert_eq!(focused, vec![WindowId(2)]);

        // Неизвестное окно снимает фокус
        assert_eq!(registry.set_focused(Some(WindowId(9))), Some(Some(WindowId(2))));
        assert!(registry.iter().all(|t| !t.focused));
    }

    #[test]
    fn test_panel_focus_remembers_previous() {
        let mut registry = TaskRegistry::new();
        let t = task(&registry, 1);
        registry.insert(t);
        registry.set_focused(Some(WindowId(1)));

        registry.remember_focus_for_panel();
        assert_eq!(registry.previously_focused(), Some(WindowId(1)));

        registry.set_focused(None);
        assert_eq!(registry.previously_focused(), None);
    }

    #[test]
    fn test_remove_clears_focus_pointers() {
        let mut registry = TaskRegistry::new();
        let t = task(&registry, 1);
        registry.insert(t);
        registry.set_focused(Some(WindowId(1)));
        registry.remember_focus_for_panel();

        assert!(registry.remove(WindowId(1)).is_some());
        assert_eq!(registry.focused(), None);
        assert_eq!(registry.previously_focused(), None);
        assert!(registry.remove(WindowId(1)).is_none());
        assert!(registry.is_empty());
    }
}
