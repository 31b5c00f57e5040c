use crate::debug_if_enabled;
use crate::error::{Result, WintaskError};
use crate::events::WindowId;
use crate::services::window_system::{Desktop, NetState, WindowSystem};
use tracing::{debug, info, warn};

use super::task::Task;
use super::Taskbar;

impl<W: WindowSystem> Taskbar<W> {
    /// Сверить реестр со списком клиентов оконного менеджера.
    ///
    /// Новые окна получают задачи, присутствующие отмечаются текущей эпохой,
    /// затем удаляются задачи, пропавшие дольше льготного периода, и
    /// пересчитывается видимость. Проход не прерывается другими событиями.
    pub fn sync(&mut self) {
        let windows = match self.ws.client_list() {
            Ok(windows) => windows,
            Err(e) => {
                warn!("Не удалось прочитать список клиентов: {}", e);
                return;
            }
        };

        let epoch = self.registry.begin_pass();
        let mut created = 0;
        for window in windows {
            if self.registry.mark_seen(window) {
                continue;
            }
            if self.create_task(window) {
                created += 1;
            }
        }

        let stale = self.registry.stale();
        for &window in &stale {
            self.remove_task(window);
        }

        let flipped = self.refresh_visibility_all();

        if self.registry.focused().is_none() {
            if let Some(active) = self.ws.active_window().filter(|w| self.registry.contains(*w)) {
                self.update_focus(Some(active));
            }
        }

        debug_if_enabled!(
            "Синхронизация #{}: добавлено {}, удалено {}, видимость изменилась у {}, всего {}",
            epoch,
            created,
            stale.len(),
            flipped,
            self.registry.len()
        );
    }

    fn create_task(&mut self, window: WindowId) -> bool {
        match self.try_create_task(window) {
            Ok(created) => created,
            Err(WintaskError::WindowGone(_)) => {
                debug!("Окно {} исчезло до создания задачи", window);
                false
            }
            Err(e) => {
                warn!("Не удалось создать задачу для окна {}: {}", window, e);
                false
            }
        }
    }

    fn try_create_task(&mut self, window: WindowId) -> Result<bool> {
        let state = self.ws.state(window)?;
        let window_type = self.ws.window_type(window)?;
        if self.filter.is_excluded(state, window_type) {
            debug_if_enabled!("Окно {} исключено: состояние {:?}, тип {:?}", window, state, window_type);
            return Ok(false);
        }

        // Подписка снимается сама, если окно исчезнет до конца чтения
        let subscription = self.ws.subscribe(window)?;
        let icon = self.icons.resolve(&self.ws, window)?;
        let title = self.ws.title(window)?;
        let desktop = self.ws.desktop(window)?.map(Desktop::from_raw).unwrap_or_default();
        let urgent = self.is_urgent(window, state)?;

        let mut task = Task::new(window, subscription, icon, self.registry.epoch());
        task.set_name(title);
        task.desktop = desktop;
        task.state = state;
        task.window_type = window_type;
        task.visible = self
            .filter
            .is_visible(task.desktop, task.iconified(), self.registry.current_desktop);

        info!("Новая задача {}", task);
        self.view.task_added(&task);
        self.registry.insert(task);

        if urgent {
            self.set_urgency(window, true);
        }
        Ok(true)
    }

    /// Срочность: флаг в WM_HINTS или _NET_WM_STATE_DEMANDS_ATTENTION
    pub(crate) fn is_urgent(&self, window: WindowId, state: NetState) -> Result<bool> {
        if state.contains(NetState::DEMANDS_ATTENTION) {
            return Ok(true);
        }
        Ok(self.ws.wm_hints(window)?.is_some_and(|hints| hints.urgent))
    }
}
