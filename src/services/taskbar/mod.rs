//! Движок панели задач: отражение окон верхнего уровня в список кнопок.
//!
//! Все обработчики выполняются в одном цикле событий по одному за раз,
//! поэтому реестр задач не требует блокировок. Таймеры (мигание,
//! наведение при перетаскивании) лишь присылают события обратно в цикл.

mod dispatcher;
mod flasher;
mod icon;
mod menu;
mod pointer;
mod registry;
mod runner;
mod sync;
mod task;
mod view;
mod visibility;


pub use self::flasher::FlashState;
pub use self::icon::IconResolver;
pub use self::menu::{ContextMenu, MenuAction};
pub use self::registry::TaskRegistry;
pub use self::runner::{create_taskbar, TaskbarRunner};
pub use self::task::Task;
pub use self::view::{LogView, TaskbarView};
pub use self::visibility::VisibilityFilter;

use crate::config::TaskbarConfig;
use crate::debug_if_enabled;
use crate::events::{LoopEvent, WindowId};
use crate::services::timer::{TimerGuard, Timers};
use crate::services::window_system::{Capability, Request, WindowSystem};
use tracing::{info, warn};

pub struct Taskbar<W: WindowSystem> {
    config: TaskbarConfig,
    ws: W,
    view: Box<dyn TaskbarView>,
    timers: Timers,
    registry: TaskRegistry,
    filter: VisibilityFilter,
    icons: IconResolver,
    menu: ContextMenu,
    /// Задача, для которой последний раз открывалось контекстное меню
    menu_target: Option<WindowId>,
    /// Собственное окно хост-панели
    panel_window: Option<WindowId>,
    /// Фоновые задачи, живущие столько же, сколько движок
    companions: Vec<TimerGuard>,
}

impl<W: WindowSystem> Taskbar<W> {
    pub fn new(config: &TaskbarConfig, ws: W, view: Box<dyn TaskbarView>, timers: Timers) -> Self {
        let registry = TaskRegistry::new();
        let menu = ContextMenu::build(registry.desktop_count, &registry.desktop_names);
        Self {
            config: config.clone(),
            ws,
            view,
            timers,
            registry,
            filter: VisibilityFilter::from_config(config),
            icons: IconResolver::new(config.icon_size),
            menu,
            menu_target: None,
            panel_window: None,
            companions: Vec::new(),
        }
    }

    pub fn with_panel_window(mut self, panel_window: Option<WindowId>) -> Self {
        self.panel_window = panel_window;
        self
    }

    pub fn with_companion(mut self, guard: TimerGuard) -> Self {
        self.companions.push(guard);
        self
    }

    #[cfg(test)]
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    /// Первичное чтение состояния оконного менеджера
    pub fn start(&mut self) {
        self.refresh_desktops();
        self.rebuild_menu();
        self.sync();
        let active = self.ws.active_window();
        self.update_focus(active);
        info!(
            "Панель задач запущена: {} задач, столов {}, текущий {}",
            self.registry.len(),
            self.registry.desktop_count,
            self.registry.current_desktop
        );
    }

    /// Обработать одно событие цикла; `false`, если пора завершаться
    pub fn handle_event(&mut self, event: LoopEvent) -> bool {
        match event {
            LoopEvent::Notify(notification) => self.handle_notification(notification),
            LoopEvent::Pointer { window, event } => self.handle_pointer(window, event),
            LoopEvent::MenuAction(action) => self.on_menu_action(action),
            LoopEvent::FlashTick(window) => self.on_flash_tick(window),
            LoopEvent::DragSettled { window, token } => self.on_drag_settled(window, token),
            LoopEvent::Shutdown => return false,
        }
        true
    }

    /// Снять все подписки и таймеры
    pub fn teardown(&mut self) {
        self.companions.clear();
        let windows = self.registry.windows();
        for window in &windows {
            self.remove_task(*window);
        }
        self.menu_target = None;
        info!("Панель задач остановлена, освобождено {} задач", windows.len());
    }

    pub(crate) fn remove_task(&mut self, window: WindowId) {
        if let Some(task) = self.registry.remove(window) {
            info!("Задача {} удалена", task);
            if self.menu_target == Some(window) {
                self.menu_target = None;
            }
            drop(task);
            self.view.task_removed(window);
        }
    }

    /// Пересчитать видимость одной задачи; сообщить, если она изменилась
    pub(crate) fn refresh_visibility(&mut self, window: WindowId) -> bool {
        let current = self.registry.current_desktop;
        let filter = self.filter;
        let Some(task) = self.registry.get_mut(window) else {
            return false;
        };
        let visible = filter.is_visible(task.desktop, task.iconified(), current);
        if visible == task.visible {
            return false;
        }
        task.visible = visible;
        self.view.task_visibility(task);
        true
    }

    pub(crate) fn refresh_visibility_all(&mut self) -> usize {
        let windows = self.registry.windows();
        windows.into_iter().filter(|w| self.refresh_visibility(*w)).count()
    }

    pub(crate) fn notify_updated(&mut self, window: WindowId) {
        if let Some(task) = self.registry.get(window) {
            self.view.task_updated(task);
        }
    }

    pub(crate) fn activation_request(&self, window: WindowId) -> Request {
        if self.ws.supports(Capability::ActiveWindow) {
            Request::Activate(window)
        } else {
            debug_if_enabled!("_NET_ACTIVE_WINDOW не поддерживается, поднимаем {} напрямую", window);
            Request::RaiseLegacy(window)
        }
    }

    /// Отправить запрос оконному менеджеру; ошибка только журналируется
    pub(crate) fn request(&self, request: Request) {
        debug_if_enabled!("Запрос к оконному менеджеру: {:?}", request);
        if let Err(e) = self.ws.send(request) {
            warn!("Запрос {:?} не выполнен: {}", request, e);
        }
    }
}
