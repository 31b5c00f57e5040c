use crate::error::{Result, WintaskError};
use crate::events::{Notification, WindowId, WindowProperty};
use crate::services::window_system::{Desktop, WindowSystem};
use crate::{debug_if_enabled, trace_if_enabled};
use image::RgbaImage;
use tracing::{debug, info, warn};

use super::Taskbar;

impl<W: WindowSystem> Taskbar<W> {
    pub(crate) fn handle_notification(&mut self, notification: Notification) {
        trace_if_enabled!("Уведомление: {}", notification);
        match notification {
            Notification::ClientListChanged => self.sync(),
            Notification::CurrentDesktopChanged => {
                self.registry.current_desktop = self.ws.current_desktop();
                debug!("Текущий стол: {}", self.registry.current_desktop);
                self.refresh_visibility_all();
            }
            Notification::DesktopCountChanged => {
                self.registry.desktop_count = self.ws.desktop_count().max(1);
                debug!("Число столов: {}", self.registry.desktop_count);
                self.rebuild_menu();
                self.refresh_visibility_all();
            }
            Notification::DesktopNamesChanged => {
                self.registry.desktop_names = self.ws.desktop_names();
                self.rebuild_menu();
            }
            Notification::ActiveWindowChanged => {
                let active = self.ws.active_window();
                self.update_focus(active);
            }
            Notification::Property { window, property } => self.on_property(window, property),
        }
    }

    fn on_property(&mut self, window: WindowId, property: WindowProperty) {
        if !self.registry.contains(window) {
            trace_if_enabled!("{:?} у окна {} без задачи, пропускаем", property, window);
            return;
        }

        match property {
            WindowProperty::Desktop => {
                let Some(desktop) = read_or_abandon(window, property, self.ws.desktop(window)) else {
                    return;
                };
                if let Some(task) = self.registry.get_mut(window) {
                    task.desktop = desktop.map(Desktop::from_raw).unwrap_or_default();
                }
                self.notify_updated(window);
                self.refresh_visibility(window);
            }
            WindowProperty::Title => {
                let Some(title) = read_or_abandon(window, property, self.ws.title(window)) else {
                    return;
                };
                if let Some(task) = self.registry.get_mut(window) {
                    task.set_name(title);
                    debug_if_enabled!("Новый заголовок {}", task);
                }
                self.notify_updated(window);
            }
            WindowProperty::Hints => {
                let state = self.registry.get(window).map(|t| t.state).unwrap_or_default();
                let Some(icon) = read_or_abandon(window, property, self.icons.resolve(&self.ws, window)) else {
                    return;
                };
                let Some(urgent) = read_or_abandon(window, property, self.is_urgent(window, state)) else {
                    return;
                };
                self.replace_icon(window, icon);
                self.set_urgency(window, urgent);
            }
            WindowProperty::State => {
                let Some(state) = read_or_abandon(window, property, self.ws.state(window)) else {
                    return;
                };
                let window_type = self.registry.get(window).map(|t| t.window_type).unwrap_or_default();
                if self.filter.is_excluded(state, window_type) {
                    info!("Окно {} больше не показывается в панели (состояние {:?})", window, state);
                    self.remove_task(window);
                    return;
                }
                let Some(urgent) = read_or_abandon(window, property, self.is_urgent(window, state)) else {
                    return;
                };
                if let Some(task) = self.registry.get_mut(window) {
                    task.state = state;
                }
                self.set_urgency(window, urgent);
                self.notify_updated(window);
                self.refresh_visibility(window);
            }
            WindowProperty::Icon => {
                if let Some(icon) = read_or_abandon(window, property, self.icons.resolve(&self.ws, window)) {
                    self.replace_icon(window, icon);
                }
            }
            WindowProperty::WindowType => {
                let Some(window_type) = read_or_abandon(window, property, self.ws.window_type(window)) else {
                    return;
                };
                let state = self.registry.get(window).map(|t| t.state).unwrap_or_default();
                if self.filter.is_excluded(state, window_type) {
                    info!("Окно {} больше не показывается в панели (тип {:?})", window, window_type);
                    self.remove_task(window);
                    return;
                }
                if let Some(task) = self.registry.get_mut(window) {
                    task.window_type = window_type;
                }
            }
        }
    }

    /// Новая иконка уже построена; старая заменяется только сейчас
    fn replace_icon(&mut self, window: WindowId, icon: RgbaImage) {
        if let Some(task) = self.registry.get_mut(window) {
            task.icon = icon;
        }
        self.notify_updated(window);
    }

    /// Активное окно сменилось
    pub(crate) fn update_focus(&mut self, active: Option<WindowId>) {
        if active.is_some() && active == self.panel_window {
            self.registry.remember_focus_for_panel();
            debug_if_enabled!(
                "Фокус у панели, до этого был у {:?}",
                self.registry.previously_focused()
            );
            return;
        }

        if let Some(old) = self.registry.set_focused(active) {
            if let Some(old) = old {
                self.notify_updated(old);
            }
            if let Some(new) = self.registry.focused() {
                debug!("Фокус перешёл к {}", new);
                self.notify_updated(new);
            }
        }
    }

    pub(crate) fn refresh_desktops(&mut self) {
        self.registry.desktop_count = self.ws.desktop_count().max(1);
        self.registry.current_desktop = self.ws.current_desktop();
        self.registry.desktop_names = self.ws.desktop_names();
    }
}

/// Результат чтения свойства; `None` означает, что обновление брошено.
/// Исчезнувшее окно не трогает задачу: её уберёт следующая синхронизация.
fn read_or_abandon<T>(window: WindowId, property: WindowProperty, value: Result<T>) -> Option<T> {
    match value {
        Ok(value) => Some(value),
        Err(WintaskError::WindowGone(_)) => {
            debug!("Окно {} исчезло, обновление {:?} отменено", window, property);
            None
        }
        Err(e) => {
            warn!("Не удалось прочитать {:?} окна {}: {}", property, window, e);
            None
        }
    }
}
