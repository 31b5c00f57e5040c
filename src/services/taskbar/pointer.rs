use crate::debug_if_enabled;
use crate::events::{Button, LoopEvent, PointerEvent, ScrollDirection, WindowId};
use crate::services::timer::{TimerGuard, Timers};
use crate::services::window_system::{Desktop, Request, StateToggle, WindowSystem};
use std::time::Duration;
use tracing::{debug, info};

use super::Taskbar;

/// Что сделать в ответ на событие указателя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    None,
    /// Поднять и передать фокус; при `switch_desktop` сначала перейти на стол окна
    Activate { switch_desktop: bool },
    Iconify,
    ToggleShade,
    PopupMenu,
    /// Событие принадлежит хост-панели
    ForwardToHost,
    /// Начать отсчёт задержки наведения при перетаскивании
    ArmDrag,
}

/// Состояние задачи, от которого зависит решение
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerContext {
    pub iconified: bool,
    /// Задача в фокусе или была в фокусе до перехода к панели
    pub holds_focus: bool,
    pub use_mouse_wheel: bool,
}

#[derive(Debug, Default)]
pub struct PointerInput {
    swallow_release: bool,
    drag: Option<(u64, TimerGuard)>,
    next_token: u64,
}

impl PointerInput {
    pub fn decide(&mut self, event: PointerEvent, ctx: PointerContext) -> PointerAction {
        match event {
            PointerEvent::Press { button: Button::Secondary, modifiers } if modifiers.has_any() => {
                self.swallow_release = true;
                PointerAction::ForwardToHost
            }
            PointerEvent::Press { .. } => PointerAction::None,
            PointerEvent::Release { button: Button::Secondary, .. } if self.swallow_release => {
                self.swallow_release = false;
                PointerAction::None
            }
            PointerEvent::Release { inside: false, .. } => PointerAction::None,
            PointerEvent::Release { button, .. } => match button {
                Button::Primary if ctx.iconified => PointerAction::Activate { switch_desktop: false },
                Button::Primary if ctx.holds_focus => PointerAction::Iconify,
                Button::Primary => PointerAction::Activate { switch_desktop: true },
                Button::Secondary => PointerAction::PopupMenu,
                Button::Middle => PointerAction::ToggleShade,
            },
            PointerEvent::Scroll(_) if !ctx.use_mouse_wheel => PointerAction::None,
            PointerEvent::Scroll(ScrollDirection::Up) => PointerAction::Activate { switch_desktop: false },
            PointerEvent::Scroll(ScrollDirection::Down) => PointerAction::Iconify,
            PointerEvent::DragEnter => PointerAction::ArmDrag,
            PointerEvent::DragLeave => {
                self.cancel_drag();
                PointerAction::None
            }
        }
    }

    /// Запустить таймер наведения; старый таймер, если был, отменяется
    pub fn arm_drag(&mut self, window: WindowId, timers: &Timers, delay: Duration) -> u64 {
        self.next_token += 1;
        let token = self.next_token;
        let guard = timers.after(delay, LoopEvent::DragSettled { window, token });
        self.drag = Some((token, guard));
        token
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Таймер сработал; `true`, только если это текущий таймер
    pub fn settle(&mut self, token: u64) -> bool {
        match &self.drag {
            Some((current, _)) if *current == token => {
                self.drag = None;
                true
            }
            _ => false,
        }
    }
}

impl<W: WindowSystem> Taskbar<W> {
    pub(crate) fn handle_pointer(&mut self, window: WindowId, event: PointerEvent) {
        let focus = (self.registry.focused(), self.registry.previously_focused());
        let delay = self.config.drag_activate_delay();
        let use_mouse_wheel = self.config.use_mouse_wheel;

        let Some(task) = self.registry.get_mut(window) else {
            debug_if_enabled!("Событие указателя {} для неизвестного окна {}", event, window);
            return;
        };
        let ctx = PointerContext {
            iconified: task.iconified(),
            holds_focus: focus.0 == Some(window) || focus.1 == Some(window),
            use_mouse_wheel,
        };
        let action = task.pointer.decide(event, ctx);
        debug_if_enabled!("Указатель {} на {}: {:?}", event, window, action);

        match action {
            PointerAction::None => {}
            PointerAction::ArmDrag => {
                task.pointer.arm_drag(window, &self.timers, delay);
            }
            PointerAction::Activate { switch_desktop } => self.activate(window, switch_desktop),
            PointerAction::Iconify => self.request(Request::Iconify(window)),
            PointerAction::ToggleShade => self.request(Request::ToggleState(window, StateToggle::Shaded)),
            PointerAction::PopupMenu => {
                self.menu_target = Some(window);
                self.view.popup_menu(window, &self.menu);
            }
            PointerAction::ForwardToHost => self.view.forward_to_host(window),
        }
    }

    pub(crate) fn on_drag_settled(&mut self, window: WindowId, token: u64) {
        let settled = self
            .registry
            .get_mut(window)
            .is_some_and(|task| task.pointer.settle(token));
        if settled {
            info!("Наведение при перетаскивании на {}, активируем", window);
            self.activate(window, true);
        } else {
            debug!("Устаревший таймер наведения {} для {}", token, window);
        }
    }

    /// Поднять окно; при `switch_desktop` сначала перейти на его стол
    pub(crate) fn activate(&mut self, window: WindowId, switch_desktop: bool) {
        let Some(task) = self.registry.get(window) else {
            return;
        };
        if switch_desktop {
            if let Desktop::Index(desktop) = task.desktop {
                if desktop != self.registry.current_desktop {
                    self.request(Request::SwitchDesktop(desktop));
                }
            }
        }
        self.request(self.activation_request(window));
    }
}
