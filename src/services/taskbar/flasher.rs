use crate::debug_if_enabled;
use crate::events::{LoopEvent, WindowId};
use crate::services::timer::{TimerGuard, Timers};
use crate::services::window_system::WindowSystem;
use std::time::Duration;
use tracing::info;

use super::Taskbar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashState {
    Idle,
    Flashing,
}

/// Мигание кнопки срочной задачи
#[derive(Debug, Default)]
pub struct UrgencyFlasher {
    timer: Option<TimerGuard>,
    phase: bool,
}

impl UrgencyFlasher {
    pub fn state(&self) -> FlashState {
        if self.timer.is_some() {
            FlashState::Flashing
        } else {
            FlashState::Idle
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.state() == FlashState::Flashing
    }

    /// Текущая фаза: `true` означает «выделенную» подсветку
    pub fn phase(&self) -> bool {
        self.phase
    }

    /// Idle → Flashing; повторный вызов ничего не делает
    pub fn start(&mut self, window: WindowId, timers: &Timers, period: Duration) -> bool {
        if self.timer.is_some() {
            return false;
        }
        self.timer = Some(timers.every(period, LoopEvent::FlashTick(window)));
        true
    }

    /// Flashing → Idle: таймер отменён, фаза сброшена
    pub fn stop(&mut self) -> bool {
        self.phase = false;
        self.timer.take().is_some()
    }

    /// Переключить фазу; `None`, если мигание не активно
    pub fn tick(&mut self) -> Option<bool> {
        self.timer.as_ref()?;
        self.phase = !self.phase;
        Some(self.phase)
    }
}

impl<W: WindowSystem> Taskbar<W> {
    /// Включить или выключить мигание задачи по признаку срочности
    pub(crate) fn set_urgency(&mut self, window: WindowId, urgent: bool) {
        let period = self.config.flash_interval();
        let use_hint = self.config.use_urgency_hint;
        let Some(task) = self.registry.get_mut(window) else {
            return;
        };
        task.urgent = urgent;

        if urgent && use_hint {
            if task.flasher.start(window, &self.timers, period) {
                info!("Задача {} требует внимания, начинаем мигание", task);
            }
        } else if task.flasher.stop() {
            info!("Задача {} больше не срочная, мигание остановлено", task);
            self.notify_updated(window);
        }
    }

    pub(crate) fn on_flash_tick(&mut self, window: WindowId) {
        let Some(task) = self.registry.get_mut(window) else {
            debug_if_enabled!("Тик мигания для неизвестного окна {}", window);
            return;
        };
        if task.flasher.tick().is_some() {
            self.notify_updated(window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let mut flasher = UrgencyFlasher::default();

        assert_eq!(flasher.state(), FlashState::Idle);
        assert!(flasher.start(WindowId(1), &timers, Duration::from_millis(100)));
        assert!(!flasher.start(WindowId(1), &timers, Duration::from_millis(100)));
        assert_eq!(flasher.state(), FlashState::Flashing);
    }

    #[tokio::test]
    async fn test_tick_toggles_and_stop_resets_phase() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let mut flasher = UrgencyFlasher::default();

        assert_eq!(flasher.tick(), None);
        flasher.start(WindowId(1), &timers, Duration::from_millis(100));
        assert_eq!(flasher.tick(), Some(true));
        assert_eq!(flasher.tick(), Some(false));
        assert_eq!(flasher.tick(), Some(true));

        assert!(flasher.stop());
        assert!(!flasher.phase());
        assert_eq!(flasher.state(), FlashState::Idle);
        assert!(!flasher.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flashing_posts_ticks_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let mut flasher = UrgencyFlasher::default();

        flasher.start(WindowId(4), &timers, Duration::from_millis(100));
        assert_eq!(rx.recv().await, Some(LoopEvent::FlashTick(WindowId(4))));

        flasher.stop();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
