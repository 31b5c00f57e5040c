use crate::events::{LoopEvent, Notification, WindowId, WindowProperty};
use crate::services::timer::TimerGuard;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, Duration};
use tracing::info;

use super::memory::{FakeWindow, MemoryWindowSystem};
use super::types::{NetState, WmHints};

const TERMINAL: WindowId = WindowId(0x1a00001);
const BROWSER: WindowId = WindowId(0x1c00001);
const PLAYER: WindowId = WindowId(0x1e00001);

/// Сценарий эмуляции оконного менеджера для запуска без X-сервера.
///
/// На каждом шаге меняет окна в `MemoryWindowSystem` и присылает те же
/// уведомления, что прислал бы настоящий оконный менеджер.
pub struct DryRunScript {
    ws: MemoryWindowSystem,
    tx: UnboundedSender<LoopEvent>,
    step: usize,
}

impl DryRunScript {
    pub const STEPS: usize = 12;

    pub fn new(ws: MemoryWindowSystem, tx: UnboundedSender<LoopEvent>) -> Self {
        ws.set_desktops(2, vec!["Работа".to_string(), "Отдых".to_string()]);
        Self { ws, tx, step: 0 }
    }

    /// Запустить сценарий по кругу; уничтожение охранника его останавливает
    pub fn spawn(mut self, period: Duration) -> TimerGuard {
        info!("Dry-run режим - оконный менеджер эмулируется, шаг каждые {:?}", period);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                if !self.advance() {
                    break;
                }
            }
        });
        TimerGuard::from_handle(handle)
    }

    /// Выполнить следующий шаг; `false`, если цикл событий закрыт
    pub fn advance(&mut self) -> bool {
        let notifications = self.apply(self.step);
        self.step = (self.step + 1) % Self::STEPS;
        notifications
            .into_iter()
            .all(|n| self.tx.send(LoopEvent::Notify(n)).is_ok())
    }

    fn apply(&self, step: usize) -> Vec<Notification> {
        let ws = &self.ws;
        let property = |window, property| Notification::Property { window, property };

        match step {
            0 => {
                info!("Dry-run: открыт терминал");
                ws.add_window(TERMINAL, FakeWindow::titled("Терминал"));
                vec![Notification::ClientListChanged]
            }
            1 => {
                info!("Dry-run: открыт браузер на втором столе");
                ws.add_window(BROWSER, FakeWindow::titled("Браузер").on_desktop(1));
                vec![Notification::ClientListChanged]
            }
            2 => {
                info!("Dry-run: фокус у терминала");
                ws.set_active(Some(TERMINAL));
                vec![Notification::ActiveWindowChanged]
            }
            3 => {
                info!("Dry-run: браузер требует внимания");
                ws.update_window(BROWSER, |w| {
                    w.hints = Some(WmHints { urgent: true, ..WmHints::default() })
                });
                vec![property(BROWSER, WindowProperty::Hints)]
            }
            4 => {
                info!("Dry-run: переход на второй стол");
                ws.set_current_desktop(1);
                vec![Notification::CurrentDesktopChanged]
            }
            5 => {
                info!("Dry-run: браузер сменил заголовок, срочность снята");
                ws.update_window(BROWSER, |w| {
                    w.title = Some("Браузер - новости".to_string());
                    w.hints = None;
                });
                vec![property(BROWSER, WindowProperty::Title), property(BROWSER, WindowProperty::Hints)]
            }
            6 => {
                info!("Dry-run: терминал свёрнут");
                ws.update_window(TERMINAL, |w| w.state |= NetState::HIDDEN);
                vec![property(TERMINAL, WindowProperty::State)]
            }
            7 => {
                info!("Dry-run: открыт плеер, исключённый из панели");
                ws.add_window(PLAYER, FakeWindow::titled("Плеер").with_state(NetState::SKIP_TASKBAR));
                vec![Notification::ClientListChanged]
            }
            8 => {
                info!("Dry-run: добавлен третий стол");
                ws.set_desktops(3, vec!["Работа".to_string(), "Отдых".to_string(), "Музыка".to_string()]);
                vec![Notification::DesktopCountChanged, Notification::DesktopNamesChanged]
            }
            9 => {
                info!("Dry-run: браузер и плеер закрыты");
                ws.remove_window(BROWSER);
                ws.remove_window(PLAYER);
                vec![Notification::ClientListChanged]
            }
            10 => {
                // Второй проход без окна удаляет задачу
                vec![Notification::ClientListChanged]
            }
            _ => {
                info!("Dry-run: терминал закрыт, сценарий начинается заново");
                ws.remove_window(TERMINAL);
                ws.set_active(None);
                ws.set_current_desktop(0);
                ws.set_desktops(2, vec!["Работа".to_string(), "Отдых".to_string()]);
                vec![
                    Notification::ActiveWindowChanged,
                    Notification::CurrentDesktopChanged,
                    Notification::DesktopCountChanged,
                    Notification::ClientListChanged,
                    Notification::ClientListChanged,
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::window_system::WindowSystem;
    use tokio::sync::mpsc;

    #[test]
    fn test_script_cycle_returns_to_empty() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ws = MemoryWindowSystem::new();
        let mut script = DryRunScript::new(ws.clone(), tx);

        assert!(script.advance());
        assert_eq!(ws.client_list().unwrap(), vec![TERMINAL]);
        assert_eq!(rx.try_recv().unwrap(), LoopEvent::Notify(Notification::ClientListChanged));

        for _ in 1..DryRunScript::STEPS {
            assert!(script.advance());
        }
        assert!(ws.client_list().unwrap().is_empty());
        assert_eq!(ws.desktop_count(), 2);
        assert_eq!(script.step, 0);
    }

    #[test]
    fn test_closed_loop_stops_script() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut script = DryRunScript::new(MemoryWindowSystem::new(), tx);
        assert!(!script.advance());
    }
}
