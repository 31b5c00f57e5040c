use crate::config::Config;
use crate::error::Result;
use crate::events::{LoopEvent, WindowId};
use crate::services::timer::Timers;
use crate::services::window_system::{DryRunScript, MemoryWindowSystem, WindowSystem, X11WindowSystem};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

use super::view::LogView;
use super::Taskbar;

/// Движок панели, готовый к запуску в цикле событий
#[async_trait::async_trait(?Send)]
pub trait TaskbarRunner {
    /// Обрабатывать события до `Shutdown` или закрытия канала
    async fn run(self: Box<Self>, rx: UnboundedReceiver<LoopEvent>) -> Result<()>;
}

#[async_trait::async_trait(?Send)]
impl<W: WindowSystem + 'static> TaskbarRunner for Taskbar<W> {
    async fn run(self: Box<Self>, mut rx: UnboundedReceiver<LoopEvent>) -> Result<()> {
        let mut taskbar = *self;
        taskbar.start();

        while let Some(event) = rx.recv().await {
            if !taskbar.handle_event(event) {
                info!("Получен сигнал завершения");
                break;
            }
        }

        taskbar.teardown();
        Ok(())
    }
}

/// Создать движок: настоящий X11 или эмуляцию для dry-run
pub fn create_taskbar(
    config: &Config,
    tx: UnboundedSender<LoopEvent>,
    dry_run: bool,
    panel_window: Option<WindowId>,
) -> Result<Box<dyn TaskbarRunner>> {
    let timers = Timers::new(tx.clone());

    if dry_run {
        let ws = MemoryWindowSystem::new();
        let script = DryRunScript::new(ws.clone(), tx).spawn(config.dry_run.interval());
        let taskbar = Taskbar::new(&config.taskbar, ws, Box::new(LogView), timers)
            .with_panel_window(panel_window)
            .with_companion(script);
        Ok(Box::new(taskbar))
    } else {
        let ws = X11WindowSystem::connect(tx)?;
        let taskbar = Taskbar::new(&config.taskbar, ws, Box::new(LogView), timers)
            .with_panel_window(panel_window);
        Ok(Box::new(taskbar))
    }
}
