//! Таймеры цикла событий.
//!
//! Таймер является задачей tokio, которая только отправляет `LoopEvent` обратно
//! в цикл; сама обработка выполняется там же, где и всё остальное.
//! Владелец держит `TimerGuard`: его уничтожение отменяет таймер.

use crate::debug_if_enabled;
use crate::events::LoopEvent;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Duration, Instant, MissedTickBehavior};

/// Отменяет таймер при уничтожении
#[derive(Debug)]
pub struct TimerGuard {
    handle: JoinHandle<()>,
}

impl TimerGuard {
    /// Привязать к охраннику уже запущенную задачу tokio
    pub fn from_handle(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    #[cfg(test)]
    pub fn cancel(self) {
        // abort выполняется в Drop
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Clone)]
pub struct Timers {
    tx: UnboundedSender<LoopEvent>,
}

impl Timers {
    pub fn new(tx: UnboundedSender<LoopEvent>) -> Self {
        Self { tx }
    }

    /// Периодический таймер: первое событие через `period`
    pub fn every(&self, period: Duration, event: LoopEvent) -> TimerGuard {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(event.clone()).is_err() {
                    debug_if_enabled!("Цикл событий закрыт, периодический таймер остановлен");
                    break;
                }
            }
        });
        TimerGuard { handle }
    }

    /// Однократный таймер
    pub fn after(&self, delay: Duration, event: LoopEvent) -> TimerGuard {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(event);
        });
        TimerGuard { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::WindowId;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_every_fires_periodically() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let _guard = timers.every(Duration::from_millis(100), LoopEvent::FlashTick(WindowId(1)));

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(LoopEvent::FlashTick(WindowId(1))));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_guard_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let guard = timers.after(
            Duration::from_millis(100),
            LoopEvent::DragSettled { window: WindowId(2), token: 1 },
        );
        guard.cancel();
        drop(timers);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timers = Timers::new(tx);
        let _guard = timers.after(
            Duration::from_millis(100),
            LoopEvent::DragSettled { window: WindowId(3), token: 7 },
        );

        assert_eq!(
            rx.recv().await,
            Some(LoopEvent::DragSettled { window: WindowId(3), token: 7 })
        );
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }
}
