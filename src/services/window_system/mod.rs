//! WindowSystem: граница с оконным менеджером
//!
//! Модуль отвечает только за чтение свойств окон и рабочих столов,
//! подписку на их изменения и отправку запросов оконному менеджеру.
//! Решения о задачах, видимости и фокусе принимает движок панели.

mod dry_run;
mod memory;
mod r#trait;
mod types;
mod x11;

pub use self::dry_run::DryRunScript;
pub use self::memory::{FakeWindow, MemoryWindowSystem};
pub use self::r#trait::WindowSystem;
pub use self::types::{
    Capability, Desktop, NetState, RawImage, Request, StateToggle, Subscription, WindowTypes, WmHints,
};
pub use self::x11::X11WindowSystem;
