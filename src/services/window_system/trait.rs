use crate::error::Result;
use crate::events::WindowId;

use super::types::{Capability, NetState, RawImage, Request, Subscription, WindowTypes, WmHints};

/// Граница протокола взаимодействия с оконным менеджером (EWMH/ICCCM).
///
/// Все чтения синхронны и завершаются в пределах одного шага цикла.
/// Чтения свойств окна различают два случая: незаданное свойство даёт
/// `Ok(None)` или пустое значение, а исчезнувшее окно даёт
/// `WintaskError::WindowGone`, чтобы вызывающий мог бросить обновление.
pub trait WindowSystem {
    /// Текущий _NET_CLIENT_LIST
    fn client_list(&self) -> Result<Vec<WindowId>>;

    /// _NET_WM_NAME (UTF-8), затем WM_NAME
    fn title(&self, window: WindowId) -> Result<Option<String>>;
    fn state(&self, window: WindowId) -> Result<NetState>;
    fn window_type(&self, window: WindowId) -> Result<WindowTypes>;
    /// Сырое значение _NET_WM_DESKTOP
    fn desktop(&self, window: WindowId) -> Result<Option<u32>>;
    /// Сырое значение _NET_WM_ICON
    fn icon_property(&self, window: WindowId) -> Result<Option<Vec<u32>>>;
    fn wm_hints(&self, window: WindowId) -> Result<Option<WmHints>>;
    /// Pixmap из WM_HINTS; недоступный pixmap означает `None`
    fn read_drawable(&self, drawable: u32) -> Option<RawImage>;

    fn desktop_count(&self) -> u32;
    fn current_desktop(&self) -> u32;
    fn desktop_names(&self) -> Vec<String>;
    fn active_window(&self) -> Option<WindowId>;

    /// Начать получать изменения свойств окна
    fn subscribe(&self, window: WindowId) -> Result<Subscription>;
    fn send(&self, request: Request) -> Result<()>;
    fn supports(&self, capability: Capability) -> bool;
}
