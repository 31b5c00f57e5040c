use crate::error::{Result, WintaskError};
use crate::events::WindowId;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use super::r#trait::WindowSystem;
use super::types::{Capability, NetState, RawImage, Request, Subscription, WindowTypes, WmHints};

/// Окно, которым владеет эмулируемый оконный менеджер
#[derive(Debug, Clone, Default)]
pub struct FakeWindow {
    pub title: Option<String>,
    pub state: NetState,
    pub window_type: WindowTypes,
    pub desktop: Option<u32>,
    pub icon: Option<Vec<u32>>,
    pub hints: Option<WmHints>,
}

impl FakeWindow {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            window_type: WindowTypes::NORMAL,
            desktop: Some(0),
            ..Self::default()
        }
    }

    pub fn on_desktop(mut self, desktop: u32) -> Self {
        self.desktop = Some(desktop);
        self
    }

    pub fn with_state(mut self, state: NetState) -> Self {
        self.state = state;
        self
    }

    #[cfg(test)]
    pub fn with_type(mut self, window_type: WindowTypes) -> Self {
        self.window_type = window_type;
        self
    }

    #[cfg(test)]
    pub fn with_hints(mut self, hints: WmHints) -> Self {
        self.hints = Some(hints);
        self
    }

    #[cfg(test)]
    pub fn with_icon(mut self, icon: Vec<u32>) -> Self {
        self.icon = Some(icon);
        self
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    windows: HashMap<WindowId, FakeWindow>,
    client_list: Vec<WindowId>,
    drawables: HashMap<u32, RawImage>,
    desktop_count: u32,
    current_desktop: u32,
    desktop_names: Vec<String>,
    active: Option<WindowId>,
    subscribed: HashSet<WindowId>,
    sent: Vec<Request>,
    active_window_supported: bool,
}

/// Оконный менеджер в памяти: для dry-run режима и тестов.
///
/// Клоны разделяют одно состояние, поэтому сценарий может менять окна,
/// пока движок панели читает их через `WindowSystem`.
#[derive(Debug, Clone)]
pub struct MemoryWindowSystem {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWindowSystem {
    pub fn new() -> Self {
        let state = MemoryState {
            desktop_count: 1,
            active_window_supported: true,
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Добавить окно и поставить его в конец списка клиентов
    pub fn add_window(&self, window: WindowId, fake: FakeWindow) {
        let mut state = self.state.lock();
        state.windows.insert(window, fake);
        if !state.client_list.contains(&window) {
            state.client_list.push(window);
        }
    }

    /// Убрать окно из списка клиентов и забыть его свойства
    pub fn remove_window(&self, window: WindowId) {
        let mut state = self.state.lock();
        state.windows.remove(&window);
        state.client_list.retain(|&w| w != window);
    }

    #[cfg(test)]
    pub fn set_client_list(&self, list: Vec<WindowId>) {
        self.state.lock().client_list = list;
    }

    pub fn update_window(&self, window: WindowId, update: impl FnOnce(&mut FakeWindow)) {
        if let Some(fake) = self.state.lock().windows.get_mut(&window) {
            update(fake);
        }
    }

    #[cfg(test)]
    pub fn add_drawable(&self, id: u32, image: RawImage) {
        self.state.lock().drawables.insert(id, image);
    }

    pub fn set_desktops(&self, count: u32, names: Vec<String>) {
        let mut state = self.state.lock();
        state.desktop_count = count;
        state.desktop_names = names;
    }

    pub fn set_current_desktop(&self, desktop: u32) {
        self.state.lock().current_desktop = desktop;
    }

    pub fn set_active(&self, window: Option<WindowId>) {
        self.state.lock().active = window;
    }

    #[cfg(test)]
    pub fn set_active_window_supported(&self, supported: bool) {
        self.state.lock().active_window_supported = supported;
    }

    #[cfg(test)]
    pub fn is_subscribed(&self, window: WindowId) -> bool {
        self.state.lock().subscribed.contains(&window)
    }

    /// Забрать накопленные исходящие запросы
    #[cfg(test)]
    pub fn take_requests(&self) -> Vec<Request> {
        std::mem::take(&mut self.state.lock().sent)
    }

    fn read<T>(&self, window: WindowId, f: impl FnOnce(&FakeWindow) -> T) -> Result<T> {
        match self.state.lock().windows.get(&window) {
            Some(fake) => Ok(f(fake)),
            None => WintaskError::window_gone(window),
        }
    }
}

impl WindowSystem for MemoryWindowSystem {
    fn client_list(&self) -> Result<Vec<WindowId>> {
        Ok(self.state.lock().client_list.clone())
    }

    fn title(&self, window: WindowId) -> Result<Option<String>> {
        self.read(window, |w| w.title.clone())
    }

    fn state(&self, window: WindowId) -> Result<NetState> {
        self.read(window, |w| w.state)
    }

    fn window_type(&self, window: WindowId) -> Result<WindowTypes> {
        self.read(window, |w| w.window_type)
    }

    fn desktop(&self, window: WindowId) -> Result<Option<u32>> {
        self.read(window, |w| w.desktop)
    }

    fn icon_property(&self, window: WindowId) -> Result<Option<Vec<u32>>> {
        self.read(window, |w| w.icon.clone())
    }

    fn wm_hints(&self, window: WindowId) -> Result<Option<WmHints>> {
        self.read(window, |w| w.hints)
    }

    fn read_drawable(&self, drawable: u32) -> Option<RawImage> {
        self.state.lock().drawables.get(&drawable).cloned()
    }

    fn desktop_count(&self) -> u32 {
        self.state.lock().desktop_count
    }

    fn current_desktop(&self) -> u32 {
        self.state.lock().current_desktop
    }

    fn desktop_names(&self) -> Vec<String> {
        self.state.lock().desktop_names.clone()
    }

    fn active_window(&self) -> Option<WindowId> {
        self.state.lock().active
    }

    fn subscribe(&self, window: WindowId) -> Result<Subscription> {
        let mut state = self.state.lock();
        if !state.windows.contains_key(&window) {
            return WintaskError::window_gone(window);
        }
        state.subscribed.insert(window);

        let shared = Arc::clone(&self.state);
        Ok(Subscription::new(window, move |window| {
            shared.lock().subscribed.remove(&window);
        }))
    }

    fn send(&self, request: Request) -> Result<()> {
        debug!("Эмулируемый запрос к оконному менеджеру: {:?}", request);
        self.state.lock().sent.push(request);
        Ok(())
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ActiveWindow => self.state.lock().active_window_supported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_window() {
        let ws = MemoryWindowSystem::new();
        ws.add_window(WindowId(1), FakeWindow::titled("one"));
        ws.add_window(WindowId(2), FakeWindow::titled("two"));

        assert_eq!(ws.client_list().unwrap(), vec![WindowId(1), WindowId(2)]);
        assert_eq!(ws.title(WindowId(2)).unwrap().as_deref(), Some("two"));

        ws.remove_window(WindowId(1));
        assert_eq!(ws.client_list().unwrap(), vec![WindowId(2)]);
        assert!(matches!(ws.title(WindowId(1)), Err(WintaskError::WindowGone(WindowId(1)))));
        assert!(matches!(ws.state(WindowId(1)), Err(WintaskError::WindowGone(_))));
    }

    #[test]
    fn test_unset_property_differs_from_gone_window() {
        let ws = MemoryWindowSystem::new();
        ws.add_window(WindowId(1), FakeWindow { title: None, desktop: None, ..FakeWindow::default() });

        assert_eq!(ws.title(WindowId(1)).unwrap(), None);
        assert_eq!(ws.desktop(WindowId(1)).unwrap(), None);
        assert!(ws.desktop(WindowId(2)).is_err());
    }

    #[test]
    fn test_subscribe_gone_window_fails() {
        let ws = MemoryWindowSystem::new();
        assert!(ws.subscribe(WindowId(9)).is_err());
    }

    #[test]
    fn test_subscription_drop_unsubscribes() {
        let ws = MemoryWindowSystem::new();
        ws.add_window(WindowId(1), FakeWindow::titled("one"));

        let subscription = ws.subscribe(WindowId(1)).unwrap();
        assert!(ws.is_subscribed(WindowId(1)));
        drop(subscription);
        assert!(!ws.is_subscribed(WindowId(1)));
    }

    #[test]
    fn test_requests_are_recorded() {
        let ws = MemoryWindowSystem::new();
        ws.send(Request::Close(WindowId(3))).unwrap();
        assert_eq!(ws.take_requests(), vec![Request::Close(WindowId(3))]);
        assert!(ws.take_requests().is_empty());
    }
}
