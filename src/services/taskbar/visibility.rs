use crate::config::TaskbarConfig;
use crate::services::window_system::{Desktop, NetState, WindowTypes};

/// Правила отбора окон: исключение при создании и видимость при отображении
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub show_iconified: bool,
    pub show_mapped: bool,
    pub show_all_desktops: bool,
    pub accept_skip_pager: bool,
}

impl VisibilityFilter {
    pub fn from_config(config: &TaskbarConfig) -> Self {
        Self {
            show_iconified: config.show_iconified,
            show_mapped: config.show_mapped,
            show_all_desktops: config.show_all_desktops,
            accept_skip_pager: config.accept_skip_pager,
        }
    }

    /// Окно вообще не должно попадать в панель
    pub fn is_excluded(&self, state: NetState, window_type: WindowTypes) -> bool {
        state.contains(NetState::SKIP_TASKBAR)
            || (state.contains(NetState::SKIP_PAGER) && self.accept_skip_pager)
            || window_type.intersects(WindowTypes::DESKTOP | WindowTypes::DOCK | WindowTypes::SPLASH)
    }

    /// Кнопка существующей задачи показывается
    pub fn is_visible(&self, desktop: Desktop, iconified: bool, current_desktop: u32) -> bool {
        let on_desktop = self.show_all_desktops
            || desktop == Desktop::All
            || desktop == Desktop::Index(current_desktop);
        let by_state = if iconified { self.show_iconified } else { self.show_mapped };
        on_desktop && by_state
    }
}
