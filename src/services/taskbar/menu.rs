use crate::events::WindowId;
use crate::services::window_system::{Desktop, Request, WindowSystem};
use tracing::{debug, info, warn};

use super::Taskbar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Raise,
    Iconify,
    Close,
    MoveToDesktop(Desktop),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

impl MenuItem {
    fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self { label: label.into(), action }
    }
}

/// Модель контекстного меню задачи
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub items: Vec<MenuItem>,
    /// Подменю «На стол»: по пункту на стол и «Все столы»
    pub desktops: Vec<MenuItem>,
}

impl ContextMenu {
    pub fn build(desktop_count: u32, names: &[String]) -> Self {
        let items = vec![
            MenuItem::new("Поднять", MenuAction::Raise),
            MenuItem::new("Свернуть", MenuAction::Iconify),
            MenuItem::new("Закрыть", MenuAction::Close),
        ];

        let mut desktops: Vec<MenuItem> = (0..desktop_count)
            .map(|i| {
                let label = names
                    .get(i as usize)
                    .filter(|name| !name.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Стол {}", i + 1));
                MenuItem::new(label, MenuAction::MoveToDesktop(Desktop::Index(i)))
            })
            .collect();
        desktops.push(MenuItem::new("Все столы", MenuAction::MoveToDesktop(Desktop::All)));

        Self { items, desktops }
    }
}

impl<W: WindowSystem> Taskbar<W> {
    pub(crate) fn rebuild_menu(&mut self) {
        self.menu = ContextMenu::build(self.registry.desktop_count, &self.registry.desktop_names);
        debug!("Контекстное меню перестроено: {} столов", self.registry.desktop_count);
        self.view.menu_rebuilt(&self.menu);
    }

    pub(crate) fn on_menu_action(&mut self, action: MenuAction) {
        let Some(window) = self.menu_target.filter(|w| self.registry.contains(*w)) else {
            warn!("Пункт меню {:?} выбран, но задача меню уже не существует", action);
            return;
        };
        info!("Меню {:?} для {}", action, window);

        match action {
            MenuAction::Raise => self.activate(window, true),
            MenuAction::Iconify => self.request(Request::Iconify(window)),
            MenuAction::Close => self.request(Request::Close(window)),
            MenuAction::MoveToDesktop(desktop) => self.request(Request::MoveToDesktop(window, desktop)),
        }
    }

    #[cfg(test)]
    pub fn menu_target(&self) -> Option<WindowId> {
        self.menu_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submenu_size_follows_desktop_count() {
        for count in [1, 2, 4, 9] {
            let menu = ContextMenu::build(count, &[]);
            assert_eq!(menu.desktops.len(), count as usize + 1);
            assert_eq!(menu.items.len(), 3);
        }
    }

    #[test]
    fn test_desktop_labels() {
        let names = vec!["web".to_string(), String::new()];
        let menu = ContextMenu::build(3, &names);

        let labels: Vec<_> = menu.desktops.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["web", "Стол 2", "Стол 3", "Все столы"]);
        assert_eq!(menu.desktops[3].action, MenuAction::MoveToDesktop(Desktop::All));
        assert_eq!(menu.desktops[1].action, MenuAction::MoveToDesktop(Desktop::Index(1)));
    }
}
