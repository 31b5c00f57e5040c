use crate::events::WindowId;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Подмножество _NET_WM_STATE, важное для панели
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NetState: u32 {
        const HIDDEN = 1 << 0;
        const SKIP_TASKBAR = 1 << 1;
        const SKIP_PAGER = 1 << 2;
        const SHADED = 1 << 3;
        const DEMANDS_ATTENTION = 1 << 4;
    }
}

bitflags! {
    /// _NET_WM_WINDOW_TYPE
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowTypes: u32 {
        const DESKTOP = 1 << 0;
        const DOCK = 1 << 1;
        const TOOLBAR = 1 << 2;
        const MENU = 1 << 3;
        const UTILITY = 1 << 4;
        const SPLASH = 1 << 5;
        const DIALOG = 1 << 6;
        const NORMAL = 1 << 7;
    }
}

/// Номер рабочего стола или «все столы» (липкое окно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Desktop {
    Index(u32),
    All,
}

impl Desktop {
    /// Значение _NET_WM_DESKTOP для «всех столов»
    pub const ALL_RAW: u32 = 0xFFFF_FFFF;

    pub fn from_raw(raw: u32) -> Self {
        if raw == Self::ALL_RAW {
            Desktop::All
        } else {
            Desktop::Index(raw)
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Desktop::Index(index) => index,
            Desktop::All => Self::ALL_RAW,
        }
    }
}

impl Default for Desktop {
    fn default() -> Self {
        Desktop::All
    }
}

impl fmt::Display for Desktop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Desktop::Index(index) => write!(f, "{}", index),
            Desktop::All => write!(f, "all"),
        }
    }
}

/// Разобранный WM_HINTS (ICCCM 4.1.2.4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WmHints {
    pub urgent: bool,
    pub icon_pixmap: Option<u32>,
    pub icon_mask: Option<u32>,
}

impl WmHints {
    const ICON_PIXMAP_HINT: u32 = 1 << 2;
    const ICON_MASK_HINT: u32 = 1 << 5;
    const URGENCY_HINT: u32 = 1 << 8;

    /// Разбор сырого значения свойства; `None`, если данных слишком мало
    pub fn from_raw(words: &[u32]) -> Option<Self> {
        let flags = *words.first()?;
        let word = |index: usize, flag: u32| {
            if flags & flag != 0 {
                words.get(index).copied().filter(|&id| id != 0)
            } else {
                None
            }
        };

        Some(Self {
            urgent: flags & Self::URGENCY_HINT != 0,
            icon_pixmap: word(3, Self::ICON_PIXMAP_HINT),
            icon_mask: word(7, Self::ICON_MASK_HINT),
        })
    }
}

/// Пиксели, прочитанные из drawable
///
/// Для глубины 1 значения 0 или 1, иначе 0x00RRGGBB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    pub pixels: Vec<u32>,
}

impl RawImage {
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width as usize) * (self.height as usize)
    }
}

/// Переключаемое через _NET_WM_STATE состояние
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateToggle {
    Shaded,
}

/// Исходящие запросы к оконному менеджеру
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// _NET_ACTIVE_WINDOW с индикацией источника «панель»
    Activate(WindowId),
    /// Без поддержки _NET_ACTIVE_WINDOW: map + raise + фокус напрямую
    RaiseLegacy(WindowId),
    Iconify(WindowId),
    SwitchDesktop(u32),
    ToggleState(WindowId, StateToggle),
    Close(WindowId),
    MoveToDesktop(WindowId, Desktop),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ActiveWindow,
}

/// Подписка на изменения свойств окна; отписывается при уничтожении
pub struct Subscription {
    window: WindowId,
    release: Option<Box<dyn FnOnce(WindowId)>>,
}

impl Subscription {
    pub fn new(window: WindowId, release: impl FnOnce(WindowId) + 'static) -> Self {
        Self {
            window,
            release: Some(Box::new(release)),
        }
    }

    #[cfg(test)]
    pub fn window(&self) -> WindowId {
        self.window
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("window", &self.window)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_desktop_raw_roundtrip_sentinel() {
        assert_eq!(Desktop::from_raw(0xFFFF_FFFF), Desktop::All);
        assert_eq!(Desktop::from_raw(3), Desktop::Index(3));
        assert_eq!(Desktop::All.to_raw(), 0xFFFF_FFFF);
        assert_eq!(Desktop::default(), Desktop::All);
    }

    #[test]
    fn test_wm_hints_parsing() {
        // flags: IconPixmapHint | IconMaskHint | UrgencyHint
        let mut words = [0u32; 9];
        words[0] = (1 << 2) | (1 << 5) | (1 << 8);
        words[3] = 0x400001;
        words[7] = 0x400002;

        let hints = WmHints::from_raw(&words).unwrap();
        assert!(hints.urgent);
        assert_eq!(hints.icon_pixmap, Some(0x400001));
        assert_eq!(hints.icon_mask, Some(0x400002));
    }

    #[test]
    fn test_wm_hints_ignores_unflagged_fields() {
        let mut words = [0u32; 9];
        words[3] = 0x400001;
        words[7] = 0x400002;

        let hints = WmHints::from_raw(&words).unwrap();
        assert!(!hints.urgent);
        assert_eq!(hints.icon_pixmap, None);
        assert_eq!(hints.icon_mask, None);
    }

    #[test]
    fn test_wm_hints_short_property() {
        assert_eq!(WmHints::from_raw(&[]), None);

        // Флаг маски есть, а самого слова нет
        let hints = WmHints::from_raw(&[1 << 5, 0, 0, 0]).unwrap();
        assert_eq!(hints.icon_mask, None);
    }

    #[test]
    fn test_subscription_releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let subscription = Subscription::new(WindowId(5), move |window| {
            assert_eq!(window, WindowId(5));
            counter.set(counter.get() + 1);
        });
        assert_eq!(subscription.window(), WindowId(5));
        drop(subscription);
        assert_eq!(released.get(), 1);
    }
}
