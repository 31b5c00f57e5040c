//! Выбор иконки задачи.
//!
//! Источники по порядку: _NET_WM_ICON, затем pixmap из WM_HINTS (с маской),
//! затем встроенная иконка по умолчанию. Результат никогда не пустой.

use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::WindowId;
use crate::services::window_system::{RawImage, WindowSystem, WmHints};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use once_cell::sync::Lazy;

/// Допустимые размеры иконки из _NET_WM_ICON, включительно
pub const ICON_MIN_DIMENSION: u32 = 16;
pub const ICON_MAX_DIMENSION: u32 = 256;

const GENERIC_BASE_SIZE: u32 = 48;

static GENERIC_ICON: Lazy<RgbaImage> = Lazy::new(draw_generic_icon);

#[derive(Debug, Clone, Copy)]
pub struct IconResolver {
    size: u32,
}

impl IconResolver {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    #[cfg(test)]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ошибка только если окно исчезло; иначе всегда есть иконка
    pub fn resolve<W: WindowSystem + ?Sized>(&self, ws: &W, window: WindowId) -> Result<RgbaImage> {
        if let Some(image) = ws.icon_property(window)?.and_then(|data| decode_net_wm_icon(&data)) {
            debug_if_enabled!("Иконка {} из _NET_WM_ICON {}x{}", window, image.width(), image.height());
            return Ok(self.fit(image));
        }

        if let Some(image) = ws.wm_hints(window)?.and_then(|hints| legacy_icon(ws, hints)) {
            debug_if_enabled!("Иконка {} из WM_HINTS {}x{}", window, image.width(), image.height());
            return Ok(self.fit(image));
        }

        debug_if_enabled!("Для {} используется иконка по умолчанию", window);
        Ok(self.generic())
    }

    pub fn generic(&self) -> RgbaImage {
        self.fit(GENERIC_ICON.clone())
    }

    fn fit(&self, image: RgbaImage) -> RgbaImage {
        if image.width() == self.size && image.height() == self.size {
            return image;
        }
        imageops::resize(&image, self.size, self.size, FilterType::Triangle)
    }
}

/// Первое изображение из _NET_WM_ICON: `[w, h, w*h пикселей 0xAARRGGBB]`
pub fn decode_net_wm_icon(data: &[u32]) -> Option<RgbaImage> {
    let (&width, &height) = (data.first()?, data.get(1)?);
    let range = ICON_MIN_DIMENSION..=ICON_MAX_DIMENSION;
    if !range.contains(&width) || !range.contains(&height) {
        debug_if_enabled!("_NET_WM_ICON отклонён: размер {}x{}", width, height);
        return None;
    }

    let count = width as usize * height as usize;
    let pixels = data.get(2..2 + count)?;

    let mut rgba = Vec::with_capacity(count * 4);
    for &argb in pixels {
        let [a, r, g, b] = argb.to_be_bytes();
        rgba.extend_from_slice(&[r, g, b, a]);
    }
    RgbaImage::from_raw(width, height, rgba)
}

fn legacy_icon<W: WindowSystem + ?Sized>(ws: &W, hints: WmHints) -> Option<RgbaImage> {
    let pixmap = ws.read_drawable(hints.icon_pixmap?)?;
    let mask = hints.icon_mask.and_then(|mask| ws.read_drawable(mask));
    compose_pixmap(&pixmap, mask.as_ref())
}

/// Цветной (или 1-битный) pixmap плюс необязательная 1-битная маска
pub fn compose_pixmap(pixmap: &RawImage, mask: Option<&RawImage>) -> Option<RgbaImage> {
    if !pixmap.is_consistent() {
        return None;
    }
    let mask = mask.filter(|m| {
        m.is_consistent() && m.width == pixmap.width && m.height == pixmap.height
    });

    let mut image = RgbaImage::new(pixmap.width, pixmap.height);
    for (x, y, out) in image.enumerate_pixels_mut() {
        let value = pixmap.pixel(x, y);
        let rgb = if pixmap.depth == 1 {
            // 1 означает цвет переднего плана (чёрный)
            if value != 0 { 0x000000 } else { 0xFFFFFF }
        } else {
            value
        };
        let alpha = match mask {
            Some(mask) if mask.pixel(x, y) == 0 => 0,
            _ => 0xFF,
        };
        let [_, r, g, b] = rgb.to_be_bytes();
        *out = Rgba([r, g, b, alpha]);
    }
    Some(image)
}

/// Рамка окна с заголовком: нейтральная иконка «какое-то приложение»
fn draw_generic_icon() -> RgbaImage {
    let size = GENERIC_BASE_SIZE;
    let frame = Rgba([0x30, 0x30, 0x38, 0xFF]);
    let title_bar = Rgba([0x3a, 0x6e, 0xa5, 0xFF]);
    let body = Rgba([0xe8, 0xe8, 0xec, 0xFF]);

    RgbaImage::from_fn(size, size, |x, y| {
        let (min, max) = (4, size - 5);
        if x < min || x > max || y < min + 2 || y > max - 2 {
            Rgba([0, 0, 0, 0])
        } else if x <= min + 1 || x >= max - 1 || y <= min + 3 || y >= max - 3 {
            frame
        } else if y <= min + 11 {
            title_bar
        } else {
            body
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::window_system::{FakeWindow, MemoryWindowSystem};

    fn icon_data(width: u32, height: u32, argb: u32) -> Vec<u32> {
        let mut data = vec![width, height];
        data.extend(std::iter::repeat(argb).take((width * height) as usize));
        data
    }

    #[test]
    fn test_decode_converts_argb_to_rgba() {
        let image = decode_net_wm_icon(&icon_data(16, 16, 0x80112233)).unwrap();
        assert_eq!(image.dimensions(), (16, 16));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0x11, 0x22, 0x33, 0x80]));
    }

    #[test]
    fn test_decode_rejects_out_of_range_dimensions() {
        assert!(decode_net_wm_icon(&icon_data(300, 16, 0xFF000000)).is_none());
        assert!(decode_net_wm_icon(&icon_data(16, 8, 0xFF000000)).is_none());
        assert!(decode_net_wm_icon(&icon_data(256, 256, 0xFF000000)).is_some());
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let mut data = icon_data(16, 16, 0xFF000000);
        data.pop();
        assert!(decode_net_wm_icon(&data).is_none());
        assert!(decode_net_wm_icon(&[16]).is_none());
        assert!(decode_net_wm_icon(&[]).is_none());
    }

    #[test]
    fn test_resolve_prefers_net_wm_icon_and_scales() {
        let ws = MemoryWindowSystem::new();
        ws.add_window(WindowId(1), FakeWindow::titled("a").with_icon(icon_data(32, 32, 0xFF00FF00)));

        let image = IconResolver::new(24).resolve(&ws, WindowId(1)).unwrap();
        assert_eq!(image.dimensions(), (24, 24));
        assert_eq!(image.get_pixel(12, 12), &Rgba([0, 0xFF, 0, 0xFF]));
    }

    #[test]
    fn test_oversized_icon_falls_through_to_legacy_hint() {
        let ws = MemoryWindowSystem::new();
        let hints = WmHints { urgent: false, icon_pixmap: Some(100), icon_mask: Some(101) };
        ws.add_window(
            WindowId(1),
            FakeWindow::titled("a")
                .with_icon(icon_data(300, 300, 0xFF00FF00))
                .with_hints(hints),
        );
        ws.add_drawable(
            100,
            RawImage { width: 2, height: 2, depth: 24, pixels: vec![0xFF0000, 0x0000FF, 0xFF0000, 0x0000FF] },
        );
        ws.add_drawable(101, RawImage { width: 2, height: 2, depth: 1, pixels: vec![1, 0, 1, 0] });

        let image = IconResolver::new(2).resolve(&ws, WindowId(1)).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
        // Левый столбец непрозрачный красный, правый прозрачный
        assert_eq!(image.get_pixel(0, 0)[0], 0xFF);
        assert_eq!(image.get_pixel(0, 0)[3], 0xFF);
        assert_eq!(image.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_no_sources_gives_generic_icon() {
        let ws = MemoryWindowSystem::new();
        ws.add_window(WindowId(1), FakeWindow::titled("a"));

        let resolver = IconResolver::new(24);
        let image = resolver.resolve(&ws, WindowId(1)).unwrap();
        assert_eq!(image.dimensions(), (24, 24));
        assert_eq!(image, resolver.generic());
        assert!(image.pixels().any(|p| p[3] != 0));
    }

    #[test]
    fn test_missing_pixmap_gives_generic_icon() {
        let ws = MemoryWindowSystem::new();
        let hints = WmHints { urgent: false, icon_pixmap: Some(555), icon_mask: None };
        ws.add_window(WindowId(1), FakeWindow::titled("a").with_hints(hints));

        let resolver = IconResolver::new(16);
        assert_eq!(resolver.resolve(&ws, WindowId(1)).unwrap(), resolver.generic());
    }

    #[test]
    fn test_gone_window_has_no_icon() {
        let ws = MemoryWindowSystem::new();
        assert!(IconResolver::new(16).resolve(&ws, WindowId(7)).is_err());
    }

    #[test]
    fn test_compose_monochrome_pixmap() {
        let pixmap = RawImage { width: 2, height: 1, depth: 1, pixels: vec![1, 0] };
        let image = compose_pixmap(&pixmap, None).unwrap();
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 0xFF]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([0xFF, 0xFF, 0xFF, 0xFF]));
    }

    #[test]
    fn test_compose_ignores_mismatched_mask() {
        let pixmap = RawImage { width: 2, height: 1, depth: 24, pixels: vec![0x010203, 0x040506] };
        let mask = RawImage { width: 1, height: 1, depth: 1, pixels: vec![0] };
        let image = compose_pixmap(&pixmap, Some(&mask)).unwrap();
        assert!(image.pixels().all(|p| p[3] == 0xFF));
        assert_eq!(image.get_pixel(1, 0), &Rgba([4, 5, 6, 0xFF]));
    }

    #[test]
    fn test_generic_icon_is_never_empty() {
        for size in [1, 8, 24, 256] {
            let image = IconResolver::new(size).generic();
            assert_eq!(image.dimensions(), (size, size));
            assert!(!image.as_raw().is_empty());
        }
        assert_eq!(IconResolver::new(0).size(), 1);
    }
}
