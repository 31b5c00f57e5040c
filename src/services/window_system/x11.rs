use crate::error::{Result, WintaskError};
use crate::{debug_if_enabled, wintask_error};
use crate::events::{LoopEvent, Notification, WindowId, WindowProperty};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};
use x11rb::atom_manager;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{
    AtomEnum, ChangeWindowAttributesAux, ClientMessageData, ClientMessageEvent, ConfigureWindowAux,
    ConnectionExt, EventMask, GetPropertyReply, ImageFormat, ImageOrder, InputFocus,
    PropertyNotifyEvent, StackMode, Window, CLIENT_MESSAGE_EVENT,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::CURRENT_TIME;

use super::r#trait::WindowSystem;
use super::types::{
    Capability, NetState, RawImage, Request, StateToggle, Subscription, WindowTypes, WmHints,
};

atom_manager! {
    pub Atoms: AtomsCookie {
        UTF8_STRING,
        WM_CHANGE_STATE,
        _NET_SUPPORTED,
        _NET_CLIENT_LIST,
        _NET_NUMBER_OF_DESKTOPS,
        _NET_CURRENT_DESKTOP,
        _NET_DESKTOP_NAMES,
        _NET_ACTIVE_WINDOW,
        _NET_CLOSE_WINDOW,
        _NET_WM_NAME,
        _NET_WM_DESKTOP,
        _NET_WM_ICON,
        _NET_WM_STATE,
        _NET_WM_STATE_HIDDEN,
        _NET_WM_STATE_SKIP_TASKBAR,
        _NET_WM_STATE_SKIP_PAGER,
        _NET_WM_STATE_SHADED,
        _NET_WM_STATE_DEMANDS_ATTENTION,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_WM_WINDOW_TYPE_NORMAL,
    }
}

/// Индикация источника в клиентских сообщениях EWMH: «пейджер/панель»
const SOURCE_PAGER: u32 = 2;
const NET_WM_STATE_TOGGLE: u32 = 2;
const ICONIC_STATE: u32 = 3;
const MAX_STRING_PROPERTY_LEN: u32 = 4096;
const MAX_LIST_PROPERTY_LEN: u32 = 1024;
/// _NET_WM_ICON 256x256 + заголовок, в 32-битных словах
const MAX_ICON_PROPERTY_LEN: u32 = 2 + 256 * 256;
/// Пауза потока чтения, когда очередь событий пуста
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct X11WindowSystem {
    conn: Arc<RustConnection>,
    root: Window,
    atoms: Atoms,
    supported: Vec<u32>,
}

impl X11WindowSystem {
    /// Подключиться к X-серверу и запустить поток чтения событий
    pub fn connect(tx: UnboundedSender<LoopEvent>) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(None)?;
        let conn = Arc::new(conn);
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| wintask_error!(service_unavailable, "экран {} не найден", screen_num))?;
        let atoms = Atoms::new(conn.as_ref())?.reply()?;

        conn.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
        )?;
        conn.flush()?;

        let mut backend = Self {
            conn: Arc::clone(&conn),
            root,
            atoms,
            supported: Vec::new(),
        };
        backend.supported = backend.root_list(atoms._NET_SUPPORTED, AtomEnum::ATOM.into())?;
        info!(
            "Подключено к X-серверу: экран {}, корневое окно 0x{:x}, _NET_SUPPORTED: {} атомов",
            screen_num,
            root,
            backend.supported.len()
        );

        tokio::task::spawn_blocking(move || forward_events(conn, root, atoms, tx));

        Ok(backend)
    }

    /// GetProperty; BadWindow превращается в `WindowGone`
    fn property_reply(
        &self,
        window: Window,
        property: u32,
        type_: u32,
        offset: u32,
        long_length: u32,
    ) -> Result<GetPropertyReply> {
        let cookie = self.conn.get_property(false, window, property, type_, offset, long_length)?;
        cookie.reply().map_err(|e| gone_or(window, e))
    }

    fn property32(&self, window: Window, property: u32, type_: u32, long_length: u32) -> Result<Option<Vec<u32>>> {
        let reply = self.property_reply(window, property, type_, 0, long_length)?;
        if reply.value_len == 0 {
            return Ok(None);
        }
        Ok(reply.value32().map(|values| values.collect()))
    }

    fn cardinal(&self, window: Window, property: u32) -> Result<Option<u32>> {
        Ok(self
            .property32(window, property, AtomEnum::CARDINAL.into(), 1)?
            .and_then(|values| values.first().copied()))
    }

    fn string_property(&self, window: Window, property: u32, type_: u32) -> Result<Option<Vec<u8>>> {
        let reply = self.property_reply(window, property, type_, 0, MAX_STRING_PROPERTY_LEN)?;
        if reply.value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(reply.value))
        }
    }

    /// Список 32-битных значений корневого окна, прочитанный целиком по частям
    fn root_list(&self, property: u32, type_: u32) -> Result<Vec<u32>> {
        read_chunked(MAX_LIST_PROPERTY_LEN, |offset| {
            let reply = self.property_reply(self.root, property, type_, offset, MAX_LIST_PROPERTY_LEN)?;
            if reply.value_len == 0 {
                return Ok((Vec::new(), 0));
            }
            let (format, bytes_after) = (reply.format, reply.bytes_after);
            let chunk = reply.value32().ok_or_else(|| {
                wintask_error!(internal, "свойство {} в формате {}, ожидался 32", property, format)
            })?;
            Ok((chunk.collect(), bytes_after))
        })
    }

    fn client_message(&self, window: Window, type_: u32, data: [u32; 5]) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_,
            data: ClientMessageData::from(data),
        };
        self.conn.send_event(
            false,
            self.root,
            EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
            event,
        )?;
        self.conn.flush()?;
        Ok(())
    }
}

impl WindowSystem for X11WindowSystem {
    fn client_list(&self) -> Result<Vec<WindowId>> {
        let ids = self.root_list(self.atoms._NET_CLIENT_LIST, AtomEnum::WINDOW.into())?;
        Ok(ids.into_iter().map(WindowId).collect())
    }

    fn title(&self, window: WindowId) -> Result<Option<String>> {
        if let Some(raw) = self.string_property(window.0, self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)? {
            return Ok(Some(String::from_utf8_lossy(&raw).into_owned()));
        }

        // WM_NAME в кодировке STRING записан в Latin-1
        let reply = self.property_reply(
            window.0,
            AtomEnum::WM_NAME.into(),
            AtomEnum::ANY.into(),
            0,
            MAX_STRING_PROPERTY_LEN,
        )?;
        if reply.value.is_empty() {
            return Ok(None);
        }
        if reply.type_ == u32::from(AtomEnum::STRING) {
            Ok(Some(reply.value.iter().map(|&b| b as char).collect()))
        } else {
            Ok(Some(String::from_utf8_lossy(&reply.value).into_owned()))
        }
    }

    fn state(&self, window: WindowId) -> Result<NetState> {
        let atoms = &self.atoms;
        let mut state = NetState::empty();
        for atom in self
            .property32(window.0, atoms._NET_WM_STATE, AtomEnum::ATOM.into(), MAX_LIST_PROPERTY_LEN)?
            .unwrap_or_default()
        {
            match atom {
                a if a == atoms._NET_WM_STATE_HIDDEN => state |= NetState::HIDDEN,
                a if a == atoms._NET_WM_STATE_SKIP_TASKBAR => state |= NetState::SKIP_TASKBAR,
                a if a == atoms._NET_WM_STATE_SKIP_PAGER => state |= NetState::SKIP_PAGER,
                a if a == atoms._NET_WM_STATE_SHADED => state |= NetState::SHADED,
                a if a == atoms._NET_WM_STATE_DEMANDS_ATTENTION => state |= NetState::DEMANDS_ATTENTION,
                _ => {}
            }
        }
        Ok(state)
    }

    fn window_type(&self, window: WindowId) -> Result<WindowTypes> {
        let atoms = &self.atoms;
        let mut types = WindowTypes::empty();
        for atom in self
            .property32(window.0, atoms._NET_WM_WINDOW_TYPE, AtomEnum::ATOM.into(), MAX_LIST_PROPERTY_LEN)?
            .unwrap_or_default()
        {
            match atom {
                a if a == atoms._NET_WM_WINDOW_TYPE_DESKTOP => types |= WindowTypes::DESKTOP,
                a if a == atoms._NET_WM_WINDOW_TYPE_DOCK => types |= WindowTypes::DOCK,
                a if a == atoms._NET_WM_WINDOW_TYPE_TOOLBAR => types |= WindowTypes::TOOLBAR,
                a if a == atoms._NET_WM_WINDOW_TYPE_MENU => types |= WindowTypes::MENU,
                a if a == atoms._NET_WM_WINDOW_TYPE_UTILITY => types |= WindowTypes::UTILITY,
                a if a == atoms._NET_WM_WINDOW_TYPE_SPLASH => types |= WindowTypes::SPLASH,
                a if a == atoms._NET_WM_WINDOW_TYPE_DIALOG => types |= WindowTypes::DIALOG,
                a if a == atoms._NET_WM_WINDOW_TYPE_NORMAL => types |= WindowTypes::NORMAL,
                _ => {}
            }
        }
        if types.is_empty() {
            Ok(WindowTypes::NORMAL)
        } else {
            Ok(types)
        }
    }

    fn desktop(&self, window: WindowId) -> Result<Option<u32>> {
        self.cardinal(window.0, self.atoms._NET_WM_DESKTOP)
    }

    fn icon_property(&self, window: WindowId) -> Result<Option<Vec<u32>>> {
        self.property32(window.0, self.atoms._NET_WM_ICON, AtomEnum::CARDINAL.into(), MAX_ICON_PROPERTY_LEN)
    }

    fn wm_hints(&self, window: WindowId) -> Result<Option<WmHints>> {
        let words = self.property32(window.0, AtomEnum::WM_HINTS.into(), AtomEnum::WM_HINTS.into(), 9)?;
        Ok(words.and_then(|words| WmHints::from_raw(&words)))
    }

    fn read_drawable(&self, drawable: u32) -> Option<RawImage> {
        let geometry = self.conn.get_geometry(drawable).ok()?.reply().ok()?;
        let image = self
            .conn
            .get_image(ImageFormat::Z_PIXMAP, drawable, 0, 0, geometry.width, geometry.height, !0)
            .ok()?
            .reply()
            .ok()?;

        let setup = self.conn.setup();
        let format = setup
            .pixmap_formats
            .iter()
            .find(|format| format.depth == geometry.depth)?;

        decode_z_image(
            &image.data,
            ZImageLayout {
                width: u32::from(geometry.width),
                height: u32::from(geometry.height),
                depth: geometry.depth,
                bits_per_pixel: format.bits_per_pixel,
                scanline_pad: format.scanline_pad,
                lsb_bytes: setup.image_byte_order == ImageOrder::LSB_FIRST,
                lsb_bits: setup.bitmap_format_bit_order == ImageOrder::LSB_FIRST,
            },
        )
    }

    fn desktop_count(&self) -> u32 {
        self.cardinal(self.root, self.atoms._NET_NUMBER_OF_DESKTOPS)
            .ok()
            .flatten()
            .unwrap_or(1)
            .max(1)
    }

    fn current_desktop(&self) -> u32 {
        self.cardinal(self.root, self.atoms._NET_CURRENT_DESKTOP)
            .ok()
            .flatten()
            .unwrap_or(0)
    }

    fn desktop_names(&self) -> Vec<String> {
        let names = self.string_property(self.root, self.atoms._NET_DESKTOP_NAMES, self.atoms.UTF8_STRING);
        let Ok(Some(raw)) = names else {
            return Vec::new();
        };
        let mut names: Vec<String> = raw
            .split(|&b| b == 0)
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect();
        if raw.last() == Some(&0) {
            names.pop();
        }
        names
    }

    fn active_window(&self) -> Option<WindowId> {
        self.property32(self.root, self.atoms._NET_ACTIVE_WINDOW, AtomEnum::WINDOW.into(), 1)
            .ok()
            .flatten()?
            .first()
            .copied()
            .filter(|&id| id != 0)
            .map(WindowId)
    }

    fn subscribe(&self, window: WindowId) -> Result<Subscription> {
        self.conn
            .change_window_attributes(
                window.0,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
            )?
            .check()
            .map_err(|e| gone_or(window.0, e))?;

        let conn = Arc::clone(&self.conn);
        Ok(Subscription::new(window, move |window| {
            if let Err(e) = conn.change_window_attributes(
                window.0,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::NO_EVENT),
            ) {
                debug!("Не удалось снять подписку с окна {}: {}", window, e);
            }
            let _ = conn.flush();
        }))
    }

    fn send(&self, request: Request) -> Result<()> {
        let atoms = &self.atoms;
        match request {
            Request::Activate(window) => {
                self.client_message(window.0, atoms._NET_ACTIVE_WINDOW, [SOURCE_PAGER, CURRENT_TIME, 0, 0, 0])
            }
            Request::RaiseLegacy(window) => {
                self.conn.map_window(window.0)?;
                self.conn.configure_window(
                    window.0,
                    &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
                )?;
                self.conn.set_input_focus(InputFocus::PARENT, window.0, CURRENT_TIME)?;
                self.conn.flush()?;
                Ok(())
            }
            Request::Iconify(window) => {
                self.client_message(window.0, atoms.WM_CHANGE_STATE, [ICONIC_STATE, 0, 0, 0, 0])
            }
            Request::SwitchDesktop(desktop) => {
                self.client_message(self.root, atoms._NET_CURRENT_DESKTOP, [desktop, CURRENT_TIME, 0, 0, 0])
            }
            Request::ToggleState(window, toggle) => {
                let state = match toggle {
                    StateToggle::Shaded => atoms._NET_WM_STATE_SHADED,
                };
                self.client_message(
                    window.0,
                    atoms._NET_WM_STATE,
                    [NET_WM_STATE_TOGGLE, state, 0, SOURCE_PAGER, 0],
                )
            }
            Request::Close(window) => {
                self.client_message(window.0, atoms._NET_CLOSE_WINDOW, [CURRENT_TIME, SOURCE_PAGER, 0, 0, 0])
            }
            Request::MoveToDesktop(window, desktop) => self.client_message(
                window.0,
                atoms._NET_WM_DESKTOP,
                [desktop.to_raw(), SOURCE_PAGER, 0, 0, 0],
            ),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ActiveWindow => self.supported.contains(&self.atoms._NET_ACTIVE_WINDOW),
        }
    }
}

/// Читать свойство кусками по `chunk` слов, пока сервер сообщает остаток.
/// `fetch` получает смещение в словах и возвращает кусок и `bytes_after`.
fn read_chunked(chunk: u32, mut fetch: impl FnMut(u32) -> Result<(Vec<u32>, u32)>) -> Result<Vec<u32>> {
    let mut values = Vec::new();
    loop {
        let offset = u32::try_from(values.len())
            .map_err(|_| wintask_error!(internal, "свойство длиннее {} слов", u32::MAX))?;
        let (part, bytes_after) = fetch(offset)?;
        let received = part.len();
        values.extend(part);
        if bytes_after == 0 || received == 0 {
            return Ok(values);
        }
        debug_if_enabled!("Свойство длиннее {} слов, читаем дальше (кусок {})", values.len(), chunk);
    }
}

/// BadWindow означает, что окно исчезло; остальные ошибки передаются как есть
fn gone_or(window: Window, error: ReplyError) -> WintaskError {
    match error {
        ReplyError::X11Error(e) if e.error_kind == ErrorKind::Window => WintaskError::WindowGone(WindowId(window)),
        other => other.into(),
    }
}

/// Поток чтения: только переводит события X11 в уведомления и отправляет в цикл.
/// Завершается, когда цикл событий закрыл свой конец канала.
fn forward_events(conn: Arc<RustConnection>, root: Window, atoms: Atoms, tx: UnboundedSender<LoopEvent>) {
    loop {
        if tx.is_closed() {
            debug!("Цикл событий закрыт, поток чтения X11 завершается");
            return;
        }

        let event = match conn.poll_for_event() {
            Ok(Some(event)) => event,
            Ok(None) => {
                std::thread::sleep(EVENT_POLL_INTERVAL);
                continue;
            }
            Err(e) => {
                error!("Соединение с X-сервером потеряно: {}", e);
                let _ = tx.send(LoopEvent::Shutdown);
                return;
            }
        };

        match event {
            Event::PropertyNotify(notify) => {
                if let Some(notification) = translate_property(&atoms, root, &notify) {
                    if tx.send(notification.into()).is_err() {
                        return;
                    }
                }
            }
            Event::Error(e) => {
                // Обычно BadWindow: окно исчезло между запросами
                debug!("Асинхронная ошибка X11: {:?}", e.error_kind);
            }
            _ => {}
        }
    }
}

fn translate_property(atoms: &Atoms, root: Window, event: &PropertyNotifyEvent) -> Option<Notification> {
    let atom = event.atom;
    if event.window == root {
        return match atom {
            a if a == atoms._NET_CLIENT_LIST => Some(Notification::ClientListChanged),
            a if a == atoms._NET_CURRENT_DESKTOP => Some(Notification::CurrentDesktopChanged),
            a if a == atoms._NET_NUMBER_OF_DESKTOPS => Some(Notification::DesktopCountChanged),
            a if a == atoms._NET_DESKTOP_NAMES => Some(Notification::DesktopNamesChanged),
            a if a == atoms._NET_ACTIVE_WINDOW => Some(Notification::ActiveWindowChanged),
            _ => None,
        };
    }

    let property = match atom {
        a if a == atoms._NET_WM_DESKTOP => WindowProperty::Desktop,
        a if a == atoms._NET_WM_NAME || a == u32::from(AtomEnum::WM_NAME) => WindowProperty::Title,
        a if a == u32::from(AtomEnum::WM_HINTS) => WindowProperty::Hints,
        a if a == atoms._NET_WM_STATE => WindowProperty::State,
        a if a == atoms._NET_WM_ICON => WindowProperty::Icon,
        a if a == atoms._NET_WM_WINDOW_TYPE => WindowProperty::WindowType,
        _ => return None,
    };
    Some(Notification::Property {
        window: WindowId(event.window),
        property,
    })
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ZImageLayout {
    pub width: u32,
    pub height: u32,
    pub depth: u8,
    pub bits_per_pixel: u8,
    pub scanline_pad: u8,
    pub lsb_bytes: bool,
    pub lsb_bits: bool,
}

/// Разбор ответа GetImage в формате ZPixmap
pub(crate) fn decode_z_image(data: &[u8], layout: ZImageLayout) -> Option<RawImage> {
    let ZImageLayout { width, height, depth, bits_per_pixel, scanline_pad, lsb_bytes, lsb_bits } = layout;
    if width == 0 || height == 0 || scanline_pad == 0 {
        return None;
    }

    let pad = scanline_pad as usize;
    let row_bits = width as usize * bits_per_pixel as usize;
    let stride = row_bits.div_ceil(pad) * pad / 8;
    if data.len() < stride * height as usize {
        warn!(
            "Слишком короткий ответ GetImage: {} байт при ожидаемых {}",
            data.len(),
            stride * height as usize
        );
        return None;
    }

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as usize {
        let row = &data[y * stride..(y + 1) * stride];
        for x in 0..width as usize {
            let value = match bits_per_pixel {
                1 => {
                    let byte = row[x / 8];
                    let bit = if lsb_bits { x % 8 } else { 7 - x % 8 };
                    u32::from((byte >> bit) & 1)
                }
                16 => {
                    let b = [row[x * 2], row[x * 2 + 1]];
                    let v = if lsb_bytes { u16::from_le_bytes(b) } else { u16::from_be_bytes(b) };
                    let r = u32::from((v >> 11) & 0x1f) * 255 / 31;
                    let g = u32::from((v >> 5) & 0x3f) * 255 / 63;
                    let bl = u32::from(v & 0x1f) * 255 / 31;
                    (r << 16) | (g << 8) | bl
                }
                24 => {
                    let p = &row[x * 3..x * 3 + 3];
                    if lsb_bytes {
                        u32::from(p[0]) | u32::from(p[1]) << 8 | u32::from(p[2]) << 16
                    } else {
                        u32::from(p[2]) | u32::from(p[1]) << 8 | u32::from(p[0]) << 16
                    }
                }
                32 => {
                    let b = [row[x * 4], row[x * 4 + 1], row[x * 4 + 2], row[x * 4 + 3]];
                    let v = if lsb_bytes { u32::from_le_bytes(b) } else { u32::from_be_bytes(b) };
                    v & 0x00FF_FFFF
                }
                other => {
                    debug!("Неподдерживаемый формат пикселя: {} бит", other);
                    return None;
                }
            };
            pixels.push(value);
        }
    }

    Some(RawImage { width, height, depth, pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(width: u32, height: u32, depth: u8, bpp: u8, pad: u8) -> ZImageLayout {
        ZImageLayout {
            width,
            height,
            depth,
            bits_per_pixel: bpp,
            scanline_pad: pad,
            lsb_bytes: true,
            lsb_bits: true,
        }
    }

    #[test]
    fn test_decode_32bpp_lsb() {
        // BGRX, BGRX
        let data = [0x33, 0x22, 0x11, 0xFF, 0x00, 0x00, 0xFF, 0x00];
        let image = decode_z_image(&data, layout(2, 1, 24, 32, 32)).unwrap();
        assert_eq!(image.pixels, vec![0x112233, 0xFF0000]);
        assert_eq!(image.depth, 24);
    }

    #[test]
    fn test_decode_1bpp_with_scanline_padding() {
        // 3x2, каждая строка дополнена до 32 бит
        let data = [0b101, 0, 0, 0, 0b010, 0, 0, 0];
        let image = decode_z_image(&data, layout(3, 2, 1, 1, 32)).unwrap();
        assert_eq!(image.pixels, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_decode_1bpp_msb_first() {
        let data = [0b1000_0000, 0, 0, 0];
        let mut l = layout(2, 1, 1, 1, 32);
        l.lsb_bits = false;
        let image = decode_z_image(&data, l).unwrap();
        assert_eq!(image.pixels, vec![1, 0]);
    }

    #[test]
    fn test_decode_rejects_short_data() {
        let data = [0u8; 4];
        assert!(decode_z_image(&data, layout(2, 1, 24, 32, 32)).is_none());
    }

    #[test]
    fn test_read_chunked_follows_bytes_after() {
        let all: Vec<u32> = (0..2500).collect();
        let mut offsets = Vec::new();
        let values = read_chunked(1024, |offset| {
            offsets.push(offset);
            let start = offset as usize;
            let end = (start + 1024).min(all.len());
            let bytes_after = ((all.len() - end) * 4) as u32;
            Ok((all[start..end].to_vec(), bytes_after))
        })
        .unwrap();

        assert_eq!(values, all);
        assert_eq!(offsets, vec![0, 1024, 2048]);
    }

    #[test]
    fn test_read_chunked_stops_on_empty_part() {
        let values = read_chunked(1024, |_| Ok((Vec::new(), 16))).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_decode_16bpp() {
        let data = 0xF800u16.to_le_bytes();
        let image = decode_z_image(&data, layout(1, 1, 16, 16, 16)).unwrap();
        assert_eq!(image.pixels, vec![0xFF0000]);
    }
}
