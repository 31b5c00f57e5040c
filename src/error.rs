use thiserror::Error;

use crate::events::WindowId;

#[derive(Error, Debug)]
pub enum WintaskError {
    #[error("Не удалось подключиться к X-серверу: {0}")]
    X11Connect(#[from] x11rb::errors::ConnectError),

    #[error("Ошибка соединения X11: {0}")]
    X11Connection(#[from] x11rb::errors::ConnectionError),

    #[error("Ошибка ответа X11: {0}")]
    X11Reply(#[from] x11rb::errors::ReplyError),

    #[error("Окно {0} исчезло")]
    WindowGone(WindowId),

    #[error("Сервис недоступен: {0}")]
    ServiceUnavailable(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl WintaskError {
    pub fn window_gone<T>(window: WindowId) -> Result<T> {
        Err(WintaskError::WindowGone(window))
    }
}

pub type Result<T> = std::result::Result<T, WintaskError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! wintask_error {
    (service_unavailable, $($arg:tt)*) => {
        $crate::error::WintaskError::ServiceUnavailable(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::WintaskError::Internal(format!($($arg)*))
    };
}
