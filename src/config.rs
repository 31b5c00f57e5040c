use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub taskbar: TaskbarConfig,
    pub dry_run: DryRunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Правила отображения и поведения кнопок задач
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskbarConfig {
    pub show_iconified: bool,
    pub show_mapped: bool,
    pub show_all_desktops: bool,
    /// Учитывать _NET_WM_STATE_SKIP_PAGER как повод не показывать окно
    pub accept_skip_pager: bool,
    pub use_mouse_wheel: bool,
    pub use_urgency_hint: bool,
    pub icon_size: u32,
    pub flash_interval_ms: u64,
    pub drag_activate_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DryRunConfig {
    pub interval_ms: u64,
}

impl DryRunConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl TaskbarConfig {
    pub fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    pub fn drag_activate_delay(&self) -> Duration {
        Duration::from_millis(self.drag_activate_delay_ms)
    }
}

impl Default for TaskbarConfig {
    fn default() -> Self {
        Self {
            show_iconified: true,
            show_mapped: true,
            show_all_desktops: false,
            accept_skip_pager: true,
            use_mouse_wheel: true,
            use_urgency_hint: true,
            icon_size: 24,
            flash_interval_ms: 500,
            drag_activate_delay_ms: 500,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            taskbar: TaskbarConfig::default(),
            dry_run: DryRunConfig { interval_ms: 3000 },
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        // Файл может отсутствовать: тогда остаются значения по умолчанию
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("WINTASK_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        let taskbar = &self.taskbar;
        if !(8..=256).contains(&taskbar.icon_size) {
            anyhow::bail!(
                "icon_size должно быть в диапазоне 8..=256, получено {}",
                taskbar.icon_size
            );
        }

        if taskbar.flash_interval_ms < 50 {
            anyhow::bail!("flash_interval_ms должно быть минимум 50");
        }

        if taskbar.drag_activate_delay_ms < 50 {
            anyhow::bail!("drag_activate_delay_ms должно быть минимум 50");
        }

        if self.dry_run.interval_ms < 100 {
            anyhow::bail!("dry_run.interval_ms должно быть минимум 100");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_icon_size() {
        let mut config = Config::default();
        config.taskbar.icon_size = 4;
        assert!(config.validate().is_err());

        config.taskbar.icon_size = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "json".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_short_intervals() {
        let mut config = Config::default();
        config.taskbar.flash_interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.taskbar.drag_activate_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/wintask.toml").unwrap();
        assert_eq!(config.taskbar.icon_size, 24);
        assert!(config.taskbar.show_mapped);
        assert!(!config.taskbar.show_all_desktops);
    }

    #[test]
    fn test_durations() {
        let config = TaskbarConfig::default();
        assert_eq!(config.flash_interval(), Duration::from_millis(500));
        assert_eq!(config.drag_activate_delay(), Duration::from_millis(500));
    }
}
