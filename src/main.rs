use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use events::{LoopEvent, WindowId};
use services::create_taskbar;

#[derive(Parser, Debug)]
#[command(name = "wintask")]
#[command(about = "Движок панели задач: отслеживание окон через EWMH")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "wintask.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция оконного менеджера)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Окно хост-панели, например 0x1e00004
    #[arg(long, value_parser = parse_window_id)]
    panel_window: Option<WindowId>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск wintask v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - оконный менеджер эмулируется");
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let taskbar = create_taskbar(&config, tx.clone(), args.dry_run, args.panel_window)
        .context("Не удалось создать панель задач")?;

    // Ожидание сигнала завершения
    let shutdown = tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        }
        let _ = tx.send(LoopEvent::Shutdown);
    });

    let result = taskbar.run(rx).await;
    shutdown.abort();

    match &result {
        Ok(()) => info!("wintask завершил работу"),
        Err(e) => error!("Панель задач остановлена с ошибкой: {}", e),
    }
    result.map_err(Into::into)
}

fn parse_window_id(value: &str) -> Result<WindowId, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed
        .map(WindowId)
        .map_err(|e| format!("неверный идентификатор окна {:?}: {}", value, e))
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "full" {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_id() {
        assert_eq!(parse_window_id("0x1e00004"), Ok(WindowId(0x1e00004)));
        assert_eq!(parse_window_id("0X10"), Ok(WindowId(16)));
        assert_eq!(parse_window_id("42"), Ok(WindowId(42)));
        assert!(parse_window_id("0xzz").is_err());
        assert!(parse_window_id("panel").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["wintask", "--dry-run", "--panel-window", "0x20"]);
        assert!(args.dry_run);
        assert_eq!(args.panel_window, Some(WindowId(0x20)));
        assert_eq!(args.config, "wintask.toml");
        assert_eq!(args.log_level, None);
    }
}
