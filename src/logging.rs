use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// Our own events at info, the GPU stack only when it has something to warn about.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // Browser console via tracing-wasm
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::ffi::OsStr;
        use std::path::{Path, PathBuf};
        use once_cell::sync::OnceCell;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        const DEFAULT_LOG_FILE: &str = "logs/app.log";

        /// `RUST_LOG_FILE` when set and non-empty, `logs/app.log` otherwise.
        fn log_file_path(from_env: Option<String>) -> PathBuf {
            from_env
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
        }

        fn split_log_path(path: &Path) -> (&Path, &OsStr) {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            (dir, path.file_name().unwrap_or(OsStr::new("app.log")))
        }

        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            // Daily-rolling file log
            let log_path = log_file_path(std::env::var("RUST_LOG_FILE").ok());
            let (dir, file) = split_log_path(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init();

            std::panic::set_hook(Box::new(|info| {
                let location = info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                    .unwrap_or_default();
                let payload = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic>".to_string());
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!(location = %location, "panic: {payload}\nBacktrace:\n{bt:?}");
            }));
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_file() {
        let path = log_file_path(None);
        assert_eq!(path, Path::new("logs/app.log"));
        let (dir, file) = split_log_path(&path);
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(file, OsStr::new("app.log"));
    }

    #[test]
    fn test_log_file_from_env() {
        assert_eq!(log_file_path(Some("/tmp/drive.log".into())), Path::new("/tmp/drive.log"));
        assert_eq!(log_file_path(Some("  ".into())), Path::new("logs/app.log"));

        let bare = log_file_path(Some("drive.log".into()));
        assert_eq!(split_log_path(&bare), (Path::new("."), OsStr::new("drive.log")));
    }
}
