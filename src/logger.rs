use std::sync::OnceLock;

static ORIGIN: OnceLock<&'static str> = OnceLock::new();

/// Sets the process tag (`UAV`, `GCS`) printed on every log line.
/// Only the first call has an effect.
pub fn set_origin(tag: &'static str) { let _ = ORIGIN.set(tag); }

/// Returns the process tag, or `"---"` if none was set yet (e.g. in unit tests).
pub fn origin() -> &'static str { ORIGIN.get().copied().unwrap_or("---") }

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

/// Link-state edges (lost, restored, latched).
#[macro_export]
macro_rules! link {
    ($($arg:tt)*) => {
        println!("\x1b[1;34m[LINK] [{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_UAV_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m [{}] {}", chrono::Utc::now().format("%H:%M:%S"), $crate::logger::origin(), format!($($arg)*))
        }
    };
}
