use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

/// Log targets used by the simulation. Debug output can be narrowed to a
/// subset of these with a comma-separated filter.
pub const TOPICS: [&str; 6] = ["level", "vision", "ai", "combat", "resource", "sim"];

// Custom logger structure
#[derive(Debug)]
struct DeckLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl log::Log for DeckLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Filters only narrow debug/trace; info and above always pass
        if let Some(filters) = &self.debug_filters {
            if metadata.level() >= log::Level::Debug {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let message = record.args().to_string();
        let (context, body) = split_context(&message);
        let context = if context.is_empty() {
            String::new()
        } else {
            format!("{} ", context)
        };

        let output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {body}",
            timestamp = timestamp,
            level_color = level_color,
            level = record.level(),
            reset = reset,
            context = context,
            target = record.target(),
            body = body
        );

        // Logging must never take the simulation down with it
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Splits a leading run of `[A##]`/`[T####]` context tags off a message so
/// they can be printed ahead of the target.
fn split_context(message: &str) -> (&str, &str) {
    let mut end = 0;
    let bytes = message.as_bytes();
    while end < bytes.len() && bytes[end] == b'[' {
        let Some(close) = message[end..].find(']') else {
            break;
        };
        let tag = &message[end + 1..end + close];
        let is_context = tag.len() > 1
            && matches!(tag.as_bytes()[0], b'A' | b'T')
            && tag[1..].bytes().all(|b| b.is_ascii_digit());
        if !is_context {
            break;
        }
        end += close + 1;
    }
    (&message[..end], message[end..].trim_start())
}

static LOGGER: OnceLock<DeckLogger> = OnceLock::new();

/// Installs the crate logger. `debug_filter` is a comma-separated list of
/// topics that keep their debug/trace output; `None` keeps all topics.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| DeckLogger {
        level,
        debug_filters,
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Topic macros. The `id, tick;` prefix form tags the line with agent and
// tick context; without it the arguments go straight to `format_args!`.

#[macro_export]
macro_rules! debug_level {
    ($($arg:tt)*) => {
        log::debug!(target: "level", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_vision {
    ($agent:expr, $tick:expr; $($arg:tt)*) => {
        log::debug!(target: "vision", "[A{:02}][T{:04}] {}", $agent, $tick, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "vision", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_ai {
    ($agent:expr, $tick:expr; $($arg:tt)*) => {
        log::debug!(target: "ai", "[A{:02}][T{:04}] {}", $agent, $tick, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "ai", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_combat {
    ($agent:expr, $tick:expr; $($arg:tt)*) => {
        log::debug!(target: "combat", "[A{:02}][T{:04}] {}", $agent, $tick, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "combat", "{}", format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_resource {
    ($agent:expr, $tick:expr; $($arg:tt)*) => {
        log::debug!(target: "resource", "[A{:02}][T{:04}] {}", $agent, $tick, format_args!($($arg)*))
    };
    ($($arg:tt)*) => {
        log::debug!(target: "resource", "{}", format_args!($($arg)*))
    };
}
