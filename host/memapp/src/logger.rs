//! stderr logger
//!
//! stdout belongs to the register output; diagnostics go to stderr as `[LEVEL][target] message`.

use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable holding the log level
pub const ENV: &str = "MEMAPP_LOG";

/// Log level used when `MEMAPP_LOG` is unset or unparsable
pub const DEFAULT: LevelFilter = LevelFilter::Warn;

/// Parses a level name (`off`, `error`, ..., `trace`), case insensitively
pub fn level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT)
}

struct Logger {
    level: LevelFilter,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                io::stderr(),
                "[{}][{}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Installs the logger; can only be done once per process
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger { level }))?;
    log::set_max_level(level);
    Ok(())
}
