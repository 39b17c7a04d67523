//! Terminal logger for the binaries
//!
//! The library itself only talks to the `log` facade; executables call
//! [`logger_init`] once at start-up.

use colored::{ColoredString, Colorize};
use log::info;
use thiserror::Error;

pub use log::LevelFilter;

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("An error occured while setting up the logger: {0}")]
    FernInit(#[from] log::SetLoggerError),
}

/// Initialise the logger for this execution.
///
/// Records at or below `min_level` are written to stdout. Debug and trace
/// records also carry their target module.
///
/// # Notes
///
/// - Only the first call succeeds, later calls return
///   [`LoggerInitError::FernInit`].
pub fn logger_init(min_level: LevelFilter) -> Result<(), LoggerInitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() > log::Level::Info {
                out.finish(format_args!(
                    "[{}] {}: {}",
                    level_to_str(record.level()),
                    record.target(),
                    message
                ))
            } else {
                out.finish(format_args!("[{}] {}", level_to_str(record.level()), message))
            }
        })
        .level(min_level)
        .chain(std::io::stdout())
        .apply()?;

    info!("Logging initialised");
    info!("    Log level: {:?}", min_level);

    Ok(())
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_strings() {
        assert!(level_to_str(log::Level::Warn).to_string().contains("WRN"));
        assert!(level_to_str(log::Level::Error).to_string().contains("ERR"));
    }

    #[test]
    fn test_second_init_fails() {
        // Other tests may have installed a logger already, so only the
        // second call of this test is guaranteed to fail.
        let _ = logger_init(LevelFilter::Warn);
        assert!(matches!(
            logger_init(LevelFilter::Warn),
            Err(LoggerInitError::FernInit(_))
        ));
    }
}
