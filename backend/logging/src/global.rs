//! Process-wide default logger.
//!
//! The default lives in an [`ArcSwapOption`]: readers take an `Arc` snapshot, so
//! a call racing [`init_logger`] sees either the old or the new logger and the
//! old one stays alive until that call returns. Until something logs or
//! installs a logger, the slot is empty and [`sync`] has nothing to do.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{info, warn};

use crate::config::{LogOption, LoggerConfig};
use crate::error::LoggerError;
use crate::level::Level;
use crate::logger::Logger;
use crate::rotate::LogWriter;

static DEFAULT: ArcSwapOption<Logger> = ArcSwapOption::const_empty();

/// Build a logger from `options` and make it the default. Returns the handle so
/// callers can also pass it around explicitly.
pub fn init_logger<I>(options: I) -> Arc<Logger>
where
    I: IntoIterator<Item = LogOption>,
{
    let logger = Arc::new(Logger::from_options(options));
    set_logger(Arc::clone(&logger));
    logger
}

/// Replace the default logger. The previous one is flushed.
pub fn set_logger(logger: Arc<Logger>) {
    info!(
        path = %logger.config().file_path.display(),
        level = %logger.min_level(),
        "Installed default logger"
    );
    if let Some(previous) = DEFAULT.swap(Some(logger)) {
        if let Err(e) = previous.sync() {
            warn!(error = %e, "Failed to flush replaced logger");
        }
    }
}

/// The default logger, built from [`LoggerConfig::default`] on first use.
pub fn logger() -> Arc<Logger> {
    if let Some(current) = DEFAULT.load_full() {
        return current;
    }
    let fresh = Arc::new(Logger::new(LoggerConfig::default()));
    let previous = DEFAULT.compare_and_swap(&None::<Arc<Logger>>, Some(Arc::clone(&fresh)));
    match &*previous {
        Some(existing) => Arc::clone(existing),
        None => fresh,
    }
}

/// Whether a default logger has been built or installed.
pub fn is_initialized() -> bool {
    DEFAULT.load().is_some()
}

/// Flush the default logger. A no-op if none was ever built.
pub fn sync() -> Result<(), LoggerError> {
    match DEFAULT.load_full() {
        Some(logger) => logger.sync(),
        None => Ok(()),
    }
}

/// The default logger's raw sink.
pub fn writer() -> LogWriter {
    logger().writer()
}

#[doc(hidden)]
#[track_caller]
pub fn log_values(level: Level, values: &[&dyn fmt::Display]) {
    logger().log_values(level, values)
}

#[doc(hidden)]
#[track_caller]
pub fn log_fmt(level: Level, args: fmt::Arguments<'_>) {
    logger().log(level, args)
}

#[doc(hidden)]
#[track_caller]
pub fn unwind_values(level: Level, values: &[&dyn fmt::Display]) -> ! {
    let logger = logger();
    match level {
        Level::DPanic => logger.dpanic(values),
        _ => logger.panic(values),
    }
}

#[doc(hidden)]
#[track_caller]
pub fn unwind_fmt(level: Level, args: fmt::Arguments<'_>) -> ! {
    let logger = logger();
    match level {
        Level::DPanic => logger.dpanicf(args),
        _ => logger.panicf(args),
    }
}

#[doc(hidden)]
#[track_caller]
pub fn fatal_values(values: &[&dyn fmt::Display]) -> ! {
    logger().fatal(values)
}

#[doc(hidden)]
#[track_caller]
pub fn fatal_fmt(args: fmt::Arguments<'_>) -> ! {
    logger().fatalf(args)
}
