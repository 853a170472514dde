//! Leveled logger bound to a rotating JSON-lines file.
//!
//! A [`Logger`] owns its sink and a private `tracing` dispatch; it never touches
//! the process-wide `tracing` subscriber, so any number of loggers can coexist
//! and one can replace another at runtime.

use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::{LogOption, LoggerConfig};
use crate::encoder::{JsonRecordFormat, short_caller};
use crate::error::LoggerError;
use crate::level::Level;
use crate::rotate::{LogWriter, RotatingFile, RotationPolicy};

const TARGET: &str = "rollog";

/// Emit one event on the current dispatch. `tracing` needs the level as a constant.
macro_rules! record {
    ($lvl:expr, $severity:expr, $logger:expr, $caller:expr, $stack:expr, $msg:expr) => {
        tracing::event!(
            target: TARGET,
            $lvl,
            severity = $severity,
            logger = $logger,
            caller = $caller,
            stacktrace = $stack,
            "{}",
            $msg
        )
    };
}

#[derive(Debug)]
struct Inner {
    config: LoggerConfig,
    min_level: Level,
    sink: LogWriter,
    dispatch: Dispatch,
}

/// Cheap to clone; clones share the sink.
#[derive(Debug, Clone)]
pub struct Logger {
    inner: Arc<Inner>,
    name: Option<Arc<str>>,
}

impl Logger {
    /// Build a logger. The log file is not opened until the first record.
    pub fn new(config: LoggerConfig) -> Self {
        let min_level = config.min_level();
        let sink = LogWriter::new(RotatingFile::new(
            config.file_path.clone(),
            RotationPolicy::from_config(&config),
        ));

        let layer = tracing_subscriber::fmt::layer()
            .event_format(JsonRecordFormat)
            .with_writer(sink.clone())
            .with_ansi(false)
            .log_internal_errors(true);
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::from_level(min_level.as_tracing()))
            .with(layer);

        let name = config.name.as_deref().map(Arc::from);
        Self {
            inner: Arc::new(Inner {
                config,
                min_level,
                sink,
                dispatch: Dispatch::new(subscriber),
            }),
            name,
        }
    }

    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = LogOption>,
    {
        Logger::new(LoggerConfig::resolve(options))
    }

    /// Same sink and level, different `N` value.
    pub fn named(&self, name: impl Into<String>) -> Logger {
        Logger {
            inner: Arc::clone(&self.inner),
            name: Some(Arc::from(name.into())),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    pub fn min_level(&self) -> Level {
        self.inner.min_level
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level.is_severe() || level >= self.inner.min_level
    }

    /// The raw sink, for subsystems that write to the same rotating file.
    pub fn writer(&self) -> LogWriter {
        self.inner.sink.clone()
    }

    /// Flush written records to disk.
    pub fn sync(&self) -> Result<(), LoggerError> {
        self.inner
            .sink
            .file()
            .sync()
            .map_err(|e| LoggerError::io(&self.inner.config.file_path, e))
    }

    /// Log a formatted message. Severe levels unwind or exit afterwards.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.dispatch(level, || args.to_string(), Location::caller());
    }

    /// Log the values' `Display` forms joined by single spaces.
    #[track_caller]
    pub fn log_values(&self, level: Level, values: &[&dyn fmt::Display]) {
        self.dispatch(level, || join_values(values), Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, values: &[&dyn fmt::Display]) {
        self.log_values(Level::Debug, values)
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    #[track_caller]
    pub fn info(&self, values: &[&dyn fmt::Display]) {
        self.log_values(Level::Info, values)
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    #[track_caller]
    pub fn warn(&self, values: &[&dyn fmt::Display]) {
        self.log_values(Level::Warn, values)
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    #[track_caller]
    pub fn error(&self, values: &[&dyn fmt::Display]) {
        self.log_values(Level::Error, values)
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }

    #[track_caller]
    pub fn dpanic(&self, values: &[&dyn fmt::Display]) -> ! {
        self.unwind(Level::DPanic, join_values(values), Location::caller())
    }

    #[track_caller]
    pub fn dpanicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.unwind(Level::DPanic, args.to_string(), Location::caller())
    }

    #[track_caller]
    pub fn panic(&self, values: &[&dyn fmt::Display]) -> ! {
        self.unwind(Level::Panic, join_values(values), Location::caller())
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.unwind(Level::Panic, args.to_string(), Location::caller())
    }

    #[track_caller]
    pub fn fatal(&self, values: &[&dyn fmt::Display]) -> ! {
        self.exit(join_values(values), Location::caller())
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.exit(args.to_string(), Location::caller())
    }

    fn dispatch(
        &self,
        level: Level,
        message: impl FnOnce() -> String,
        caller: &'static Location<'static>,
    ) {
        match level {
            Level::DPanic | Level::Panic => self.unwind(level, message(), caller),
            Level::Fatal => self.exit(message(), caller),
            _ if self.enabled(level) => self.emit(level, &message(), caller),
            _ => {}
        }
    }

    fn unwind(&self, level: Level, message: String, caller: &'static Location<'static>) -> ! {
        self.emit(level, &message, caller);
        std::panic::panic_any(message)
    }

    fn exit(&self, message: String, caller: &'static Location<'static>) -> ! {
        self.emit(Level::Fatal, &message, caller);
        if let Err(e) = self.sync() {
            eprintln!("rollog: {e}");
        }
        std::process::exit(1)
    }

    fn emit(&self, level: Level, message: &str, caller: &Location<'_>) {
        let caller = short_caller(caller.file(), caller.line());
        let stacktrace = level
            .is_severe()
            .then(|| Backtrace::force_capture().to_string());
        let severity = level.as_str();
        let logger = self.name.as_deref();
        let stack = stacktrace.as_deref();

        tracing::dispatcher::with_default(&self.inner.dispatch, || match level {
            Level::Debug => record!(tracing::Level::DEBUG, severity, logger, caller.as_str(), stack, message),
            Level::Info => record!(tracing::Level::INFO, severity, logger, caller.as_str(), stack, message),
            Level::Warn => record!(tracing::Level::WARN, severity, logger, caller.as_str(), stack, message),
            _ => record!(tracing::Level::ERROR, severity, logger, caller.as_str(), stack, message),
        });
    }
}

/// `Display` forms joined by single spaces.
pub fn join_values(values: &[&dyn fmt::Display]) -> String {
    let mut joined = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            joined.push(' ');
        }
        joined.push_str(&value.to_string());
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{with_file_path, with_level, with_max_age, with_name};
    use crate::encoder::{CALLER_KEY, LEVEL_KEY, MESSAGE_KEY, NAME_KEY, STACKTRACE_KEY, TIME_KEY};
    use crate::rotate::log_files;
    use serde_json::Value;
    use std::any::Any;
    use std::io::Write;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::path::{Path, PathBuf};

    fn expect_unwind(f: impl FnOnce()) -> Box<dyn Any + Send> {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => std::panic!("expected the call to unwind"),
            Err(payload) => payload,
        }
    }

    fn logger_at(dir: &Path, level: &str) -> (Logger, PathBuf) {
        let path = dir.join("app.log");
        let logger = Logger::from_options([with_file_path(&path), with_level(level)]);
        (logger, path)
    }

    fn records(path: &Path) -> Vec<Value> {
        let mut recs = Vec::new();
        for file in log_files(path).unwrap_or_default() {
            let raw = std::fs::read_to_string(file).unwrap();
            recs.extend(raw.lines().map(|line| serde_json::from_str::<Value>(line).unwrap()));
        }
        recs
    }

    fn nothing_written(path: &Path) -> bool {
        log_files(path).unwrap().is_empty()
    }

    #[test]
    fn writes_one_json_record_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "debug");
        logger.infof(format_args!("user {} logged in", 42));
        logger.debug(&[&"cache", &"warm"]);

        let recs = records(&path);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0][LEVEL_KEY], "INFO");
        assert_eq!(recs[0][MESSAGE_KEY], "user 42 logged in");
        assert_eq!(recs[1][LEVEL_KEY], "DEBUG");
        assert_eq!(recs[1][MESSAGE_KEY], "cache warm");
    }

    #[test]
    fn record_carries_time_and_caller() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "info");
        let line = line!() + 1;
        logger.info(&[&"hi"]);

        let rec = &records(&path)[0];
        let time = rec[TIME_KEY].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.3f%z").is_ok());
        assert_eq!(rec[CALLER_KEY], format!("src/logger.rs:{line}"));
        assert!(rec.get(NAME_KEY).is_none());
        assert!(rec.get(STACKTRACE_KEY).is_none());
    }

    #[test]
    fn below_minimum_never_reaches_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "warn");
        logger.debug(&[&"d"]);
        logger.infof(format_args!("i"));
        assert!(nothing_written(&path));

        logger.error(&[&"e"]);
        let recs = records(&path);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0][LEVEL_KEY], "ERROR");
    }

    #[test]
    fn unknown_level_gates_at_info() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "chatty");
        assert_eq!(logger.min_level(), Level::Info);
        logger.debug(&[&"dropped"]);
        logger.info(&[&"kept"]);
        let recs = records(&path);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0][MESSAGE_KEY], "kept");
    }

    #[test]
    fn values_are_space_joined() {
        assert_eq!(join_values(&[]), "");
        assert_eq!(join_values(&[&"a", &1, &2.5, &true]), "a 1 2.5 true");
    }

    #[test]
    fn panic_logs_with_stacktrace_then_unwinds() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "info");

        let payload = expect_unwind(|| logger.panicf(format_args!("boom {}", 7)));
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("boom 7"));

        let rec = &records(&path)[0];
        assert_eq!(rec[LEVEL_KEY], "PANIC");
        assert_eq!(rec[MESSAGE_KEY], "boom 7");
        assert!(!rec[STACKTRACE_KEY].as_str().unwrap().is_empty());
    }

    #[test]
    fn severe_levels_ignore_the_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "fatal");
        logger.error(&[&"dropped"]);

        expect_unwind(|| logger.dpanic(&[&"still", &"written"]));

        let recs = records(&path);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0][LEVEL_KEY], "DPANIC");
        assert_eq!(recs[0][MESSAGE_KEY], "still written");
    }

    #[test]
    fn generic_log_unwinds_for_panic_levels() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, _path) = logger_at(dir.path(), "debug");
        let payload = expect_unwind(|| logger.log(Level::Panic, format_args!("via log")));
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("via log"));
    }

    #[test]
    fn named_logger_shares_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let root = Logger::from_options([with_file_path(&path), with_name("root")]);
        let child = root.named("http");
        root.info(&[&"from root"]);
        child.info(&[&"from child"]);

        let recs = records(&path);
        assert_eq!(recs[0][NAME_KEY], "root");
        assert_eq!(recs[1][NAME_KEY], "http");
        assert_eq!(child.name(), Some("http"));
    }

    #[test]
    fn sync_is_safe_before_and_after_writes() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "info");
        logger.sync().unwrap();
        logger.sync().unwrap();
        assert!(nothing_written(&path));
        logger.info(&[&"x"]);
        logger.sync().unwrap();
        assert_eq!(records(&path).len(), 1);
    }

    #[test]
    fn writer_appends_to_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let (logger, path) = logger_at(dir.path(), "info");
        let mut raw = logger.writer();
        raw.write_all(b"{\"M\":\"raw\"}\n").unwrap();
        logger.info(&[&"structured"]);

        let recs = records(&path);
        assert_eq!(recs[0][MESSAGE_KEY], "raw");
        assert_eq!(recs[1][MESSAGE_KEY], "structured");
    }

    #[test]
    fn unwritable_path_does_not_fail_construction() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("app.log");
        let logger = Logger::from_options([with_file_path(&path)]);
        logger.info(&[&"lost"]);
        assert!(!path.exists());
        assert!(logger.sync().is_ok());
    }

    #[test]
    fn huge_max_age_never_panics_a_log_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let logger = Logger::from_options([with_file_path(&path), with_max_age(100_000_000)]);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            logger.info(&[&"x"]);
            logger.sync()
        }));
        assert!(matches!(outcome, Ok(Ok(()))));
        assert_eq!(records(&path).len(), 1);
    }

    #[test]
    fn loggers_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let a = Logger::from_options([with_file_path(dir.path().join("a.log")), with_level("error")]);
        let b = Logger::from_options([with_file_path(dir.path().join("b.log")), with_level("debug")]);
        a.info(&[&"dropped"]);
        b.info(&[&"kept"]);
        assert!(records(&dir.path().join("a.log")).is_empty());
        assert_eq!(records(&dir.path().join("b.log")).len(), 1);
    }
}
