//! Severity levels and name resolution.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Record severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    /// Logs, then unwinds.
    DPanic,
    /// Logs, then unwinds.
    Panic,
    /// Logs, flushes the sink, then exits the process.
    Fatal,
}

impl Level {
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::DPanic,
        Level::Panic,
        Level::Fatal,
    ];

    /// Resolve a lowercase level name. Never fails: unknown names are `Info`.
    pub fn from_name(name: &str) -> Level {
        match name {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" => Level::Warn,
            "error" => Level::Error,
            "dpanic" => Level::DPanic,
            "panic" => Level::Panic,
            "fatal" => Level::Fatal,
            _ => Level::Info,
        }
    }

    /// Capitalized name written into records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::DPanic => "DPANIC",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// Levels that always emit and carry a stack trace.
    pub fn is_severe(&self) -> bool {
        *self >= Level::DPanic
    }

    /// The closest `tracing` level. Everything from `Error` up shares `ERROR`.
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        }
    }
}

impl FromStr for Level {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Level::from_name(s))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_known_name() {
        let names = ["debug", "info", "warn", "error", "dpanic", "panic", "fatal"];
        for (name, level) in names.iter().zip(Level::ALL) {
            assert_eq!(Level::from_name(name), level);
        }
    }

    #[test]
    fn unknown_names_fall_back_to_info() {
        for name in ["", "trace", "verbose", "DEBUG", "Warn", " error", "fatal!"] {
            assert_eq!(Level::from_name(name), Level::Info, "name {name:?}");
        }
    }

    #[test]
    fn ordering_is_monotonic() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn severe_levels() {
        assert!(!Level::Error.is_severe());
        assert!(Level::DPanic.is_severe());
        assert!(Level::Panic.is_severe());
        assert!(Level::Fatal.is_severe());
    }

    #[test]
    fn from_str_is_infallible() {
        let level: Level = "warn".parse().unwrap();
        assert_eq!(level, Level::Warn);
        assert_eq!(level.to_string(), "WARN");
    }

    #[test]
    fn maps_onto_tracing_levels() {
        assert_eq!(Level::Debug.as_tracing(), tracing::Level::DEBUG);
        assert_eq!(Level::Warn.as_tracing(), tracing::Level::WARN);
        assert_eq!(Level::Fatal.as_tracing(), tracing::Level::ERROR);
    }
}
