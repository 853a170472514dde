//! Logging macros over the default logger.
//!
//! Each level has two forms. `info!(a, b, c)` joins the `Display` forms of its
//! arguments with single spaces. `infof!("x = {}", x)` formats like `format!`.

#[doc(hidden)]
#[macro_export]
macro_rules! __values {
    ($($value:expr),* $(,)?) => {
        &[$(&$value as &dyn ::core::fmt::Display),*]
    };
}

#[macro_export]
macro_rules! debug {
    ($($value:expr),* $(,)?) => {
        $crate::global::log_values($crate::Level::Debug, $crate::__values!($($value),*))
    };
}

#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::global::log_fmt($crate::Level::Debug, ::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($($value:expr),* $(,)?) => {
        $crate::global::log_values($crate::Level::Info, $crate::__values!($($value),*))
    };
}

#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::global::log_fmt($crate::Level::Info, ::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($($value:expr),* $(,)?) => {
        $crate::global::log_values($crate::Level::Warn, $crate::__values!($($value),*))
    };
}

#[macro_export]
macro_rules! warnf {
    ($($arg:tt)+) => {
        $crate::global::log_fmt($crate::Level::Warn, ::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($value:expr),* $(,)?) => {
        $crate::global::log_values($crate::Level::Error, $crate::__values!($($value),*))
    };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::global::log_fmt($crate::Level::Error, ::core::format_args!($($arg)+))
    };
}

/// Logs, then unwinds with the message as payload.
#[macro_export]
macro_rules! dpanic {
    ($($value:expr),* $(,)?) => {
        $crate::global::unwind_values($crate::Level::DPanic, $crate::__values!($($value),*))
    };
}

/// Logs, then unwinds with the message as payload.
#[macro_export]
macro_rules! dpanicf {
    ($($arg:tt)+) => {
        $crate::global::unwind_fmt($crate::Level::DPanic, ::core::format_args!($($arg)+))
    };
}

/// Logs, then unwinds with the message as payload.
#[macro_export]
macro_rules! panic {
    ($($value:expr),* $(,)?) => {
        $crate::global::unwind_values($crate::Level::Panic, $crate::__values!($($value),*))
    };
}

/// Logs, then unwinds with the message as payload.
#[macro_export]
macro_rules! panicf {
    ($($arg:tt)+) => {
        $crate::global::unwind_fmt($crate::Level::Panic, ::core::format_args!($($arg)+))
    };
}

/// Logs, flushes, then exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($($value:expr),* $(,)?) => {
        $crate::global::fatal_values($crate::__values!($($value),*))
    };
}

/// Logs, flushes, then exits the process with status 1.
#[macro_export]
macro_rules! fatalf {
    ($($arg:tt)+) => {
        $crate::global::fatal_fmt(::core::format_args!($($arg)+))
    };
}
