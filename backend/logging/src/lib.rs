//! Leveled JSON-lines logging to a size/age rotated file.
//!
//! A [`Logger`] writes one JSON object per record to a [`RotatingFile`]. The
//! crate keeps one process-wide default logger, reached through the level
//! macros ([`info!`], [`warnf!`], ...) and replaced with [`init_logger`].
//!
//! ```no_run
//! use rollog::{info, infof, init_logger, with_file_path, with_level};
//!
//! init_logger([with_file_path("/var/log/app.log"), with_level("info")]);
//! info!("listening on", 8080);
//! infof!("{} workers ready", 4);
//! rollog::sync().ok();
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod global;
pub mod level;
pub mod logger;
mod macros;
pub mod rotate;

pub use config::{
    LogOption, LoggerConfig, apply_options, load_config, with_file_path, with_level,
    with_max_age, with_max_backups, with_max_size, with_name,
};
pub use encoder::JsonRecordFormat;
pub use error::LoggerError;
pub use global::{init_logger, is_initialized, logger, set_logger, sync, writer};
pub use level::Level;
pub use logger::Logger;
pub use rotate::{LogWriter, RotatingFile, RotationPolicy};
