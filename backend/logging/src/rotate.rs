//! Size and age based file rotation.
//!
//! Size rollover and backup counting are done by [`logroller`]. The roller is
//! built on the first write, so an unwritable path only fails once something
//! is logged. Age retention is handled here: backups of the log file whose
//! modification time is older than `max_age` are deleted when the file is
//! first opened, and again at most once per [`PRUNE_INTERVAL`] while writing.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use logroller::{LogRoller, LogRollerBuilder, Rotation, RotationSize};
use tracing_subscriber::fmt::MakeWriter;

use crate::config::LoggerConfig;

pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// When to roll the active file and which backups to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_size_mb: u64,
    /// `None` keeps backups regardless of age.
    pub max_age: Option<TimeDelta>,
    /// 0 keeps every backup.
    pub max_backups: usize,
}

impl RotationPolicy {
    pub fn from_config(config: &LoggerConfig) -> Self {
        let max_size_mb = match config.max_size_mb {
            0 => crate::config::DEFAULT_MAX_SIZE_MB,
            n => n,
        };
        let max_age = match config.max_age_days {
            0 => None,
            days => i64::try_from(days).ok().and_then(TimeDelta::try_days),
        };
        Self {
            max_size_mb,
            max_age,
            max_backups: config.max_backups,
        }
    }

    /// Modification time before which a backup is stale. `None` when there is
    /// no age limit or the limit reaches past the earliest representable time.
    pub fn age_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.max_age.and_then(|age| now.checked_sub_signed(age))
    }
}

#[derive(Default)]
struct Active {
    roller: Option<LogRoller>,
    pruned_at: Option<Instant>,
}

/// A log file that rolls itself over. Writes are serialized internally.
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    active: Mutex<Active>,
}

impl fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RotatingFile {
    /// No I/O happens until the first write.
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            active: Mutex::new(Active::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Append one record.
    pub fn write_record(&self, buf: &[u8]) -> io::Result<usize> {
        let mut active = self.lock();

        let due = active
            .pruned_at
            .is_none_or(|at| at.elapsed() >= PRUNE_INTERVAL);
        if due {
            self.prune_and_report();
            active.pruned_at = Some(Instant::now());
        }

        if active.roller.is_none() {
            active.roller = Some(self.build_roller()?);
        }
        let Some(roller) = active.roller.as_mut() else {
            return Err(io::Error::other("log file is not open"));
        };
        roller.write_all(buf)?;
        Ok(buf.len())
    }

    /// Flush buffered records. Nothing to do if the file was never opened.
    pub fn sync(&self) -> io::Result<()> {
        match self.lock().roller.as_mut() {
            Some(roller) => roller.flush(),
            None => Ok(()),
        }
    }

    /// Delete backups older than the age limit. Returns how many were removed
    /// and the failures met along the way.
    pub fn prune(&self) -> (usize, Vec<io::Error>) {
        let mut failures = Vec::new();
        let Some(cutoff) = self.policy.age_cutoff(Utc::now()) else {
            return (0, failures);
        };

        let backups = match list_backups(&self.path) {
            Ok(backups) => backups,
            Err(e) => {
                failures.push(e);
                return (0, failures);
            }
        };

        let mut removed = 0;
        for (modified, path) in backups {
            if modified >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => failures.push(e),
            }
        }
        (removed, failures)
    }

    fn lock(&self) -> MutexGuard<'_, Active> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Runs inside an event dispatch, where `tracing` drops nested events.
    fn prune_and_report(&self) {
        let (_, failures) = self.prune();
        for e in failures {
            eprintln!("rollog: pruning backups of {}: {e}", self.path.display());
        }
    }

    fn build_roller(&self) -> io::Result<LogRoller> {
        let dir = log_dir(&self.path);
        let dir = dir.to_str().ok_or_else(|| non_utf8(dir))?;
        let name = self
            .path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "log path has no file name"))?;
        let name = name.to_str().ok_or_else(|| non_utf8(&self.path))?;

        let size = RotationSize::MB(
            self.policy
                .max_size_mb
                .try_into()
                .unwrap_or_else(|_| u8::MAX.into()),
        );
        let mut builder = LogRollerBuilder::new(dir, name).rotation(Rotation::SizeBased(size));
        if self.policy.max_backups > 0 {
            builder = builder.max_keep_files(
                self.policy
                    .max_backups
                    .try_into()
                    .unwrap_or_else(|_| u8::MAX.into()),
            );
        }
        builder.build().map_err(|e| io::Error::other(e.to_string()))
    }
}

fn non_utf8(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("log path is not valid UTF-8: {}", path.display()),
    )
}

fn log_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// The log file and every file next to it whose name extends the log file's
/// name, sorted by name.
pub fn log_files(path: &Path) -> io::Result<Vec<PathBuf>> {
    let Some(prefix) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(log_dir(path))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| n.starts_with(prefix)) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Rolled-over copies of `path` with their modification times.
pub fn list_backups(path: &Path) -> io::Result<Vec<(DateTime<Utc>, PathBuf)>> {
    let mut backups = Vec::new();
    for file in log_files(path)? {
        if file.file_name() == path.file_name() {
            continue;
        }
        let modified = fs::metadata(&file)?.modified()?;
        backups.push((DateTime::<Utc>::from(modified), file));
    }
    Ok(backups)
}

/// Shared handle to a [`RotatingFile`], usable as an `io::Write` by other subsystems.
#[derive(Debug, Clone)]
pub struct LogWriter(Arc<RotatingFile>);

impl LogWriter {
    pub fn new(file: RotatingFile) -> Self {
        LogWriter(Arc::new(file))
    }

    pub fn file(&self) -> &RotatingFile {
        &self.0
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_record(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.sync()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
