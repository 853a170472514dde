//! JSON-lines record format.
//!
//! One object per line, keys in this order:
//!
//! | key | value |
//! |-----|-------|
//! | `T` | local time, ISO-8601 with milliseconds and offset |
//! | `L` | capitalized level |
//! | `N` | logger name, omitted when unnamed |
//! | `C` | caller, `dir/file.rs:line` |
//! | `M` | message |
//! | `S` | stack trace, only for dpanic, panic and fatal |

use std::fmt;

use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub const TIME_KEY: &str = "T";
pub const LEVEL_KEY: &str = "L";
pub const NAME_KEY: &str = "N";
pub const CALLER_KEY: &str = "C";
pub const MESSAGE_KEY: &str = "M";
pub const STACKTRACE_KEY: &str = "S";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Event field names the logger attaches to each record.
pub(crate) mod field {
    pub const SEVERITY: &str = "severity";
    pub const LOGGER: &str = "logger";
    pub const CALLER: &str = "caller";
    pub const STACKTRACE: &str = "stacktrace";
    pub const MESSAGE: &str = "message";
}

#[derive(Debug, Default)]
struct RecordFields {
    message: String,
    severity: Option<String>,
    logger: Option<String>,
    caller: Option<String>,
    stacktrace: Option<String>,
}

impl Visit for RecordFields {
    fn record_str(&mut self, f: &Field, value: &str) {
        let slot = match f.name() {
            field::SEVERITY => &mut self.severity,
            field::LOGGER => &mut self.logger,
            field::CALLER => &mut self.caller,
            field::STACKTRACE => &mut self.stacktrace,
            field::MESSAGE => {
                self.message = value.to_string();
                return;
            }
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    fn record_debug(&mut self, f: &Field, value: &dyn fmt::Debug) {
        self.record_str(f, &format!("{value:?}"));
    }
}

#[derive(Debug, Serialize)]
struct Record<'a> {
    #[serde(rename = "T")]
    time: &'a str,
    #[serde(rename = "L")]
    level: &'a str,
    #[serde(rename = "N", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "C", skip_serializing_if = "Option::is_none")]
    caller: Option<&'a str>,
    #[serde(rename = "M")]
    message: &'a str,
    #[serde(rename = "S", skip_serializing_if = "Option::is_none")]
    stacktrace: Option<&'a str>,
}

/// `tracing-subscriber` event format writing one JSON record per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordFormat;

impl<S, N> FormatEvent<S, N> for JsonRecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = RecordFields::default();
        event.record(&mut fields);

        // Events that did not come through `Logger` still get a level and caller.
        let meta = event.metadata();
        if fields.severity.is_none() {
            fields.severity = Some(meta.level().as_str().to_string());
        }
        if fields.caller.is_none() {
            if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
                fields.caller = Some(short_caller(file, line));
            }
        }

        let time = chrono::Local::now().format(TIME_FORMAT).to_string();
        let line = render(&fields, &time).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

fn render(fields: &RecordFields, time: &str) -> serde_json::Result<String> {
    serde_json::to_string(&Record {
        time,
        level: fields.severity.as_deref().unwrap_or("INFO"),
        name: fields.logger.as_deref(),
        caller: fields.caller.as_deref(),
        message: &fields.message,
        stacktrace: fields.stacktrace.as_deref(),
    })
}

/// Last directory plus file name, then the line: `src/main.rs:42`.
pub fn short_caller(file: &str, line: u32) -> String {
    let trimmed = match file.rmatch_indices(['/', '\\']).nth(1) {
        Some((idx, _)) => &file[idx + 1..],
        None => file,
    };
    format!("{trimmed}:{line}")
}
