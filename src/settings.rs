// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration of the logger and its file streams.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use jiff::tz::TimeZone;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::EventSink;
use crate::Level;
use crate::Trap;
use crate::file::Category;
use crate::trap::default_trap;

/// The default maximum size of a single error log file, 20 MiB.
pub const DEFAULT_MAX_ERROR_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Settings shared by a [`Logger`](crate::Logger), its shadow instance and the
/// [`FileLogger`](crate::FileLogger) behind them.
///
/// Settings can be built in code or deserialized; every field has a default.
///
/// # Examples
///
/// ```
/// use af_logger::Category;
/// use af_logger::Level;
/// use af_logger::LoggerSettings;
///
/// let settings = LoggerSettings::new("sync")
///     .min_level(Level::Info)
///     .log_dir("./logs")
///     .map_level(Level::Info, Category::Success)
///     .map_level(Level::Error, Category::Error)
///     .map_level(Level::Fatal, Category::Error);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerSettings {
    /// Records below this level are not printed to the console.
    pub min_level: Level,
    /// The logger name, printed on the console and used as the file name stem by default.
    pub name: String,
    /// Printed after the name on every console line, unless the entry sets its own prefix.
    pub prefix: Option<String>,
    /// The file name stem; defaults to [`name`](Self::name).
    pub file_prefix: Option<String>,
    /// The directory of the log files; defaults to `../logs` relative to the working directory.
    pub log_dir: Option<PathBuf>,
    /// Leading part of success file names.
    pub success_file_prefix: String,
    /// Leading part of error file names.
    pub error_file_prefix: String,
    /// Rotated success files at or below this size are deleted, 0 if unset. A non-zero value also
    /// sweeps stale small files on start.
    pub min_log_size: Option<u64>,
    /// Rotated error files at or below this size are deleted; defaults to `min_log_size`.
    pub min_error_log_size: Option<u64>,
    /// Sweep stale small files on start even when the thresholds are zero.
    pub prune_on_start: bool,
    /// Size cap of a single success file.
    pub max_log_file_size: Option<u64>,
    /// Size cap of a single error file.
    pub max_error_file_size: Option<u64>,
    /// Which file category receives each level; unmapped levels are console only.
    pub file_logger_map: BTreeMap<Level, Category>,
    /// Disable console colors.
    pub no_color: bool,
    /// IANA name of the time zone of console timestamps; the system time zone if unset.
    pub time_zone: Option<String>,
    /// Observer of file rotation events.
    #[serde(skip)]
    pub emitter: Option<Arc<dyn EventSink>>,
    /// Handler of errors raised while logging.
    #[serde(skip)]
    pub trap: Option<Arc<dyn Trap>>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            min_level: Level::Silly,
            name: "log".to_string(),
            prefix: None,
            file_prefix: None,
            log_dir: None,
            success_file_prefix: "sync-".to_string(),
            error_file_prefix: "error-sync-".to_string(),
            min_log_size: None,
            min_error_log_size: None,
            prune_on_start: false,
            max_log_file_size: None,
            max_error_file_size: Some(DEFAULT_MAX_ERROR_FILE_SIZE),
            file_logger_map: BTreeMap::new(),
            no_color: false,
            time_zone: None,
            emitter: None,
            trap: None,
        }
    }
}

impl LoggerSettings {
    /// Create settings for a logger with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read settings from a JSON value.
    ///
    /// Malformed input never fails: a non-object value yields the defaults, and fields of the
    /// wrong shape are dropped in favor of their defaults. Whatever was ignored is reported to
    /// `trap`.
    pub fn from_json(value: Value, trap: &dyn Trap) -> LoggerSettings {
        let Value::Object(fields) = value else {
            let err = Error::new("logger settings must be an object, using defaults")
                .with_context("value", &value);
            trap.trap(&err);
            return LoggerSettings::default();
        };

        if let Ok(settings) = serde_json::from_value(Value::Object(fields.clone())) {
            return settings;
        }

        let mut accepted = Map::new();
        for (key, value) in fields {
            let mut single = Map::new();
            single.insert(key.clone(), value);
            match serde_json::from_value::<LoggerSettings>(Value::Object(single.clone())) {
                Ok(_) => accepted.extend(single),
                Err(err) => {
                    let err = Error::new("ignored malformed logger setting")
                        .with_context("key", key)
                        .with_source(err);
                    trap.trap(&err);
                }
            }
        }

        serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
    }

    /// Set the minimum console level.
    pub fn min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Set the console prefix printed after the logger name.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the file name stem.
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = Some(prefix.into());
        self
    }

    /// Set the log directory.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Set the size at or below which rotated success files are deleted.
    pub fn min_log_size(mut self, size: u64) -> Self {
        self.min_log_size = Some(size);
        self
    }

    /// Set the size at or below which rotated error files are deleted.
    pub fn min_error_log_size(mut self, size: u64) -> Self {
        self.min_error_log_size = Some(size);
        self
    }

    /// Sweep stale small files when the file logger starts.
    pub fn prune_on_start(mut self, yes: bool) -> Self {
        self.prune_on_start = yes;
        self
    }

    /// Route `level` to the file `category`, replacing any previous route of that level.
    pub fn map_level(mut self, level: Level, category: Category) -> Self {
        self.file_logger_map.insert(level, category);
        self
    }

    /// Disable console colors.
    pub fn no_color(mut self, yes: bool) -> Self {
        self.no_color = yes;
        self
    }

    /// Set the observer of rotation events.
    pub fn emitter(mut self, sink: impl EventSink) -> Self {
        self.emitter = Some(Arc::new(sink));
        self
    }

    /// Set the handler of errors raised while logging.
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Some(Arc::new(trap));
        self
    }

    /// The file category of `level`, if any.
    pub fn category_of(&self, level: Level) -> Option<Category> {
        self.file_logger_map.get(&level).copied()
    }

    /// The file name stem, falling back to the logger name.
    pub fn effective_file_prefix(&self) -> &str {
        match self.file_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => &self.name,
        }
    }

    /// Set the time zone of console timestamps by its IANA name.
    pub fn time_zone(mut self, name: impl Into<String>) -> Self {
        self.time_zone = Some(name.into());
        self
    }

    /// Resolve the configured time zone; unknown names fall back to the system time zone.
    pub(crate) fn resolve_time_zone(&self, trap: &dyn Trap) -> Option<TimeZone> {
        let name = self.time_zone.as_deref()?;
        match TimeZone::get(name) {
            Ok(tz) => Some(tz),
            Err(err) => {
                let err = Error::new("unknown time zone, using the system time zone")
                    .with_context("time_zone", name)
                    .with_source(err);
                trap.trap(&err);
                None
            }
        }
    }

    pub(crate) fn effective_trap(&self) -> Arc<dyn Trap> {
        self.trap.clone().unwrap_or_else(default_trap)
    }
}
