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

use std::sync::Arc;
use std::sync::Mutex;

use crate::Append;
use crate::Entry;
use crate::FileLogger;
use crate::Level;
use crate::LoggerSettings;
use crate::Trap;
use crate::logger::LoggerBuilder;
use crate::record::Record;
use crate::report::ErrorReport;

/// Options of [`Logger::m_err`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MErrOptions {
    /// A note appended to the error message.
    pub msg: Option<String>,
    /// Hand the error back to the caller after logging it.
    pub thr: bool,
    /// Omit the cause chain and the backtrace.
    pub no_stack: bool,
}

impl MErrOptions {
    /// Append `msg` to the error message.
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// Hand the error back to the caller after logging it.
    pub fn thr(mut self) -> Self {
        self.thr = true;
        self
    }

    /// Omit the cause chain and the backtrace.
    pub fn no_stack(mut self) -> Self {
        self.no_stack = true;
        self
    }
}

impl From<&str> for MErrOptions {
    fn from(msg: &str) -> Self {
        MErrOptions::default().msg(msg)
    }
}

#[derive(Debug, Default)]
struct State {
    last_message: Option<String>,
    records_logged: u64,
}

/// A leveled console logger that forwards mapped levels to a [`FileLogger`].
///
/// Console output is filtered by the minimum level of the settings. File output only depends on
/// the level map: a level mapped to a category is written to that category's stream whatever the
/// console threshold is.
#[derive(Debug)]
pub struct Logger {
    settings: Arc<LoggerSettings>,
    console: Box<dyn Append>,
    file_logger: Option<Arc<FileLogger>>,
    trap: Arc<dyn Trap>,
    shadow: Option<Box<Logger>>,
    state: Mutex<State>,
}

impl Logger {
    pub(crate) fn new(
        settings: Arc<LoggerSettings>,
        console: Box<dyn Append>,
        file_logger: Option<Arc<FileLogger>>,
        trap: Arc<dyn Trap>,
        shadow: Option<Box<Logger>>,
    ) -> Self {
        Self {
            settings,
            console,
            file_logger,
            trap,
            shadow,
            state: Mutex::new(State::default()),
        }
    }

    /// Create a builder of a logger configured by `settings`.
    pub fn builder(settings: LoggerSettings) -> LoggerBuilder {
        LoggerBuilder::new(settings)
    }

    /// The settings, shared with the shadow instance.
    pub fn settings(&self) -> &Arc<LoggerSettings> {
        &self.settings
    }

    /// The file logger records are forwarded to, if any.
    pub fn file_logger(&self) -> Option<&Arc<FileLogger>> {
        self.file_logger.as_ref()
    }

    /// Whether records of `level` are printed to the console.
    pub fn is_level(&self, level: Level) -> bool {
        level >= self.settings.min_level
    }

    /// The independently constructed instance behind the suffixed methods.
    ///
    /// It shares the settings with this logger but prints to its own console appender, keeps its
    /// own state and never writes files. The shadow of a shadow is itself.
    pub fn shadow(&self) -> &Logger {
        self.shadow.as_deref().unwrap_or(self)
    }

    /// The last message printed to the console by this instance.
    pub fn last_message(&self) -> Option<String> {
        self.state().last_message.clone()
    }

    /// How many records this instance printed to the console.
    pub fn records_logged(&self) -> u64 {
        self.state().records_logged
    }

    /// Log `entry` at `level`.
    pub fn log(&self, level: Level, entry: impl Into<Entry>) {
        self.dispatch(level, entry.into(), self.is_level(level))
    }

    fn dispatch(&self, level: Level, entry: Entry, to_console: bool) {
        let category = self
            .file_logger
            .as_ref()
            .and_then(|_| self.settings.category_of(level));
        if !to_console && category.is_none() {
            return;
        }

        let record = Record::now(level, self.settings.name.as_str(), entry);
        if to_console {
            match self.console.append(&record) {
                Ok(()) => {
                    let mut state = self.state();
                    state.last_message = Some(record.message().to_string());
                    state.records_logged += 1;
                }
                Err(err) => self.trap.trap(&err),
            }
        }

        if let (Some(files), Some(category)) = (&self.file_logger, category) {
            files.category(category).main(&record);
        }
    }

    /// Log at silly level.
    pub fn silly(&self, entry: impl Into<Entry>) {
        self.log(Level::Silly, entry)
    }

    /// Log at debug level.
    pub fn debug(&self, entry: impl Into<Entry>) {
        self.log(Level::Debug, entry)
    }

    /// Log at trace level.
    pub fn trace(&self, entry: impl Into<Entry>) {
        self.log(Level::Trace, entry)
    }

    /// Log at info level.
    pub fn info(&self, entry: impl Into<Entry>) {
        self.log(Level::Info, entry)
    }

    /// Log at warn level.
    pub fn warn(&self, entry: impl Into<Entry>) {
        self.log(Level::Warn, entry)
    }

    /// Log at error level.
    ///
    /// Text and structured values are normalized into an [`ErrorReport`] first, so a JSON object
    /// with `message` and `cause` fields prints like an error with a cause chain.
    pub fn error(&self, entry: impl Into<Entry>) {
        self.log(Level::Error, normalize_error(entry.into()))
    }

    /// Log at fatal level, normalized like [`Logger::error`].
    pub fn fatal(&self, entry: impl Into<Entry>) {
        self.log(Level::Fatal, normalize_error(entry.into()))
    }

    /// Log an SQL query at trace level, titled `SQL [title]`.
    ///
    /// Only active when the `DEBUG` environment variable is `*` or names `sql`, in which case the
    /// query is printed whatever the minimum level is.
    pub fn sql(&self, title: impl AsRef<str>, query: impl Into<String>) {
        let debug = std::env::var("DEBUG").ok();
        self.sql_with_debug(debug.as_deref(), title, query);
    }

    fn sql_with_debug(
        &self,
        debug: Option<&str>,
        title: impl AsRef<str>,
        query: impl Into<String>,
    ) {
        if !sql_debug_enabled(debug) {
            return;
        }
        let title = format!("SQL [{}]", title.as_ref());
        let query: String = query.into();
        self.dispatch(Level::Trace, Entry::titled(title, query), true);
    }

    /// Pretty-print `err` at error level.
    ///
    /// With [`MErrOptions::thr`] the error is handed back as `Err` after logging, so the caller
    /// can propagate it; otherwise `Ok(())` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use af_logger::Logger;
    /// use af_logger::LoggerSettings;
    /// use af_logger::MErrOptions;
    /// use af_logger::append::Memory;
    ///
    /// let logger = Logger::builder(LoggerSettings::new("app"))
    ///     .console(Memory::default())
    ///     .build();
    /// assert!(logger.m_err("boom", "while syncing").is_ok());
    /// assert!(logger.m_err("boom", MErrOptions::default().thr()).is_err());
    /// ```
    pub fn m_err(
        &self,
        err: impl Into<ErrorReport>,
        options: impl Into<MErrOptions>,
    ) -> Result<(), ErrorReport> {
        let options = options.into();
        let mut report = err.into();
        if let Some(msg) = &options.msg {
            report = report.with_note(msg);
        }

        let text = report.render(!options.no_stack);
        self.log(Level::Error, Entry::new(text));

        if options.thr { Err(report) } else { Ok(()) }
    }

    /// Report `err` at fatal level, close the file streams and exit with code 1.
    pub fn report_fatal_and_exit(&self, err: impl Into<ErrorReport>) -> ! {
        let report = err.into();
        self.log(Level::Fatal, Entry::new(report.render(true)));
        if let Err(err) = self.console.flush() {
            self.trap.trap(&err);
        }
        match &self.file_logger {
            Some(files) => files.shutdown(1),
            None => std::process::exit(1),
        }
    }

    /// Flush the console and wait until the file streams have written every record.
    pub fn flush(&self) {
        if let Err(err) = self.console.flush() {
            self.trap.trap(&err);
        }
        if let Some(files) = &self.file_logger {
            for stream in [files.success(), files.error()] {
                if let Err(err) = stream.flush() {
                    self.trap.trap(&err);
                }
            }
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn normalize_error(mut entry: Entry) -> Entry {
    entry.message = entry.message.into_error();
    entry
}

/// Whether the `DEBUG` value enables SQL tracing: `*` or a list naming `sql`.
fn sql_debug_enabled(debug: Option<&str>) -> bool {
    match debug {
        None => false,
        Some(value) => {
            value.trim() == "*"
                || value
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .any(|word| word.eq_ignore_ascii_case("sql"))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::append::Memory;
    use crate::layout::FileLayout;

    fn logger(settings: LoggerSettings) -> (Logger, Memory, Memory) {
        let console = Memory::default().with_layout(FileLayout::default());
        let shadow = Memory::default().with_layout(FileLayout::default());
        let logger = Logger::builder(settings)
            .console(console.clone())
            .shadow_console(shadow.clone())
            .build();
        (logger, console, shadow)
    }

    fn message(line: &str) -> &str {
        // drop the `HH:MM:SS: ` time of day
        &line[10..]
    }

    #[test]
    fn test_is_level_is_monotonic() {
        for min_level in Level::ALL {
            let (logger, _, _) = logger(LoggerSettings::new("app").min_level(min_level));
            let enabled = Level::ALL.map(|level| logger.is_level(level));
            let first = enabled.iter().position(|&yes| yes).unwrap();
            assert!(enabled[first..].iter().all(|&yes| yes));
            assert_eq!(Level::ALL[first], min_level);
        }
    }

    #[test]
    fn test_console_threshold() {
        let (logger, console, _) = logger(LoggerSettings::new("app").min_level(Level::Info));
        logger.debug("hidden");
        logger.info("shown");
        logger.warn(Entry::titled("disk", "almost full"));
        let lines = console.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(message(&lines[0]), "shown");
        assert_eq!(message(&lines[1]), "disk: almost full");
        assert_eq!(logger.records_logged(), 2);
        assert_eq!(logger.last_message().as_deref(), Some("almost full"));
    }

    #[test]
    fn test_error_normalizes_inputs() {
        let (logger, console, _) = logger(LoggerSettings::new("app"));
        logger.error("plain");
        logger.error(json!({
            "name": "SyncError",
            "message": "sync failed",
            "cause": { "message": "timeout" },
        }));
        let lines = console.lines();
        assert_eq!(message(&lines[0]), "Error: plain");
        assert_eq!(
            message(&lines[1]),
            "SyncError: sync failed\n  caused by: timeout"
        );
    }

    #[test]
    fn test_shadow_is_independent() {
        let (logger, console, shadow_console) = logger(LoggerSettings::new("app"));
        logger.info("main");
        logger.shadow().info("shadow one");
        logger.shadow().info("shadow two");

        assert_eq!(logger.records_logged(), 1);
        assert_eq!(logger.last_message().as_deref(), Some("main"));
        assert_eq!(logger.shadow().records_logged(), 2);
        assert_eq!(logger.shadow().last_message().as_deref(), Some("shadow two"));
        assert_eq!(console.lines().len(), 1);
        assert_eq!(shadow_console.lines().len(), 2);
        assert!(Arc::ptr_eq(logger.settings(), logger.shadow().settings()));
        assert!(logger.shadow().file_logger().is_none());
        assert!(std::ptr::eq(logger.shadow().shadow(), logger.shadow()));
    }

    #[test]
    fn test_m_err() {
        let (logger, console, _) = logger(LoggerSettings::new("app"));
        let err = anyhow::anyhow!("timeout").context("sync failed");

        assert_eq!(logger.m_err(&err, "while syncing"), Ok(()));
        assert!(
            message(&console.lines()[0])
                .starts_with("Error: sync failed\nwhile syncing\n  caused by: timeout")
        );

        let returned = logger
            .m_err(&err, MErrOptions::default().thr().no_stack())
            .unwrap_err();
        assert_eq!(returned.message(), "sync failed");
        assert_eq!(message(&console.lines()[1]), "Error: sync failed");
    }

    #[test]
    fn test_sql_prints_at_trace_whatever_the_level() {
        let console = Memory::default();
        let logger = Logger::builder(LoggerSettings::new("app").min_level(Level::Fatal))
            .console(console.clone())
            .shadow_console(Memory::default())
            .build();

        logger.sql_with_debug(None, "q", "SELECT 1");
        assert!(console.lines().is_empty());

        logger.sql_with_debug(Some("sql"), "q", "UPDATE t SET a = 1");
        logger.sql_with_debug(Some("*"), "q", "SELECT 1");
        let lines = console.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("TRACE [app] SQL [q]: UPDATE t SET a = 1"));
        assert!(lines[1].contains("TRACE [app] SQL [q]: "));
        assert!(lines[1].ends_with("\nSELECT 1\n"));

        logger.info("below fatal");
        assert_eq!(console.lines().len(), 2);
    }

    #[test]
    fn test_sql_debug_enabled() {
        assert!(!sql_debug_enabled(None));
        assert!(sql_debug_enabled(Some("*")));
        assert!(sql_debug_enabled(Some("sql")));
        assert!(sql_debug_enabled(Some("http,sql")));
        assert!(!sql_debug_enabled(Some("mysql")));
        assert!(!sql_debug_enabled(Some("")));
    }
}
