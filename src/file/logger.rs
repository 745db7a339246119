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

use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Error;
use crate::EventSink;
use crate::LoggerSettings;
use crate::Trap;
use crate::append::close_in_order;
use crate::file::Category;
use crate::file::clock::Clock;
use crate::file::naming::FileNaming;
use crate::file::rolling::RotatingFileWriterBuilder;
use crate::file::stream::RotatingFileStream;
use crate::settings::DEFAULT_MAX_ERROR_FILE_SIZE;
use crate::trap::default_trap;

/// A builder to configure and create a [`FileLogger`].
#[derive(Debug)]
pub struct FileLoggerBuilder {
    // required
    suffix: String,

    // has default
    prefix: String,
    error_prefix: String,
    log_dir: Option<PathBuf>,
    min_log_size: Option<u64>,
    min_error_log_size: Option<u64>,
    prune_on_start: bool,
    max_file_size: Option<u64>,
    max_error_file_size: Option<u64>,
    sink: Option<Arc<dyn EventSink>>,
    trap: Arc<dyn Trap>,
    clock: Clock,
}

impl FileLoggerBuilder {
    /// Create a builder for files named after `suffix`, e.g. `sync-<suffix>-2024-08-10.log`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            prefix: "sync-".to_string(),
            error_prefix: "error-sync-".to_string(),
            log_dir: None,
            min_log_size: None,
            min_error_log_size: None,
            prune_on_start: false,
            max_file_size: None,
            max_error_file_size: Some(DEFAULT_MAX_ERROR_FILE_SIZE),
            sink: None,
            trap: default_trap(),
            clock: Clock::DefaultClock,
        }
    }

    /// Create a builder from logger settings.
    pub fn from_settings(settings: &LoggerSettings) -> Self {
        let mut builder = FileLoggerBuilder::new(settings.effective_file_prefix())
            .prefix(&settings.success_file_prefix)
            .error_prefix(&settings.error_file_prefix)
            .prune_on_start(settings.prune_on_start)
            .trap_arc(settings.effective_trap());
        builder.log_dir = settings.log_dir.clone();
        builder.min_log_size = settings.min_log_size;
        builder.min_error_log_size = settings.min_error_log_size;
        builder.max_file_size = settings.max_log_file_size;
        builder.max_error_file_size = settings.max_error_file_size;
        builder.sink = settings.emitter.clone();
        builder
    }

    /// Set the leading part of success file names.
    ///
    /// Default to `sync-`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the leading part of error file names.
    ///
    /// Default to `error-sync-`.
    pub fn error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = prefix.into();
        self
    }

    /// Set the log directory. Error files go to its `error` subdirectory.
    ///
    /// Default to `logs` next to the current working directory.
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Delete success files at or below `size` bytes once they are rotated out, and sweep stale
    /// ones on start when `size` is not zero.
    ///
    /// Default to 0: empty files are deleted on rotation, and nothing is swept on start.
    pub fn min_log_size(mut self, size: u64) -> Self {
        self.min_log_size = Some(size);
        self
    }

    /// Like [`min_log_size`](Self::min_log_size) for error files.
    ///
    /// Default to the success threshold.
    pub fn min_error_log_size(mut self, size: u64) -> Self {
        self.min_error_log_size = Some(size);
        self
    }

    /// Sweep stale small files on start even when the thresholds are zero or unset.
    pub fn prune_on_start(mut self, yes: bool) -> Self {
        self.prune_on_start = yes;
        self
    }

    /// Roll success files over within a day once they reach `size` bytes.
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = Some(size);
        self
    }

    /// Roll error files over within a day once they reach `size` bytes.
    ///
    /// Default to 20 MiB.
    pub fn max_error_file_size(mut self, size: Option<u64>) -> Self {
        self.max_error_file_size = size;
        self
    }

    /// Set the observer of rotation events.
    pub fn sink(mut self, sink: impl EventSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Set the trap for errors raised while writing, rotating or pruning.
    ///
    /// Default to [`DefaultTrap`](crate::DefaultTrap).
    pub fn trap(self, trap: impl Trap) -> Self {
        self.trap_arc(Arc::new(trap))
    }

    fn trap_arc(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the [`FileLogger`].
    ///
    /// Stale small files are swept synchronously before this returns, see
    /// [`RotatingFileStream::prune_old_empty`].
    ///
    /// # Errors
    ///
    /// Return an error if either:
    ///
    /// * The log directories cannot be created.
    /// * Today's log files cannot be opened.
    /// * The writer threads cannot be spawned.
    pub fn build(self) -> Result<FileLogger, Error> {
        let log_dir = match self.log_dir.clone() {
            Some(dir) => dir,
            None => default_log_dir()?,
        };
        let error_dir = log_dir.join("error");
        let min_error_log_size = self.min_error_log_size.or(self.min_log_size);

        let success = self.stream(
            Category::Success,
            log_dir.clone(),
            &self.prefix,
            self.min_log_size,
            self.max_file_size,
        )?;
        let error = self.stream(
            Category::Error,
            error_dir,
            &self.error_prefix,
            min_error_log_size,
            self.max_error_file_size,
        )?;

        let today = self.clock.now().date();
        for (stream, threshold) in [(&success, self.min_log_size), (&error, min_error_log_size)] {
            if self.prune_on_start || threshold.is_some_and(|size| size > 0) {
                let removed = stream.prune_old_empty_before(threshold.unwrap_or(0), today);
                log::debug!(
                    "pruned {} stale {} log files in {}",
                    removed.len(),
                    stream.category(),
                    stream.dir().display()
                );
            }
        }

        Ok(FileLogger {
            log_dir,
            success,
            error,
            trap: self.trap,
        })
    }

    fn stream(
        &self,
        category: Category,
        dir: PathBuf,
        prefix: &str,
        min_size: Option<u64>,
        max_size: Option<u64>,
    ) -> Result<RotatingFileStream, Error> {
        // rotated empty files are always dropped, the threshold only raises the bar
        let min_size = min_size.unwrap_or(0);
        let naming = FileNaming::new(prefix, &self.suffix)?;
        let max_size = max_size
            .and_then(|size| usize::try_from(size).ok())
            .and_then(NonZeroUsize::new);
        let builder = RotatingFileWriterBuilder::new(dir.clone(), naming.clone(), category)
            .max_file_size(max_size)
            .min_size(Some(min_size))
            .sink(self.sink.clone())
            .trap(self.trap.clone())
            .clock(self.clock.clone());
        RotatingFileStream::new(builder, dir, naming, category, self.trap.clone())
    }
}

fn default_log_dir() -> Result<PathBuf, Error> {
    let cwd = std::env::current_dir().map_err(|err| {
        Error::new("failed to resolve the default log directory").with_source(err)
    })?;
    let base = cwd.parent().unwrap_or(&cwd);
    Ok(base.join("logs"))
}

/// Two daily rotating log streams: one for regular output and one for errors.
///
/// Success files live in the log directory, error files in its `error` subdirectory.
#[derive(Debug)]
pub struct FileLogger {
    log_dir: PathBuf,
    success: RotatingFileStream,
    error: RotatingFileStream,
    trap: Arc<dyn Trap>,
}

impl FileLogger {
    /// Create a builder for files named after `suffix`.
    pub fn builder(suffix: impl Into<String>) -> FileLoggerBuilder {
        FileLoggerBuilder::new(suffix)
    }

    /// The stream of regular output.
    pub fn success(&self) -> &RotatingFileStream {
        &self.success
    }

    /// The stream of errors.
    pub fn error(&self) -> &RotatingFileStream {
        &self.error
    }

    /// The stream of `category`.
    pub fn category(&self, category: Category) -> &RotatingFileStream {
        match category {
            Category::Success => &self.success,
            Category::Error => &self.error,
        }
    }

    /// The directory of the success files.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Close the success stream, then the error stream.
    ///
    /// Each stream is completely flushed and closed before the next one starts closing.
    pub fn close(&self) -> Result<(), Error> {
        close_in_order(&[&self.success, &self.error])
    }

    /// Close both streams and exit the process with `exit_code`.
    pub fn shutdown(&self, exit_code: i32) -> ! {
        if let Err(err) = self.close() {
            self.trap.trap(&err);
        }
        std::process::exit(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::str::FromStr;

    use jiff::Zoned;
    use tempfile::TempDir;

    use super::*;
    use crate::Entry;
    use crate::Level;
    use crate::LogEvent;
    use crate::record::Record;

    fn today_is(date: &str) -> Clock {
        Clock::manual(Zoned::from_str(&format!("{date}T12:00:00[UTC]")).unwrap())
    }

    #[test]
    fn test_layout_of_directories() {
        let temp_dir = TempDir::new().unwrap();
        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .clock(today_is("2024-08-10"))
            .build()
            .unwrap();

        assert_eq!(files.log_dir(), temp_dir.path());
        assert_eq!(files.success().dir(), temp_dir.path());
        assert_eq!(files.error().dir(), temp_dir.path().join("error"));
        assert_eq!(files.category(Category::Error).category(), Category::Error);
        assert_eq!(files.success().naming().template(), "sync-app-%DATE%.log");
        assert_eq!(files.error().naming().template(), "error-sync-app-%DATE%.log");
        files.close().unwrap();

        assert!(temp_dir.path().join("sync-app-2024-08-10.log").exists());
        assert!(temp_dir.path().join("error/error-sync-app-2024-08-10.log").exists());
    }

    #[test]
    fn test_default_policy_drops_empty_rotated_files() {
        let temp_dir = TempDir::new().unwrap();
        let clock = today_is("2024-08-10");
        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .clock(clock.clone())
            .build()
            .unwrap();

        let next_day = Zoned::from_str("2024-08-11T12:00:00[UTC]").unwrap();
        clock.set_now(next_day.clone());
        let record = Record::new(Level::Info, next_day, "app", Entry::from("hello"));
        files.success().main(&record);
        files.close().unwrap();

        assert!(!temp_dir.path().join("sync-app-2024-08-10.log").exists());
        let text = fs::read_to_string(temp_dir.path().join("sync-app-2024-08-11.log")).unwrap();
        assert_eq!(text, "12:00:00: hello\n");
        // the error stream never rotated and keeps its empty file of the first day
        assert!(temp_dir.path().join("error/error-sync-app-2024-08-10.log").exists());
    }

    #[test]
    fn test_default_error_threshold_is_zero_on_rotation() {
        let temp_dir = TempDir::new().unwrap();
        let clock = today_is("2024-08-10");
        let (sender, receiver) = crossbeam_channel::unbounded::<LogEvent>();
        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .sink(sender)
            .clock(clock.clone())
            .build()
            .unwrap();

        let next_day = Zoned::from_str("2024-08-11T08:00:00[UTC]").unwrap();
        clock.set_now(next_day.clone());
        let record = Record::new(Level::Error, next_day, "app", Entry::from("boom"));
        files.error().main(&record);
        files.close().unwrap();

        let error_dir = temp_dir.path().join("error");
        assert!(!error_dir.join("error-sync-app-2024-08-10.log").exists());
        assert!(error_dir.join("error-sync-app-2024-08-11.log").exists());
        let rotations = receiver
            .try_iter()
            .filter(|event| matches!(event, LogEvent::RotateError { .. }))
            .count();
        assert_eq!(rotations, 1);
    }

    #[test]
    fn test_startup_prune_with_zero_threshold() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("sync-app-2023-01-01.log"), "").unwrap();
        fs::write(temp_dir.path().join("sync-app-2023-01-02.log"), "").unwrap();

        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .prune_on_start(true)
            .clock(today_is("2023-01-02"))
            .build()
            .unwrap();
        files.close().unwrap();

        assert!(!temp_dir.path().join("sync-app-2023-01-01.log").exists());
        assert!(temp_dir.path().join("sync-app-2023-01-02.log").exists());
    }

    #[test]
    fn test_startup_prune_needs_threshold_or_flag() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("sync-app-2023-01-01.log");
        fs::write(&stale, "").unwrap();

        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .min_log_size(0)
            .clock(today_is("2023-01-02"))
            .build()
            .unwrap();
        files.close().unwrap();
        assert!(stale.exists());

        fs::write(temp_dir.path().join("sync-app-2023-01-01.log"), "tiny").unwrap();
        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .min_log_size(16)
            .clock(today_is("2023-01-02"))
            .build()
            .unwrap();
        files.close().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_error_threshold_falls_back_to_success_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let error_dir = temp_dir.path().join("error");
        fs::create_dir_all(&error_dir).unwrap();
        fs::write(error_dir.join("error-sync-app-2023-01-01.log"), "tiny").unwrap();

        let (sender, receiver) = crossbeam_channel::unbounded::<LogEvent>();
        let files = FileLogger::builder("app")
            .log_dir(temp_dir.path())
            .min_log_size(16)
            .sink(sender)
            .clock(today_is("2023-01-02"))
            .build()
            .unwrap();

        let record = Record::now(Level::Error, "app", Entry::from("boom"));
        files.error().main(&record);
        files.close().unwrap();

        assert!(!error_dir.join("error-sync-app-2023-01-01.log").exists());
        let events = receiver.try_iter().map(|e| e.name()).collect::<Vec<_>>();
        assert_eq!(events, ["logNewSuccess", "logNewError"]);

        let text = fs::read_to_string(error_dir.join("error-sync-app-2023-01-02.log")).unwrap();
        assert!(text.ends_with(": boom\n"));
    }
}
