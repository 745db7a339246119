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

//! A bridge to forward logs from the `log` crate to a [`Logger`].

use std::sync::Arc;

use crate::Entry;
use crate::Level;
use crate::Logger;

struct LogCrateLogger(Arc<Logger>);

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let level = Level::from(metadata.level());
        self.0.is_level(level) || self.0.settings().category_of(level).is_some()
    }

    fn log(&self, record: &log::Record) {
        if !log::Log::enabled(self, record.metadata()) {
            return;
        }
        let entry = Entry::titled(record.target(), record.args().to_string());
        self.0.log(record.level().into(), entry)
    }

    fn flush(&self) {
        self.0.flush()
    }
}

/// Set up the log crate global logger.
///
/// This function calls [`log::set_boxed_logger`] so that all logs from the log crate are
/// forwarded to `logger`, with the target as the title.
///
/// This should be called early in the execution of a Rust program. Any log events that occur
/// before initialization will be ignored.
///
/// This function will set the global maximum log level to `Trace`. To override this, call
/// [`log::set_max_level`] after this function.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use af_logger::Logger;
/// use af_logger::LoggerSettings;
///
/// let logger = Arc::new(Logger::builder(LoggerSettings::new("app")).build());
/// if let Err(err) = af_logger::bridge::try_setup_log_crate(logger) {
///     eprintln!("failed to setup log crate: {err}");
/// }
/// ```
pub fn try_setup_log_crate(logger: Arc<Logger>) -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(LogCrateLogger(logger)))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger.
///
/// Like [`try_setup_log_crate`], but panics if the log crate global logger has already been set.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate(logger: Arc<Logger>) {
    try_setup_log_crate(logger).expect(
        "af_logger::bridge::setup_log_crate must be called before the log crate global logger initialized",
    )
}
