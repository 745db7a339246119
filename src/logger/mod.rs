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

//! The leveled logger facade.

mod builder;
mod facade;

pub use self::builder::LoggerBuilder;
pub use self::facade::Logger;
pub use self::facade::MErrOptions;

use std::sync::Arc;

use crate::Error;
use crate::FileLogger;
use crate::LoggerSettings;
use crate::file::FileLoggerBuilder;
use crate::report::ErrorReport;

/// A console logger together with the file logger it forwards to.
#[derive(Debug, Clone)]
pub struct AfLogger {
    /// The facade.
    pub logger: Arc<Logger>,
    /// The two rotating file streams behind the facade.
    pub file_logger: Arc<FileLogger>,
}

impl AfLogger {
    /// Report `err` at fatal level, close the file streams and exit with code 1.
    pub fn exit_on_error(&self, err: impl Into<ErrorReport>) -> ! {
        self.logger.report_fatal_and_exit(err)
    }
}

/// Build a [`FileLogger`] and a [`Logger`] forwarding to it from the same settings.
///
/// # Errors
///
/// Return an error if the file logger cannot be built, see [`FileLoggerBuilder::build`].
///
/// # Examples
///
/// ```
/// use af_logger::Category;
/// use af_logger::Level;
/// use af_logger::LoggerSettings;
///
/// let dir = tempfile::tempdir().unwrap();
/// let settings = LoggerSettings::new("app")
///     .min_level(Level::Info)
///     .log_dir(dir.path())
///     .map_level(Level::Error, Category::Error);
///
/// let af = af_logger::af_logger(settings).unwrap();
/// af.logger.info("service started");
/// af.logger.error("connection refused");
/// af.file_logger.close().unwrap();
/// ```
pub fn af_logger(settings: LoggerSettings) -> Result<AfLogger, Error> {
    let file_logger = Arc::new(FileLoggerBuilder::from_settings(&settings).build()?);
    let logger = Logger::builder(settings)
        .file_logger(file_logger.clone())
        .build();
    Ok(AfLogger {
        logger: Arc::new(logger),
        file_logger,
    })
}
