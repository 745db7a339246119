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

//! A leveled console logger with daily rotating success and error log files.
//!
//! # Overview
//!
//! A [`Logger`] prints records at or above its minimum level to the console, colored by level.
//! Levels mapped to a [`Category`] are also written to the matching stream of a [`FileLogger`]:
//! regular output to `<log_dir>/sync-<name>-<YYYY-MM-DD>.log`, errors to
//! `<log_dir>/error/error-sync-<name>-<YYYY-MM-DD>.log`. Files roll over at midnight and, when a
//! size cap is set, within the day. Rotated files at or below a minimum size are deleted, and
//! stale small files are swept on start.
//!
//! # Examples
//!
//! ```
//! use af_logger::Category;
//! use af_logger::Entry;
//! use af_logger::Level;
//! use af_logger::LoggerSettings;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let settings = LoggerSettings::new("app")
//!     .min_level(Level::Info)
//!     .log_dir(dir.path())
//!     .min_log_size(0)
//!     .map_level(Level::Info, Category::Success)
//!     .map_level(Level::Error, Category::Error)
//!     .map_level(Level::Fatal, Category::Error);
//!
//! let af = af_logger::af_logger(settings).unwrap();
//! let logger = &af.logger;
//!
//! logger.debug("not printed, not written");
//! logger.info(Entry::titled("sync", "12 rows fetched"));
//! logger.error("connection refused");
//!
//! af.file_logger.close().unwrap();
//! ```
//!
//! Records logged through the `log` crate can be forwarded with [`bridge::setup_log_crate`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod bridge;
pub mod file;
pub mod layout;
pub mod request_id;

mod color;
mod error;
mod event;
mod level;
mod logger;
mod record;
mod report;
mod settings;
mod trap;

pub use self::append::Append;
pub use self::color::LevelColor;
pub use self::error::Error;
pub use self::event::EventFn;
pub use self::event::EventSink;
pub use self::event::LogEvent;
pub use self::file::Category;
pub use self::file::FileLogger;
pub use self::layout::Layout;
pub use self::level::Level;
pub use self::logger::AfLogger;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::MErrOptions;
pub use self::logger::af_logger;
pub use self::record::EchoOptions;
pub use self::record::Entry;
pub use self::record::Message;
pub use self::record::Record;
pub use self::report::ErrorReport;
pub use self::settings::DEFAULT_MAX_ERROR_FILE_SIZE;
pub use self::settings::LoggerSettings;
pub use self::trap::DefaultTrap;
pub use self::trap::Trap;
