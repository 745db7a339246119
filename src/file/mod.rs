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

//! Daily rotating log files, one stream per [`Category`].
//!
//! # Example
//!
//!```
//! use af_logger::Category;
//! use af_logger::FileLogger;
//! use af_logger::Level;
//! use af_logger::Record;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let files = FileLogger::builder("app")
//!     .log_dir(dir.path())
//!     .min_log_size(0)
//!     .build()
//!     .unwrap();
//!
//! let record = Record::now(Level::Error, "app", "connection refused");
//! files.category(Category::Error).main(&record);
//! files.close().unwrap();
//! ```

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub use self::logger::FileLogger;
pub use self::logger::FileLoggerBuilder;
pub use self::naming::FileNaming;
pub use self::stream::RotatingFileStream;

mod clock;
mod logger;
mod naming;
mod non_blocking;
mod prune;
mod rolling;
mod stream;
mod worker;

/// One of the two log file destinations.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Regular output, configured as `"info"`.
    #[serde(rename = "info", alias = "success")]
    Success,
    /// Error output, configured as `"error"`.
    #[serde(rename = "error")]
    Error,
}

impl Category {
    /// The name used in event names, `Success` or `Error`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "Success",
            Category::Error => "Error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
