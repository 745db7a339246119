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

//! Log levels.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;

/// The severity of a log record.
///
/// Levels are ordered from the most verbose to the most severe:
/// `Silly < Debug < Trace < Info < Warn < Error < Fatal`. The ordering is fixed and does not
/// follow the alphabet nor the `log` crate, where `Trace` is more verbose than `Debug`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Designates the noisiest output.
    Silly,
    /// Designates lower priority information.
    Debug,
    /// Designates tracing of internals, such as SQL statements.
    Trace,
    /// Designates useful information.
    Info,
    /// Designates hazardous situations.
    Warn,
    /// Designates very serious errors.
    Error,
    /// Designates unrecoverable errors.
    Fatal,
}

impl Level {
    /// All levels, from the most verbose to the most severe.
    pub const ALL: [Level; 7] = [
        Level::Silly,
        Level::Debug,
        Level::Trace,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Return the upper case representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silly => "SILLY",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Return the lower case name of the `Level`, as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Silly => "silly",
            Level::Debug => "debug",
            Level::Trace => "trace",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for level in Level::ALL {
            if s.eq_ignore_ascii_case(level.name()) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Silly < Level::Debug);
        assert!(Level::Debug < Level::Trace);
        assert!(Level::Trace < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("silly".parse::<Level>().unwrap(), Level::Silly);
        assert_eq!("FATAL".parse::<Level>().unwrap(), Level::Fatal);
        assert_eq!("Warn".parse::<Level>().unwrap(), Level::Warn);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_deserialize() {
        let level: Level = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(level, Level::Trace);
        assert!(serde_json::from_str::<Level>("\"TRACE\"").is_err());
    }
}
