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

//! Color utilities.

use colored::Color;
use colored::ColoredString;
use colored::Colorize;

use crate::Level;

/// Colors for different log levels.
#[derive(Debug, Clone)]
pub struct LevelColor {
    /// Color for fatal level logs.
    pub fatal: Color,
    /// Color for error level logs.
    pub error: Color,
    /// Color for warning level logs.
    pub warn: Color,
    /// Color for info level logs.
    pub info: Color,
    /// Color for trace level logs.
    pub trace: Color,
    /// Color for debug level logs.
    pub debug: Color,
    /// Color for silly level logs.
    pub silly: Color,
}

impl Default for LevelColor {
    fn default() -> Self {
        Self {
            fatal: Color::Red,
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            trace: Color::BrightBlack,
            debug: Color::Cyan,
            silly: Color::Magenta,
        }
    }
}

impl LevelColor {
    /// The color of the given level.
    pub fn of(&self, level: Level) -> Color {
        match level {
            Level::Fatal => self.fatal,
            Level::Error => self.error,
            Level::Warn => self.warn,
            Level::Info => self.info,
            Level::Trace => self.trace,
            Level::Debug => self.debug,
            Level::Silly => self.silly,
        }
    }

    /// Colorize the log level.
    pub fn colorize_record_level(&self, no_color: bool, level: Level) -> ColoredString {
        if no_color {
            ColoredString::from(level.to_string())
        } else {
            ColoredString::from(level.to_string()).color(self.of(level))
        }
    }
}
