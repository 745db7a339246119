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

use std::fmt::Write;

use colored::Color;
use colored::ColoredString;
use colored::Colorize;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::color::LevelColor;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that formats log records as optionally colored console lines.
///
/// Output format:
///
/// ```text
/// 2024-08-11 22:44:57.172 ERROR [app] [req-1] sync: connection refused
/// 2024-08-11 22:44:57.172  WARN [app] disk almost full
/// 2024-08-11 22:44:57.172  INFO [app] {"rows":12}
/// ```
///
/// Levels are colored unless `no_color` is set. A per-record color override from the record's
/// [`EchoOptions`](crate::EchoOptions) applies to the message text. Messages that start with
/// `SELECT ` are printed on their own lines in magenta.
///
/// # Examples
///
/// ```
/// use af_logger::layout::ConsoleLayout;
/// use jiff::tz::TimeZone;
///
/// let layout = ConsoleLayout::default().no_color().timezone(TimeZone::UTC);
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleLayout {
    colors: LevelColor,
    no_color: bool,
    timezone: TimeZone,
    prefix: Option<String>,
}

impl Default for ConsoleLayout {
    fn default() -> Self {
        Self {
            colors: LevelColor::default(),
            no_color: false,
            timezone: TimeZone::system(),
            prefix: None,
        }
    }
}

impl ConsoleLayout {
    /// Customize the color of a log level.
    ///
    /// No effect if `no_color` is set to `true`.
    pub fn level_color(mut self, level: Level, color: Color) -> Self {
        match level {
            Level::Fatal => self.colors.fatal = color,
            Level::Error => self.colors.error = color,
            Level::Warn => self.colors.warn = color,
            Level::Info => self.colors.info = color,
            Level::Trace => self.colors.trace = color,
            Level::Debug => self.colors.debug = color,
            Level::Silly => self.colors.silly = color,
        }
        self
    }

    /// Disable colored output.
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system timezone if not set.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Set the prefix printed before every message that has no prefix of its own.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    fn paint(&self, text: &str, color: Option<Color>, bold: bool) -> ColoredString {
        let mut text = ColoredString::from(text);
        if self.no_color {
            return text;
        }
        if let Some(color) = color {
            text = text.color(color);
        }
        if bold {
            text = text.bold();
        }
        text
    }
}

impl Layout for ConsoleLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let options = record.options();
        let mut text = "\n".repeat(options.lines_before);

        let time = record.time().with_time_zone(self.timezone.clone());
        let level = self.colors.colorize_record_level(self.no_color, record.level());

        // SAFETY: write to a string always succeeds
        write!(
            &mut text,
            "{} {level:>5} [{}]",
            time.strftime("%Y-%m-%d %H:%M:%S%.3f"),
            record.name()
        )
        .unwrap();
        if let Some(request_id) = record.request_id() {
            write!(&mut text, " [{request_id}]").unwrap();
        }
        text.push(' ');

        if let Some(prefix) = options.prefix.as_deref().or(self.prefix.as_deref()) {
            text.push_str(prefix);
        }
        if let Some(title) = record.title() {
            write!(&mut text, "{}: ", self.paint(title, None, options.bold)).unwrap();
        }

        let message = record.message();
        if message.trim_start_matches(' ').starts_with("SELECT ") {
            write!(&mut text, "\n{}\n", self.paint(message, Some(Color::Magenta), false)).unwrap();
        } else {
            write!(&mut text, "{}", self.paint(message, options.color, false)).unwrap();
        }

        Ok(text.into_bytes())
    }
}
