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

use crate::Append;
use crate::FileLogger;
use crate::Logger;
use crate::LoggerSettings;
use crate::Trap;
use crate::append::Stdout;
use crate::layout::ConsoleLayout;

/// A builder for configuring a [`Logger`].
///
/// # Examples
///
/// ```
/// use af_logger::Logger;
/// use af_logger::LoggerSettings;
/// use af_logger::append::Memory;
///
/// let console = Memory::default();
/// let logger = Logger::builder(LoggerSettings::new("app"))
///     .console(console.clone())
///     .build();
/// logger.info("hello");
/// assert_eq!(console.lines().len(), 1);
/// ```
#[must_use = "call `build` to construct the logger"]
#[derive(Debug)]
pub struct LoggerBuilder {
    settings: LoggerSettings,
    console: Option<Box<dyn Append>>,
    shadow_console: Option<Box<dyn Append>>,
    file_logger: Option<Arc<FileLogger>>,
}

impl LoggerBuilder {
    pub(crate) fn new(settings: LoggerSettings) -> Self {
        Self {
            settings,
            console: None,
            shadow_console: None,
            file_logger: None,
        }
    }

    /// Set the console appender.
    ///
    /// Default to [`Stdout`] with a [`ConsoleLayout`] configured from the settings.
    pub fn console(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.console = Some(append.into());
        self
    }

    /// Set the console appender of the shadow instance.
    ///
    /// Default to [`Stdout`] with a [`ConsoleLayout`] configured from the settings.
    pub fn shadow_console(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.shadow_console = Some(append.into());
        self
    }

    /// Forward records of mapped levels to `file_logger`.
    pub fn file_logger(mut self, file_logger: Arc<FileLogger>) -> Self {
        self.file_logger = Some(file_logger);
        self
    }

    /// Build the [`Logger`] and its shadow instance.
    pub fn build(self) -> Logger {
        let LoggerBuilder {
            settings,
            console,
            shadow_console,
            file_logger,
        } = self;

        let trap = settings.effective_trap();
        let layout = console_layout(&settings, trap.as_ref());
        let console = console.unwrap_or_else(|| stdout(&layout));
        let shadow_console = shadow_console.unwrap_or_else(|| stdout(&layout));

        let settings = Arc::new(settings);
        let shadow = Logger::new(settings.clone(), shadow_console, None, trap.clone(), None);
        Logger::new(settings, console, file_logger, trap, Some(Box::new(shadow)))
    }
}

fn stdout(layout: &ConsoleLayout) -> Box<dyn Append> {
    Stdout::default().with_layout(layout.clone()).into()
}

/// The console layout described by `settings`.
fn console_layout(settings: &LoggerSettings, trap: &dyn Trap) -> ConsoleLayout {
    let mut layout = ConsoleLayout::default();
    if settings.no_color {
        layout = layout.no_color();
    }
    if let Some(tz) = settings.resolve_time_zone(trap) {
        layout = layout.timezone(tz);
    }
    if let Some(prefix) = settings.prefix.as_deref() {
        layout = layout.prefix(prefix);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entry;
    use crate::Layout;
    use crate::Level;
    use crate::record::Record;
    use crate::trap::DefaultTrap;

    fn format(settings: &LoggerSettings, entry: Entry) -> String {
        let layout = console_layout(settings, &DefaultTrap::default());
        let record = Record::now(Level::Info, settings.name.as_str(), entry);
        String::from_utf8(layout.format(&record).unwrap()).unwrap()
    }

    #[test]
    fn test_console_prefix_comes_from_settings() {
        let settings = LoggerSettings::new("app").no_color(true).prefix("> ");
        assert!(format(&settings, Entry::from("hello")).ends_with("INFO [app] > hello"));

        let settings = LoggerSettings::new("app").no_color(true);
        assert!(format(&settings, Entry::from("hello")).ends_with("INFO [app] hello"));
    }
}
