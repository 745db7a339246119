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

use crate::Error;
use crate::Layout;
use crate::append::Append;
use crate::layout::ConsoleLayout;
use crate::record::Record;

/// An appender that keeps formatted log lines in memory.
///
/// Clones share the same buffer, so a clone handed to a logger can be inspected afterwards.
///
/// # Examples
///
/// ```
/// use af_logger::append::Memory;
///
/// let memory = Memory::default();
/// assert!(memory.lines().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Memory {
    layout: Arc<dyn Layout>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            layout: Arc::new(ConsoleLayout::default().no_color()),
            lines: Arc::default(),
        }
    }
}

impl Memory {
    /// Set the layout for the [`Memory`] appender.
    ///
    /// Default to [`ConsoleLayout`] without colors.
    pub fn with_layout(mut self, layout: impl Layout) -> Self {
        self.layout = Arc::new(layout);
        self
    }

    /// The lines captured so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Drop the captured lines.
    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Append for Memory {
    fn append(&self, record: &Record) -> Result<(), Error> {
        let bytes = self.layout.format(record)?;
        let line = String::from_utf8_lossy(&bytes).into_owned();
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line);
        Ok(())
    }
}
