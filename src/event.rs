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

//! Rotation events and the sink they are delivered to.

use std::fmt;
use std::path::PathBuf;

use crossbeam_channel::Sender;

/// An event raised by a rotating file stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// The success stream moved from `old_file` to `new_file`.
    RotateSuccess {
        /// The file that was just closed.
        old_file: PathBuf,
        /// The file that is now active.
        new_file: PathBuf,
    },
    /// The error stream moved from `old_file` to `new_file`.
    RotateError {
        /// The file that was just closed.
        old_file: PathBuf,
        /// The file that is now active.
        new_file: PathBuf,
    },
    /// The success stream started a new file.
    NewSuccess {
        /// The file that is now active.
        new_file: PathBuf,
    },
    /// The error stream started a new file.
    NewError {
        /// The file that is now active.
        new_file: PathBuf,
    },
}

impl LogEvent {
    /// The event name as seen by observers.
    pub fn name(&self) -> &'static str {
        match self {
            LogEvent::RotateSuccess { .. } => "logRotateSuccess",
            LogEvent::RotateError { .. } => "logRotateError",
            LogEvent::NewSuccess { .. } => "logNewSuccess",
            LogEvent::NewError { .. } => "logNewError",
        }
    }
}

/// An observer of [`LogEvent`]s.
///
/// Sinks are called from the writer thread of the stream that raised the event.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver an event.
    fn emit(&self, event: &LogEvent);
}

impl EventSink for Sender<LogEvent> {
    fn emit(&self, event: &LogEvent) {
        // a dropped receiver means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

impl fmt::Debug for dyn EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventSink")
    }
}

/// An [`EventSink`] backed by a closure.
///
/// # Examples
///
/// ```
/// use af_logger::EventFn;
/// use af_logger::LogEvent;
///
/// let sink = EventFn(|event: &LogEvent| println!("{}", event.name()));
/// ```
pub struct EventFn<F>(pub F);

impl<F> EventSink for EventFn<F>
where
    F: Fn(&LogEvent) + Send + Sync + 'static,
{
    fn emit(&self, event: &LogEvent) {
        (self.0)(event)
    }
}

impl<F> fmt::Debug for EventFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFn").finish_non_exhaustive()
    }
}
