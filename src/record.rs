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

//! Log entries as handed in by the caller, and the records rendered from them.

use colored::Color;
use jiff::Zoned;
use serde_json::Value;

use crate::Level;
use crate::report::ErrorReport;

/// The payload of a log entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Plain text.
    Text(String),
    /// A structured value, rendered as JSON.
    Value(Value),
    /// An application error.
    Error(ErrorReport),
}

impl Message {
    /// Render the message as text.
    pub fn render(&self, pretty_json: bool) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Value(Value::String(text)) => text.clone(),
            Message::Value(value) if pretty_json => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Message::Value(value) => value.to_string(),
            Message::Error(report) => report.render(true),
        }
    }

    /// Normalize any message into an [`Message::Error`].
    pub fn into_error(self) -> Message {
        match self {
            Message::Text(text) => Message::Error(ErrorReport::new(text)),
            Message::Value(value) => Message::Error(ErrorReport::from_value(&value)),
            Message::Error(report) => Message::Error(report),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Message::Value(value)
    }
}

impl From<ErrorReport> for Message {
    fn from(report: ErrorReport) -> Self {
        Message::Error(report)
    }
}

/// Console formatting directives of a single entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EchoOptions {
    /// Overrides the level color.
    pub color: Option<Color>,
    /// Printed before the message instead of the logger's own prefix.
    pub prefix: Option<String>,
    /// Renders structured values as indented JSON.
    pub pretty_json: bool,
    /// Number of blank lines printed before the entry.
    pub lines_before: usize,
    /// Renders the message in bold.
    pub bold: bool,
}

impl EchoOptions {
    /// Set the color override.
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Render structured values as indented JSON.
    pub fn pretty_json(mut self) -> Self {
        self.pretty_json = true;
        self
    }

    /// Print `n` blank lines before the entry.
    pub fn lines_before(mut self, n: usize) -> Self {
        self.lines_before = n;
        self
    }

    /// Render the message in bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// A log call: an optional title, a message and formatting options.
///
/// # Examples
///
/// ```
/// use af_logger::Entry;
/// use af_logger::EchoOptions;
///
/// let plain = Entry::from("service started");
/// let titled = Entry::titled("sync", "12 rows fetched").with_options(EchoOptions::default().lines_before(1));
/// let structured = Entry::from(serde_json::json!({ "rows": 12 }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub(crate) title: Option<String>,
    pub(crate) message: Message,
    pub(crate) options: EchoOptions,
    pub(crate) request_id: Option<String>,
}

impl Entry {
    /// Create an entry without a title.
    pub fn new(message: impl Into<Message>) -> Self {
        Self {
            title: None,
            message: message.into(),
            options: EchoOptions::default(),
            request_id: None,
        }
    }

    /// Create an entry with a title.
    pub fn titled(title: impl Into<String>, message: impl Into<Message>) -> Self {
        Entry::new(message).with_title(title)
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.is_empty() { None } else { Some(title) };
        self
    }

    /// Set the formatting options.
    pub fn with_options(mut self, options: EchoOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the request id explicitly, taking precedence over the ambient one.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// The message of this entry.
    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl From<&str> for Entry {
    fn from(message: &str) -> Self {
        Entry::new(message)
    }
}

impl From<String> for Entry {
    fn from(message: String) -> Self {
        Entry::new(message)
    }
}

impl From<Value> for Entry {
    fn from(message: Value) -> Self {
        Entry::new(message)
    }
}

impl From<ErrorReport> for Entry {
    fn from(message: ErrorReport) -> Self {
        Entry::new(message)
    }
}

impl From<Message> for Entry {
    fn from(message: Message) -> Self {
        Entry::new(message)
    }
}

/// A log record rendered from an [`Entry`].
#[derive(Debug, Clone)]
pub struct Record {
    level: Level,
    time: Zoned,
    name: String,
    request_id: Option<String>,
    title: Option<String>,
    message: String,
    options: EchoOptions,
}

impl Record {
    pub(crate) fn new(level: Level, time: Zoned, name: impl Into<String>, entry: Entry) -> Self {
        let message = entry.message.render(entry.options.pretty_json);
        Self {
            level,
            time,
            name: name.into(),
            request_id: entry.request_id.or_else(crate::request_id::current),
            title: entry.title,
            message,
            options: entry.options,
        }
    }

    /// Create a record stamped with the current time.
    pub fn now(level: Level, name: impl Into<String>, entry: impl Into<Entry>) -> Self {
        Record::new(level, Zoned::now(), name, entry.into())
    }

    /// The severity of the record.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The observed time.
    pub fn time(&self) -> &Zoned {
        &self.time
    }

    /// The name of the logger that produced the record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The correlation id of the request the record belongs to.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// The optional title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The console formatting directives.
    pub fn options(&self) -> &EchoOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_conversions() {
        let entry = Entry::from("hello");
        assert_eq!(entry.message(), &Message::Text("hello".to_string()));
        assert_eq!(entry.title, None);

        let entry = Entry::titled("", "no title");
        assert_eq!(entry.title, None);

        let entry = Entry::from(json!({ "a": 1 }));
        assert_eq!(entry.message(), &Message::Value(json!({ "a": 1 })));
    }

    #[test]
    fn test_message_render() {
        let value = Message::Value(json!({ "a": 1 }));
        assert_eq!(value.render(false), r#"{"a":1}"#);
        assert_eq!(value.render(true), "{\n  \"a\": 1\n}");
        assert_eq!(Message::Value(json!("text")).render(false), "text");
    }

    #[test]
    fn test_message_into_error() {
        let message = Message::from("boom").into_error();
        assert_eq!(message.render(false), "Error: boom");

        let message = Message::Value(json!({ "message": "bad", "cause": "worse" })).into_error();
        assert_eq!(message.render(false), "Error: bad\n  caused by: worse");
    }
}
