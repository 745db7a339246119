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

//! Normalization of application errors into a renderable shape.

use std::backtrace::BacktraceStatus;
use std::fmt;

use serde_json::Value;

/// An application error reduced to a message, its cause chain and an optional backtrace.
///
/// Whatever was handed to the error path (an [`std::error::Error`], an [`anyhow::Error`], a
/// string or a JSON value) ends up as an `ErrorReport`, so rendering never fails on an unexpected
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    name: String,
    message: String,
    causes: Vec<String>,
    backtrace: Option<String>,
}

impl ErrorReport {
    /// Create a report with the default name `Error`.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            name: "Error".to_string(),
            message: if message.is_empty() {
                "Error".to_string()
            } else {
                message
            },
            causes: vec![],
            backtrace: None,
        }
    }

    /// Create a report from an error and its `source()` chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut report = ErrorReport::new(err.to_string());
        let mut source = err.source();
        while let Some(err) = source {
            report.causes.push(err.to_string());
            source = err.source();
        }
        report
    }

    /// Create a report from an [`anyhow::Error`], keeping its backtrace if one was captured.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let mut chain = err.chain();
        let mut report = match chain.next() {
            Some(head) => ErrorReport::new(head.to_string()),
            None => ErrorReport::new("Error"),
        };
        report.causes = chain.map(|err| err.to_string()).collect();

        let backtrace = err.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            report.backtrace = Some(backtrace.to_string());
        }
        report
    }

    /// Create a report from an arbitrary JSON value.
    ///
    /// Objects contribute their `name` and `message` fields, and nested `cause` (or `error`)
    /// objects become the cause chain. Any other value is rendered as JSON text.
    pub fn from_value(value: &Value) -> Self {
        let mut report = match value {
            Value::String(s) => return ErrorReport::new(s.as_str()),
            Value::Object(obj) => match obj.get("message") {
                Some(Value::String(message)) => ErrorReport::new(message.as_str()),
                Some(message) => ErrorReport::new(message.to_string()),
                None => ErrorReport::new(value.to_string()),
            },
            _ => return ErrorReport::new(value.to_string()),
        };

        if let Some(Value::String(name)) = value.get("name") {
            report.name = name.clone();
        }

        let mut cause = value.get("cause").or_else(|| value.get("error"));
        while let Some(next) = cause {
            match next {
                Value::Null => break,
                Value::String(s) => report.causes.push(s.clone()),
                Value::Object(obj) => match obj.get("message") {
                    Some(Value::String(message)) => report.causes.push(message.clone()),
                    _ => report.causes.push(next.to_string()),
                },
                other => report.causes.push(other.to_string()),
            }
            cause = next.get("cause").or_else(|| next.get("error"));
        }

        report
    }

    /// Append a note line to the message.
    pub fn with_note(mut self, note: impl AsRef<str>) -> Self {
        let note = note.as_ref();
        if !note.is_empty() {
            self.message.push('\n');
            self.message.push_str(note);
        }
        self
    }

    /// The name of the error kind, `Error` unless the source said otherwise.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The top-level message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The messages of the cause chain, outermost first.
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Render the report; `with_stack` includes the cause chain and the backtrace.
    pub fn render(&self, with_stack: bool) -> String {
        let mut text = format!("{}: {}", self.name, self.message);
        if with_stack {
            for cause in &self.causes {
                text.push_str("\n  caused by: ");
                text.push_str(cause);
            }
            if let Some(backtrace) = &self.backtrace {
                text.push('\n');
                text.push_str(backtrace.trim_end());
            }
        }
        text
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(f.alternate()))
    }
}

impl std::error::Error for ErrorReport {}

impl From<&str> for ErrorReport {
    fn from(message: &str) -> Self {
        ErrorReport::new(message)
    }
}

impl From<String> for ErrorReport {
    fn from(message: String) -> Self {
        ErrorReport::new(message)
    }
}

impl From<anyhow::Error> for ErrorReport {
    fn from(err: anyhow::Error) -> Self {
        ErrorReport::from_anyhow(&err)
    }
}

impl From<&anyhow::Error> for ErrorReport {
    fn from(err: &anyhow::Error) -> Self {
        ErrorReport::from_anyhow(err)
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(err: std::io::Error) -> Self {
        ErrorReport::from_error(&err)
    }
}

impl From<crate::Error> for ErrorReport {
    fn from(err: crate::Error) -> Self {
        ErrorReport::from_error(&err)
    }
}
