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

use crate::Error;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that formats log records as lines of the rotating log files.
///
/// Output format:
///
/// ```text
/// 22:44:57: connection refused
/// 22:44:58: [req-1] sync: 12 rows fetched
/// ```
///
/// The date is part of the file name, so only the time of day is written.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct FileLayout {}

impl Layout for FileLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let mut text = record.time().strftime("%H:%M:%S: ").to_string();
        if let Some(request_id) = record.request_id() {
            // SAFETY: write to a string always succeeds
            write!(&mut text, "[{request_id}] ").unwrap();
        }
        if let Some(title) = record.title() {
            write!(&mut text, "{title}: ").unwrap();
        }
        text.push_str(record.message());
        Ok(text.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use jiff::Zoned;

    use super::*;
    use crate::Entry;
    use crate::Level;

    #[test]
    fn test_file_line() {
        let time = Zoned::from_str("2023-01-02T08:05:09[UTC]").unwrap();
        let record = Record::new(Level::Error, time.clone(), "app", Entry::from("boom"));
        let bytes = FileLayout::default().format(&record).unwrap();
        assert_eq!(bytes, b"08:05:09: boom");

        let entry = Entry::titled("sync", "12 rows").with_request_id("r1");
        let record = Record::new(Level::Info, time, "app", entry);
        let bytes = FileLayout::default().format(&record).unwrap();
        assert_eq!(bytes, b"08:05:09: [r1] sync: 12 rows");
    }
}
