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

use jiff::civil::Date;
use regex::Regex;

use crate::Error;

/// Names the files of one stream and recovers the date embedded in them.
///
/// Files are named `<stem>-<YYYY-MM-DD>.log`; size rollovers within the same day continue as
/// `<stem>-<YYYY-MM-DD>.log.<n>`. Only the former match [`FileNaming::embedded_date`].
#[derive(Debug, Clone)]
pub struct FileNaming {
    stem: String,
    pattern: Regex,
}

impl FileNaming {
    /// Create the naming of files starting with `prefix` followed by `suffix`.
    pub fn new(prefix: &str, suffix: &str) -> Result<FileNaming, Error> {
        let stem = format!("{prefix}{suffix}");
        let pattern = format!(r"^{}-([\d-]{{10}})\.log$", regex::escape(&stem));
        let pattern = Regex::new(&pattern).map_err(|err| {
            Error::new("failed to compile log filename pattern")
                .with_context("stem", &stem)
                .with_source(err)
        })?;
        Ok(FileNaming { stem, pattern })
    }

    /// The filename template, with `%DATE%` standing for the date.
    pub fn template(&self) -> String {
        format!("{}-%DATE%.log", self.stem)
    }

    /// The filename of the `count`-th file of `date`.
    pub fn filename(&self, date: Date, count: usize) -> String {
        let stem = &self.stem;
        let date = date.strftime("%Y-%m-%d");
        match count {
            0 => format!("{stem}-{date}.log"),
            n => format!("{stem}-{date}.log.{n}"),
        }
    }

    /// The `YYYY-MM-DD` segment of a filename produced by this naming.
    pub fn embedded_date<'a>(&self, filename: &'a str) -> Option<&'a str> {
        let captures = self.pattern.captures(filename)?;
        captures.get(1).map(|m| m.as_str())
    }
}

/// The `YYYYMMDD` key of a `YYYY-MM-DD` date, ordered like the date itself as long as every
/// field is zero-padded.
pub(crate) fn date_key(date: &str) -> String {
    date.replace('-', "")
}

pub(crate) fn today_key(today: Date) -> String {
    today.strftime("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn test_filename_and_date_roundtrip() {
        let naming = FileNaming::new("sync-", "app").unwrap();
        assert_eq!(naming.template(), "sync-app-%DATE%.log");

        let filename = naming.filename(date(2023, 1, 2), 0);
        assert_eq!(filename, "sync-app-2023-01-02.log");
        assert_eq!(naming.embedded_date(&filename), Some("2023-01-02"));

        let rolled = naming.filename(date(2023, 1, 2), 3);
        assert_eq!(rolled, "sync-app-2023-01-02.log.3");
        assert_eq!(naming.embedded_date(&rolled), None);
    }

    #[test]
    fn test_pattern_is_literal_and_anchored() {
        let naming = FileNaming::new("sync-", "a.b").unwrap();
        assert_eq!(naming.embedded_date("sync-a.b-2023-01-02.log"), Some("2023-01-02"));
        assert_eq!(naming.embedded_date("sync-aXb-2023-01-02.log"), None);
        assert_eq!(naming.embedded_date("error-sync-a.b-2023-01-02.log"), None);
        assert_eq!(naming.embedded_date("sync-a.b-2023-01-02.txt"), None);
    }

    #[test]
    fn test_date_key_orders_dates() {
        assert_eq!(date_key("2023-01-02"), "20230102");
        assert_eq!(today_key(date(2023, 1, 2)), "20230102");
        assert!(date_key("2022-12-31") < today_key(date(2023, 1, 1)));
    }
}
