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

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;
use crate::Layout;
use crate::Trap;
use crate::append::Append;
use crate::file::Category;
use crate::file::naming::FileNaming;
use crate::file::non_blocking::NonBlocking;
use crate::file::non_blocking::WorkerGuard;
use crate::file::prune;
use crate::file::rolling::RotatingFileWriterBuilder;
use crate::layout::FileLayout;
use crate::record::Record;

/// The log files of one [`Category`].
///
/// Lines are handed over to a dedicated writer thread that owns the active file, so writes of
/// one stream keep their order. Rotation, pruning of the rotated file and event delivery run on
/// that thread as well.
#[derive(Debug)]
pub struct RotatingFileStream {
    category: Category,
    dir: PathBuf,
    naming: FileNaming,
    layout: FileLayout,
    writer: NonBlocking,
    guard: Mutex<Option<WorkerGuard>>,
    trap: Arc<dyn Trap>,
}

impl RotatingFileStream {
    pub(crate) fn new(
        builder: RotatingFileWriterBuilder,
        dir: PathBuf,
        naming: FileNaming,
        category: Category,
        trap: Arc<dyn Trap>,
    ) -> Result<Self, Error> {
        let file = builder.build()?;
        let thread_name = format!("af-logger-{}", category.as_str().to_lowercase());
        let (writer, guard) = NonBlocking::create(file, thread_name, None, trap.clone())?;
        Ok(Self {
            category,
            dir,
            naming,
            layout: FileLayout::default(),
            writer,
            guard: Mutex::new(Some(guard)),
            trap,
        })
    }

    /// The category of this stream.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The directory holding the files of this stream.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The naming of the files of this stream.
    pub fn naming(&self) -> &FileNaming {
        &self.naming
    }

    /// Write the record and hand it back.
    ///
    /// Failures are reported to the trap; the record passes through regardless.
    pub fn main<'a>(&self, record: &'a Record) -> &'a Record {
        if let Err(err) = self.write(record) {
            let err = err.with_context("category", self.category);
            self.trap.trap(&err);
        }
        record
    }

    /// Write the record as one line of the active file.
    pub fn write(&self, record: &Record) -> Result<(), Error> {
        let mut bytes = self.layout.format(record)?;
        bytes.push(b'\n');
        self.writer.send(bytes)
    }

    /// Delete the files of this stream dated before today whose size is at most `min_size`.
    ///
    /// Returns the deleted paths. Failures are reported to the trap.
    pub fn prune_old_empty(&self, min_size: u64) -> Vec<PathBuf> {
        self.prune_old_empty_before(min_size, Zoned::now().date())
    }

    /// Like [`RotatingFileStream::prune_old_empty`], with `today` given explicitly.
    pub fn prune_old_empty_before(&self, min_size: u64, today: Date) -> Vec<PathBuf> {
        prune::prune_old_empty(&self.dir, &self.naming, min_size, today, self.trap.as_ref())
    }

    /// Block until every line written so far is in the file.
    pub fn flush(&self) -> Result<(), Error> {
        if self.guard().is_none() {
            return Ok(());
        }
        self.writer.flush()
    }

    /// Flush and close the active file, waiting for the writer thread to finish.
    ///
    /// Closing twice is a no-op. Lines written after closing are reported to the trap.
    pub fn close(&self) -> Result<(), Error> {
        let guard = self.guard().take();
        match guard {
            Some(guard) => guard
                .close()
                .map_err(|err| err.with_context("category", self.category)),
            None => Ok(()),
        }
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Option<WorkerGuard>> {
        self.guard.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Append for RotatingFileStream {
    fn append(&self, record: &Record) -> Result<(), Error> {
        self.write(record)
    }

    fn flush(&self) -> Result<(), Error> {
        RotatingFileStream::flush(self)
    }

    fn close(&self) -> Result<(), Error> {
        RotatingFileStream::close(self)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::str::FromStr;

    use jiff::Span;
    use jiff::civil::date;
    use tempfile::TempDir;

    use super::*;
    use crate::Entry;
    use crate::Level;
    use crate::file::clock::Clock;
    use crate::trap::default_trap;

    fn stream(dir: &Path, clock: Clock) -> RotatingFileStream {
        let naming = FileNaming::new("sync-", "app").unwrap();
        let builder = RotatingFileWriterBuilder::new(dir, naming.clone(), Category::Success)
            .min_size(Some(0))
            .clock(clock);
        RotatingFileStream::new(
            builder,
            dir.to_path_buf(),
            naming,
            Category::Success,
            default_trap(),
        )
        .unwrap()
    }

    #[test]
    fn test_main_passes_record_through() {
        let temp_dir = TempDir::new().unwrap();
        let now = Zoned::from_str("2024-08-10T08:00:00[UTC]").unwrap();
        let stream = stream(temp_dir.path(), Clock::manual(now.clone()));

        let record = Record::new(Level::Info, now, "app", Entry::from("hello"));
        let returned = stream.main(&record);
        assert!(std::ptr::eq(returned, &record));

        stream.close().unwrap();
        stream.close().unwrap();
        let text = fs::read_to_string(temp_dir.path().join("sync-app-2024-08-10.log")).unwrap();
        assert_eq!(text, "08:00:00: hello\n");
        assert!(stream.write(&record).is_err());
    }

    #[test]
    fn test_rotation_on_writer_thread() {
        let temp_dir = TempDir::new().unwrap();
        let now = Zoned::from_str("2024-08-10T23:59:59[UTC]").unwrap();
        let clock = Clock::manual(now.clone());
        let stream = stream(temp_dir.path(), clock.clone());

        stream.write(&Record::new(Level::Info, now.clone(), "app", "late".into())).unwrap();
        stream.flush().unwrap();
        let later = now.checked_add(Span::new().seconds(1)).unwrap();
        clock.set_now(later.clone());
        stream.write(&Record::new(Level::Info, later, "app", "early".into())).unwrap();
        stream.close().unwrap();

        let old = fs::read_to_string(temp_dir.path().join("sync-app-2024-08-10.log")).unwrap();
        let new = fs::read_to_string(temp_dir.path().join("sync-app-2024-08-11.log")).unwrap();
        assert_eq!(old, "23:59:59: late\n");
        assert_eq!(new, "00:00:00: early\n");
    }

    #[test]
    fn test_prune_old_empty_uses_stream_naming() {
        let temp_dir = TempDir::new().unwrap();
        let now = Zoned::from_str("2023-01-02T10:00:00[UTC]").unwrap();
        let stream = stream(temp_dir.path(), Clock::manual(now));

        fs::write(temp_dir.path().join("sync-app-2023-01-01.log"), "").unwrap();
        fs::write(temp_dir.path().join("error-sync-app-2023-01-01.log"), "").unwrap();

        let removed = stream.prune_old_empty_before(0, date(2023, 1, 2));
        assert_eq!(removed, [temp_dir.path().join("sync-app-2023-01-01.log")]);
        assert!(temp_dir.path().join("sync-app-2023-01-02.log").exists());
        assert!(temp_dir.path().join("error-sync-app-2023-01-01.log").exists());
        stream.close().unwrap();
    }
}
