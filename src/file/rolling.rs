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

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use jiff::Zoned;
use jiff::civil::Date;

use crate::Error;
use crate::EventSink;
use crate::LogEvent;
use crate::Trap;
use crate::file::Category;
use crate::file::clock::Clock;
use crate::file::naming::FileNaming;
use crate::file::prune::remove_if_small;
use crate::trap::default_trap;

/// A writer for daily rotating files.
///
/// The active file is always the one of the current date. When the date changes, or the active
/// file exceeds the size cap, a new file is opened and installed before the rotation hooks run,
/// so the next write lands in the new file.
#[derive(Debug)]
pub(crate) struct RotatingFileWriter {
    state: State,
    writer: File,
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            let err = Error::new("failed to flush file writer on dropped").with_source(err);
            self.state.hooks.trap.trap(&err);
        }
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.state.clock.now();
        let writer = &mut self.writer;

        if self.state.should_rollover_on_date(&now) {
            self.state.advance_date(&now);
            self.state.refresh_writer(writer);
        }

        if self.state.should_rollover_on_size() {
            self.state.advance_count();
            self.state.refresh_writer(writer);
        }

        writer
            .write(buf)
            .inspect(|&n| self.state.current_filesize += n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// What happens around a rotation: pruning of the closed file and event delivery.
#[derive(Debug)]
pub(crate) struct RotationHooks {
    pub(crate) category: Category,
    pub(crate) min_size: Option<u64>,
    pub(crate) sink: Option<Arc<dyn EventSink>>,
    pub(crate) trap: Arc<dyn Trap>,
}

impl RotationHooks {
    pub(crate) fn on_rotate(&self, old_file: &Path, new_file: &Path) {
        if let Some(min_size) = self.min_size {
            if let Err(err) = remove_if_small(old_file, min_size) {
                self.trap.trap(&err);
            }
        }

        let old_file = old_file.to_path_buf();
        let new_file = new_file.to_path_buf();
        let event = match self.category {
            Category::Success => LogEvent::RotateSuccess { old_file, new_file },
            Category::Error => LogEvent::RotateError { old_file, new_file },
        };
        self.emit(&event);
    }

    pub(crate) fn on_new_file(&self, new_file: &Path) {
        let new_file = new_file.to_path_buf();
        let event = match self.category {
            Category::Success => LogEvent::NewSuccess { new_file },
            Category::Error => LogEvent::NewError { new_file },
        };
        self.emit(&event);
    }

    fn emit(&self, event: &LogEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }
}

/// A builder for configuring [`RotatingFileWriter`].
#[derive(Debug)]
pub(crate) struct RotatingFileWriterBuilder {
    // required
    basedir: PathBuf,
    naming: FileNaming,
    category: Category,

    // has default
    max_size: Option<NonZeroUsize>,
    min_size: Option<u64>,
    sink: Option<Arc<dyn EventSink>>,
    clock: Clock,
    trap: Arc<dyn Trap>,
}

impl RotatingFileWriterBuilder {
    pub(crate) fn new(basedir: impl Into<PathBuf>, naming: FileNaming, category: Category) -> Self {
        Self {
            basedir: basedir.into(),
            naming,
            category,
            max_size: None,
            min_size: None,
            sink: None,
            clock: Clock::DefaultClock,
            trap: default_trap(),
        }
    }

    pub(crate) fn max_file_size(mut self, n: Option<NonZeroUsize>) -> Self {
        self.max_size = n;
        self
    }

    pub(crate) fn min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    pub(crate) fn sink(mut self, sink: Option<Arc<dyn EventSink>>) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn trap(mut self, trap: Arc<dyn Trap>) -> Self {
        self.trap = trap;
        self
    }

    pub(crate) fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn build(self) -> Result<RotatingFileWriter, Error> {
        let Self {
            basedir,
            naming,
            category,
            max_size,
            min_size,
            sink,
            clock,
            trap,
        } = self;

        let hooks = RotationHooks {
            category,
            min_size,
            sink,
            trap,
        };
        let (state, writer) = State::new(basedir, naming, max_size, clock, hooks)?;
        Ok(RotatingFileWriter { state, writer })
    }
}

#[derive(Debug)]
struct State {
    log_dir: PathBuf,
    naming: FileNaming,
    current_path: PathBuf,
    current_date: Date,
    current_count: usize,
    current_filesize: usize,
    next_date_timestamp: i64,
    max_size: Option<NonZeroUsize>,
    clock: Clock,
    hooks: RotationHooks,
}

impl State {
    fn new(
        log_dir: PathBuf,
        naming: FileNaming,
        max_size: Option<NonZeroUsize>,
        clock: Clock,
        hooks: RotationHooks,
    ) -> Result<(Self, File), Error> {
        let now = clock.now();
        fs::create_dir_all(&log_dir).map_err(|err| {
            Error::new("failed to create log directory")
                .with_context("dir", log_dir.display())
                .with_source(err)
        })?;

        let current_date = now.date();
        let current_path = log_dir.join(naming.filename(current_date, 0));
        let mut state = State {
            log_dir,
            naming,
            current_path,
            current_date,
            current_count: 0,
            current_filesize: 0,
            next_date_timestamp: next_date_timestamp(&now),
            max_size,
            clock,
            hooks,
        };

        let (file, created) = open_log_file(&state.current_path)?;
        if created {
            state.hooks.on_new_file(&state.current_path);
        } else {
            // continue to use the file of today left by a previous run
            state.current_filesize = file
                .metadata()
                .map(|metadata| metadata.len() as usize)
                .unwrap_or_default();
        }

        Ok((state, file))
    }

    fn next_path(&mut self) -> PathBuf {
        loop {
            let path = self
                .log_dir
                .join(self.naming.filename(self.current_date, self.current_count));
            // after a size rollover, skip files left over by a previous run of the same day
            if self.current_count == 0 || !path.exists() {
                return path;
            }
            self.current_count += 1;
        }
    }

    fn refresh_writer(&mut self, file: &mut File) {
        let new_path = self.next_path();
        match open_log_file(&new_path) {
            Ok((new_file, created)) => {
                if let Err(err) = file.flush() {
                    let err = Error::new("failed to flush previous writer").with_source(err);
                    self.hooks.trap.trap(&err);
                }
                // the old handle is closed here, before the hooks inspect the old file
                drop(std::mem::replace(file, new_file));
                let old_path = std::mem::replace(&mut self.current_path, new_path);
                if !created {
                    self.current_filesize = file
                        .metadata()
                        .map(|metadata| metadata.len() as usize)
                        .unwrap_or_default();
                }

                self.hooks.on_new_file(&self.current_path);
                self.hooks.on_rotate(&old_path, &self.current_path);
            }
            Err(err) => {
                let err = Error::new("failed to rotate log writer").with_source(err);
                self.hooks.trap.trap(&err);
            }
        }
    }

    fn should_rollover_on_date(&self, now: &Zoned) -> bool {
        now.timestamp().as_millisecond() >= self.next_date_timestamp
    }

    fn should_rollover_on_size(&self) -> bool {
        self.max_size
            .is_some_and(|n| self.current_filesize >= n.get())
    }

    fn advance_count(&mut self) {
        self.current_count += 1;
        self.current_filesize = 0;
    }

    fn advance_date(&mut self, now: &Zoned) {
        self.current_date = now.date();
        self.current_count = 0;
        self.current_filesize = 0;
        self.next_date_timestamp = next_date_timestamp(now);
    }
}

/// Milliseconds since the epoch of the next local midnight after `now`.
fn next_date_timestamp(now: &Zoned) -> i64 {
    now.date()
        .tomorrow()
        .and_then(|date| date.to_zoned(now.time_zone().clone()))
        .map(|midnight| midnight.timestamp().as_millisecond())
        .unwrap_or(i64::MAX)
}

fn open_log_file(path: &Path) -> Result<(File, bool), Error> {
    let existed = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            Error::new("failed to create log file")
                .with_context("path", path.display())
                .with_source(err)
        })?;
    Ok((file, !existed))
}
