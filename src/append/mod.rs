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

//! Dispatch log records to various targets.

use std::fmt;

use crate::Error;
use crate::record::Record;

mod memory;
mod stdio;

pub use self::memory::Memory;
pub use self::stdio::Stdout;

/// An appender that can process log records.
pub trait Append: fmt::Debug + Send + Sync + 'static {
    /// Dispatch a log record to the append target.
    fn append(&self, record: &Record) -> Result<(), Error>;

    /// Flush any buffered records.
    ///
    /// Default to a no-op.
    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Flush and release the target. Returns once every pending record is written.
    ///
    /// Default to [`Append::flush`].
    fn close(&self) -> Result<(), Error> {
        self.flush()
    }
}

impl<T: Append> From<T> for Box<dyn Append> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Close the appenders one after another, each fully before the next starts.
///
/// Every appender is closed even if an earlier one fails; the first error is returned.
pub(crate) fn close_in_order(appenders: &[&dyn Append]) -> Result<(), Error> {
    let mut result = Ok(());
    for append in appenders {
        if let Err(err) = append.close() {
            if result.is_ok() {
                result = Err(err);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[derive(Debug)]
    struct Slow {
        name: &'static str,
        delay: Duration,
        journal: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Append for Slow {
        fn append(&self, _: &Record) -> Result<(), Error> {
            Ok(())
        }

        fn close(&self) -> Result<(), Error> {
            self.journal.lock().unwrap().push(format!("{} start", self.name));
            thread::sleep(self.delay);
            self.journal.lock().unwrap().push(format!("{} done", self.name));
            if self.fail {
                return Err(Error::new(format!("{} failed", self.name)));
            }
            Ok(())
        }
    }

    #[test]
    fn test_close_in_order_is_sequential() {
        let journal = Arc::new(Mutex::new(vec![]));
        let success = Slow {
            name: "success",
            delay: Duration::from_millis(50),
            journal: journal.clone(),
            fail: true,
        };
        let error = Slow {
            name: "error",
            delay: Duration::ZERO,
            journal: journal.clone(),
            fail: false,
        };

        let err = close_in_order(&[&success, &error]).unwrap_err();
        assert_eq!(err.message(), "success failed");
        assert_eq!(
            *journal.lock().unwrap(),
            ["success start", "success done", "error start", "error done"]
        );
    }
}
