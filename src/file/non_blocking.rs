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

use std::io::Write;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::SendTimeoutError;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;
use crossbeam_channel::unbounded;

use crate::Error;
use crate::Trap;
use crate::file::worker::Worker;

#[derive(Debug)]
pub(crate) enum Message {
    Record(Vec<u8>),
    Flush(Sender<()>),
    Shutdown,
}

/// A guard that flushes and closes the writer of a [`NonBlocking`] channel.
///
/// [`WorkerGuard::close`] blocks until every pending record is written and the file is closed.
/// Dropping the guard without closing it waits for the worker at most for the shutdown timeout.
#[derive(Debug)]
pub(crate) struct WorkerGuard {
    handle: Option<JoinHandle<()>>,
    sender: Sender<Message>,
    shutdown: Sender<()>,
    shutdown_timeout: Duration,
    trap: Arc<dyn Trap>,
}

impl WorkerGuard {
    fn new(
        handle: JoinHandle<()>,
        sender: Sender<Message>,
        shutdown: Sender<()>,
        trap: Arc<dyn Trap>,
    ) -> Self {
        const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(100);

        WorkerGuard {
            handle: Some(handle),
            sender,
            shutdown,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            trap,
        }
    }

    pub(crate) fn close(mut self) -> Result<(), Error> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        // a disconnected channel means the worker is already gone
        if self.sender.send(Message::Shutdown).is_ok() {
            let _ = self.shutdown.send(());
        }

        handle
            .join()
            .map_err(|_| Error::new("log writer thread panicked"))
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }

        let shutdown_timeout = self.shutdown_timeout;
        match self
            .sender
            .send_timeout(Message::Shutdown, shutdown_timeout)
        {
            Ok(()) => {
                // Attempt to wait for `Worker` to flush all messages before dropping. This happens
                // when the `Worker` calls `recv()` on a zero-capacity channel. Use `send_timeout`
                // so that drop is not blocked indefinitely.
                let _ = self.shutdown.send_timeout((), shutdown_timeout);
            }
            Err(SendTimeoutError::Disconnected(_)) => (),
            Err(SendTimeoutError::Timeout(_)) => {
                let err = Error::new("failed to send shutdown signal to logging worker");
                self.trap.trap(&err);
            }
        }
    }
}

/// A writer handle that hands records over to a dedicated thread.
#[derive(Clone, Debug)]
pub(crate) struct NonBlocking {
    sender: Sender<Message>,
}

impl NonBlocking {
    pub(crate) fn create<T: Write + Send + 'static>(
        writer: T,
        thread_name: String,
        buffered_lines_limit: Option<usize>,
        trap: Arc<dyn Trap>,
    ) -> Result<(NonBlocking, WorkerGuard), Error> {
        let (sender, receiver) = match buffered_lines_limit {
            Some(cap) => bounded(cap),
            None => unbounded(),
        };

        let (shutdown_sender, shutdown_receiver) = bounded(0);

        let worker = Worker::new(writer, receiver, shutdown_receiver, trap.clone());
        let handle = worker.make_thread(thread_name).map_err(|err| {
            Error::new("failed to spawn the non-blocking log writer thread").with_source(err)
        })?;
        let worker_guard = WorkerGuard::new(handle, sender.clone(), shutdown_sender, trap);

        Ok((Self { sender }, worker_guard))
    }

    pub(crate) fn send(&self, record: Vec<u8>) -> Result<(), Error> {
        self.sender
            .send(Message::Record(record))
            .map_err(|err| Error::new("failed to send log message").with_source(err))
    }

    /// Block until every record sent so far is flushed to the file.
    pub(crate) fn flush(&self) -> Result<(), Error> {
        let (done, wait) = bounded(1);
        self.sender
            .send(Message::Flush(done))
            .map_err(|err| Error::new("failed to send flush request").with_source(err))?;
        wait.recv()
            .map_err(|err| Error::new("log writer stopped before flushing").with_source(err))
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::trap::default_trap;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_close_writes_everything_in_order() {
        let buf = Shared::default();
        let (writer, guard) =
            NonBlocking::create(buf.clone(), "test-writer".into(), None, default_trap()).unwrap();
        for i in 0..100 {
            writer.send(format!("{i}\n").into_bytes()).unwrap();
        }
        guard.close().unwrap();

        let expected = (0..100).map(|i| format!("{i}\n")).collect::<String>();
        assert_eq!(String::from_utf8(buf.0.lock().unwrap().clone()).unwrap(), expected);
        assert!(writer.send(b"late\n".to_vec()).is_err());
    }

    #[test]
    fn test_flush_waits_for_pending_records() {
        let buf = Shared::default();
        let (writer, guard) =
            NonBlocking::create(buf.clone(), "test-writer".into(), Some(8), default_trap())
                .unwrap();
        writer.send(b"one\n".to_vec()).unwrap();
        writer.send(b"two\n".to_vec()).unwrap();
        writer.flush().unwrap();
        assert_eq!(buf.0.lock().unwrap().as_slice(), b"one\ntwo\n");
        guard.close().unwrap();
    }

    #[derive(Debug, Default)]
    struct Collect(Mutex<Vec<String>>);

    impl Trap for Collect {
        fn trap(&self, err: &Error) {
            self.0.lock().unwrap().push(err.to_string());
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk is gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failures_go_to_the_trap() {
        let trap = Arc::new(Collect::default());
        let (writer, guard) =
            NonBlocking::create(Broken, "test-writer".into(), None, trap.clone()).unwrap();
        writer.send(b"one\n".to_vec()).unwrap();
        writer.send(b"two\n".to_vec()).unwrap();
        guard.close().unwrap();

        let trapped = trap.0.lock().unwrap().clone();
        assert_eq!(trapped.len(), 2);
        assert!(trapped.iter().all(|err| err.contains("failed to write log")));
        assert!(trapped.iter().all(|err| err.contains("disk is gone")));
    }
}
