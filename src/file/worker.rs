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

use std::io;
use std::io::Write;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvError;
use crossbeam_channel::TryRecvError;

use crate::Error;
use crate::Trap;
use crate::file::non_blocking::Message;

pub(crate) struct Worker<T: Write + Send + 'static> {
    writer: T,
    receiver: Receiver<Message>,
    shutdown: Receiver<()>,
    trap: Arc<dyn Trap>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum WorkerState {
    Empty,
    Disconnected,
    Continue,
    Shutdown,
}

impl<T: Write + Send + 'static> Worker<T> {
    pub(crate) fn new(
        writer: T,
        receiver: Receiver<Message>,
        shutdown: Receiver<()>,
        trap: Arc<dyn Trap>,
    ) -> Worker<T> {
        Self {
            writer,
            receiver,
            shutdown,
            trap,
        }
    }

    fn handle(&mut self, message: Message) -> io::Result<WorkerState> {
        match message {
            Message::Record(record) => {
                self.writer.write_all(&record)?;
                Ok(WorkerState::Continue)
            }
            Message::Flush(done) => {
                self.writer.flush()?;
                let _ = done.send(());
                Ok(WorkerState::Continue)
            }
            Message::Shutdown => Ok(WorkerState::Shutdown),
        }
    }

    fn recv(&mut self) -> io::Result<WorkerState> {
        match self.receiver.recv() {
            Ok(message) => self.handle(message),
            Err(RecvError) => Ok(WorkerState::Disconnected),
        }
    }

    fn try_recv(&mut self) -> io::Result<WorkerState> {
        match self.receiver.try_recv() {
            Ok(message) => self.handle(message),
            Err(TryRecvError::Empty) => Ok(WorkerState::Empty),
            Err(TryRecvError::Disconnected) => Ok(WorkerState::Disconnected),
        }
    }

    pub(crate) fn work(&mut self) -> io::Result<WorkerState> {
        let mut worker_state = self.recv()?;

        while worker_state == WorkerState::Continue {
            worker_state = self.try_recv()?;
        }

        self.writer.flush()?;
        Ok(worker_state)
    }

    pub(crate) fn make_thread(mut self, name: String) -> io::Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new().name(name).spawn(move || {
            loop {
                match self.work() {
                    Ok(WorkerState::Continue) | Ok(WorkerState::Empty) => {}
                    Ok(WorkerState::Shutdown) | Ok(WorkerState::Disconnected) => {
                        let _ = self.shutdown.recv();
                        break;
                    }
                    Err(err) => {
                        let err = Error::new("failed to write log").with_source(err);
                        self.trap.trap(&err);
                    }
                }
            }
            if let Err(err) = self.writer.flush() {
                let err = Error::new("failed to flush log").with_source(err);
                self.trap.trap(&err);
            }
        })
    }
}
