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

//! Traps for errors raised on best-effort paths.
//!
//! Pruning, rotation and writes issued from the logging facade never return errors to the
//! caller. They are handed to a [`Trap`] instead, which by default reports them on stderr.

use std::fmt;
use std::io;
use std::io::Write;
use std::sync::Arc;

use crate::Error;

/// A handler for errors that cannot be propagated to the caller.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error.
    fn trap(&self, err: &Error);
}

/// A default trap that sends errors to standard error if possible.
///
/// If standard error is not available, it does nothing.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct DefaultTrap {}

impl Trap for DefaultTrap {
    fn trap(&self, err: &Error) {
        let _ = writeln!(io::stderr(), "{err}");
    }
}

pub(crate) fn default_trap() -> Arc<dyn Trap> {
    Arc::new(DefaultTrap::default())
}
