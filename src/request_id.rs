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

//! Request-scoped correlation ids.
//!
//! A request id is attached to every record logged while it is in scope. It can be set for the
//! duration of a closure on the current thread with [`scope`], or carried by a future across
//! polls with [`FutureExt::with_request_id`]. An id set explicitly on an
//! [`Entry`](crate::Entry) takes precedence over both.
//!
//! # Examples
//!
//! ```
//! use af_logger::request_id;
//!
//! request_id::scope("req-42", || {
//!     assert_eq!(request_id::current().as_deref(), Some("req-42"));
//! });
//! assert_eq!(request_id::current(), None);
//! ```

use std::cell::RefCell;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

thread_local! {
    static REQUEST_IDS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Guard;

impl Guard {
    fn push(id: String) -> Guard {
        REQUEST_IDS.with(|ids| ids.borrow_mut().push(id));
        Guard
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        REQUEST_IDS.with(|ids| {
            ids.borrow_mut().pop();
        });
    }
}

/// The innermost request id in scope on the current thread.
pub fn current() -> Option<String> {
    REQUEST_IDS.with(|ids| ids.borrow().last().cloned())
}

/// Run `f` with `id` as the current request id. Scopes nest; the outer id is restored when `f`
/// returns or unwinds.
pub fn scope<R>(id: impl Into<String>, f: impl FnOnce() -> R) -> R {
    let _guard = Guard::push(id.into());
    f()
}

/// An extension trait for futures to run them with a request id.
pub trait FutureExt: Future {
    /// Make `id` the current request id whenever this future is polled.
    fn with_request_id(self, id: impl Into<String>) -> impl Future<Output = Self::Output>
    where
        Self: Sized,
    {
        RequestIdFuture {
            future: Some(self),
            id: id.into(),
        }
    }
}

impl<F: Future> FutureExt for F {}

#[pin_project::pin_project]
struct RequestIdFuture<F> {
    #[pin]
    future: Option<F>,
    id: String,
}

impl<F: Future> Future for RequestIdFuture<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let mut fut = this.future;
        if let Some(future) = fut.as_mut().as_pin_mut() {
            let guard = Guard::push(this.id.clone());

            let result = match future.poll(cx) {
                Poll::Ready(output) => {
                    fut.set(None);
                    Poll::Ready(output)
                }
                Poll::Pending => Poll::Pending,
            };

            drop(guard);
            return result;
        }

        unreachable!("RequestIdFuture polled after completion");
    }
}
