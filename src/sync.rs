// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Synchronous (blocking) adapters.
//!
//! The waiting and listing logic is the same as for the asynchronous API,
//! only the way it pauses differs: the current thread is put to sleep instead
//! of yielding to a runtime. The futures are driven by a minimal executor, so
//! providers used here must not rely on a tokio runtime being present.
//!
//! This module is only available when the `sync` feature is enabled.

use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::executor;
use tokio_util::sync::CancellationToken;

use crate::common::{
    cancelled_error, wait_for_state, Delay, DeletionWaiter, FetchStatus, PollRequest,
    ResourceIterator, ResourceQuery, StateWaiter, Stateful, WaitOutcome,
};
use crate::Result;

/// Granularity of cancellation checks while sleeping.
const SLICE: Duration = Duration::from_millis(50);

/// Delay blocking the current thread.
///
/// Checks the cancellation token every 50 milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingDelay;

#[async_trait]
impl Delay for BlockingDelay {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn delay(&self, duration: Duration, cancel: &CancellationToken) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            if cancel.is_cancelled() {
                return Err(cancelled_error());
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }

            thread::sleep(SLICE.min(deadline - now));
        }
    }
}

/// Wait for a resource to reach one of the target states, blocking the thread.
///
/// See [wait_for_state](../common/fn.wait_for_state.html) for details.
pub fn wait_for_state_blocking<F>(
    source: &F,
    request: &PollRequest<<F::Entity as Stateful>::State>,
    cancel: &CancellationToken,
) -> Result<WaitOutcome<F::Entity>>
where
    F: FetchStatus + ?Sized,
{
    executor::block_on(wait_for_state(source, request, &BlockingDelay, cancel))
}

impl<F: FetchStatus> StateWaiter<F> {
    /// Wait, blocking the current thread.
    pub fn wait_blocking(self) -> Result<F::Entity> {
        executor::block_on(self.wait_with(&BlockingDelay))
    }
}

impl<F: FetchStatus> DeletionWaiter<F> {
    /// Wait, blocking the current thread.
    pub fn wait_blocking(self) -> Result<()> {
        executor::block_on(self.wait_with(&BlockingDelay))
    }
}

impl<Q: ResourceQuery> ResourceIterator<Q> {
    /// Convert this iterator into a blocking `Iterator`.
    ///
    /// Pages are fetched lazily, as with [into_stream](#method.into_stream).
    pub fn into_blocking_iter(self) -> impl Iterator<Item = Result<Q::Item>> {
        executor::block_on_stream(Box::pin(self.into_stream()))
    }

    /// Execute the query and return all results, blocking the current thread.
    pub fn all_blocking(self) -> Result<Vec<Q::Item>> {
        self.into_blocking_iter().collect()
    }
}
