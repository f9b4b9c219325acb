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

//! Waiters.

use std::fmt::{self, Debug};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::{self, Either};
use tokio_util::sync::CancellationToken;

use super::types::{FetchStatus, Stateful};
use crate::config::WaitSettings;
use crate::{Error, ErrorKind, Result};

/// How to treat a resource that cannot be found while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// A missing resource is an error (propagated as is).
    #[default]
    Error,
    /// A missing resource means that the deletion has finished.
    Deleted,
}

/// Result of a successful wait.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    /// The resource reached one of the target states.
    Reached(T),
    /// The resource no longer exists.
    Deleted,
}

impl<T> WaitOutcome<T> {
    /// Get the resource if it reached a target state.
    #[inline]
    pub fn into_entity(self) -> Option<T> {
        match self {
            WaitOutcome::Reached(entity) => Some(entity),
            WaitOutcome::Deleted => None,
        }
    }

    /// Whether the outcome is the deletion sentinel.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, WaitOutcome::Deleted)
    }
}

/// A single polling operation.
#[derive(Debug, Clone)]
pub struct PollRequest<S> {
    /// ID of the resource to watch.
    pub entity_id: String,
    /// States that finish the wait successfully.
    pub target_states: Vec<S>,
    /// States that abort the wait.
    pub fatal_states: Vec<S>,
    /// Delay between two fetches.
    pub poll_interval: Duration,
    /// Total time to wait (`None` to wait forever).
    pub timeout: Option<Duration>,
    /// What a missing resource means.
    pub not_found: NotFoundPolicy,
}

impl<S: PartialEq + Debug> PollRequest<S> {
    /// Create a request with the default settings.
    pub fn new<Id: Into<String>>(entity_id: Id, target_states: Vec<S>) -> PollRequest<S> {
        let settings = WaitSettings::default();
        PollRequest {
            entity_id: entity_id.into(),
            target_states,
            fatal_states: Vec::new(),
            poll_interval: settings.poll_interval,
            timeout: settings.timeout,
            not_found: NotFoundPolicy::Error,
        }
    }

    /// Check that the request is consistent.
    pub fn validate(&self) -> Result<()> {
        if self.target_states.is_empty() && self.not_found != NotFoundPolicy::Deleted {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("No target states provided for resource {}", self.entity_id),
            ));
        }

        if let Some(state) = self
            .target_states
            .iter()
            .find(|state| self.fatal_states.contains(state))
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("State {:?} is both a target and a fatal state", state),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Poll interval must be positive",
            ));
        }

        Ok(())
    }

    #[inline]
    pub(crate) fn apply_settings(&mut self, settings: WaitSettings) {
        self.poll_interval = settings.poll_interval;
        self.timeout = settings.timeout;
    }
}

/// A way to pause between two polls.
///
/// The waiting logic is implemented once against this trait. Use
/// [TokioDelay](struct.TokioDelay.html) inside a tokio runtime and
/// [BlockingDelay](../sync/struct.BlockingDelay.html) for blocking code.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Current time according to this delay's clock.
    fn now(&self) -> Instant;

    /// Wait for the duration.
    ///
    /// Must fail with `OperationCancelled` if the token is cancelled before
    /// the duration passes.
    async fn delay(&self, duration: Duration, cancel: &CancellationToken) -> Result<()>;
}

/// Delay using the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn delay(&self, duration: Duration, cancel: &CancellationToken) -> Result<()> {
        let sleep = Box::pin(tokio::time::sleep(duration));
        let cancelled = Box::pin(cancel.cancelled());
        match future::select(cancelled, sleep).await {
            Either::Left(..) => Err(cancelled_error()),
            Either::Right(..) => Ok(()),
        }
    }
}

pub(crate) fn cancelled_error() -> Error {
    Error::new(ErrorKind::OperationCancelled, "Cancelled by the caller")
}

/// Wait for a resource to reach one of the target states.
///
/// Fetches the resource immediately and then every `poll_interval` until:
///
/// * its state is one of `target_states` - returns `WaitOutcome::Reached`,
/// * its state is one of `fatal_states` - fails with `OperationFailed`, the
///   error carries the resource (see `Error::last_seen`),
/// * it is not found and `not_found` is `NotFoundPolicy::Deleted` - returns
///   `WaitOutcome::Deleted`,
/// * `timeout` passes - fails with `OperationTimedOut`,
/// * `cancel` is cancelled - fails with `OperationCancelled`.
///
/// Errors from `source` are never retried.
pub async fn wait_for_state<F, D>(
    source: &F,
    request: &PollRequest<<F::Entity as Stateful>::State>,
    delay: &D,
    cancel: &CancellationToken,
) -> Result<WaitOutcome<F::Entity>>
where
    F: FetchStatus + ?Sized,
    D: Delay + ?Sized,
{
    request.validate()?;

    let id = &request.entity_id;
    let started = delay.now();
    let mut attempt = 0usize;
    loop {
        if cancel.is_cancelled() {
            debug!("Waiting for resource {} was cancelled", id);
            return Err(cancelled_error());
        }

        attempt += 1;
        let entity = match source.fetch_status(id).await {
            Ok(entity) => entity,
            Err(ref e)
                if e.kind() == ErrorKind::ResourceNotFound
                    && request.not_found == NotFoundPolicy::Deleted =>
            {
                debug!("Resource {} was deleted", id);
                return Ok(WaitOutcome::Deleted);
            }
            Err(e) => {
                debug!("Failed to fetch resource {} - {}", id, e);
                return Err(e);
            }
        };

        let state = entity.state();
        if request.target_states.contains(&state) {
            debug!(
                "Resource {} reached state {} after {} attempt(s)",
                id, state, attempt
            );
            return Ok(WaitOutcome::Reached(entity));
        }

        if request.fatal_states.contains(&state) {
            debug!("Resource {} got into fatal state {}", id, state);
            return Err(Error::new_unexpected_state(
                format!("Resource {}", id),
                state.to_string(),
                entity,
            ));
        }

        if let Some(timeout) = request.timeout {
            if delay.now().saturating_duration_since(started) >= timeout {
                debug!(
                    "Timeout waiting for resource {} to reach {:?}, last state {}",
                    id, request.target_states, state
                );
                return Err(Error::new(
                    ErrorKind::OperationTimedOut,
                    format!(
                        "Timeout waiting for resource {} to reach {:?}, current state is {}",
                        id, request.target_states, state
                    ),
                ));
            }
        }

        trace!(
            "Still waiting for resource {} to get to {:?}, current is {}",
            id,
            request.target_states,
            state
        );
        delay.delay(request.poll_interval, cancel).await?;
    }
}

/// Waiter for a resource to reach a certain state.
///
/// Usually created by one of the `wait_for_*` calls of a service manager.
pub struct StateWaiter<F: FetchStatus> {
    source: F,
    request: PollRequest<<F::Entity as Stateful>::State>,
    cancel: CancellationToken,
}

impl<F: FetchStatus + Debug> Debug for StateWaiter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateWaiter")
            .field("source", &self.source)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl<F: FetchStatus> StateWaiter<F> {
    /// Create a waiter with default settings.
    pub fn new<Id: Into<String>>(
        source: F,
        id: Id,
        target_states: Vec<<F::Entity as Stateful>::State>,
    ) -> StateWaiter<F> {
        StateWaiter {
            source,
            request: PollRequest::new(id, target_states),
            cancel: CancellationToken::new(),
        }
    }

    /// The underlying request.
    #[inline]
    pub fn request(&self) -> &PollRequest<<F::Entity as Stateful>::State> {
        &self.request
    }

    /// Add a target state.
    pub fn with_target_state(mut self, state: <F::Entity as Stateful>::State) -> Self {
        self.request.target_states.push(state);
        self
    }

    /// Add a fatal state.
    pub fn with_fatal_state(mut self, state: <F::Entity as Stateful>::State) -> Self {
        self.request.fatal_states.push(state);
        self
    }

    /// Replace fatal states.
    pub fn with_fatal_states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = <F::Entity as Stateful>::State>,
    {
        self.request.fatal_states = states.into_iter().collect();
        self
    }

    /// Set delay between two fetches.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.request.poll_interval = poll_interval;
        self
    }

    /// Set the maximum time to wait.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    /// Wait without a time limit.
    pub fn without_timeout(mut self) -> Self {
        self.request.timeout = None;
        self
    }

    /// Use the settings (poll interval and timeout).
    pub fn with_settings(mut self, settings: WaitSettings) -> Self {
        self.request.apply_settings(settings);
        self
    }

    /// Abort waiting when the token is cancelled.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Wait using the tokio timer.
    pub async fn wait(self) -> Result<F::Entity> {
        self.wait_with(&TokioDelay).await
    }

    /// Wait using the provided delay implementation.
    pub async fn wait_with<D: Delay + ?Sized>(self, delay: &D) -> Result<F::Entity> {
        let outcome = wait_for_state(&self.source, &self.request, delay, &self.cancel).await?;
        match outcome {
            WaitOutcome::Reached(entity) => Ok(entity),
            // Cannot happen with NotFoundPolicy::Error.
            WaitOutcome::Deleted => Err(Error::new_not_found(&self.request.entity_id)),
        }
    }
}

/// Wait for resource deletion.
///
/// The deletion is considered finished once the resource can no longer be
/// found or once it reaches one of the target states (e.g. `DELETED`).
pub struct DeletionWaiter<F: FetchStatus> {
    inner: StateWaiter<F>,
}

impl<F: FetchStatus + Debug> Debug for DeletionWaiter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeletionWaiter")
            .field("source", &self.inner.source)
            .field("request", &self.inner.request)
            .finish_non_exhaustive()
    }
}

impl<F: FetchStatus> DeletionWaiter<F> {
    /// Create a deletion waiter with default settings.
    pub fn new<Id: Into<String>>(source: F, id: Id) -> DeletionWaiter<F> {
        let mut inner = StateWaiter::new(source, id, Vec::new());
        inner.request.not_found = NotFoundPolicy::Deleted;
        DeletionWaiter { inner }
    }

    /// The underlying request.
    #[inline]
    pub fn request(&self) -> &PollRequest<<F::Entity as Stateful>::State> {
        &self.inner.request
    }

    /// Add a state that also means that the resource is deleted.
    pub fn with_target_state(self, state: <F::Entity as Stateful>::State) -> Self {
        DeletionWaiter {
            inner: self.inner.with_target_state(state),
        }
    }

    /// Add a fatal state.
    pub fn with_fatal_state(self, state: <F::Entity as Stateful>::State) -> Self {
        DeletionWaiter {
            inner: self.inner.with_fatal_state(state),
        }
    }

    /// Set delay between two fetches.
    pub fn with_poll_interval(self, poll_interval: Duration) -> Self {
        DeletionWaiter {
            inner: self.inner.with_poll_interval(poll_interval),
        }
    }

    /// Set the maximum time to wait.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        DeletionWaiter {
            inner: self.inner.with_timeout(timeout),
        }
    }

    /// Wait without a time limit.
    pub fn without_timeout(self) -> Self {
        DeletionWaiter {
            inner: self.inner.without_timeout(),
        }
    }

    /// Use the settings (poll interval and timeout).
    pub fn with_settings(self, settings: WaitSettings) -> Self {
        DeletionWaiter {
            inner: self.inner.with_settings(settings),
        }
    }

    /// Abort waiting when the token is cancelled.
    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        DeletionWaiter {
            inner: self.inner.with_cancellation(cancel),
        }
    }

    /// Wait using the tokio timer.
    pub async fn wait(self) -> Result<()> {
        self.wait_with(&TokioDelay).await
    }

    /// Wait using the provided delay implementation.
    pub async fn wait_with<D: Delay + ?Sized>(self, delay: &D) -> Result<()> {
        let inner = self.inner;
        match wait_for_state(&inner.source, &inner.request, delay, &inner.cancel).await? {
            WaitOutcome::Reached(entity) => debug!(
                "Resource {} is considered deleted in state {}",
                inner.request.entity_id,
                entity.state()
            ),
            WaitOutcome::Deleted => {
                trace!("Resource {} no longer exists", inner.request.entity_id)
            }
        }
        Ok(())
    }
}
