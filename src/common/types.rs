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

//! Types and traits shared between services.

use std::fmt::{self, Debug, Display};
use std::future::Future;

use async_trait::async_trait;
use futures::future::{self, Ready};

use crate::Result;

/// Trait representing a resource that has a state (status).
pub trait Stateful {
    /// Type of the state.
    type State: Clone + Debug + Display + PartialEq + Send + Sync + 'static;

    /// Current state of the resource.
    fn state(&self) -> Self::State;
}

/// Trait representing a way to fetch the current representation of a resource.
///
/// If the resource no longer exists, implementations must fail with an error
/// of kind [ResourceNotFound](../enum.ErrorKind.html#variant.ResourceNotFound).
#[async_trait]
pub trait FetchStatus: Send + Sync {
    /// Resource type.
    type Entity: Stateful + Send + Sync + 'static;

    /// Fetch the resource by its ID.
    async fn fetch_status(&self, id: &str) -> Result<Self::Entity>;
}

#[async_trait]
impl<F: FetchStatus + ?Sized> FetchStatus for &F {
    type Entity = F::Entity;

    async fn fetch_status(&self, id: &str) -> Result<Self::Entity> {
        (**self).fetch_status(id).await
    }
}

/// A `FetchStatus` implementation based on a closure.
///
/// Created via [status_fn](fn.status_fn.html) or
/// [status_fn_blocking](fn.status_fn_blocking.html).
#[derive(Clone)]
pub struct StatusFn<F> {
    inner: F,
}

impl<F> Debug for StatusFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusFn").finish_non_exhaustive()
    }
}

/// Use an asynchronous closure accepting a resource ID as a `FetchStatus`.
///
/// ```rust
/// use rackstack::common::{status_fn, StateWaiter};
/// use rackstack::compute::{Server, ServerStatus};
///
/// # async fn example(fetch_server: impl Fn(String) -> std::future::Ready<rackstack::Result<Server>> + Send + Sync) {
/// let source = status_fn(move |id| fetch_server(id));
/// let waiter = StateWaiter::new(source, "srv-1", vec![ServerStatus::Active]);
/// # }
/// ```
pub fn status_fn<F, Fut, T>(func: F) -> StatusFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
    T: Stateful + Send + Sync + 'static,
{
    StatusFn { inner: func }
}

/// Use a blocking closure accepting a resource ID as a `FetchStatus`.
///
/// Mostly useful together with the [sync](../sync/index.html) adapters.
pub fn status_fn_blocking<F, T>(
    func: F,
) -> StatusFn<impl Fn(String) -> Ready<Result<T>> + Send + Sync>
where
    F: Fn(&str) -> Result<T> + Send + Sync,
    T: Stateful + Send + Sync + 'static,
{
    StatusFn {
        inner: move |id: String| future::ready(func(&id)),
    }
}

#[async_trait]
impl<F, Fut, T> FetchStatus for StatusFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send,
    T: Stateful + Send + Sync + 'static,
{
    type Entity = T;

    async fn fetch_status(&self, id: &str) -> Result<T> {
        (self.inner)(id.to_string()).await
    }
}
