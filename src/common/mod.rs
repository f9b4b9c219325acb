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

//! Types and traits shared by all services.

mod resourceiterator;
mod types;
mod waiter;

pub use self::resourceiterator::{page_fn, PageFn, ResourceIterator, ResourceQuery};
pub use self::types::{status_fn, status_fn_blocking, FetchStatus, StatusFn, Stateful};
pub use self::waiter::{
    wait_for_state, Delay, DeletionWaiter, NotFoundPolicy, PollRequest, StateWaiter,
    TokioDelay, WaitOutcome,
};
pub(crate) use self::waiter::cancelled_error;
