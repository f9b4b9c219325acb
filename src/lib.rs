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

//! Long-running operation waiters and paginated listings for Rackspace and
//! OpenStack clouds.
//!
//! Most cloud APIs answer a mutating call (create a server, delete a volume)
//! right away with a resource that is still being processed. This crate
//! provides the two primitives every service binding needs on top of that:
//!
//! * [`StateWaiter`](common/struct.StateWaiter.html) and
//!   [`DeletionWaiter`](common/struct.DeletionWaiter.html) poll a resource
//!   until it reaches the expected state, fails, disappears or times out.
//! * [`ResourceIterator`](common/struct.ResourceIterator.html) turns a
//!   marker-based paginated listing into one lazy stream.
//!
//! HTTP transport and authentication are not part of this crate. Each
//! service module defines a provider trait (e.g.
//! [`ComputeApi`](compute/trait.ComputeApi.html)) with one call per resource
//! fetch or page fetch; implement it on top of your HTTP client and wrap it
//! in the service manager to get the waiters and listings.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example<P: rackstack::compute::ComputeApi>(provider: P) -> rackstack::Result<()> {
//! use futures::TryStreamExt;
//!
//! let compute = rackstack::compute::Compute::new(provider);
//! let server = compute.wait_for_server_active("srv-1").wait().await?;
//! println!("Server {} is {}", server.id, server.status);
//!
//! let servers = compute.list_all_servers()?.into_stream();
//! futures::pin_mut!(servers);
//! while let Some(summary) = servers.try_next().await? {
//!     println!("{}", summary.name);
//! }
//! # Ok(()) }
//! ```

#![crate_name = "rackstack"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

#[cfg(feature = "block-storage")]
pub mod block_storage;
pub mod common;
#[cfg(feature = "compute")]
pub mod compute;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
#[cfg(feature = "dns")]
pub mod dns;
mod error;
#[cfg(feature = "image")]
pub mod image;
#[cfg(feature = "load-balancer")]
pub mod load_balancer;
#[cfg(feature = "network")]
pub mod network;
#[cfg(feature = "object-storage")]
pub mod object_storage;
#[cfg(feature = "queues")]
pub mod queues;
#[cfg(feature = "sync")]
pub mod sync;

pub use crate::common::{
    DeletionWaiter, FetchStatus, PollRequest, ResourceIterator, ResourceQuery, StateWaiter,
    Stateful, WaitOutcome,
};
pub use crate::config::Config;
pub use crate::error::{Error, ErrorKind, Result};
