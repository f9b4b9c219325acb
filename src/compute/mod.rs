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

//! Compute API: servers, flavors and images.
//!
//! Implement [ComputeApi](trait.ComputeApi.html) on top of your HTTP client,
//! then use [Compute](struct.Compute.html) to wait for server state changes
//! and to list resources across pages.

use async_trait::async_trait;

use crate::common::{DeletionWaiter, ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

mod protocol;

pub use self::protocol::{Flavor, ImageSummary, Ref, Server, ServerStatus, ServerSummary};

/// States in which a server will not become active without an intervention.
pub const SERVER_FATAL_STATES: &[ServerStatus] = &[
    ServerStatus::Error,
    ServerStatus::Unknown,
    ServerStatus::Suspended,
];

/// Calls to the Compute API.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Get a server by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the server does not exist.
    async fn get_server(&self, id: &str) -> Result<Server>;

    /// List one page of server summaries.
    async fn list_servers(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<ServerSummary>>;

    /// List one page of servers with details.
    async fn list_servers_detailed(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Server>>;

    /// List one page of flavors.
    async fn list_flavors(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Flavor>>;

    /// List one page of images.
    async fn list_images(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<ImageSummary>>;
}

status_source! {
    #[doc = "Source of server status."]
    ServerSource: ComputeApi::get_server -> Server
}

list_query! {
    #[doc = "A query to server list."]
    ServerQuery: ComputeApi::list_servers -> ServerSummary, marker id, limit 100
}

list_query! {
    #[doc = "A query to detailed server list."]
    DetailedServerQuery: ComputeApi::list_servers_detailed -> Server, marker id, limit 100
}

list_query! {
    #[doc = "A query to flavor list."]
    FlavorQuery: ComputeApi::list_flavors -> Flavor, marker id, limit 100
}

list_query! {
    #[doc = "A query to image list."]
    ImageQuery: ComputeApi::list_images -> ImageSummary, marker id, limit 100
}

/// Waiters and listings for the Compute API.
#[derive(Debug, Clone)]
pub struct Compute<P> {
    provider: P,
    config: Config,
}

impl<P: ComputeApi> Compute<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> Compute<P> {
        Compute {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> Compute<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for a server to reach the target status.
    ///
    /// Fails if the server gets into `ERROR`, `UNKNOWN` or `SUSPENDED`
    /// (unless it is the target).
    pub fn wait_for_server_state<Id: Into<String>>(
        &self,
        id: Id,
        target: ServerStatus,
    ) -> StateWaiter<ServerSource<'_, P>> {
        StateWaiter::new(ServerSource(&self.provider), id, vec![target])
            .with_fatal_states(
                SERVER_FATAL_STATES
                    .iter()
                    .copied()
                    .filter(|state| *state != target),
            )
            .with_settings(self.config.settings(ResourceKind::Server))
    }

    /// Wait for a server to become `ACTIVE`, e.g. after a build or a reboot.
    ///
    /// ```rust,no_run
    /// # async fn example<P: rackstack::compute::ComputeApi>(provider: P) -> rackstack::Result<()> {
    /// use std::time::Duration;
    ///
    /// let compute = rackstack::compute::Compute::new(provider);
    /// let server = compute
    ///     .wait_for_server_active("srv-1")
    ///     .with_timeout(Duration::from_secs(1800))
    ///     .wait()
    ///     .await?;
    /// assert_eq!(server.status, rackstack::compute::ServerStatus::Active);
    /// # Ok(()) }
    /// ```
    #[inline]
    pub fn wait_for_server_active<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<ServerSource<'_, P>> {
        self.wait_for_server_state(id, ServerStatus::Active)
    }

    /// Wait for a resized server to become `VERIFY_RESIZE`.
    #[inline]
    pub fn wait_for_server_verify_resize<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<ServerSource<'_, P>> {
        self.wait_for_server_state(id, ServerStatus::VerifyingResize)
    }

    /// Wait for a server to become `SHUTOFF`.
    #[inline]
    pub fn wait_for_server_shut_off<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<ServerSource<'_, P>> {
        self.wait_for_server_state(id, ServerStatus::ShutOff)
    }

    /// Wait for a server to be deleted.
    ///
    /// Finishes once the server is `DELETED`, `SOFT_DELETED` or cannot be found.
    pub fn wait_for_server_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<ServerSource<'_, P>> {
        DeletionWaiter::new(ServerSource(&self.provider), id)
            .with_target_state(ServerStatus::Deleted)
            .with_target_state(ServerStatus::SoftDeleted)
            .with_fatal_state(ServerStatus::Error)
            .with_settings(self.config.settings(ResourceKind::Server))
    }

    /// List all servers.
    pub fn list_all_servers(&self) -> Result<ResourceIterator<ServerQuery<'_, P>>> {
        ResourceIterator::new(ServerQuery(&self.provider), self.config.page_size())
    }

    /// List all servers with details.
    pub fn list_all_servers_with_details(
        &self,
    ) -> Result<ResourceIterator<DetailedServerQuery<'_, P>>> {
        ResourceIterator::new(DetailedServerQuery(&self.provider), self.config.page_size())
    }

    /// List all flavors.
    pub fn list_all_flavors(&self) -> Result<ResourceIterator<FlavorQuery<'_, P>>> {
        ResourceIterator::new(FlavorQuery(&self.provider), self.config.page_size())
    }

    /// List all images.
    pub fn list_all_images(&self) -> Result<ResourceIterator<ImageQuery<'_, P>>> {
        ResourceIterator::new(ImageQuery(&self.provider), self.config.page_size())
    }
}
