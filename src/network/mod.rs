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

//! Network API.

use async_trait::async_trait;

use crate::common::{ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

mod protocol;

pub use self::protocol::{Network, NetworkStatus};

/// Calls to the Network API.
#[async_trait]
pub trait NetworkApi: Send + Sync {
    /// Get a network by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the network does not exist.
    async fn get_network(&self, id: &str) -> Result<Network>;

    /// List one page of networks.
    async fn list_networks(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Network>>;
}

status_source! {
    #[doc = "Source of network status."]
    NetworkSource: NetworkApi::get_network -> Network
}

list_query! {
    #[doc = "A query to network list."]
    NetworkQuery: NetworkApi::list_networks -> Network, marker id, limit 100
}

/// Waiters and listings for the Network API.
#[derive(Debug, Clone)]
pub struct Networks<P> {
    provider: P,
    config: Config,
}

impl<P: NetworkApi> Networks<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> Networks<P> {
        Networks {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> Networks<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for a network to become `ACTIVE`, failing on `ERROR`.
    pub fn wait_for_network_active<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<NetworkSource<'_, P>> {
        StateWaiter::new(
            NetworkSource(&self.provider),
            id,
            vec![NetworkStatus::Active],
        )
        .with_fatal_state(NetworkStatus::Error)
        .with_settings(self.config.settings(ResourceKind::Network))
    }

    /// List all networks.
    pub fn list_all_networks(&self) -> Result<ResourceIterator<NetworkQuery<'_, P>>> {
        ResourceIterator::new(NetworkQuery(&self.provider), self.config.page_size())
    }
}
