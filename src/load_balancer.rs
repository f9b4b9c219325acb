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

//! Load Balancer API.

use async_trait::async_trait;

use crate::common::{DeletionWaiter, ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

protocol_enum! {
    #[doc = "Possible load balancer statuses."]
    enum LoadBalancerStatus {
        Active = "ACTIVE",
        Build = "BUILD",
        PendingUpdate = "PENDING_UPDATE",
        PendingDelete = "PENDING_DELETE",
        Suspended = "SUSPENDED",
        Deleted = "DELETED",
        Error = "ERROR"
    }
}

/// States in which a load balancer will not become active.
pub const LOAD_BALANCER_FATAL_STATES: &[LoadBalancerStatus] =
    &[LoadBalancerStatus::Error, LoadBalancerStatus::Suspended];

/// A load balancer.
#[derive(Clone, Debug, Deserialize)]
pub struct LoadBalancer {
    /// Unique ID.
    pub id: String,
    /// Load balancer name.
    pub name: String,
    /// Current status.
    pub status: LoadBalancerStatus,
    /// Protocol of the load balancer.
    #[serde(default)]
    pub protocol: Option<String>,
    /// Port of the load balancer.
    #[serde(default)]
    pub port: Option<u16>,
}

stateful_resource!(LoadBalancer, LoadBalancerStatus);

/// Calls to the Load Balancer API.
#[async_trait]
pub trait LoadBalancerApi: Send + Sync {
    /// Get a load balancer by its ID.
    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer>;

    /// List one page of load balancers.
    async fn list_load_balancers(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<LoadBalancer>>;
}

status_source! {
    #[doc = "Source of load balancer status."]
    LoadBalancerSource: LoadBalancerApi::get_load_balancer -> LoadBalancer
}

list_query! {
    #[doc = "A query to load balancer list."]
    LoadBalancerQuery: LoadBalancerApi::list_load_balancers -> LoadBalancer, marker id, limit 100
}

/// Waiters and listings for the Load Balancer API.
#[derive(Debug, Clone)]
pub struct LoadBalancers<P> {
    provider: P,
    config: Config,
}

impl<P: LoadBalancerApi> LoadBalancers<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> LoadBalancers<P> {
        LoadBalancers {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> LoadBalancers<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for a load balancer to become `ACTIVE`.
    pub fn wait_for_load_balancer_active<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<LoadBalancerSource<'_, P>> {
        StateWaiter::new(
            LoadBalancerSource(&self.provider),
            id,
            vec![LoadBalancerStatus::Active],
        )
        .with_fatal_states(LOAD_BALANCER_FATAL_STATES.iter().copied())
        .with_settings(self.config.settings(ResourceKind::LoadBalancer))
    }

    /// Wait for a load balancer to reach `DELETED` or disappear.
    pub fn wait_for_load_balancer_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<LoadBalancerSource<'_, P>> {
        DeletionWaiter::new(LoadBalancerSource(&self.provider), id)
            .with_target_state(LoadBalancerStatus::Deleted)
            .with_fatal_state(LoadBalancerStatus::Error)
            .with_settings(self.config.settings(ResourceKind::LoadBalancer))
    }

    /// List all load balancers.
    pub fn list_all_load_balancers(
        &self,
    ) -> Result<ResourceIterator<LoadBalancerQuery<'_, P>>> {
        ResourceIterator::new(LoadBalancerQuery(&self.provider), self.config.page_size())
    }
}
