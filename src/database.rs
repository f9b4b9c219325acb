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

//! Database API: database instances and flavors.

use async_trait::async_trait;

use crate::common::{DeletionWaiter, ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

protocol_enum! {
    #[doc = "Possible database instance statuses."]
    enum InstanceStatus {
        Active = "ACTIVE",
        Blocked = "BLOCKED",
        Build = "BUILD",
        Failed = "FAILED",
        Reboot = "REBOOT",
        Resize = "RESIZE",
        Shutdown = "SHUTDOWN",
        Error = "ERROR",
        Backup = "BACKUP",
        RestartRequired = "RESTART_REQUIRED"
    }
}

/// States in which an instance will not become active.
pub const INSTANCE_FATAL_STATES: &[InstanceStatus] =
    &[InstanceStatus::Error, InstanceStatus::Failed];

/// Volume of a database instance.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct InstanceVolume {
    /// Size in GiB.
    pub size: u64,
}

/// A database instance.
#[derive(Clone, Debug, Deserialize)]
pub struct Instance {
    /// Unique ID.
    pub id: String,
    /// Instance name.
    pub name: String,
    /// Current status.
    pub status: InstanceStatus,
    /// Host name to connect to.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Volume of the instance.
    #[serde(default)]
    pub volume: Option<InstanceVolume>,
}

stateful_resource!(Instance, InstanceStatus);

/// A database flavor.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DatabaseFlavor {
    /// Unique ID.
    pub id: String,
    /// Flavor name.
    pub name: String,
    /// RAM size in MiB.
    #[serde(default)]
    pub ram: u64,
}

/// Calls to the Database API.
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// Get a database instance by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the instance does not exist.
    async fn get_instance(&self, id: &str) -> Result<Instance>;

    /// List one page of database instances.
    async fn list_instances(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Instance>>;

    /// List one page of database flavors.
    async fn list_flavors(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<DatabaseFlavor>>;
}

status_source! {
    #[doc = "Source of database instance status."]
    InstanceSource: DatabaseApi::get_instance -> Instance
}

list_query! {
    #[doc = "A query to database instance list."]
    InstanceQuery: DatabaseApi::list_instances -> Instance, marker id, limit 20
}

list_query! {
    #[doc = "A query to database flavor list."]
    DatabaseFlavorQuery: DatabaseApi::list_flavors -> DatabaseFlavor, marker id, limit 20
}

/// Waiters and listings for the Database API.
#[derive(Debug, Clone)]
pub struct Databases<P> {
    provider: P,
    config: Config,
}

impl<P: DatabaseApi> Databases<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> Databases<P> {
        Databases {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> Databases<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for an instance to become `ACTIVE`, failing on `ERROR` or `FAILED`.
    pub fn wait_for_instance_active<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<InstanceSource<'_, P>> {
        StateWaiter::new(
            InstanceSource(&self.provider),
            id,
            vec![InstanceStatus::Active],
        )
        .with_fatal_states(INSTANCE_FATAL_STATES.iter().copied())
        .with_settings(self.config.settings(ResourceKind::DatabaseInstance))
    }

    /// Wait for an instance to be deleted.
    pub fn wait_for_instance_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<InstanceSource<'_, P>> {
        DeletionWaiter::new(InstanceSource(&self.provider), id)
            .with_fatal_state(InstanceStatus::Error)
            .with_settings(self.config.settings(ResourceKind::DatabaseInstance))
    }

    /// List all database instances.
    pub fn list_all_instances(&self) -> Result<ResourceIterator<InstanceQuery<'_, P>>> {
        ResourceIterator::new(InstanceQuery(&self.provider), self.config.page_size())
    }

    /// List all database flavors.
    pub fn list_all_flavors(&self) -> Result<ResourceIterator<DatabaseFlavorQuery<'_, P>>> {
        ResourceIterator::new(DatabaseFlavorQuery(&self.provider), self.config.page_size())
    }
}
