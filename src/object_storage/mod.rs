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

//! Object Storage API: containers and objects.
//!
//! Both collections are ordered by name and use the name as the marker.

use async_trait::async_trait;

use crate::common::{ResourceIterator, ResourceQuery};
use crate::config::Config;
use crate::Result;

mod protocol;

pub use self::protocol::{Container, Object};

/// Calls to the Object Storage API.
#[async_trait]
pub trait ObjectStorageApi: Send + Sync {
    /// List one page of containers.
    async fn list_containers(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Container>>;

    /// List one page of objects in the container.
    async fn list_objects(
        &self,
        container: &str,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Object>>;
}

list_query! {
    #[doc = "A query to container list."]
    ContainerQuery: ObjectStorageApi::list_containers -> Container, marker name, limit 10000
}

/// A query to object list in one container.
#[derive(Debug)]
pub struct ObjectQuery<'p, P: ?Sized> {
    provider: &'p P,
    container: String,
}

#[async_trait]
impl<'p, P: ObjectStorageApi + ?Sized> ResourceQuery for ObjectQuery<'p, P> {
    type Item = Object;

    const DEFAULT_LIMIT: usize = 10000;

    fn extract_marker(&self, resource: &Object) -> String {
        resource.name.clone()
    }

    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Object>> {
        self.provider
            .list_objects(&self.container, marker, limit)
            .await
    }
}

/// Listings for the Object Storage API.
#[derive(Debug, Clone)]
pub struct ObjectStorage<P> {
    provider: P,
    config: Config,
}

impl<P: ObjectStorageApi> ObjectStorage<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> ObjectStorage<P> {
        ObjectStorage {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> ObjectStorage<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// List all containers.
    pub fn list_all_containers(&self) -> Result<ResourceIterator<ContainerQuery<'_, P>>> {
        ResourceIterator::new(ContainerQuery(&self.provider), self.config.page_size())
    }

    /// List all objects in the container.
    pub fn list_all_objects<C: Into<String>>(
        &self,
        container: C,
    ) -> Result<ResourceIterator<ObjectQuery<'_, P>>> {
        let query = ObjectQuery {
            provider: &self.provider,
            container: container.into(),
        };
        ResourceIterator::new(query, self.config.page_size())
    }
}
