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

//! Queues API.
//!
//! Queues have no lifecycle to wait for; only listing is supported.

use async_trait::async_trait;
use serde_json::Value;

use crate::common::ResourceIterator;
use crate::config::Config;
use crate::Result;

/// A message queue.
#[derive(Clone, Debug, Deserialize)]
pub struct Queue {
    /// Queue name (also its unique identifier).
    pub name: String,
    /// Link to the queue.
    #[serde(default)]
    pub href: Option<String>,
    /// Queue metadata (only when requested with details).
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Calls to the Queues API.
#[async_trait]
pub trait QueuesApi: Send + Sync {
    /// List one page of queues, ordered by name.
    async fn list_queues(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Queue>>;
}

list_query! {
    #[doc = "A query to queue list."]
    QueueQuery: QueuesApi::list_queues -> Queue, marker name, limit 10
}

/// Listings for the Queues API.
#[derive(Debug, Clone)]
pub struct Queues<P> {
    provider: P,
    config: Config,
}

impl<P: QueuesApi> Queues<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> Queues<P> {
        Queues {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> Queues<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// List all queues.
    pub fn list_all_queues(&self) -> Result<ResourceIterator<QueueQuery<'_, P>>> {
        ResourceIterator::new(QueueQuery(&self.provider), self.config.page_size())
    }
}
