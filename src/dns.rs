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

//! DNS API: domains and asynchronous jobs.
//!
//! Most mutating DNS calls return a job instead of the result. Use
//! [Dns::wait_for_job_completed](struct.Dns.html#method.wait_for_job_completed)
//! to wait for it.

use async_trait::async_trait;
use serde::de::{Deserialize, Deserializer, Error as DeserError};
use serde_json::Value;

use crate::common::{ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

protocol_enum! {
    #[doc = "Possible statuses of an asynchronous job."]
    enum JobStatus {
        Initialized = "INITIALIZED",
        Running = "RUNNING",
        Completed = "COMPLETED",
        Error = "ERROR"
    }
}

/// Error details of a failed job.
#[derive(Clone, Debug, Deserialize)]
pub struct JobError {
    /// Error code.
    #[serde(default)]
    pub code: Option<u16>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Additional details.
    #[serde(default)]
    pub details: Option<String>,
}

/// An asynchronous DNS job.
#[derive(Clone, Debug, Deserialize)]
pub struct Job {
    /// Unique ID.
    #[serde(rename = "jobId")]
    pub id: String,
    /// Current status.
    pub status: JobStatus,
    /// URL to poll for the job status.
    #[serde(rename = "callbackUrl", default)]
    pub callback_url: Option<String>,
    /// Error details (for failed jobs).
    #[serde(default)]
    pub error: Option<JobError>,
}

stateful_resource!(Job, JobStatus);

/// Domain IDs are numbers in responses but strings in URLs.
fn id_as_string<'de, D>(deserializer: D) -> ::std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!("invalid domain ID {}", other))),
    }
}

/// A DNS domain.
#[derive(Clone, Debug, Deserialize)]
pub struct Domain {
    /// Unique ID.
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Domain name.
    pub name: String,
    /// Contact email address.
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
    /// Default TTL of the records.
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Creation date and time, as reported by the server.
    #[serde(default)]
    pub created: Option<String>,
    /// Last update date and time, as reported by the server.
    #[serde(default)]
    pub updated: Option<String>,
}

/// Calls to the DNS API.
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Get an asynchronous job by its ID.
    async fn get_job(&self, id: &str) -> Result<Job>;

    /// List one page of domains.
    async fn list_domains(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Domain>>;
}

status_source! {
    #[doc = "Source of job status."]
    JobSource: DnsApi::get_job -> Job
}

list_query! {
    #[doc = "A query to domain list."]
    DomainQuery: DnsApi::list_domains -> Domain, marker id, limit 100
}

/// Waiters and listings for the DNS API.
#[derive(Debug, Clone)]
pub struct Dns<P> {
    provider: P,
    config: Config,
}

impl<P: DnsApi> Dns<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> Dns<P> {
        Dns {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> Dns<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for a job to become `COMPLETED`, failing on `ERROR`.
    ///
    /// The failed job is available via `Error::last_seen::<Job>()`.
    pub fn wait_for_job_completed<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<JobSource<'_, P>> {
        StateWaiter::new(JobSource(&self.provider), id, vec![JobStatus::Completed])
            .with_fatal_state(JobStatus::Error)
            .with_settings(self.config.settings(ResourceKind::DnsJob))
    }

    /// List all domains.
    pub fn list_all_domains(&self) -> Result<ResourceIterator<DomainQuery<'_, P>>> {
        ResourceIterator::new(DomainQuery(&self.provider), self.config.page_size())
    }
}
