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

//! JSON structures and protocol bits for the Compute API.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

protocol_enum! {
    #[doc = "Possible server statuses."]
    enum ServerStatus {
        Active = "ACTIVE",
        Building = "BUILD",
        Deleted = "DELETED",
        Error = "ERROR",
        HardRebooting = "HARD_REBOOT",
        Migrating = "MIGRATING",
        Paused = "PAUSED",
        Rebooting = "REBOOT",
        Rebuilding = "REBUILD",
        Rescuing = "RESCUE",
        Resizing = "RESIZE",
        RevertingResize = "REVERT_RESIZE",
        Shelved = "SHELVED",
        ShelvedOffloaded = "SHELVED_OFFLOADED",
        ShutOff = "SHUTOFF",
        SoftDeleted = "SOFT_DELETED",
        Suspended = "SUSPENDED",
        Unknown = "UNKNOWN",
        UpdatingPassword = "PASSWORD",
        VerifyingResize = "VERIFY_RESIZE"
    }
}

/// A reference to another resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Ref {
    /// ID of the resource.
    pub id: String,
}

/// A server with all details.
#[derive(Clone, Debug, Deserialize)]
pub struct Server {
    /// Unique ID.
    pub id: String,
    /// Server name.
    pub name: String,
    /// Current status.
    pub status: ServerStatus,
    /// Progress of the current operation in percents (if known).
    #[serde(default)]
    pub progress: Option<u8>,
    /// Flavor of the server.
    #[serde(default)]
    pub flavor: Option<Ref>,
    /// Image the server was built from (empty when booted from volume).
    #[serde(default)]
    pub image: Option<Ref>,
    /// Public IPv4 address.
    #[serde(rename = "accessIPv4", default)]
    pub access_ipv4: Option<String>,
    /// Public IPv6 address.
    #[serde(rename = "accessIPv6", default)]
    pub access_ipv6: Option<String>,
    /// Creation date and time.
    #[serde(default)]
    pub created: Option<DateTime<FixedOffset>>,
    /// Last update date and time.
    #[serde(default)]
    pub updated: Option<DateTime<FixedOffset>>,
    /// Server metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

stateful_resource!(Server, ServerStatus);

/// A summary of a server.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ServerSummary {
    /// Unique ID.
    pub id: String,
    /// Server name.
    pub name: String,
}

/// A server flavor.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Flavor {
    /// Unique ID.
    pub id: String,
    /// Flavor name.
    pub name: String,
    /// RAM size in MiB.
    #[serde(default)]
    pub ram: u64,
    /// Root disk size in GiB.
    #[serde(default)]
    pub disk: u64,
    /// Number of virtual CPUs.
    #[serde(default)]
    pub vcpus: u32,
}

/// A summary of an image as seen by the Compute API.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ImageSummary {
    /// Unique ID.
    pub id: String,
    /// Image name.
    pub name: String,
}
