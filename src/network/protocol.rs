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

//! JSON structures and protocol bits for the Network API.

use chrono::{DateTime, FixedOffset};

protocol_enum! {
    #[doc = "Possible network statuses."]
    enum NetworkStatus {
        Active = "ACTIVE",
        Down = "DOWN",
        Building = "BUILD",
        Error = "ERROR"
    }
}

/// A network.
#[derive(Debug, Clone, Deserialize)]
pub struct Network {
    /// Unique ID.
    pub id: String,
    /// Network name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current status.
    pub status: NetworkStatus,
    /// Whether the network is administratively up.
    #[serde(default)]
    pub admin_state_up: bool,
    /// Whether the network is shared between projects.
    #[serde(default)]
    pub shared: bool,
    /// IDs of the subnets of this network.
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Creation date and time.
    #[serde(default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

stateful_resource!(Network, NetworkStatus);
