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

//! JSON structures and protocol bits for the Image API.

use chrono::{DateTime, FixedOffset};

protocol_enum! {
    #[doc = "Possible image statuses."]
    enum ImageStatus {
        Queued = "queued",
        Saving = "saving",
        Uploading = "uploading",
        Importing = "importing",
        Active = "active",
        Killed = "killed",
        Deleted = "deleted",
        PendingDelete = "pending_delete",
        Deactivated = "deactivated"
    }
}

protocol_enum! {
    #[doc = "Possible image visibility values."]
    enum ImageVisibility {
        Public = "public",
        Community = "community",
        Shared = "shared",
        Private = "private"
    }
}

/// An image.
#[derive(Clone, Debug, Deserialize)]
pub struct Image {
    /// Unique ID.
    pub id: String,
    /// Image name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current status.
    pub status: ImageStatus,
    /// Image visibility.
    #[serde(default)]
    pub visibility: Option<ImageVisibility>,
    /// Checksum of the image data.
    #[serde(default)]
    pub checksum: Option<String>,
    /// Image size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Creation date and time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update date and time.
    pub updated_at: DateTime<FixedOffset>,
}

stateful_resource!(Image, ImageStatus);
