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

//! JSON structures and protocol bits for the Block Storage API.

use std::collections::HashMap;

use chrono::NaiveDateTime;

protocol_enum! {
    #[doc = "Possible volume statuses."]
    enum VolumeStatus {
        Creating = "creating",
        Available = "available",
        Reserved = "reserved",
        Attaching = "attaching",
        Detaching = "detaching",
        InUse = "in-use",
        Maintenance = "maintenance",
        Deleting = "deleting",
        AwaitingTransfer = "awaiting-transfer",
        Error = "error",
        ErrorDeleting = "error_deleting",
        BackingUp = "backing-up",
        RestoringBackup = "restoring-backup",
        ErrorBackingUp = "error_backing-up",
        ErrorRestoring = "error_restoring",
        ErrorExtending = "error_extending",
        Downloading = "downloading",
        Uploading = "uploading",
        Retyping = "retyping",
        Extending = "extending"
    }
}

protocol_enum! {
    #[doc = "Possible snapshot statuses."]
    enum SnapshotStatus {
        Creating = "creating",
        Available = "available",
        BackingUp = "backing-up",
        Deleting = "deleting",
        Error = "error",
        Deleted = "deleted",
        Unmanaging = "unmanaging",
        Restoring = "restoring",
        ErrorDeleting = "error_deleting"
    }
}

/// A volume.
#[derive(Clone, Debug, Deserialize)]
pub struct Volume {
    /// Unique ID.
    pub id: String,
    /// Volume name (if set).
    #[serde(default)]
    pub name: Option<String>,
    /// Current status.
    pub status: VolumeStatus,
    /// Size in GiB.
    pub size: u64,
    /// Name of the volume type.
    #[serde(default)]
    pub volume_type: Option<String>,
    /// ID of the snapshot the volume was created from.
    #[serde(default)]
    pub snapshot_id: Option<String>,
    /// Whether the volume is bootable.
    #[serde(default)]
    pub bootable: Option<String>,
    /// Creation date and time.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Volume metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

stateful_resource!(Volume, VolumeStatus);

/// A volume snapshot.
#[derive(Clone, Debug, Deserialize)]
pub struct Snapshot {
    /// Unique ID.
    pub id: String,
    /// Snapshot name (if set).
    #[serde(default)]
    pub name: Option<String>,
    /// Current status.
    pub status: SnapshotStatus,
    /// Size in GiB.
    pub size: u64,
    /// ID of the source volume.
    pub volume_id: String,
    /// Progress of the snapshot creation (e.g. `42%`).
    #[serde(rename = "os-extended-snapshot-attributes:progress", default)]
    pub progress: Option<String>,
    /// Creation date and time.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

stateful_resource!(Snapshot, SnapshotStatus);
