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

//! Block Storage API: volumes and snapshots.

use async_trait::async_trait;

use crate::common::{DeletionWaiter, ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

mod protocol;

pub use self::protocol::{Snapshot, SnapshotStatus, Volume, VolumeStatus};

/// Calls to the Block Storage API.
#[async_trait]
pub trait BlockStorageApi: Send + Sync {
    /// Get a volume by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the volume does not exist.
    async fn get_volume(&self, id: &str) -> Result<Volume>;

    /// List one page of volumes.
    async fn list_volumes(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Volume>>;

    /// Get a snapshot by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the snapshot does not exist.
    async fn get_snapshot(&self, id: &str) -> Result<Snapshot>;

    /// List one page of snapshots.
    async fn list_snapshots(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Snapshot>>;
}

status_source! {
    #[doc = "Source of volume status."]
    VolumeSource: BlockStorageApi::get_volume -> Volume
}

status_source! {
    #[doc = "Source of snapshot status."]
    SnapshotSource: BlockStorageApi::get_snapshot -> Snapshot
}

list_query! {
    #[doc = "A query to volume list."]
    VolumeQuery: BlockStorageApi::list_volumes -> Volume, marker id, limit 50
}

list_query! {
    #[doc = "A query to snapshot list."]
    SnapshotQuery: BlockStorageApi::list_snapshots -> Snapshot, marker id, limit 50
}

/// Waiters and listings for the Block Storage API.
#[derive(Debug, Clone)]
pub struct BlockStorage<P> {
    provider: P,
    config: Config,
}

impl<P: BlockStorageApi> BlockStorage<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> BlockStorage<P> {
        BlockStorage {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> BlockStorage<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for a volume to reach the target status.
    ///
    /// Fails on `error` unless it is the target.
    pub fn wait_for_volume_state<Id: Into<String>>(
        &self,
        id: Id,
        target: VolumeStatus,
    ) -> StateWaiter<VolumeSource<'_, P>> {
        let fatal = Some(VolumeStatus::Error).filter(|state| *state != target);
        StateWaiter::new(VolumeSource(&self.provider), id, vec![target])
            .with_fatal_states(fatal)
            .with_settings(self.config.settings(ResourceKind::Volume))
    }

    /// Wait for a volume to become `available`, e.g. after creation or detaching.
    #[inline]
    pub fn wait_for_volume_available<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<VolumeSource<'_, P>> {
        self.wait_for_volume_state(id, VolumeStatus::Available)
    }

    /// Wait for a volume to become `in-use` after attaching.
    #[inline]
    pub fn wait_for_volume_in_use<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<VolumeSource<'_, P>> {
        self.wait_for_volume_state(id, VolumeStatus::InUse)
    }

    /// Wait for a volume to be deleted, failing on `error_deleting`.
    pub fn wait_for_volume_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<VolumeSource<'_, P>> {
        DeletionWaiter::new(VolumeSource(&self.provider), id)
            .with_fatal_state(VolumeStatus::ErrorDeleting)
            .with_settings(self.config.settings(ResourceKind::Volume))
    }

    /// Wait for a snapshot to become `available`, failing on `error`.
    pub fn wait_for_snapshot_available<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<SnapshotSource<'_, P>> {
        StateWaiter::new(
            SnapshotSource(&self.provider),
            id,
            vec![SnapshotStatus::Available],
        )
        .with_fatal_state(SnapshotStatus::Error)
        .with_settings(self.config.settings(ResourceKind::Snapshot))
    }

    /// Wait for a snapshot to be deleted, failing on `error_deleting`.
    pub fn wait_for_snapshot_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<SnapshotSource<'_, P>> {
        DeletionWaiter::new(SnapshotSource(&self.provider), id)
            .with_target_state(SnapshotStatus::Deleted)
            .with_fatal_state(SnapshotStatus::ErrorDeleting)
            .with_settings(self.config.settings(ResourceKind::Snapshot))
    }

    /// List all volumes.
    pub fn list_all_volumes(&self) -> Result<ResourceIterator<VolumeQuery<'_, P>>> {
        ResourceIterator::new(VolumeQuery(&self.provider), self.config.page_size())
    }

    /// List all snapshots.
    pub fn list_all_snapshots(&self) -> Result<ResourceIterator<SnapshotQuery<'_, P>>> {
        ResourceIterator::new(SnapshotQuery(&self.provider), self.config.page_size())
    }
}
