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

//! Image API.

use async_trait::async_trait;

use crate::common::{DeletionWaiter, ResourceIterator, StateWaiter};
use crate::config::{Config, ResourceKind};
use crate::Result;

mod protocol;

pub use self::protocol::{Image, ImageStatus, ImageVisibility};

/// States in which an image will not become active.
pub const IMAGE_FATAL_STATES: &[ImageStatus] = &[
    ImageStatus::Killed,
    ImageStatus::Deleted,
    ImageStatus::PendingDelete,
    ImageStatus::Deactivated,
];

/// Calls to the Image API.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Get an image by its ID.
    ///
    /// Must fail with `ResourceNotFound` if the image does not exist.
    async fn get_image(&self, id: &str) -> Result<Image>;

    /// List one page of images.
    async fn list_images(
        &self,
        marker: Option<String>,
        limit: Option<usize>,
    ) -> Result<Vec<Image>>;
}

status_source! {
    #[doc = "Source of image status."]
    ImageSource: ImageApi::get_image -> Image
}

list_query! {
    #[doc = "A query to image list."]
    ImageQuery: ImageApi::list_images -> Image, marker id, limit 25
}

/// Waiters and listings for the Image API.
#[derive(Debug, Clone)]
pub struct ImageService<P> {
    provider: P,
    config: Config,
}

impl<P: ImageApi> ImageService<P> {
    /// Create with the default configuration.
    pub fn new(provider: P) -> ImageService<P> {
        ImageService {
            provider,
            config: Config::default(),
        }
    }

    /// Use the provided configuration.
    pub fn with_config(mut self, config: Config) -> ImageService<P> {
        self.config = config;
        self
    }

    /// The underlying provider.
    #[inline]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for an image to become `active`, e.g. after a server snapshot.
    pub fn wait_for_image_active<Id: Into<String>>(
        &self,
        id: Id,
    ) -> StateWaiter<ImageSource<'_, P>> {
        StateWaiter::new(ImageSource(&self.provider), id, vec![ImageStatus::Active])
            .with_fatal_states(IMAGE_FATAL_STATES.iter().copied())
            .with_settings(self.config.settings(ResourceKind::Image))
    }

    /// Wait for an image to be deleted.
    ///
    /// Finishes once the image is `deleted`, `pending_delete` or cannot be found.
    pub fn wait_for_image_deleted<Id: Into<String>>(
        &self,
        id: Id,
    ) -> DeletionWaiter<ImageSource<'_, P>> {
        DeletionWaiter::new(ImageSource(&self.provider), id)
            .with_target_state(ImageStatus::Deleted)
            .with_target_state(ImageStatus::PendingDelete)
            .with_settings(self.config.settings(ResourceKind::Image))
    }

    /// List all images.
    pub fn list_all_images(&self) -> Result<ResourceIterator<ImageQuery<'_, P>>> {
        ResourceIterator::new(ImageQuery(&self.provider), self.config.page_size())
    }
}
