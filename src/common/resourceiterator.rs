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

//! Generic API bits for implementing paginated listings.

use std::fmt::{self, Debug};
use std::future::Future;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::{Stream, TryStreamExt};
use futures::pin_mut;
use tokio_util::sync::CancellationToken;

use super::waiter::cancelled_error;
use crate::{Error, ErrorKind, Result};

/// A query for resources.
///
/// This is a low-level trait that should not be used directly.
#[async_trait]
pub trait ResourceQuery: Send + Sync {
    /// Item type.
    type Item: Send;

    /// Default limit to use with this query.
    const DEFAULT_LIMIT: usize;

    /// Whether pagination is supported for this query.
    ///
    /// If not, exactly one page is fetched.
    async fn can_paginate(&self) -> Result<bool> {
        Ok(true)
    }

    /// Extract a marker from a resource.
    fn extract_marker(&self, resource: &Self::Item) -> String;

    /// Get a chunk of resources.
    async fn fetch_chunk(
        &self,
        limit: Option<usize>,
        marker: Option<String>,
    ) -> Result<Vec<Self::Item>>;
}

/// Generic implementation of a `Stream` over resources.
///
/// The resources are fetched page by page, the key of the last resource on a
/// page is used as a marker for the next one. The iteration stops on the
/// first empty page.
///
/// Note that the remote collection may change between two page fetches, so
/// resources may be missed or returned twice.
#[derive(Debug, Clone)]
pub struct ResourceIterator<Q> {
    query: Q,
    limit: usize,
    cancel: CancellationToken,
}

impl<Q> ResourceIterator<Q>
where
    Q: ResourceQuery,
{
    /// Create a new iterator.
    ///
    /// Fails with `InvalidInput` if `limit` is zero. If `limit` is not
    /// provided, `Q::DEFAULT_LIMIT` is used.
    pub fn new(query: Q, limit: Option<usize>) -> Result<ResourceIterator<Q>> {
        let limit = limit.unwrap_or(Q::DEFAULT_LIMIT);
        if limit == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Page size must be positive",
            ));
        }

        Ok(ResourceIterator {
            query,
            limit,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort the iteration when the token is cancelled.
    ///
    /// The token is checked before fetching every page.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Page size used by this iterator.
    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// The underlying query.
    #[inline]
    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Convert this iterator into a stream.
    ///
    /// No requests are done until you start iterating. The next page is only
    /// requested when all items from the previous one have been consumed.
    pub fn into_stream(self) -> impl Stream<Item = Result<Q::Item>> {
        let ResourceIterator {
            query,
            limit,
            cancel,
        } = self;

        try_stream! {
            let can_paginate = query.can_paginate().await?;
            let mut marker: Option<String> = None;
            let mut page = 0usize;
            loop {
                if cancel.is_cancelled() {
                    Err::<(), Error>(cancelled_error())?;
                }

                page += 1;
                trace!("Fetching page {} with marker {:?} and limit {}", page, marker, limit);
                let chunk = query.fetch_chunk(Some(limit), marker.take()).await?;
                if chunk.is_empty() {
                    debug!("Listing finished after {} page(s)", page);
                    break;
                }

                marker = chunk.last().map(|item| query.extract_marker(item));
                for item in chunk {
                    yield item;
                }

                if !can_paginate {
                    debug!("Pagination is not possible, stopping after one page");
                    break;
                }
            }
        }
    }

    /// Execute the query and return all results.
    pub async fn all(self) -> Result<Vec<Q::Item>> {
        self.into_stream().try_collect().await
    }

    /// Return one and exactly one result.
    ///
    /// Fails with `ResourceNotFound` if the query produces no results and
    /// with `TooManyItems` if the query produces more than one result.
    pub async fn one(self) -> Result<Q::Item> {
        let stream = self.into_stream();
        pin_mut!(stream);
        match stream.try_next().await? {
            Some(result) => {
                if stream.try_next().await?.is_some() {
                    Err(Error::new(
                        ErrorKind::TooManyItems,
                        "Query returned more than one result",
                    ))
                } else {
                    Ok(result)
                }
            }
            None => Err(Error::new(
                ErrorKind::ResourceNotFound,
                "Query returned no results",
            )),
        }
    }
}

/// A `ResourceQuery` based on closures.
///
/// Created via [page_fn](fn.page_fn.html).
#[derive(Clone)]
pub struct PageFn<F, M> {
    fetch: F,
    marker: M,
}

impl<F, M> Debug for PageFn<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFn").finish_non_exhaustive()
    }
}

/// Use closures as a `ResourceQuery`.
///
/// `fetch` receives the marker and the limit and returns a page, `marker`
/// extracts the marker from an item.
///
/// ```rust
/// use rackstack::common::{page_fn, ResourceIterator};
///
/// # async fn example() -> rackstack::Result<()> {
/// let names = vec!["a", "b", "c", "d", "e"];
/// let query = page_fn(
///     move |marker: Option<String>, limit: Option<usize>| {
///         let start = marker
///             .and_then(|m| names.iter().position(|n| *n == m).map(|i| i + 1))
///             .unwrap_or(0);
///         let end = (start + limit.unwrap_or(2)).min(names.len());
///         let page: Vec<String> = names[start..end].iter().map(|n| n.to_string()).collect();
///         futures::future::ok(page)
///     },
///     |name: &String| name.clone(),
/// );
/// let all = ResourceIterator::new(query, Some(2))?.all().await?;
/// assert_eq!(all.len(), 5);
/// # Ok(()) }
/// ```
pub fn page_fn<F, Fut, M, T>(fetch: F, marker: M) -> PageFn<F, M>
where
    F: Fn(Option<String>, Option<usize>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
    M: Fn(&T) -> String + Send + Sync,
    T: Send,
{
    PageFn { fetch, marker }
}

#[async_trait]
impl<F, Fut, M, T> ResourceQuery for PageFn<F, M>
where
    F: Fn(Option<String>, Option<usize>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
    M: Fn(&T) -> String + Send + Sync,
    T: Send,
{
    type Item = T;

    const DEFAULT_LIMIT: usize = 100;

    fn extract_marker(&self, resource: &T) -> String {
        (self.marker)(resource)
    }

    async fn fetch_chunk(&self, limit: Option<usize>, marker: Option<String>) -> Result<Vec<T>> {
        (self.fetch)(marker, limit).await
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use futures::{pin_mut, TryStreamExt};
    use tokio_util::sync::CancellationToken;

    use super::{page_fn, ResourceIterator, ResourceQuery};
    use crate::{Error, ErrorKind, Result};

    #[derive(Debug, Clone, PartialEq)]
    struct Item(u32);

    /// Serves fixed pages and records every call.
    #[derive(Debug, Clone)]
    struct FixedPages {
        pages: Vec<Vec<u32>>,
        calls: Arc<Mutex<Vec<(Option<usize>, Option<String>)>>>,
        paginate: bool,
        fail_on: Option<usize>,
    }

    impl FixedPages {
        fn new(pages: Vec<Vec<u32>>) -> FixedPages {
            FixedPages {
                pages,
                calls: Arc::new(Mutex::new(Vec::new())),
                paginate: true,
                fail_on: None,
            }
        }

        fn calls(&self) -> Vec<(Option<usize>, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceQuery for FixedPages {
        type Item = Item;

        const DEFAULT_LIMIT: usize = 3;

        async fn can_paginate(&self) -> Result<bool> {
            Ok(self.paginate)
        }

        fn extract_marker(&self, resource: &Item) -> String {
            format!("item-{}", resource.0)
        }

        async fn fetch_chunk(
            &self,
            limit: Option<usize>,
            marker: Option<String>,
        ) -> Result<Vec<Item>> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((limit, marker));
                calls.len() - 1
            };
            if self.fail_on == Some(index) {
                return Err(Error::new(ErrorKind::InternalServerError, "boom"));
            }
            Ok(self
                .pages
                .get(index)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(Item)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let query = FixedPages::new(vec![vec![1, 2, 3], vec![4, 5, 6], vec![]]);
        let items = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .all()
            .await
            .unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items.last(), Some(&Item(6)));
        assert_eq!(query.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_markers() {
        let query = FixedPages::new(vec![vec![1, 2], vec![3], vec![]]);
        let _ = ResourceIterator::new(query.clone(), Some(2))
            .unwrap()
            .all()
            .await
            .unwrap();
        assert_eq!(
            query.calls(),
            vec![
                (Some(2), None),
                (Some(2), Some("item-2".to_string())),
                (Some(2), Some("item-3".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let query = FixedPages::new(vec![vec![]]);
        let items = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .all()
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(query.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit() {
        let query = FixedPages::new(vec![vec![1]]);
        let err = ResourceIterator::new(query.clone(), Some(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(query.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lazy() {
        let query = FixedPages::new(vec![vec![1, 2, 3], vec![4, 5, 6], vec![]]);
        let stream = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .into_stream();
        assert!(query.calls().is_empty());

        pin_mut!(stream);
        for expected in 1..=3 {
            assert_eq!(stream.try_next().await.unwrap(), Some(Item(expected)));
        }
        assert_eq!(query.calls().len(), 1);

        assert_eq!(stream.try_next().await.unwrap(), Some(Item(4)));
        assert_eq!(query.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_keeps_yielded_items() {
        let mut query = FixedPages::new(vec![vec![1, 2], vec![3, 4], vec![]]);
        query.fail_on = Some(1);
        let stream = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .into_stream();
        pin_mut!(stream);
        assert_eq!(stream.try_next().await.unwrap(), Some(Item(1)));
        assert_eq!(stream.try_next().await.unwrap(), Some(Item(2)));
        let err = stream.try_next().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
    }

    #[tokio::test]
    async fn test_no_pagination() {
        let mut query = FixedPages::new(vec![vec![1, 2], vec![3, 4], vec![]]);
        query.paginate = false;
        let items = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .all()
            .await
            .unwrap();
        assert_eq!(items, vec![Item(1), Item(2)]);
        assert_eq!(query.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_one() {
        let query = FixedPages::new(vec![vec![1], vec![]]);
        let item = ResourceIterator::new(query, None)
            .unwrap()
            .one()
            .await
            .unwrap();
        assert_eq!(item, Item(1));

        let query = FixedPages::new(vec![vec![]]);
        let err = ResourceIterator::new(query, None)
            .unwrap()
            .one()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);

        let query = FixedPages::new(vec![vec![1, 2], vec![]]);
        let err = ResourceIterator::new(query, None)
            .unwrap()
            .one()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyItems);
    }

    #[tokio::test]
    async fn test_cancellation() {
        let query = FixedPages::new(vec![vec![1, 2], vec![3, 4], vec![]]);
        let cancel = CancellationToken::new();
        let stream = ResourceIterator::new(query.clone(), None)
            .unwrap()
            .with_cancellation(cancel.clone())
            .into_stream();
        pin_mut!(stream);
        assert_eq!(stream.try_next().await.unwrap(), Some(Item(1)));
        cancel.cancel();
        // Items from an already fetched page are still returned.
        assert_eq!(stream.try_next().await.unwrap(), Some(Item(2)));
        let err = stream.try_next().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationCancelled);
        assert_eq!(query.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_page_fn() {
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        let query = page_fn(
            move |marker: Option<String>, _limit: Option<usize>| {
                *c.lock().unwrap() += 1;
                let page = match marker.as_deref() {
                    None => vec!["alpha".to_string(), "beta".to_string()],
                    Some("beta") => vec!["gamma".to_string()],
                    Some(_) => Vec::new(),
                };
                futures::future::ok(page)
            },
            |name: &String| name.clone(),
        );
        let items = ResourceIterator::new(query, Some(2))
            .unwrap()
            .all()
            .await
            .unwrap();
        assert_eq!(items, vec!["alpha", "beta", "gamma"]);
        assert_eq!(*calls.lock().unwrap(), 3);
    }
}
