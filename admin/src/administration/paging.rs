//! One page of a collection listing.
//!
//! Paging is positional (`$skip`/`$top`) and therefore only weakly
//! consistent: entities created or deleted between two page fetches can
//! shift later pages, so an enumeration may skip or repeat an entity. No
//! snapshot isolation is attempted.

use super::AdministrationClientOptions;
use super::continuation::{self, PageCursor, SKIP_PARAMETER, TOP_PARAMETER};
use super::entity::EntityScope;
use super::errors::{AdministrationError, AdministrationResult};
use super::feed::Feed;
use super::logging::Logger;
use super::projection::{Projector, project_entries};
use super::transport::{HttpRequest, Transport};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

pub const API_VERSION_PARAMETER: &str = "api-version";

/// A page of entities plus the token for the page after it.
///
/// `continuation_token` is `None` exactly when there are no further pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub continuation_token: Option<String>,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }

    fn empty(status: StatusCode, headers: HeaderMap) -> Self {
        Self {
            items: Vec::new(),
            continuation_token: None,
            status,
            headers,
        }
    }
}

pub struct PagedFetcher<'a> {
    transport: &'a dyn Transport,
    options: &'a AdministrationClientOptions,
    logger: Logger,
}

impl<'a> PagedFetcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        options: &'a AdministrationClientOptions,
        logger: Logger,
    ) -> Self {
        Self {
            transport,
            options,
            logger,
        }
    }

    /// Fetch the page at `cursor` from `collection_path` and project it.
    ///
    /// An error status fails the fetch with nothing returned. A body that is
    /// not a feed is logged and yields an empty terminal page.
    pub async fn fetch_page<T>(
        &self,
        collection_path: &str,
        scope: &EntityScope,
        cursor: PageCursor,
        projector: Projector<T>,
    ) -> AdministrationResult<Page<T>> {
        let skip = cursor.skip();
        let request = HttpRequest::get(collection_path)
            .with_query(SKIP_PARAMETER, skip)
            .with_query(TOP_PARAMETER, self.options.page_size)
            .with_query(API_VERSION_PARAMETER, &self.options.api_version);

        self.logger.debug(format_args!(
            "Listing {collection_path} ({SKIP_PARAMETER}={skip}, {TOP_PARAMETER}={})",
            self.options.page_size
        ));
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            return Err(AdministrationError::from_status(
                "list",
                collection_path,
                response.status,
                &response.headers,
                &response.body,
            ));
        }

        let feed = match Feed::parse(&response.body) {
            Ok(feed) => feed,
            Err(e) => {
                self.logger.warn(format_args!(
                    "Could not read feed from {collection_path}: {e}; returning an empty page"
                ));
                return Ok(Page::empty(response.status, response.headers));
            }
        };

        let Feed {
            entries,
            links,
            rejected,
        } = feed;
        for (title, reason) in &rejected {
            self.logger.warn(format_args!(
                "Skipping entry '{title}' in {collection_path}: {reason}"
            ));
        }
        let items = project_entries(entries, scope, projector);
        let continuation_token = continuation::next_skip(&links, &self.logger)?
            .map(continuation::encode_token);

        self.logger.debug(format_args!(
            "Listed {} item(s) from {collection_path}, next page: {}",
            items.len(),
            continuation_token.as_deref().unwrap_or("none")
        ));

        Ok(Page {
            items,
            continuation_token,
            status: response.status,
            headers: response.headers,
        })
    }
}
