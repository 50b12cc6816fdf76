//! # Administration Module
//!
//! Management of namespace entities (queues, topics, subscriptions and
//! rules) over the Atom/XML management API.
//!
//! ## Core Components
//!
//! - [`AdministrationClient`] - async CRUD and listing for every entity kind
//! - [`BlockingAdministrationClient`] - synchronous adapter over the async client
//! - [`Page`] / continuation tokens - positional paging of collections
//! - [`Transport`] / [`ReqwestTransport`] - the HTTP seam
//! - [`AdministrationError`] - error taxonomy shared by all operations
//!
//! ## Usage
//!
//! ```no_run
//! use admin::administration::{AdministrationClient, AdministrationClientOptions};
//! use futures::TryStreamExt;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AdministrationClient::from_connection_string(
//!         "Endpoint=sb://contoso.servicebus.windows.net/;SharedAccessKeyName=policy;SharedAccessKey=key",
//!         AdministrationClientOptions::default(),
//!     )?;
//!
//!     // Page by page
//!     let mut token = None;
//!     loop {
//!         let page = client.list_queues(token.as_deref()).await?;
//!         for queue in &page.items {
//!             println!("{}", queue.name);
//!         }
//!         match page.continuation_token {
//!             Some(next) => token = Some(next),
//!             None => break,
//!         }
//!     }
//!
//!     // Or as a stream
//!     let topics: Vec<_> = client.topics().try_collect().await?;
//!     println!("{} topics", topics.len());
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::time::Duration;

pub use self::blocking::BlockingAdministrationClient;
pub use self::client::{AdministrationClient, EntityStream, Response};
pub use self::continuation::{PageCursor, decode_token, encode_token};
pub use self::duration::MAX_DURATION;
pub use self::entity::{EntityKind, EntityScope, Queue, Rule, Subscription, Topic};
pub use self::errors::{AdministrationError, AdministrationResult, ResponseContext};
pub use self::feed::{EntityContent, EntityDescription, Feed, FeedEntry, ResponseLink};
pub use self::logging::Logger;
pub use self::models::*;
pub use self::paging::Page;
pub use self::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Synchronous adapter owning its own runtime
pub mod blocking;
/// Async CRUD façade
pub mod client;
/// Continuation tokens and next-link parsing
pub mod continuation;
/// ISO-8601 duration codec
pub mod duration;
/// Entity kinds, scopes and request paths
pub mod entity;
/// Error taxonomy
pub mod errors;
/// Atom feed/entry parsing
pub mod feed;
/// Injectable logging port
pub mod logging;
/// Public entity models
pub mod models;
/// Single-page fetch and projection
pub mod paging;
/// Wire description to model projection
pub mod projection;
/// Atom entry request bodies
pub mod serialization;
/// HTTP transport abstraction
pub mod transport;

pub const DEFAULT_API_VERSION: &str = "2021-05";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SAS_TOKEN_VALIDITY_HOURS: i64 = 1;

/// Tunables shared by the client, the pager and the transport.
///
/// Deserializable so applications can embed it in their own configuration;
/// every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdministrationClientOptions {
    /// `api-version` sent with every request.
    pub api_version: String,
    /// `$top` for list requests.
    pub page_size: u32,
    pub timeout_secs: u64,
    /// Lifetime of SAS tokens generated from a shared access key.
    pub sas_token_validity_hours: i64,
}

impl Default for AdministrationClientOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sas_token_validity_hours: DEFAULT_SAS_TOKEN_VALIDITY_HOURS,
        }
    }
}

impl AdministrationClientOptions {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// SAS token lifetime. Non-positive or unrepresentable hour counts are
    /// a configuration error.
    pub fn sas_validity(&self) -> AdministrationResult<chrono::Duration> {
        let hours = self.sas_token_validity_hours;
        chrono::Duration::try_hours(hours)
            .filter(|validity| *validity > chrono::Duration::zero())
            .ok_or_else(|| {
                AdministrationError::Configuration(format!(
                    "sas_token_validity_hours must be a positive number of hours, got {hours}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_fill_missing_fields_with_defaults() {
        let options: AdministrationClientOptions =
            serde_json::from_str(r#"{ "page_size": 25 }"#).unwrap();
        assert_eq!(options.page_size, 25);
        assert_eq!(options.api_version, "2021-05");
        assert_eq!(options.timeout(), Duration::from_secs(60));
        assert_eq!(options.sas_validity().unwrap(), chrono::Duration::hours(1));
    }

    #[test]
    fn out_of_range_sas_validity_is_configuration_error() {
        for hours in [0, -1, i64::MAX] {
            let options = AdministrationClientOptions {
                sas_token_validity_hours: hours,
                ..Default::default()
            };
            assert!(matches!(
                options.sas_validity(),
                Err(AdministrationError::Configuration(_))
            ));
        }
    }
}
