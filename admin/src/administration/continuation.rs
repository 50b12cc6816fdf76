//! Continuation tokens and the `next`-link extractor.
//!
//! The service pages collections positionally with `$skip`/`$top`. The token
//! handed to callers is the decimal form of the next `$skip`, nothing more:
//! no signature, no staleness check. It is stable across client versions.

use super::errors::{AdministrationError, AdministrationResult};
use super::feed::ResponseLink;
use super::logging::Logger;
use url::Url;

pub const SKIP_PARAMETER: &str = "$skip";
pub const TOP_PARAMETER: &str = "$top";
const NEXT_RELATION: &str = "next";

pub fn encode_token(skip: u64) -> String {
    skip.to_string()
}

/// Tokens only ever come from [`encode_token`], so anything else is a caller bug.
pub fn decode_token(token: &str) -> AdministrationResult<u64> {
    parse_decimal(token).ok_or_else(|| {
        AdministrationError::invalid_argument(
            "continuation_token",
            format!("'{token}' is not a continuation token issued by this client"),
        )
    })
}

/// Where the next page request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    FirstPage,
    NextPage { skip: u64 },
}

impl PageCursor {
    /// An absent or empty token selects the first page without being decoded.
    pub fn from_token(token: Option<&str>) -> AdministrationResult<Self> {
        match token {
            None => Ok(PageCursor::FirstPage),
            Some(t) if t.is_empty() => Ok(PageCursor::FirstPage),
            Some(t) => decode_token(t).map(|skip| PageCursor::NextPage { skip }),
        }
    }

    pub fn skip(&self) -> u64 {
        match self {
            PageCursor::FirstPage => 0,
            PageCursor::NextPage { skip } => *skip,
        }
    }
}

/// Find the feed's `next` link and read its `$skip`.
///
/// `Ok(None)` means the page is terminal, including the tolerated case of a
/// `next` link that carries no usable `$skip`. A `next` href that is not a
/// valid URL fails the fetch because the continuation point cannot be honored.
pub fn next_skip(links: &[ResponseLink], logger: &Logger) -> AdministrationResult<Option<u64>> {
    let Some(next) = links
        .iter()
        .find(|link| link.rel.eq_ignore_ascii_case(NEXT_RELATION))
    else {
        return Ok(None);
    };

    let url = Url::parse(&next.href).map_err(|e| {
        AdministrationError::malformed(format!("invalid next link '{}': {e}", next.href))
    })?;

    let skip = url.query().and_then(skip_from_query);
    if skip.is_none() {
        logger.warn(format_args!(
            "Next link '{}' has no valid {SKIP_PARAMETER} parameter; treating page as last",
            next.href
        ));
    }
    Ok(skip)
}

fn skip_from_query(query: &str) -> Option<u64> {
    let decoded = urlencoding::decode(query).ok()?;
    decoded
        .split("&amp;")
        .flat_map(|segment| segment.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(SKIP_PARAMETER))
        .and_then(|(_, value)| parse_decimal(value.trim()))
}

/// Canonical base-10 only: `u64::from_str` alone would accept a leading `+`.
fn parse_decimal(value: &str) -> Option<u64> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
