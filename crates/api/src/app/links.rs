//! Location URLs for created resources.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use codecamp_core::TalkId;

/// Builds the path a client can `GET` to fetch a resource.
///
/// `None` means no usable link can be formed for the given key.
pub trait LinkGenerator: Send + Sync {
    fn camp(&self, moniker: &str) -> Option<String>;

    fn talk(&self, moniker: &str, talk_id: TalkId) -> Option<String>;
}

/// Links that mirror the router's own paths.
#[derive(Debug, Clone)]
pub struct RouteLinks {
    prefix: String,
}

impl RouteLinks {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for RouteLinks {
    fn default() -> Self {
        Self::new("/api")
    }
}

impl LinkGenerator for RouteLinks {
    fn camp(&self, moniker: &str) -> Option<String> {
        if moniker.is_empty() {
            return None;
        }
        Some(format!("{}/camps/{}", self.prefix, encode_segment(moniker)))
    }

    fn talk(&self, moniker: &str, talk_id: TalkId) -> Option<String> {
        if !talk_id.is_assigned() {
            return None;
        }
        self.camp(moniker)
            .map(|camp| format!("{camp}/talks/{talk_id}"))
    }
}

// Everything but the unreserved characters (RFC 3986 §2.3).
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// `.` and `..` are dot-segments; a client would collapse them.
fn encode_segment(s: &str) -> String {
    if s.bytes().all(|b| b == b'.') {
        return utf8_percent_encode(s, NON_ALPHANUMERIC).to_string();
    }
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}
