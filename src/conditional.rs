//! Conditional request evaluation (If-None-Match / If-Modified-Since)

use crate::http_date::parse_http_date;
use crate::models::ValidatorRecord;
use chrono::{DateTime, Utc};
use http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use http::HeaderMap;
use tracing::debug;

/// Conditional headers of one request
///
/// Malformed headers are recorded as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalContext {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl ConditionalContext {
    /// Create a context from raw header values
    pub fn new(if_none_match: Option<&str>, if_modified_since: Option<&str>) -> Self {
        ConditionalContext {
            if_none_match: if_none_match.map(str::to_string),
            if_modified_since: if_modified_since.and_then(parse_http_date),
        }
    }

    /// Extract the conditional headers from a request
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let if_none_match = headers
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok());
        let if_modified_since = headers
            .get(IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok());

        let context = Self::new(if_none_match, if_modified_since);
        if if_modified_since.is_some() && context.if_modified_since.is_none() {
            debug!("Ignoring malformed If-Modified-Since: {:?}", if_modified_since);
        }
        context
    }
}

/// Whether a request can be answered with 304 Not Modified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    ShortCircuit,
    Proceed,
}

/// Evaluate a request's conditional headers against a resource's validators
///
/// If-None-Match takes precedence: when the request carries it, the
/// answer depends on the ETag alone. Otherwise If-Modified-Since short
/// circuits when the resource has not changed since that instant.
pub fn evaluate(context: &ConditionalContext, validators: &ValidatorRecord) -> Decision {
    if let Some(if_none_match) = &context.if_none_match {
        return match &validators.etag {
            Some(etag) if etag == if_none_match => Decision::ShortCircuit,
            _ => Decision::Proceed,
        };
    }

    let not_modified = context
        .if_modified_since
        .zip(validators.last_modified.as_deref().and_then(parse_http_date))
        .map(|(since, last_modified)| last_modified <= since)
        .unwrap_or(false);

    if not_modified {
        Decision::ShortCircuit
    } else {
        Decision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const LAST_MODIFIED: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

    fn validators() -> ValidatorRecord {
        ValidatorRecord::new(
            Some(LAST_MODIFIED.to_string()),
            Some("\"abc123\"".to_string()),
        )
    }

    #[test]
    fn test_no_conditionals_proceeds() {
        assert_eq!(evaluate(&ConditionalContext::default(), &validators()), Decision::Proceed);
    }

    #[test]
    fn test_matching_etag_short_circuits() {
        let context = ConditionalContext::new(Some("\"abc123\""), None);
        assert_eq!(evaluate(&context, &validators()), Decision::ShortCircuit);
    }

    #[test]
    fn test_matching_etag_wins_over_old_date() {
        let context = ConditionalContext::new(Some("\"abc123\""), Some("Thu, 01 Jan 1970 00:00:00 GMT"));
        assert_eq!(evaluate(&context, &validators()), Decision::ShortCircuit);
    }

    #[test]
    fn test_mismatched_etag_ignores_date() {
        let context = ConditionalContext::new(Some("\"other\""), Some(LAST_MODIFIED));
        assert_eq!(evaluate(&context, &validators()), Decision::Proceed);
    }

    #[test]
    fn test_if_none_match_without_etag_proceeds() {
        let context = ConditionalContext::new(Some("\"abc123\""), None);
        assert_eq!(evaluate(&context, &ValidatorRecord::default()), Decision::Proceed);
    }

    #[test]
    fn test_if_modified_since_equal() {
        let context = ConditionalContext::new(None, Some(LAST_MODIFIED));
        assert_eq!(evaluate(&context, &validators()), Decision::ShortCircuit);
    }

    #[test]
    fn test_if_modified_since_later() {
        let context = ConditionalContext::new(None, Some("Thu, 22 Oct 2015 07:28:00 GMT"));
        assert_eq!(evaluate(&context, &validators()), Decision::ShortCircuit);
    }

    #[test]
    fn test_if_modified_since_earlier() {
        let context = ConditionalContext::new(None, Some("Tue, 20 Oct 2015 07:28:00 GMT"));
        assert_eq!(evaluate(&context, &validators()), Decision::Proceed);
    }

    #[test]
    fn test_malformed_date_is_absent() {
        let context = ConditionalContext::new(None, Some("not a date"));
        assert_eq!(context.if_modified_since, None);
        assert_eq!(evaluate(&context, &validators()), Decision::Proceed);
    }

    #[test]
    fn test_date_without_last_modified_proceeds() {
        let context = ConditionalContext::new(None, Some(LAST_MODIFIED));
        assert_eq!(evaluate(&context, &ValidatorRecord::default()), Decision::Proceed);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"abc123\""));
        headers.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 UTC"));

        let context = ConditionalContext::from_headers(&headers);
        assert_eq!(context.if_none_match.as_deref(), Some("\"abc123\""));
        assert!(context.if_modified_since.is_some());
    }
}
