//! Retry and rate-limit policy for GitHub API requests.
//!
//! Two independent mechanisms decide whether a failed request is sent again:
//!
//! - **Generic retry**: transport failures and server-side statuses are retried
//!   with a quadratic backoff, up to [`ClientConfig::max_retries`] times.
//! - **Throttling**: responses signalling a primary or secondary rate limit are
//!   handed to a [`RateLimitHandler`], which decides whether to wait out the
//!   server-specified delay and try again.
//!
//! [`ClientConfig::max_retries`]: crate::github::ClientConfig

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tracing::{info, warn};

/// Statuses that will not change by asking again.
const DO_NOT_RETRY: [u16; 7] = [400, 401, 403, 404, 410, 422, 451];

/// Delay applied to a secondary rate limit when the server does not name one.
pub const DEFAULT_SECONDARY_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Which rate limit a response hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitKind {
    /// The request quota for the current window is exhausted.
    Primary,
    /// GitHub's abuse detection throttled the request.
    Secondary,
}

impl fmt::Display for RateLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitKind::Primary => f.write_str("Primary rate limit exceeded"),
            RateLimitKind::Secondary => f.write_str("Secondary rate limit exceeded"),
        }
    }
}

/// A rate-limited request, as seen by a [`RateLimitHandler`].
#[derive(Debug, Clone)]
pub struct RateLimited<'a> {
    pub kind: RateLimitKind,
    /// How long the server asked us to wait.
    pub retry_after: Duration,
    pub method: &'a str,
    pub url: &'a str,
    /// Retries already made for this request.
    pub retry_count: u32,
}

/// Decides whether a rate-limited request should be retried after its delay.
pub type RateLimitHandler = fn(&RateLimited<'_>) -> bool;

/// Rate-limit handlers used by a client.
///
/// Handlers are consulted at most [`ClientConfig::max_retries`] times per
/// request; past that the request fails regardless of their answer.
///
/// [`ClientConfig::max_retries`]: crate::github::ClientConfig
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    pub on_rate_limit: RateLimitHandler,
    pub on_secondary_rate_limit: RateLimitHandler,
}

impl ThrottleConfig {
    /// The handler consulted for the given kind of rate limit.
    pub fn handler(&self, kind: RateLimitKind) -> RateLimitHandler {
        match kind {
            RateLimitKind::Primary => self.on_rate_limit,
            RateLimitKind::Secondary => self.on_secondary_rate_limit,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            on_rate_limit: retry_quota_once,
            on_secondary_rate_limit: retry_abuse_once,
        }
    }
}

/// Retries a primary rate limit only on the first retry of a request.
pub fn retry_quota_once(event: &RateLimited<'_>) -> bool {
    warn!("Request quota exhausted for request {} {}", event.method, event.url);
    retry_if_first(event)
}

/// Retries a secondary rate limit only on the first retry of a request.
pub fn retry_abuse_once(event: &RateLimited<'_>) -> bool {
    warn!("Abuse detected for request {} {}", event.method, event.url);
    retry_if_first(event)
}

fn retry_if_first(event: &RateLimited<'_>) -> bool {
    if event.retry_count == 0 {
        info!("Retrying after {} seconds!", event.retry_after.as_secs());
        true
    } else {
        false
    }
}

/// Whether a failed response status is worth retrying.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.as_u16() >= 400 && !DO_NOT_RETRY.contains(&status.as_u16())
}

/// Whether a transport-level failure is worth retrying.
pub fn is_retryable_error(err: &reqwest::Error) -> bool {
    !err.is_builder() && !err.is_decode()
}

/// Delay before retry number `retry_count + 1`.
pub fn backoff_delay(base: Duration, retry_count: u32) -> Duration {
    let factor = retry_count.saturating_add(1).saturating_pow(2);
    base.saturating_mul(factor)
}

/// Detect a rate-limit signal in a failed response.
///
/// `message` is the API error message from the response body.
pub fn detect_rate_limit(
    status: StatusCode,
    headers: &HeaderMap,
    message: &str,
    now: SystemTime,
) -> Option<(RateLimitKind, Duration)> {
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }

    let retry_after = header_u64(headers, "retry-after").map(Duration::from_secs);

    let lower = message.to_ascii_lowercase();
    if lower.contains("secondary rate") || lower.contains("abuse") {
        return Some((
            RateLimitKind::Secondary,
            retry_after.unwrap_or(DEFAULT_SECONDARY_RETRY_AFTER),
        ));
    }

    if header_str(headers, "x-ratelimit-remaining") == Some("0") {
        let delay = retry_after.unwrap_or_else(|| {
            let reset = header_u64(headers, "x-ratelimit-reset").unwrap_or(0);
            let now = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
            Duration::from_secs(reset.saturating_add(1).saturating_sub(now))
        });
        return Some((RateLimitKind::Primary, delay));
    }

    None
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn event(retry_count: u32) -> RateLimited<'static> {
        RateLimited {
            kind: RateLimitKind::Primary,
            retry_after: Duration::from_secs(3),
            method: "PATCH",
            url: "https://api.github.com/repos/acme/widgets",
            retry_count,
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::CONFLICT));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));

        assert!(!is_retryable_status(StatusCode::OK));
        assert!(!is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn test_backoff_is_quadratic() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 9), Duration::from_secs(100));
        assert_eq!(backoff_delay(Duration::ZERO, 5), Duration::ZERO);
    }

    #[test]
    fn test_primary_rate_limit_from_reset() {
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1010")]);
        let detected = detect_rate_limit(StatusCode::FORBIDDEN, &h, "API rate limit exceeded", at(1000));

        assert_eq!(detected, Some((RateLimitKind::Primary, Duration::from_secs(11))));
    }

    #[test]
    fn test_primary_rate_limit_reset_in_past() {
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "900")]);
        let detected = detect_rate_limit(StatusCode::TOO_MANY_REQUESTS, &h, "", at(1000));

        assert_eq!(detected, Some((RateLimitKind::Primary, Duration::ZERO)));
    }

    #[test]
    fn test_primary_rate_limit_far_future_reset() {
        let h = headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "18446744073709551615")]);
        let detected = detect_rate_limit(StatusCode::FORBIDDEN, &h, "", at(1000));

        assert_eq!(detected, Some((RateLimitKind::Primary, Duration::from_secs(u64::MAX - 1000))));
    }

    #[test]
    fn test_primary_rate_limit_prefers_retry_after() {
        let h = headers(&[("x-ratelimit-remaining", "0"), ("retry-after", "5")]);
        let detected = detect_rate_limit(StatusCode::FORBIDDEN, &h, "", at(1000));

        assert_eq!(detected, Some((RateLimitKind::Primary, Duration::from_secs(5))));
    }

    #[test]
    fn test_secondary_rate_limit() {
        let h = headers(&[("retry-after", "30")]);
        let detected = detect_rate_limit(
            StatusCode::FORBIDDEN,
            &h,
            "You have exceeded a secondary rate limit. Please wait a few minutes.",
            at(1000),
        );
        assert_eq!(detected, Some((RateLimitKind::Secondary, Duration::from_secs(30))));

        let detected = detect_rate_limit(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            "You have triggered an abuse detection mechanism.",
            at(1000),
        );
        assert_eq!(detected, Some((RateLimitKind::Secondary, DEFAULT_SECONDARY_RETRY_AFTER)));
    }

    #[test]
    fn test_plain_forbidden_is_not_rate_limit() {
        let h = headers(&[("x-ratelimit-remaining", "4999")]);
        assert_eq!(
            detect_rate_limit(StatusCode::FORBIDDEN, &h, "Must have admin rights", at(1000)),
            None
        );
    }

    #[test]
    fn test_other_statuses_are_not_rate_limits() {
        let h = headers(&[("x-ratelimit-remaining", "0")]);
        assert_eq!(
            detect_rate_limit(StatusCode::INTERNAL_SERVER_ERROR, &h, "secondary rate", at(1000)),
            None
        );
    }

    #[test]
    fn test_default_handlers_retry_first_time_only() {
        let throttle = ThrottleConfig::default();
        for kind in [RateLimitKind::Primary, RateLimitKind::Secondary] {
            let handler = throttle.handler(kind);
            assert!(handler(&RateLimited { kind, ..event(0) }));
            assert!(!handler(&RateLimited { kind, ..event(1) }));
            assert!(!handler(&RateLimited { kind, ..event(4) }));
        }
    }
}
