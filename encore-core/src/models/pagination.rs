//! Pagination support for list queries
//!
//! Song listing uses an opaque page token that encodes the numeric offset of
//! the next page; an empty token means the listing is exhausted.

/// Default page size for song listing
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum allowed page size to prevent OOM and slow queries
pub const MAX_PAGE_SIZE: i64 = 100;

/// Effective page size: default 20, values outside (0, 100] fall back to it.
#[must_use]
pub fn effective_page_size(page_size: Option<i64>) -> i64 {
    match page_size {
        Some(size) if size > 0 && size <= MAX_PAGE_SIZE => size,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Decode a page token into a row offset.
///
/// Tokens are produced by [`next_page_token`]; anything unparseable or
/// negative restarts the listing from the beginning rather than erroring,
/// matching the forgiving behavior of the listing endpoints.
#[must_use]
pub fn parse_page_token(token: Option<&str>) -> i64 {
    token
        .and_then(|t| t.parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(0)
}

/// Produce the token for the next page, or an empty string when the current
/// page was not full (no further rows can exist).
#[must_use]
pub fn next_page_token(offset: i64, page_size: i64, returned: usize) -> String {
    if returned as i64 == page_size {
        (offset + page_size).to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(effective_page_size(None), 20);
        assert_eq!(effective_page_size(Some(0)), 20);
        assert_eq!(effective_page_size(Some(-5)), 20);
        assert_eq!(effective_page_size(Some(500)), 20);
        assert_eq!(effective_page_size(Some(100)), 100);
        assert_eq!(effective_page_size(Some(7)), 7);
    }

    #[test]
    fn invalid_tokens_restart_from_zero() {
        assert_eq!(parse_page_token(None), 0);
        assert_eq!(parse_page_token(Some("")), 0);
        assert_eq!(parse_page_token(Some("abc")), 0);
        assert_eq!(parse_page_token(Some("-10")), 0);
        assert_eq!(parse_page_token(Some("40")), 40);
    }

    #[test]
    fn next_token_is_empty_on_short_page() {
        assert_eq!(next_page_token(0, 20, 20), "20");
        assert_eq!(next_page_token(20, 20, 20), "40");
        assert_eq!(next_page_token(20, 20, 5), "");
        assert_eq!(next_page_token(0, 20, 0), "");
    }

    #[test]
    fn token_round_trip() {
        let token = next_page_token(40, 20, 20);
        assert_eq!(parse_page_token(Some(&token)), 60);
    }
}
