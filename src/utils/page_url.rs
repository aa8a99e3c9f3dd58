//! Page URL normalization and hashing
//!
//! Events are grouped per page by a compact xxHash64 of the normalized URL,
//! so `https://Example.com/pricing/` and `https://example.com/pricing#plans`
//! land in the same bucket.

use url::Url;
use xxhash_rust::xxh64::xxh64;

/// Normalize a page URL for grouping
///
/// Lowercases scheme and host (done by the parser), drops the fragment and
/// default port, and strips a trailing `/` from non-root paths. Input that
/// does not parse as an absolute URL is only trimmed.
pub fn normalize_page_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}

/// 16 位十六进制 xxh64 哈希
pub fn page_url_hash(raw: &str) -> String {
    let normalized = normalize_page_url(raw);
    format!("{:016x}", xxh64(normalized.as_bytes(), 0))
}
