//! Slug generation
//!
//! `Spring Sale!` → `spring-sale`; collisions get `-1`, `-2`, … appended.

use std::collections::HashSet;

/// Slug used when the source text has no usable characters
pub const FALLBACK_SLUG: &str = "cta";

/// 留出后缀空间（列宽 200）
const MAX_SLUG_LEN: usize = 190;

/// Lowercase, keep alphanumerics, collapse everything else into single dashes
pub fn sanitize_slug(source: &str) -> String {
    let mut slug = String::with_capacity(source.len());
    let mut pending_dash = false;

    for ch in source.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_LEN {
        slug = slug.chars().take(MAX_SLUG_LEN).collect();
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Pick `base`, or the first free `base-N`, given the slugs already in use
pub fn disambiguate_slug(base: &str, taken: &[String]) -> String {
    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut suffix = 1u32;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_slug("Spring Sale!"), "spring-sale");
        assert_eq!(sanitize_slug("  Black   Friday -- 2025 "), "black-friday-2025");
        assert_eq!(sanitize_slug("snake_case_title"), "snake-case-title");
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_slug("Été Soldes"), "été-soldes");
        assert_eq!(sanitize_slug("春季 促销"), "春季-促销");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_slug(""), FALLBACK_SLUG);
        assert_eq!(sanitize_slug("!!!"), FALLBACK_SLUG);
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "a".repeat(300);
        assert_eq!(sanitize_slug(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_disambiguate() {
        assert_eq!(disambiguate_slug("promo", &[]), "promo");
        assert_eq!(
            disambiguate_slug("promo", &["promo".to_string()]),
            "promo-1"
        );
        assert_eq!(
            disambiguate_slug(
                "promo",
                &["promo".to_string(), "promo-1".to_string(), "promo-3".to_string()]
            ),
            "promo-2"
        );
    }

    #[test]
    fn test_disambiguate_ignores_unrelated_suffixes() {
        assert_eq!(
            disambiguate_slug("promo", &["promo-1".to_string()]),
            "promo"
        );
    }
}
