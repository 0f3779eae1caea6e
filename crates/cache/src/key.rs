//! Deterministic cache keys for paginated list endpoints.
//!
//! Two logically identical requests must land on the same key, so raw
//! pagination input is clamped before the key is built. Malformed input is
//! never rejected at this layer (the HTTP boundary treats it as page 1).

/// Page requested when the query string carries none.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the query string carries none.
pub const DEFAULT_LIMIT: u32 = 5;

/// Cache tags, one per cacheable catalog resource. Every cached page of a
/// resource is registered under its tag so a single write purges them all.
pub mod tags {
    pub const VIDEOGAME: &str = "videogame";
    pub const EDITOR: &str = "editor";
    pub const CATEGORY: &str = "category";
}

/// Clamped pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    /// Clamp raw query-string input.
    ///
    /// Absent values fall back to the defaults; present but non-numeric,
    /// zero, or negative values clamp to 1.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: clamp_component(page, DEFAULT_PAGE),
            limit: clamp_component(limit, DEFAULT_LIMIT),
        }
    }

    /// Offset of the first row of this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn clamp_component(raw: Option<&str>, default: u32) -> u32 {
    match raw {
        None => default,
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map(|v| v.clamp(1, i64::from(u32::MAX)) as u32)
            .unwrap_or(1),
    }
}

/// Build the cache key for one page of a resource listing.
pub fn page_key(resource: &str, params: PageParams) -> String {
    format!("{}-{}-{}", resource, params.page, params.limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let params = PageParams::from_raw(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 5);
    }

    #[test]
    fn test_negative_and_zero_clamp_to_one() {
        let params = PageParams::from_raw(Some("-3"), Some("0"));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn test_non_numeric_clamps_to_one() {
        let params = PageParams::from_raw(Some("abc"), Some(""));
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[test]
    fn test_valid_input_passes_through() {
        let params = PageParams::from_raw(Some("7"), Some("25"));
        assert_eq!(params.page, 7);
        assert_eq!(params.limit, 25);
        assert_eq!(params.offset(), 150);
    }

    #[test]
    fn test_key_is_stable() {
        let a = page_key(tags::VIDEOGAME, PageParams::from_raw(Some("2"), Some("10")));
        let b = page_key(tags::VIDEOGAME, PageParams::from_raw(Some("2"), Some("10")));
        assert_eq!(a, b);
        assert_eq!(a, "videogame-2-10");
    }

    #[test]
    fn test_distinct_pages_never_collide() {
        let mut keys = std::collections::HashSet::new();
        for page in 1..=10 {
            for limit in 1..=10 {
                let params = PageParams::from_raw(
                    Some(&page.to_string()),
                    Some(&limit.to_string()),
                );
                assert!(keys.insert(page_key(tags::EDITOR, params)));
            }
        }
    }

    #[test]
    fn test_clamped_inputs_share_a_key() {
        let a = page_key(tags::CATEGORY, PageParams::from_raw(Some("-1"), Some("oops")));
        let b = page_key(tags::CATEGORY, PageParams::from_raw(Some("0"), Some("1")));
        assert_eq!(a, b);
    }
}
