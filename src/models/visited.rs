//! In-memory set of URLs already processed during a run.

use std::collections::HashSet;

use url::Url;

/// URLs seen during one scrape, shared by listing pages and detail pages.
///
/// By default URLs are compared by exact string equality. Query parameters
/// named in `ignored_params` are stripped before comparison so a site that
/// appends per-visit tokens cannot defeat loop detection.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<String>,
    ignored_params: Vec<String>,
}

impl VisitedSet {
    /// Create a set that ignores the given query parameters when comparing.
    pub fn with_ignored_params(params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            seen: HashSet::new(),
            ignored_params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Record a URL. Returns true if it had not been seen before.
    pub fn insert(&mut self, url: &str) -> bool {
        let key = self.canonical(url);
        self.seen.insert(key)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&self.canonical(url))
    }

    fn canonical(&self, url: &str) -> String {
        if self.ignored_params.is_empty() {
            return url.to_string();
        }

        let Ok(mut parsed) = Url::parse(url) else {
            return url.to_string();
        };

        let kept: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(k, _)| !self.ignored_params.iter().any(|p| p == k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            parsed.set_query(None);
        } else {
            parsed.query_pairs_mut().clear().extend_pairs(kept);
        }

        parsed.to_string()
    }
}
