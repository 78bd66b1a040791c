//! Parsed snapshot of a rendered page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::error::{Result, ScrapeError};

/// A page's DOM together with the URL it was loaded from.
///
/// Holds a `scraper::Html`, which is not `Send`; build it, query it, and drop
/// it before the next `.await`.
pub struct RenderedPage {
    url: String,
    html: Html,
}

impl RenderedPage {
    pub fn parse(url: &str, source: &str) -> Self {
        Self {
            url: url.to_string(),
            html: Html::parse_document(source),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// First element matching `selector`, if any.
    pub fn find(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    pub fn find_all<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }

    /// Resolve an `href` against this page's URL.
    pub fn resolve(&self, href: &str) -> Result<String> {
        let invalid = |source| ScrapeError::InvalidUrl {
            href: href.to_string(),
            source,
        };
        let base = Url::parse(&self.url).map_err(invalid)?;
        base.join(href).map(|u| u.to_string()).map_err(invalid)
    }
}

/// All text beneath an element, concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Parse a CSS selector, mapping the error into [`ScrapeError::Selector`].
pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(format!("{}: {}", selector, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <div class="item"><a href="/p/1">One</a></div>
            <div class="item"><a href="https://other.example/p/2">Two <b>bold</b></a></div>
        </body></html>
    "#;

    #[test]
    fn test_find_and_text() {
        let page = RenderedPage::parse("https://www.othoba.com/smartphone", PAGE);
        let selector = parse_selector(".item a").unwrap();

        let first = page.find(&selector).unwrap();
        assert_eq!(element_text(first), "One");
        assert_eq!(page.find_all(&selector).count(), 2);

        let second = page.find_all(&selector).nth(1).unwrap();
        assert_eq!(element_text(second), "Two bold");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let page = RenderedPage::parse("https://www.othoba.com/smartphone?pagesize=40", PAGE);
        assert_eq!(page.resolve("/p/1").unwrap(), "https://www.othoba.com/p/1");
        assert_eq!(
            page.resolve("https://other.example/p/2").unwrap(),
            "https://other.example/p/2"
        );
        assert_eq!(
            page.resolve("?pagenumber=2").unwrap(),
            "https://www.othoba.com/smartphone?pagenumber=2"
        );
    }

    #[test]
    fn test_resolve_against_invalid_base() {
        let page = RenderedPage::parse("not a url", PAGE);
        assert!(matches!(
            page.resolve("/p/1"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(parse_selector("li[["), Err(ScrapeError::Selector(_))));
    }
}
