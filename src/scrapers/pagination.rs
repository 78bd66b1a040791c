//! Next-page lookup on listing pages.

use super::error::Result;
use super::layout::Layout;
use super::page::RenderedPage;

/// Absolute URL of the page after the active one.
///
/// `None` when the listing has no further page item with a link; that is the
/// normal end of traversal, not an error.
pub fn find_next_page(page: &RenderedPage, layout: &Layout) -> Result<Option<String>> {
    let Some(href) = page
        .find(&layout.next_page)
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with("javascript:"))
    else {
        return Ok(None);
    };

    page.resolve(href).map(Some)
}
