//! In-page anchor scrolling.

/// Element id targeted by an in-page `href`, or `None` when the link should
/// keep its default behaviour (`#` alone, or not a fragment link).
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Document offset that leaves the target `header_offset` px below the top
/// of the viewport. `rect_top` is the target's viewport-relative top.
pub fn scroll_destination(rect_top: f64, scroll_y: f64, header_offset: f64) -> f64 {
    (rect_top + scroll_y - header_offset).max(0.0)
}
