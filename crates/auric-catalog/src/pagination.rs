//! Cursor extraction for the Admin API's `Link`-header pagination.
//!
//! Each page of `products.json` carries a `Link` response header with URLs
//! for the adjacent pages; the cursor travels as a `page_info` query
//! parameter:
//!
//! ```text
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous",
//! <https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=NEXT>; rel="next"
//! ```

/// Pulls the `page_info` cursor for the next page out of a `Link` header.
///
/// Returns `None` when the header is absent, when no `rel="next"` segment
/// exists (last page), or when the next-page URL carries no `page_info`
/// parameter. Cursors are base64url-encoded and need no percent-decoding.
#[must_use]
pub fn next_page_cursor(link_header: Option<&str>) -> Option<String> {
    let header = link_header?;

    header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(bracketed_url)
        .and_then(|url| query_value(url, "page_info"))
}

/// The URL between `<` and `>` in one link directive.
fn bracketed_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    (start < end).then(|| &segment[start..end])
}

fn query_value(url: &str, param: &str) -> Option<String> {
    let query = &url[url.find('?')? + 1..];
    let needle = format!("{param}=");

    query
        .split('&')
        .filter_map(|pair| pair.strip_prefix(needle.as_str()))
        // Drop any trailing fragment anchor.
        .map(|value| value.split('#').next().unwrap_or(value))
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_header_yields_no_cursor() {
        assert!(next_page_cursor(None).is_none());
        assert!(next_page_cursor(Some("")).is_none());
    }

    #[test]
    fn extracts_cursor_from_single_next_link() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=eyJsYXN0X2lkIjo5fQ>; rel="next""#;
        assert_eq!(
            next_page_cursor(Some(header)).as_deref(),
            Some("eyJsYXN0X2lkIjo5fQ")
        );
    }

    #[test]
    fn picks_next_out_of_combined_prev_next() {
        let header = concat!(
            r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous",  "#,
            r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=NEXT>; rel="next""#
        );
        assert_eq!(next_page_cursor(Some(header)).as_deref(), Some("NEXT"));
    }

    #[test]
    fn previous_only_means_last_page() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&page_info=PREV>; rel="previous""#;
        assert!(next_page_cursor(Some(header)).is_none());
    }

    #[test]
    fn next_link_without_page_info_yields_no_cursor() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250>; rel="next""#;
        assert!(next_page_cursor(Some(header)).is_none());
    }

    #[test]
    fn page_info_need_not_be_first_parameter() {
        let header = r#"<https://shop.myshopify.com/admin/api/2024-01/products.json?limit=250&fields=id&page_info=CUR>; rel="next""#;
        assert_eq!(next_page_cursor(Some(header)).as_deref(), Some("CUR"));
    }
}
