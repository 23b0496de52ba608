use url::Url;

/// Shortest string accepted as a link target; anything shorter is a degenerate href
pub const MIN_URL_LEN: usize = 20;

/// Normalizes an href found on the page at `base`
///
/// # Normalization Steps
///
/// 1. Resolve the href against `base` (RFC 3986), or parse it verbatim when
///    `follow_relative` is false
/// 2. Remove the fragment (everything after #)
/// 3. Reject results shorter than [`MIN_URL_LEN`]
/// 4. Reject anything that is not `http://` or `https://`
///
/// Path case and trailing slashes are preserved, so `/docs` and `/docs/` are
/// distinct links.
///
/// # Arguments
///
/// * `href` - The raw href attribute value
/// * `base` - URL of the page the href was found on
/// * `follow_relative` - Whether relative hrefs are resolved against `base`
///
/// # Returns
///
/// * `Some(String)` - Normalized absolute URL
/// * `None` - The href was rejected
///
/// # Examples
///
/// ```
/// use link_crawler::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// let link = normalize_link("guide#install", &base, true);
/// assert_eq!(link.as_deref(), Some("https://example.com/docs/guide"));
/// ```
pub fn normalize_link(href: &str, base: &Url, follow_relative: bool) -> Option<String> {
    let mut url = if follow_relative {
        base.join(href).ok()?
    } else {
        Url::parse(href).ok()?
    };

    url.set_fragment(None);
    let link = String::from(url);

    if link.len() < MIN_URL_LEN {
        return None;
    }

    if !(link.starts_with("http://") || link.starts_with("https://")) {
        return None;
    }

    Some(link)
}
