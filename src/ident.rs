//! Join keys derived from image URLs.

/// Extracts the Flickr photo id from a static image URL.
///
/// Flickr names static files `{photo_id}_{secret}[_{size}].{ext}`, so the id
/// is the last path segment with its extension and everything from the
/// first `_` removed. Query strings and fragments are ignored. A bare
/// `12345.jpg` yields `12345`.
///
/// # Example
/// ```
/// use oistats::ident::extract_image_id;
///
/// let url = "https://farm3.staticflickr.com/2387/2108244434_29a2dff03b_o.jpg";
/// assert_eq!(extract_image_id(url), "2108244434");
/// ```
pub fn extract_image_id(url: &str) -> &str {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    let path = &url[..end];

    let segment = match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    };
    let stem = match segment.rfind('.') {
        Some(idx) => &segment[..idx],
        None => segment,
    };
    match stem.find('_') {
        Some(idx) => &stem[..idx],
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flickr_static_url() {
        assert_eq!(
            extract_image_id("https://farm3.staticflickr.com/2387/2108244434_29a2dff03b_o.jpg"),
            "2108244434"
        );
        assert_eq!(
            extract_image_id("https://c2.staticflickr.com/6/5606/15611395595_f51465687d_o.jpg"),
            "15611395595"
        );
    }

    #[test]
    fn test_plain_file_name() {
        assert_eq!(extract_image_id("http://example.com/photos/12345.jpg"), "12345");
        assert_eq!(extract_image_id("12345.jpg"), "12345");
        assert_eq!(extract_image_id("12345"), "12345");
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(
            extract_image_id("https://example.com/a/777_abc.png?size=large"),
            "777"
        );
        assert_eq!(extract_image_id("https://example.com/a/888.png#top"), "888");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(extract_image_id(""), "");
        assert_eq!(extract_image_id("https://example.com/dir/"), "");
        assert_eq!(extract_image_id(".hidden"), "");
    }

    #[test]
    fn test_stable_across_calls() {
        let url = "https://farm1.staticflickr.com/1/42_deadbeef_o.jpg";
        assert_eq!(extract_image_id(url), extract_image_id(&url.to_string()));
    }
}
