//! RFC 5988 `Link` header rendering

use crate::cursor::TokenSet;

/// Render a token set as a `Link` header value
///
/// Each present token becomes `<base_url?page=token>; rel="<type>"`, in
/// `self`, `first`, `next`, `prev` order. An existing query on `base_url` is
/// kept and `page` is appended to it.
pub fn link_header(base_url: &str, tokens: &TokenSet) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };

    tokens
        .links()
        .into_iter()
        .map(|(rel, token)| {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("page", token)
                .finish();
            format!("<{base_url}{separator}{query}>; rel=\"{rel}\"")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find the URL for a relation in a `Link` header value
pub fn parse_link_header(header: &str, rel: &str) -> Option<String> {
    header.split(',').find_map(|link| {
        let mut url = None;
        let mut matches = false;

        for segment in link.split(';').map(str::trim) {
            if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                url = Some(inner);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                matches = value.trim_matches(['"', '\'']) == rel;
            }
        }

        url.filter(|_| matches).map(str::to_string)
    })
}
