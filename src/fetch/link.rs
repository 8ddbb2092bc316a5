// `Link` response header parsing (RFC 8288), as used by cursor-paginated
// REST APIs: `<https://api.example/items?page=2>; rel="next", <...>; rel="last"`.

/// Return the target of the `rel="next"` entry, if there is one.
///
/// Malformed entries are ignored rather than reported; a header with no
/// usable `next` entry simply means there is no next page.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?
            .trim();

        let is_next = parts.filter_map(|param| param.split_once('=')).any(|(key, value)| {
            key.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });

        (is_next && !target.is_empty()).then(|| target.to_string())
    })
}
