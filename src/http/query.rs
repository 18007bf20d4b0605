use std::collections::HashMap;

/// Returns the request target without its query string.
pub fn get_path(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

/// Parses the query string of a request target into a map.
///
/// Names and values are form-urlencoded decoded. When a name repeats, the
/// last value wins.
pub fn parse_query(url: &str) -> HashMap<String, String> {
    match url.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => HashMap::new(),
    }
}
