//! Shareable links: the recipient's name and message carried as the `n`
//! and `m` query parameters.
//!
//! Each value is percent-encoded on its own before it goes into the query,
//! so the query carries it encoded twice. Links made by the web version of
//! the card have the same shape and open here unchanged.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

pub const NAME_PARAM: &str = "n";
pub const MESSAGE_PARAM: &str = "m";

pub const DEFAULT_BASE_URL: &str = "https://wishcard.app/";

// Everything but the characters a browser's encodeURIComponent leaves alone
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WishData {
    pub name: String,
    pub message: String,
}

impl WishData {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Both fields hold something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.message.trim().is_empty()
    }
}

/// Builds the share link on top of `base`. Any query or fragment already on
/// the base is dropped.
pub fn encode(base: &Url, wish: &WishData) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    let name = utf8_percent_encode(&wish.name, COMPONENT).to_string();
    let message = utf8_percent_encode(&wish.message, COMPONENT).to_string();
    url.query_pairs_mut()
        .append_pair(NAME_PARAM, &name)
        .append_pair(MESSAGE_PARAM, &message);
    url
}

// Second decoding layer. A value that doesn't decode to UTF-8 is kept as the
// query gave it.
fn unescape(value: String) -> String {
    let decoded = percent_decode_str(&value)
        .decode_utf8()
        .map(|text| text.into_owned());
    match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("keeping undecodable value {:?}: {}", value, e);
            value
        }
    }
}

/// Reads a wish back out of a link. Both parameters must be present and
/// non-empty; the first occurrence of each wins.
pub fn decode(url: &Url) -> Option<WishData> {
    let mut name = None;
    let mut message = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            NAME_PARAM if name.is_none() => name = Some(unescape(value.into_owned())),
            MESSAGE_PARAM if message.is_none() => message = Some(unescape(value.into_owned())),
            _ => {}
        }
    }

    match (name, message) {
        (Some(name), Some(message)) if !name.is_empty() && !message.is_empty() => {
            Some(WishData { name, message })
        }
        _ => None,
    }
}

/// Like [`decode`], for a link given as text. Links that don't parse are
/// treated the same as links without a wish.
pub fn parse_link(link: &str) -> Option<WishData> {
    match Url::parse(link.trim()) {
        Ok(url) => decode(&url),
        Err(e) => {
            tracing::debug!("ignoring malformed link {:?}: {}", link, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn round_trip_keeps_newlines() {
        let wish = WishData::new("Sarah", "Hi\nThere");
        let url = encode(&base(), &wish);
        assert_eq!(url.as_str(), "https://wishcard.app/?n=Sarah&m=Hi%250AThere");
        assert_eq!(decode(&url), Some(wish));
    }

    #[test]
    fn round_trip_special_characters() {
        let wish = WishData::new("Zoë & Ana", "100% = a+b?\n#1 ❤");
        let url = encode(&base(), &wish);
        assert_eq!(parse_link(url.as_str()), Some(wish));
    }

    #[test]
    fn encode_replaces_existing_query() {
        let base = Url::parse("https://example.com/card?n=old&x=1#top").unwrap();
        let url = encode(&base, &WishData::new("Alex", "Hey"));
        assert_eq!(url.as_str(), "https://example.com/card?n=Alex&m=Hey");
    }

    #[test]
    fn missing_parameter_is_no_wish() {
        assert_eq!(parse_link("https://wishcard.app/?n=Sarah"), None);
        assert_eq!(parse_link("https://wishcard.app/?m=Hello"), None);
        assert_eq!(parse_link("https://wishcard.app/"), None);
    }

    #[test]
    fn empty_parameter_is_no_wish() {
        assert_eq!(parse_link("https://wishcard.app/?n=&m=Hello"), None);
    }

    #[test]
    fn malformed_link_is_no_wish() {
        assert_eq!(parse_link("not a link"), None);
        assert_eq!(parse_link(""), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let wish = parse_link("https://wishcard.app/?n=A&n=B&m=x").unwrap();
        assert_eq!(wish.name, "A");
    }

    #[test]
    fn plus_decodes_as_space() {
        let wish = parse_link("https://wishcard.app/?n=Mary+Jane&m=Hi%20there").unwrap();
        assert_eq!(wish, WishData::new("Mary Jane", "Hi there"));
    }

    #[test]
    fn double_encoded_values_decode_fully() {
        let wish = parse_link("https://wish.example/?n=Mary%2520Jane&m=Hi%250AThere").unwrap();
        assert_eq!(wish, WishData::new("Mary Jane", "Hi\nThere"));

        let wish = parse_link("https://wishcard.app/?n=Zo%25C3%25AB&m=Hi%0AThere").unwrap();
        assert_eq!(wish, WishData::new("Zoë", "Hi\nThere"));
    }

    #[test]
    fn undecodable_second_layer_is_kept() {
        let wish = parse_link("https://wishcard.app/?n=100%25FF&m=50%25+off").unwrap();
        assert_eq!(wish.name, "100%FF");
        assert_eq!(wish.message, "50% off");
    }

    #[test]
    fn encode_matches_encode_uri_component() {
        let url = encode(&base(), &WishData::new("Mary Jane", "(hi)!"));
        assert_eq!(url.as_str(), "https://wishcard.app/?n=Mary%2520Jane&m=%28hi%29%21");
    }

    #[test]
    fn completeness_ignores_whitespace() {
        assert!(WishData::new("A", "b").is_complete());
        assert!(!WishData::new("  ", "b").is_complete());
        assert!(!WishData::new("A", "\n\n").is_complete());
    }
}
