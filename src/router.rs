//! Explorer URL router
//!
//! Maps explorer locations to views. Accepted forms:
//!
//! - `ecashx://blocks?page=2` deep links (case-insensitive scheme, any
//!   number of slashes after the colon)
//! - absolute explorer URLs: `https://explorer.e.cash/block/<hash>`
//! - bare paths: `/address/ecash:qq...?currentTab=ecash-outpoints`
//! - web hash routes: `#/block-height/700000`
//!
//! ## Routes
//!
//! - `/` and `/blocks` - latest blocks
//! - `/block/<hash>` - transactions of a block
//! - `/block-height/<height>` - same, resolved by height
//! - `/address/<address>` - address transactions, outpoints and balances
//!
//! The query string is returned with the route and seeds the parameter state.

use std::fmt;

pub const SCHEME: &str = "ecashx";

const BASE32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Blocks,
    Block { hash: String },
    BlockHeight { height: u64 },
    Address { address: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Blocks => "/blocks".to_string(),
            Route::Block { hash } => format!("/block/{hash}"),
            Route::BlockHeight { height } => format!("/block-height/{height}"),
            Route::Address { address } => format!("/address/{address}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A parsed location: the route plus its raw query string (without `?`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub route: Route,
    pub query: String,
}

impl Link {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            query: String::new(),
        }
    }

    /// Path and query in the form stored in history.
    pub fn to_url(&self) -> String {
        crate::params::join_url(&self.route.path(), &self.query, "")
    }
}

fn trim_slashes(mut s: &str) -> &str {
    while let Some(rest) = s.strip_prefix('/') {
        s = rest;
    }
    s
}

/// Path after an `ecashx:` scheme (case-insensitive, slash variants).
fn after_scheme(s: &str) -> Option<&str> {
    let (scheme, rest) = s.split_once(':')?;
    if scheme.eq_ignore_ascii_case(SCHEME) {
        Some(trim_slashes(rest))
    } else {
        None
    }
}

/// Path and query of an absolute `http(s)://` URL.
fn after_host(s: &str) -> Option<String> {
    let lower = s.get(..8).map(str::to_ascii_lowercase).unwrap_or_default();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }
    let url = url::Url::parse(s).ok()?;
    let mut out = url.path().to_string();
    if let Some(q) = url.query() {
        out.push('?');
        out.push_str(q);
    }
    Some(out)
}

/// Parse a location. Returns `None` for unknown routes or malformed values.
pub fn parse(raw: &str) -> Option<Link> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(Link::new(Route::Blocks));
    }

    let owned;
    let rest = if let Some(rest) = after_scheme(s) {
        rest
    } else if let Some(path) = after_host(s) {
        owned = path;
        trim_slashes(&owned)
    } else if let Some(rest) = s.strip_prefix("#") {
        trim_slashes(rest)
    } else {
        trim_slashes(s)
    };

    // fragments never carry route state
    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    let mut segments = path.split('/').filter(|seg| !seg.is_empty());
    let page = segments.next().unwrap_or("").to_ascii_lowercase();
    let route = match page.as_str() {
        "" | "blocks" => Route::Blocks,
        "block" => {
            let hash = segments.next()?;
            if !is_block_hash(hash) {
                return None;
            }
            Route::Block {
                hash: hash.to_ascii_lowercase(),
            }
        }
        "block-height" => Route::BlockHeight {
            height: segments.next()?.parse().ok()?,
        },
        "address" => {
            let address = urlencoding::decode(segments.next()?).ok()?.into_owned();
            if address.is_empty() {
                return None;
            }
            Route::Address { address }
        }
        _ => return None,
    };

    Some(Link {
        route,
        query: query.to_string(),
    })
}

pub fn is_block_hash(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_base32_payload(s: &str) -> bool {
    s.len() >= 26 && s.chars().all(|c| BASE32_CHARSET.contains(c))
}

/// Map free text typed into the go-to prompt to a route.
pub fn classify_search(text: &str) -> Option<Route> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if is_block_hash(text) {
        return Some(Route::Block {
            hash: text.to_ascii_lowercase(),
        });
    }
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse()
            .ok()
            .map(|height| Route::BlockHeight { height });
    }

    let lower = text.to_ascii_lowercase();
    if let Some((prefix, payload)) = lower.split_once(':') {
        if (prefix == "ecash" || prefix == "etoken") && is_base32_payload(payload) {
            return Some(Route::Address { address: lower });
        }
        return None;
    }
    if is_base32_payload(&lower) {
        return Some(Route::Address { address: lower });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "000000000000000003a3d3e2d8e6bd2b2f6a43e8a56e2e5e9d9a9b8b7a6c5d4e";
    const ADDR: &str = "ecash:qq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx";

    #[test]
    fn test_parse_blocks() {
        assert_eq!(parse("").unwrap().route, Route::Blocks);
        assert_eq!(parse("/").unwrap().route, Route::Blocks);
        assert_eq!(parse("ecashx://blocks").unwrap().route, Route::Blocks);
        let link = parse("/blocks?page=3&rows=50").unwrap();
        assert_eq!(link.route, Route::Blocks);
        assert_eq!(link.query, "page=3&rows=50");
    }

    #[test]
    fn test_parse_block() {
        let link = parse(&format!("ecashx://block/{HASH}")).unwrap();
        assert_eq!(
            link.route,
            Route::Block {
                hash: HASH.to_string()
            }
        );
        assert!(parse("/block/xyz").is_none());
        assert!(parse("/block/").is_none());
    }

    #[test]
    fn test_parse_block_height() {
        assert_eq!(
            parse("#/block-height/700000").unwrap().route,
            Route::BlockHeight { height: 700_000 }
        );
        assert!(parse("/block-height/abc").is_none());
    }

    #[test]
    fn test_parse_address_with_tab_query() {
        let link = parse(&format!(
            "https://explorer.e.cash/address/{ADDR}?currentTab=ecash-outpoints&ecop=2"
        ))
        .unwrap();
        assert_eq!(
            link.route,
            Route::Address {
                address: ADDR.to_string()
            }
        );
        assert_eq!(link.query, "currentTab=ecash-outpoints&ecop=2");
    }

    #[test]
    fn test_parse_encoded_address() {
        let link = parse("/address/ecash%3Aqq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx").unwrap();
        assert_eq!(
            link.route,
            Route::Address {
                address: ADDR.to_string()
            }
        );
    }

    #[test]
    fn test_parse_case_insensitive_scheme_and_slashes() {
        assert_eq!(parse("ECASHX://blocks").unwrap().route, Route::Blocks);
        assert_eq!(
            parse("ecashx:////block-height/42").unwrap().route,
            Route::BlockHeight { height: 42 }
        );
        assert_eq!(
            parse("ecashx:/block-height/42#frag").unwrap().route,
            Route::BlockHeight { height: 42 }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("ecashx://tx/abc").is_none());
        assert!(parse("/address/").is_none());
        assert!(parse("ftp://explorer/blocks").is_none());
    }

    #[test]
    fn test_link_url_round_trip() {
        let link = parse("/address/qq?txp=2").unwrap();
        assert_eq!(link.to_url(), "/address/qq?txp=2");
        assert_eq!(parse(&link.to_url()).unwrap(), link);
    }

    #[test]
    fn test_classify_search() {
        assert_eq!(
            classify_search(&HASH.to_uppercase()),
            Some(Route::Block {
                hash: HASH.to_string()
            })
        );
        assert_eq!(
            classify_search(" 123 "),
            Some(Route::BlockHeight { height: 123 })
        );
        assert_eq!(
            classify_search(ADDR),
            Some(Route::Address {
                address: ADDR.to_string()
            })
        );
        assert_eq!(
            classify_search("qq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx"),
            Some(Route::Address {
                address: "qq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx".to_string()
            })
        );
        assert_eq!(classify_search("bitcoincash:qq9h6d0a5q65fgywv4ry64x04ep906mdku8f0gxfgx"), None);
        assert_eq!(classify_search("hello"), None);
        assert_eq!(classify_search(""), None);
    }
}
