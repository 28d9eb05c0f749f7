///! QRZ.com XML answer parser
///!
///! The answers are small and flat, so the handful of elements we need are
///! pulled out with regular expressions instead of a full XML parser.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{XmlCallsign, XmlResponse, XmlSession};

static SESSION: LazyLock<Regex> = LazyLock::new(|| element("Session"));
static CALLSIGN: LazyLock<Regex> = LazyLock::new(|| element("Callsign"));
static KEY: LazyLock<Regex> = LazyLock::new(|| element("Key"));
static ERROR: LazyLock<Regex> = LazyLock::new(|| element("Error"));
static GRID: LazyLock<Regex> = LazyLock::new(|| element("grid"));

/// Pattern for the text of a `<tag>...</tag>` element.
fn element(tag: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{tag}(?:\s[^>]*)?>(.*?)</{tag}>"))
        .expect("element pattern is a valid regex")
}

/// Parse a QRZ.com XML answer into an [`XmlResponse`].
pub fn parse_xml_response(xml: &str) -> XmlResponse {
    let session = extract(&SESSION, xml).map(|block| XmlSession {
        key: extract(&KEY, &block).filter(|k| !k.is_empty()),
        error: extract(&ERROR, &block),
    });

    let callsign = extract(&CALLSIGN, xml).map(|block| XmlCallsign {
        grid: extract(&GRID, &block),
    });

    XmlResponse { session, callsign }
}

/// Text of the first element matched by `re`, trimmed and unescaped.
fn extract(re: &Regex, xml: &str) -> Option<String> {
    re.captures(xml)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape(m.as_str().trim()))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
