//! Body decoding.
//!
//! Forum software is old and often not UTF-8. Fetched bodies arrive as
//! bytes; the charset comes from the `Content-Type` header when it names
//! one, else from a `<meta>` declaration in the first kilobyte, else UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Bytes of the document searched for a `<meta>` charset.
const SNIFF_LEN: usize = 1024;

/// `<meta charset="...">` and the `http-equiv` `content="...; charset=..."`
/// form.
#[allow(clippy::expect_used)]
static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>]+)"#).expect("META_CHARSET regex")
});

/// `text/html; charset=...` header value.
#[allow(clippy::expect_used)]
static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).expect("HEADER_CHARSET regex"));

/// Encoding named by a `Content-Type` header value.
#[must_use]
pub fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let label = HEADER_CHARSET.captures(content_type)?.get(1)?;
    Encoding::for_label(label.as_str().as_bytes())
}

/// Encoding declared by a `<meta>` tag near the top of `body`.
#[must_use]
pub fn sniff_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&body[..body.len().min(SNIFF_LEN)]);
    let label = META_CHARSET.captures(&head)?.get(1)?;
    Encoding::for_label(label.as_str().as_bytes())
}

/// Decode a fetched body to a UTF-8 string.
///
/// Undecodable sequences become U+FFFD; decoding never fails.
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| sniff_meta_charset(body))
        .unwrap_or(UTF_8);

    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }

    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}
