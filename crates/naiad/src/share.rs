//! Share-link codec for diagram source text.
//!
//! Turns arbitrary diagram source into a URL-safe, size-bounded token and
//! back. Two encodings compete: a DEFLATE-compressed, base64-url token under
//! the `c` query key, and a percent-encoded-then-base64 token under the
//! legacy `code` key. [`encode`] tries them in that fixed order and fails
//! with [`ShareError::TooLarge`] when neither candidate fits the
//! [`MAX_URL_LENGTH`] bound; it never truncates and never emits an
//! over-length URL.
//!
//! [`decode`] is best-effort: a malformed or absent token yields `None`,
//! never an error, so a shared link that cannot be read degrades to an empty
//! editor instead of a failure page.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use log::{debug, warn};
use thiserror::Error;
use url::Url;

/// Hard upper bound on the length of a generated share URL, in characters.
pub const MAX_URL_LENGTH: usize = 2000;

/// Query key carrying a compressed token.
const COMPRESSED_PARAM: &str = "c";

/// Query key carrying a base64 fallback token.
const BASE64_PARAM: &str = "code";

/// Escape set equivalent to ECMAScript's `encodeURIComponent`.
const URI_COMPONENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Errors that can occur while generating a share link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    /// Neither encoding produced a URL within [`MAX_URL_LENGTH`].
    #[error(
        "Diagram too large for URL sharing ({chars} characters). \
         Consider shortening your diagram or using the export feature instead."
    )]
    TooLarge {
        /// Character count of the original diagram source.
        chars: usize,
    },
}

/// The encoding a share token was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMethod {
    /// DEFLATE + base64-url under the `c` key.
    Compressed,
    /// Percent-encode + base64 under the `code` key.
    Base64,
}

impl std::fmt::Display for ShareMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compressed => write!(f, "compressed"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// A successfully encoded share link.
#[derive(Debug, Clone)]
pub struct ShareToken {
    method: ShareMethod,
    url: Url,
    payload: String,
    original_size: usize,
    encoded_size: usize,
}

impl ShareToken {
    /// Returns the encoding that produced this token.
    pub fn method(&self) -> ShareMethod {
        self.method
    }

    /// Returns the full share URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the encoded query payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the character count of the original diagram source.
    pub fn original_size(&self) -> usize {
        self.original_size
    }

    /// Returns the character count of the encoded payload.
    pub fn encoded_size(&self) -> usize {
        self.encoded_size
    }
}

/// Generate a shareable URL for diagram source.
///
/// Any query already present on `base` is replaced by the share parameter.
///
/// The compressed candidate is preferred; the base64 fallback is attempted
/// both when compression fails and when the compressed URL is over-length.
///
/// # Errors
///
/// Returns [`ShareError::TooLarge`] when no candidate fits the bound.
pub fn encode(base: &Url, source: &str) -> Result<ShareToken, ShareError> {
    encode_with(base, source, compress)
}

/// Encoding policy with the compressor as a seam.
///
/// The base64 fallback runs when the compressor errors and when its candidate
/// URL is over-length; both triggers are pinned by the unit tests below.
fn encode_with(
    base: &Url,
    source: &str,
    compressor: impl Fn(&str) -> std::io::Result<String>,
) -> Result<ShareToken, ShareError> {
    let original_size = source.chars().count();

    match compressor(source) {
        Ok(payload) => {
            if let Some(token) =
                candidate(base, ShareMethod::Compressed, payload, original_size)
            {
                return Ok(token);
            }
        }
        Err(err) => warn!(err:? = err; "Compression failed, trying base64 fallback"),
    }

    let payload = STANDARD.encode(
        percent_encoding::utf8_percent_encode(source, URI_COMPONENT).to_string(),
    );
    if let Some(token) = candidate(base, ShareMethod::Base64, payload, original_size) {
        return Ok(token);
    }

    Err(ShareError::TooLarge {
        chars: original_size,
    })
}

/// Extract diagram source from a share URL.
///
/// The compressed `c` key is checked first, then the `code` fallback. Every
/// failure mode yields `None`; this function never errors.
pub fn decode(url: &Url) -> Option<String> {
    if let Some(payload) = raw_query_param(url, COMPRESSED_PARAM) {
        if let Some(source) = decompress(&payload) {
            return Some(source);
        }
        warn!("Failed to decompress share parameter");
    }

    if let Some(payload) = raw_query_param(url, BASE64_PARAM) {
        if let Some(source) = decode_base64(&payload) {
            return Some(source);
        }
        warn!("Failed to decode base64 share parameter");
    }

    None
}

/// Returns `url` with both share query keys removed.
///
/// Other query pairs are preserved verbatim; a URL without share parameters
/// comes back unchanged.
pub fn clean_url(url: &Url) -> Url {
    let mut cleaned = url.clone();
    let remaining: Vec<&str> = url
        .query()
        .map(|query| {
            query
                .split('&')
                .filter(|pair| {
                    let key = pair.split('=').next().unwrap_or(pair);
                    key != COMPRESSED_PARAM && key != BASE64_PARAM
                })
                .collect()
        })
        .unwrap_or_default();

    if remaining.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.set_query(Some(&remaining.join("&")));
    }
    cleaned
}

/// Compression statistics for UI display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionStats {
    /// Character count of the diagram source.
    pub original_size: usize,
    /// Character count of the encoded payload.
    pub compressed_size: usize,
    /// Percent saved relative to the original; negative when the encoding
    /// expands the source.
    pub ratio_percent: i32,
    /// Encoding the statistics describe.
    pub method: ShareMethod,
}

/// Compute compression statistics for diagram source without building a URL.
pub fn compression_stats(source: &str) -> CompressionStats {
    let original_size = source.chars().count();

    let (payload, method) = match compress(source) {
        Ok(payload) => (payload, ShareMethod::Compressed),
        Err(_) => (
            STANDARD.encode(
                percent_encoding::utf8_percent_encode(source, URI_COMPONENT).to_string(),
            ),
            ShareMethod::Base64,
        ),
    };

    let compressed_size = payload.chars().count();
    let ratio_percent = if original_size == 0 {
        0
    } else {
        ((1.0 - compressed_size as f64 / original_size as f64) * 100.0).round() as i32
    };

    CompressionStats {
        original_size,
        compressed_size,
        ratio_percent,
        method,
    }
}

fn candidate(
    base: &Url,
    method: ShareMethod,
    payload: String,
    original_size: usize,
) -> Option<ShareToken> {
    let key = match method {
        ShareMethod::Compressed => COMPRESSED_PARAM,
        ShareMethod::Base64 => BASE64_PARAM,
    };

    let mut url = base.clone();
    url.set_query(Some(&format!("{key}={payload}")));

    if url.as_str().len() > MAX_URL_LENGTH {
        debug!(
            method = method.to_string(),
            url_length = url.as_str().len();
            "Share candidate over length bound"
        );
        return None;
    }

    let encoded_size = payload.chars().count();
    Some(ShareToken {
        method,
        url,
        payload,
        original_size,
        encoded_size,
    })
}

/// Returns the raw (undecoded) value of a query parameter.
///
/// The payload alphabets never need percent-escaping, so the raw value is the
/// exact encoder output.
fn raw_query_param(url: &Url, key: &str) -> Option<String> {
    url.query()?.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == key).then(|| value.to_string())
    })
}

fn compress(source: &str) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(source.as_bytes())?;
    let bytes = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn decompress(payload: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let mut source = String::new();
    DeflateDecoder::new(bytes.as_slice())
        .read_to_string(&mut source)
        .ok()?;
    Some(source)
}

fn decode_base64(payload: &str) -> Option<String> {
    let bytes = STANDARD.decode(payload).ok()?;
    let escaped = std::str::from_utf8(&bytes).ok()?;
    Some(
        percent_encoding::percent_decode_str(escaped)
            .decode_utf8()
            .ok()?
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://naiad.example/").unwrap()
    }

    #[test]
    fn encode_prefers_compression() {
        let token = encode(&base(), "flowchart TD\nA-->B").unwrap();
        assert_eq!(token.method(), ShareMethod::Compressed);
        assert!(token.url().as_str().starts_with("https://naiad.example/?c="));
        assert_eq!(token.original_size(), 18);
        assert_eq!(token.encoded_size(), token.payload().chars().count());
    }

    #[test]
    fn decode_inverts_encode() {
        let source = "sequenceDiagram\n  Alice->>Bob: héllo ✓";
        let token = encode(&base(), source).unwrap();
        assert_eq!(decode(token.url()).as_deref(), Some(source));
    }

    #[test]
    fn decode_checks_compressed_key_first() {
        let token = encode(&base(), "graph LR").unwrap();
        let mut url = token.url().clone();
        // A base64 pair after the compressed one must not win.
        url.set_query(Some(&format!("c={}&code=Z2FyYmFnZQ==", token.payload())));
        assert_eq!(decode(&url).as_deref(), Some("graph LR"));
    }

    #[test]
    fn decode_falls_through_corrupt_compressed_token() {
        let escaped =
            percent_encoding::utf8_percent_encode("pie title Pets", URI_COMPONENT).to_string();
        let payload = STANDARD.encode(escaped);
        let mut url = base();
        url.set_query(Some(&format!("c=@@@not-deflate@@@&code={payload}")));
        assert_eq!(decode(&url).as_deref(), Some("pie title Pets"));
    }

    #[test]
    fn decode_of_absent_or_corrupt_token_is_none() {
        assert_eq!(decode(&base()), None);

        let mut url = base();
        url.set_query(Some("c=%%%%"));
        assert_eq!(decode(&url), None);

        url.set_query(Some("code=!!!"));
        assert_eq!(decode(&url), None);

        url.set_query(Some("other=1"));
        assert_eq!(decode(&url), None);
    }

    #[test]
    fn failing_compressor_triggers_base64_fallback() {
        let compressor = |_: &str| -> std::io::Result<String> {
            Err(std::io::Error::other("unsupported input"))
        };
        let token = encode_with(&base(), "graph LR\nX-->Y", compressor).unwrap();
        assert_eq!(token.method(), ShareMethod::Base64);
        assert!(token.url().as_str().starts_with("https://naiad.example/?code="));
        assert_eq!(decode(token.url()).as_deref(), Some("graph LR\nX-->Y"));
    }

    #[test]
    fn over_length_compressed_candidate_triggers_base64_fallback() {
        // Policy decision: a compressed candidate that exceeds the bound
        // without erroring also falls back, rather than failing outright.
        let compressor =
            |_: &str| -> std::io::Result<String> { Ok("x".repeat(MAX_URL_LENGTH + 1)) };
        let token = encode_with(&base(), "graph LR\nX-->Y", compressor).unwrap();
        assert_eq!(token.method(), ShareMethod::Base64);
        assert!(token.url().as_str().len() <= MAX_URL_LENGTH);
        assert_eq!(decode(token.url()).as_deref(), Some("graph LR\nX-->Y"));
    }

    #[test]
    fn encode_fails_loudly_when_nothing_fits() {
        let source: String = std::iter::repeat_with(fastrand_like)
            .take(40_000)
            .collect();
        let err = encode(&base(), &source).unwrap_err();
        assert_eq!(
            err,
            ShareError::TooLarge {
                chars: source.chars().count()
            }
        );
    }

    // Deterministic pseudo-random printable characters, incompressible enough
    // to defeat DEFLATE at this length.
    fn fastrand_like() -> char {
        use std::cell::Cell;
        thread_local! {
            static STATE: Cell<u64> = const { Cell::new(0x9e3779b97f4a7c15) };
        }
        STATE.with(|state| {
            let mut x = state.get();
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            state.set(x);
            char::from_u32(0x21 + (x % 0x5e) as u32).unwrap()
        })
    }

    #[test]
    fn clean_url_strips_share_keys_only() {
        let url = Url::parse("https://naiad.example/?theme=dark&c=abc&code=def").unwrap();
        assert_eq!(
            clean_url(&url).as_str(),
            "https://naiad.example/?theme=dark"
        );

        let url = Url::parse("https://naiad.example/?c=abc").unwrap();
        assert_eq!(clean_url(&url).as_str(), "https://naiad.example/");

        let untouched = Url::parse("https://naiad.example/editor?theme=dark").unwrap();
        assert_eq!(clean_url(&untouched), untouched);
    }

    #[test]
    fn compression_stats_report_savings() {
        let source = "flowchart TD\n".repeat(40);
        let stats = compression_stats(&source);
        assert_eq!(stats.method, ShareMethod::Compressed);
        assert_eq!(stats.original_size, source.chars().count());
        assert!(stats.ratio_percent > 0, "repetitive text should shrink");

        assert_eq!(compression_stats("").ratio_percent, 0);
    }
}
