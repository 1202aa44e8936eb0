//! Uri/url conversion and assertions.
//!
//! A uri never carries a protocol or port; a url always carries a protocol.
//! Every API call site asserts which form it holds before touching the
//! network, so a mixed-up address is a programmer error surfaced
//! synchronously, never a request that goes to the wrong place.

use crate::error::UriError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

fn has_protocol(s: &str) -> bool {
    s.contains("://")
}

/// Port = `:` followed by a digit inside the host part (before the first `/`)
fn has_port(s: &str) -> bool {
    let host = s.split("://").last().unwrap_or(s);
    let host = host.split('/').next().unwrap_or(host);
    match host.find(':') {
        Some(idx) => host[idx + 1..].chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Assert that `s` is a uri: no protocol, no port
pub fn assert_uri(s: &str) -> Result<(), UriError> {
    if has_protocol(s) || has_port(s) {
        return Err(UriError::ExpectedUri(s.to_string()));
    }
    Ok(())
}

/// Assert that `s` is a url: protocol required
pub fn assert_url(s: &str) -> Result<(), UriError> {
    if !has_protocol(s) {
        return Err(UriError::ExpectedUrl(s.to_string()));
    }
    Ok(())
}

/// Resolve a uri to a url by prepending protocol and port
pub fn uri_to_url(protocol: &str, port: u16, uri: &str) -> Result<String, UriError> {
    assert_uri(uri)?;
    let (host, path) = match uri.find('/') {
        Some(idx) => (&uri[..idx], &uri[idx..]),
        None => (uri, ""),
    };
    Ok(format!("{}://{}:{}{}", protocol, host, port, path))
}

/// Strip a url back down to a uri: protocol, port, query and fragment removed
pub fn url_to_uri(url: &str) -> Result<String, UriError> {
    assert_url(url)?;
    let rest = url.split("://").nth(1).unwrap_or(url);
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);

    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let host = host.split(':').next().unwrap_or(host);
    Ok(format!("{}{}", host, path))
}

/// Reversible encoding of a uri, used as schedule/uri-index resource ids
pub fn encode_uri(uri: &str) -> String {
    BASE64.encode(uri)
}

pub fn decode_uri(id: &str) -> Result<String, UriError> {
    let bytes = BASE64
        .decode(id)
        .map_err(|_| UriError::InvalidEncoding(id.to_string()))?;
    String::from_utf8(bytes).map_err(|_| UriError::InvalidEncoding(id.to_string()))
}
