//! Content addressing for bookmark records.
//!
//! A bookmark's storage location is a pure function of its URL: the URL is
//! normalized, hashed with SHA-1, and rendered as `{bucket}/{hash22}.json`.
//! The two-digit bucket spreads records across 32 directories; the filename
//! is the first 22 characters of the base32-encoded digest. The server-side
//! site generator derives paths the same way, so any change here breaks
//! cross-implementation agreement.

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

/// Number of base32 characters used for the filename part of an address.
pub const HASH_PART_LEN: usize = 22;

const BASE32_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

const RECOGNIZED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Normalizes a URL for use as addressing input.
///
/// Scheme and host are lower-cased; user-info and everything after the host
/// keep their case. A single trailing `/` is stripped from the path unless
/// the path is exactly `/` or the URL carries a query or fragment. Strings
/// that do not look like `scheme://host...` pass through unchanged.
pub fn normalize_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let scheme = scheme.to_ascii_lowercase();
    if !RECOGNIZED_SCHEMES.contains(&scheme.as_str()) {
        return url.to_string();
    }
    let authority_end = rest.find(['?', '/', '#']).unwrap_or(rest.len());
    let (authority, trailer) = rest.split_at(authority_end);
    if authority.is_empty() {
        return url.to_string();
    }
    // user-info runs up to the first '@' and is preserved verbatim
    let (userinfo, host) = match authority.find('@') {
        Some(at) => authority.split_at(at + 1),
        None => ("", authority),
    };
    let mut result = String::with_capacity(url.len());
    result.push_str(&scheme);
    result.push_str("://");
    result.push_str(userinfo);
    result.push_str(&host.to_ascii_lowercase());
    if trailer.contains('?') || trailer.contains('#') || !trailer.ends_with('/') || trailer == "/" {
        result.push_str(trailer);
    } else {
        result.push_str(&trailer[..trailer.len() - 1]);
    }
    result
}

/// Computes the storage address for a URL: `{bucket}/{hash22}.json`.
///
/// The base32 encoding runs over the full 20-byte digest, and the bucket is
/// taken from the digest's last byte, so truncating the digest before
/// encoding would change both parts of the result.
pub fn address_of(url: &str) -> String {
    let d = digest(&SHA1_FOR_LEGACY_USE_ONLY, normalize_url(url).as_bytes());
    let bytes = d.as_ref();
    let hash = base32(bytes);
    let bucket = bytes[bytes.len() - 1] % 32;
    format!("{:02}/{}.json", bucket, &hash[..HASH_PART_LEN])
}

/// RFC 4648 base32 over the lowercase `a-z2-7` alphabet, without padding.
fn base32(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 8 / 5 + 1);
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &b in bytes {
        acc = (acc << 8) | u32::from(b);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[(acc >> bits & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(BASE32_ALPHABET[(acc << (5 - bits) & 0x1f) as usize] as char);
    }
    out
}
