// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session cookie extraction.
//!
//! The dispatcher hands out its session token in a `Set-Cookie` response
//! header. Real deployments sit behind proxies that fold several cookies
//! into one header value, so extraction has to cope with:
//!
//! - any casing of the header name (handled by the header map itself)
//! - multiple `Set-Cookie` header values
//! - several cookies joined by commas inside one value
//! - cookie names that merely end with the wanted name (`XJSESSIONID`
//!   must not match `JSESSIONID`)

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Extracts the value of the named cookie from all `Set-Cookie` headers.
///
/// Returns the first match in header order, or `None` when no header
/// carries the cookie.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(SET_COOKIE) {
        let raw = match value.to_str() {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        if let Some(token) = find_cookie(raw, name) {
            return Some(token);
        }
    }
    None
}

/// Finds `name=value` in one header value, respecting word boundaries.
fn find_cookie(raw: &str, name: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut search = 0;

    while let Some(pos) = raw[search..].find(name) {
        let start = search + pos;
        let end = start + name.len();

        let boundary_before = start == 0 || matches!(bytes[start - 1], b' ' | b';' | b',');
        let eq_after = bytes.get(end) == Some(&b'=');

        if boundary_before && eq_after {
            let rest = &raw[end + 1..];
            let value = rest[..value_len(rest)].trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }

        search = start + 1;
    }

    None
}

/// Length of the cookie value at the start of `rest`.
///
/// A `;` always ends the value. A `,` ends it only when the text after
/// the comma introduces another `name=` pair; a bare comma belongs to
/// the value itself.
fn value_len(rest: &str) -> usize {
    for (i, b) in rest.bytes().enumerate() {
        match b {
            b';' => return i,
            b',' if starts_cookie_pair(&rest[i + 1..]) => return i,
            _ => {}
        }
    }
    rest.len()
}

/// Whether `text` (the remainder after a comma) begins a `name=` token.
fn starts_cookie_pair(text: &str) -> bool {
    let mut saw_name = false;
    for c in text.trim_start().chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            saw_name = true;
        } else {
            return saw_name && c == '=';
        }
    }
    false
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for value in values {
            map.append(SET_COOKIE, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_plain_cookie() {
        let map = headers(&["JSESSIONID=abc123; Path=/; HttpOnly"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("abc123".to_string()));
    }

    #[test]
    fn test_second_header_value() {
        let map = headers(&["theme=dark; Path=/", "JSESSIONID=tok-9; Path=/"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("tok-9".to_string()));
    }

    #[test]
    fn test_comma_folded_value() {
        let map = headers(&["theme=dark; Path=/, JSESSIONID=folded; HttpOnly, lang=en"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("folded".to_string()));
    }

    #[test]
    fn test_value_terminated_by_cookie_pair_after_comma() {
        let map = headers(&["JSESSIONID=abc, Expires=Wed, 21 Oct 2026 07:28:00 GMT"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("abc".to_string()));
    }

    #[test]
    fn test_comma_inside_value_is_preserved() {
        // The comma after `1` is not followed by a `name=` token, so it
        // belongs to the token value.
        let map = headers(&["JSESSIONID=1,2; Path=/"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("1,2".to_string()));

        let map = headers(&["JSESSIONID=1,2"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("1,2".to_string()));
    }

    #[test]
    fn test_prefixed_name_does_not_match() {
        let map = headers(&["XJSESSIONID=wrong; Path=/"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), None);

        let map = headers(&["XJSESSIONID=wrong; JSESSIONID=right"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("right".to_string()));
    }

    #[test]
    fn test_missing_cookie() {
        let map = headers(&["theme=dark; Path=/"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), None);
    }

    #[test]
    fn test_empty_value_is_no_token() {
        let map = headers(&["JSESSIONID=; Path=/"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let map = headers(&["JSESSIONID=first", "JSESSIONID=second"]);
        assert_eq!(extract_cookie(&map, "JSESSIONID"), Some("first".to_string()));
    }
}
