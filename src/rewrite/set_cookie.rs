//! `Set-Cookie` header rewriting.
//!
//! Every staged `Set-Cookie` value is parsed, run through the rule pipeline
//! and re-serialized in its original order. Values that do not parse as a
//! cookie are dropped, the same way a permissive cookie parser skips them.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use cookie::Cookie;

use crate::rewrite::RuleSet;

/// Counters describing a single header rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    /// `Set-Cookie` values present before the rewrite.
    pub seen: usize,
    /// Cookies whose path was changed by at least one rule.
    pub rewritten: usize,
    /// Values dropped because they could not be parsed or re-encoded.
    pub dropped: usize,
}

impl RuleSet {
    /// Rewrite the `Path` attribute of every `Set-Cookie` value in `headers`.
    ///
    /// No other header is read or modified.
    pub fn rewrite_set_cookies(&self, headers: &mut HeaderMap) -> RewriteSummary {
        let mut summary = RewriteSummary::default();

        let staged: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
        if staged.is_empty() {
            return summary;
        }
        headers.remove(SET_COOKIE);
        summary.seen = staged.len();

        for raw in staged {
            let Some(mut cookie) = parse_set_cookie(&raw) else {
                summary.dropped += 1;
                continue;
            };

            let name = cookie.name().to_string();
            let path = cookie.path().unwrap_or("").to_string();
            if let Some(new_path) = self.rewrite_path(&name, &path) {
                let new_path = sanitize_path(&new_path);
                tracing::trace!(
                    cookie = %name,
                    from = %path,
                    to = %new_path,
                    "Rewrote cookie path"
                );
                if new_path.is_empty() {
                    cookie.unset_path();
                } else {
                    cookie.set_path(new_path);
                }
                summary.rewritten += 1;
            }

            match HeaderValue::try_from(cookie.to_string()) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => {
                    tracing::debug!(cookie = %name, error = %e, "Dropping unencodable Set-Cookie");
                    summary.dropped += 1;
                }
            }
        }

        summary
    }
}

fn parse_set_cookie(raw: &HeaderValue) -> Option<Cookie<'static>> {
    let text = match std::str::from_utf8(raw.as_bytes()) {
        Ok(text) => text,
        Err(_) => {
            tracing::debug!("Dropping non UTF-8 Set-Cookie value");
            return None;
        }
    };

    match Cookie::parse(text.to_string()) {
        Ok(cookie) if is_token(cookie.name()) => Some(cookie),
        Ok(cookie) => {
            tracing::debug!(name = %cookie.name(), "Dropping Set-Cookie with invalid name");
            None
        }
        Err(e) => {
            tracing::debug!(value = %text, error = %e, "Dropping malformed Set-Cookie value");
            None
        }
    }
}

/// RFC 7230 `token`, the grammar RFC 6265 requires for cookie names.
fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

/// Keep only visible ASCII and spaces, minus `;`, so a rewritten path can
/// never introduce extra attributes.
fn sanitize_path(path: &str) -> String {
    let cleaned: String = path
        .chars()
        .filter(|&c| (' '..='~').contains(&c) && c != ';')
        .collect();
    if cleaned.len() != path.len() {
        tracing::debug!(path = %path, "Stripped invalid bytes from rewritten cookie path");
    }
    cleaned
}
