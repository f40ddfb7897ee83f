//! Candidate discovery: find URL-looking substrings in free-form text.
//!
//! Two recognizers run over the whole input. The scheme recognizer finds
//! explicit `http://` / `https://` URLs; the bare recognizer finds domains
//! written without a scheme (`www.bilibili.com/video/...`). Scheme matches
//! are split where several URLs were pasted back to back, and every
//! candidate is cut at delimiters that never belong to a pasted URL.

use std::sync::LazyLock;

use regex::Regex;

/// Explicit URLs: scheme followed by everything up to whitespace or a
/// common delimiter.
static SCHEME_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>()]+"#).unwrap());

/// Bare domains with an optional path. The word boundary is ASCII so a
/// domain glued to preceding CJK text is still found.
static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u:\b)[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}[^\s"'<>()]*"#).unwrap()
});

const HTTP: &str = "http://";
const HTTPS: &str = "https://";

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Found by the scheme recognizer (after splitting).
    Scheme,
    /// Found by the bare-domain recognizer.
    Bare,
}

/// A raw URL candidate, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub kind: CandidateKind,
}

/// Raw recognizer output for a piece of text.
#[derive(Debug, Default)]
pub struct Discovery<'a> {
    /// Scheme candidates, already split at embedded schemes.
    pub scheme: Vec<Candidate<'a>>,
    /// Bare candidates that are not part of an explicit http(s) URL.
    pub bare: Vec<Candidate<'a>>,
    /// Whether either recognizer matched anything at all.
    pub matched: bool,
}

impl<'a> Discovery<'a> {
    /// All candidates, scheme-prefixed first.
    pub fn into_candidates(self) -> impl Iterator<Item = Candidate<'a>> {
        self.scheme.into_iter().chain(self.bare)
    }
}

/// Run both recognizers over `text`.
pub fn discover(text: &str) -> Discovery<'_> {
    let mut discovery = Discovery::default();

    for m in SCHEME_URL.find_iter(text) {
        discovery.matched = true;
        discovery
            .scheme
            .extend(split_concatenated(m.as_str()).into_iter().map(|text| Candidate {
                text,
                kind: CandidateKind::Scheme,
            }));
    }

    for m in BARE_URL.find_iter(text) {
        discovery.matched = true;
        let candidate = match preceding_scheme(text, m.start()) {
            // Already covered, and split, by the scheme recognizer.
            Some(scheme) if is_http_scheme(scheme) => continue,
            // Keep the foreign scheme attached so canonicalization rejects it.
            Some(scheme) => &text[m.start() - scheme.len() - "://".len()..m.end()],
            None => m.as_str(),
        };
        discovery.bare.push(Candidate {
            text: candidate,
            kind: CandidateKind::Bare,
        });
    }

    discovery
}

/// Split a scheme match that contains several URLs pasted without a
/// separator, e.g. `https://a.com/x?q=1https://b.com/y`.
///
/// Each URL runs from an `http://` or `https://` up to the next one or the
/// end of the string.
pub fn split_concatenated(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let Some(mut start) = find_scheme(raw, 0) else {
        return parts;
    };

    loop {
        let scheme_len = if raw[start..].starts_with(HTTPS) {
            HTTPS.len()
        } else {
            HTTP.len()
        };
        match find_scheme(raw, start + scheme_len) {
            Some(next) => {
                parts.push(&raw[start..next]);
                start = next;
            }
            None => {
                parts.push(&raw[start..]);
                break;
            }
        }
    }

    parts
}

/// Byte offset of the first `http://` or `https://` at or after `from`.
fn find_scheme(raw: &str, from: usize) -> Option<usize> {
    let rest = raw.get(from..)?;
    let http = rest.find(HTTP);
    let https = rest.find(HTTPS);
    let offset = match (http, https) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    Some(from + offset)
}

/// If the match at `start` is immediately preceded by `scheme://`, return
/// the scheme.
fn preceding_scheme(text: &str, start: usize) -> Option<&str> {
    let before = text[..start].strip_suffix("://")?;
    let scheme_start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        .last()
        .map(|(i, _)| i)?;
    let scheme = &before[scheme_start..];
    scheme
        .starts_with(|c: char| c.is_ascii_alphabetic())
        .then_some(scheme)
}

/// Only the lowercase forms are found by the scheme recognizer, so an
/// uppercase `HTTPS://` keeps its scheme attached instead.
fn is_http_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}

/// Trim a candidate down to the part that can belong to a URL.
///
/// Cuts at the first CJK or full-width punctuation mark (a pasted URL
/// followed by `，` or `。`), then strips trailing sentence punctuation and
/// unbalanced closing brackets.
pub fn clean_candidate(raw: &str) -> &str {
    let mut url = raw.trim();

    if let Some(cut) = url.find(is_wide_punctuation) {
        url = &url[..cut];
    }

    loop {
        let Some(last) = url.chars().last() else {
            break;
        };
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ']' => url.matches('[').count() < url.matches(']').count(),
            '}' => url.matches('{').count() < url.matches('}').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }

    url.trim_end()
}

/// CJK symbols and punctuation, and half/full-width forms.
fn is_wide_punctuation(c: char) -> bool {
    matches!(c, '\u{3000}'..='\u{303F}' | '\u{FF00}'..='\u{FFEF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(candidates: &[Candidate<'a>]) -> Vec<&'a str> {
        candidates.iter().map(|c| c.text).collect()
    }

    #[test]
    fn split_single_url_is_unchanged() {
        assert_eq!(
            split_concatenated("https://bilibili.com/video/1"),
            vec!["https://bilibili.com/video/1"]
        );
    }

    #[test]
    fn split_concatenated_urls() {
        let raw = "https://a.com/x?q=1https://b.com/yhttp://c.com/z";
        assert_eq!(
            split_concatenated(raw),
            vec!["https://a.com/x?q=1", "https://b.com/y", "http://c.com/z"]
        );
    }

    #[test]
    fn split_ignores_text_before_first_scheme() {
        assert_eq!(
            split_concatenated("xxhttps://a.com"),
            vec!["https://a.com"]
        );
        assert!(split_concatenated("no scheme here").is_empty());
    }

    #[test]
    fn scheme_recognizer_stops_at_delimiters() {
        let d = discover(r#"<a href="https://bilibili.com/v">(https://b23.tv/x)</a>"#);
        assert_eq!(
            texts(&d.scheme),
            vec!["https://bilibili.com/v", "https://b23.tv/x"]
        );
    }

    #[test]
    fn bare_matches_inside_http_urls_are_dropped() {
        let d = discover("see https://m.bilibili.com/foo");
        assert_eq!(texts(&d.scheme), vec!["https://m.bilibili.com/foo"]);
        assert!(d.bare.is_empty());
        assert!(d.matched);
    }

    #[test]
    fn bare_matches_keep_foreign_scheme() {
        let d = discover("ftp://bilibili.com/x");
        assert!(d.scheme.is_empty());
        assert_eq!(texts(&d.bare), vec!["ftp://bilibili.com/x"]);
    }

    #[test]
    fn bare_domain_after_cjk_text() {
        let d = discover("收藏这个链接：www.bilibili.com/video/BV1xx411c7mD");
        assert_eq!(texts(&d.bare), vec!["www.bilibili.com/video/BV1xx411c7mD"]);

        let d = discover("收藏www.bilibili.com");
        assert_eq!(texts(&d.bare), vec!["www.bilibili.com"]);
    }

    #[test]
    fn candidates_are_ordered_scheme_first() {
        let d = discover("bilibili.com/a and https://b23.tv/b");
        let all: Vec<_> = d.into_candidates().collect();
        assert_eq!(all[0].text, "https://b23.tv/b");
        assert_eq!(all[0].kind, CandidateKind::Scheme);
        assert_eq!(all[1].text, "bilibili.com/a");
        assert_eq!(all[1].kind, CandidateKind::Bare);
    }

    #[test]
    fn nothing_matched_in_plain_prose() {
        let d = discover("just some words, no links at all");
        assert!(!d.matched);
        assert_eq!(d.into_candidates().count(), 0);
    }

    #[test]
    fn preceding_scheme_detection() {
        let text = "go to svn+ssh://host.example.com/repo";
        let start = text.find("host").unwrap();
        assert_eq!(preceding_scheme(text, start), Some("svn+ssh"));

        let text = "//host.example.com";
        assert_eq!(preceding_scheme(text, 2), None);

        let text = "1://host.example.com";
        assert_eq!(preceding_scheme(text, 4), None);
    }

    #[test]
    fn clean_strips_trailing_punctuation() {
        assert_eq!(clean_candidate("https://a.com/x."), "https://a.com/x");
        assert_eq!(clean_candidate(" https://a.com/x?!, "), "https://a.com/x");
        assert_eq!(clean_candidate("https://a.com/x]"), "https://a.com/x");
        assert_eq!(clean_candidate("https://a.com/[x]"), "https://a.com/[x]");
    }

    #[test]
    fn clean_cuts_at_wide_punctuation() {
        assert_eq!(
            clean_candidate("www.bilibili.com/video/BV1，很好看。"),
            "www.bilibili.com/video/BV1"
        );
        assert_eq!(
            clean_candidate("https://bilibili.com/v！"),
            "https://bilibili.com/v"
        );
    }

    #[test]
    fn clean_keeps_unicode_path_letters() {
        assert_eq!(
            clean_candidate("https://zh.wikipedia.org/wiki/中文"),
            "https://zh.wikipedia.org/wiki/中文"
        );
    }
}
