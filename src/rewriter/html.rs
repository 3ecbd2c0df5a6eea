//! Tolerant tag scanner used by the HTML rewriter
//!
//! Markup is never parsed into a tree. Tags are located with a pattern that
//! understands quoted attribute values (which may contain `>`), and only the
//! values of recognised attributes are replaced. Text between tags, comments,
//! and tags that do not match the pattern are copied through untouched.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// An opening tag: name, then attribute text with quoted values kept whole
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([a-zA-Z][a-zA-Z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("tag pattern is valid")
});

/// One `name=value` attribute with a double-quoted, single-quoted, or bare value
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("attribute pattern is valid")
});

/// How an attribute value was quoted in the source markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
    Bare,
}

/// Rewrites attribute values of every opening tag in `html`
///
/// `rewrite` receives the lowercase tag name, the lowercase attribute name and
/// the raw attribute value, and returns a replacement value or `None` to keep
/// the attribute exactly as written.
pub(crate) fn rewrite_attributes<F>(html: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, &str, &str) -> Option<String>,
{
    TAG.replace_all(html, |tag: &Captures<'_>| {
        let name = tag[1].to_ascii_lowercase();
        let attrs = &tag[2];

        let mut changed = false;
        let rewritten = ATTR.replace_all(attrs, |attr: &Captures<'_>| {
            let (value, quote) = if let Some(m) = attr.get(3) {
                (m.as_str(), Quote::Double)
            } else if let Some(m) = attr.get(4) {
                (m.as_str(), Quote::Single)
            } else {
                (attr.get(5).map_or("", |m| m.as_str()), Quote::Bare)
            };

            match rewrite(&name, &attr[1].to_ascii_lowercase(), value) {
                Some(new_value) => {
                    changed = true;
                    format!("{}{}{}", &attr[1], &attr[2], quote_value(&new_value, quote))
                }
                None => attr[0].to_string(),
            }
        });

        if changed {
            format!("<{}{}>", &tag[1], rewritten)
        } else {
            tag[0].to_string()
        }
    })
    .into_owned()
}

fn quote_value(value: &str, quote: Quote) -> String {
    match quote {
        Quote::Single => format!("'{}'", value.replace('\'', "%27")),
        Quote::Double | Quote::Bare => format!("\"{}\"", value.replace('"', "%22")),
    }
}

/// One image candidate of a `srcset` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SrcsetCandidate<'a> {
    pub url: &'a str,
    pub descriptors: &'a str,
}

/// Splits a `srcset` value into candidates
///
/// Candidates are separated by commas. A `data:` URL runs until whitespace so
/// the comma inside it does not split it; descriptors run until the next comma.
pub(crate) fn parse_srcset(value: &str) -> Vec<SrcsetCandidate<'_>> {
    let mut candidates = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let is_data = rest.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
        let url_end = if is_data {
            rest.find(char::is_whitespace)
        } else {
            rest.find(|c: char| c.is_whitespace() || c == ',')
        }
        .unwrap_or(rest.len());
        let token = &rest[..url_end];
        rest = &rest[url_end..];

        let (url, descriptors) = if token.ends_with(',') {
            (token.trim_end_matches(','), "")
        } else if rest.starts_with(',') {
            (token, "")
        } else {
            let desc_end = rest.find(',').unwrap_or(rest.len());
            let descriptors = rest[..desc_end].trim();
            rest = &rest[desc_end..];
            (token, descriptors)
        };

        if !url.is_empty() {
            candidates.push(SrcsetCandidate { url, descriptors });
        }
    }

    candidates
}
