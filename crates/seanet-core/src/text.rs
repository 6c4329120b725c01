#![forbid(unsafe_code)]

//! Page content extraction.
//!
//! Pipeline: content JSON → markup ([`page_markup`]) → plain text
//! ([`markup_to_text`]) → displayable characters plus their source
//! positions ([`TextBuffer`]).

use crate::config::ContentMode;
use crate::error::{AssetKind, SeaError};
use serde::Deserialize;

/// Displayable characters and the position each one had in the source text.
///
/// Both vectors have the same length and `source_indices` is non-decreasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    chars: Vec<char>,
    source_indices: Vec<usize>,
}

impl TextBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter `text` with collapsed separators.
    #[must_use]
    pub fn from_plain(text: &str) -> Self {
        Self::from_plain_with(text, ContentMode::Collapsed)
    }

    /// Filter `text`: map dot/dash look-alikes to `-`, drop other non-ASCII
    /// and control characters, and collapse whitespace runs.
    #[must_use]
    pub fn from_plain_with(text: &str, mode: ContentMode) -> Self {
        let mut buf = Self::new();
        let mut pending_space: Option<usize> = None;

        for (index, ch) in text.chars().enumerate() {
            let ch = match ch {
                '·' | '–' => '-',
                c => c,
            };
            if ch.is_whitespace() {
                pending_space.get_or_insert(index);
                continue;
            }
            if !ch.is_ascii() || ch.is_ascii_control() {
                continue;
            }
            if let Some(space_at) = pending_space.take() {
                if mode == ContentMode::Collapsed && !buf.is_empty() {
                    buf.push(' ', space_at);
                }
            }
            buf.push(ch, index);
        }
        buf
    }

    /// Append one character. Indices must not decrease.
    pub fn push(&mut self, ch: char, source_index: usize) {
        debug_assert!(
            self.source_indices
                .last()
                .is_none_or(|&last| last <= source_index),
            "source indices must be non-decreasing"
        );
        self.chars.push(ch);
        self.source_indices.push(source_index);
    }

    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    #[must_use]
    pub fn source_indices(&self) -> &[usize] {
        &self.source_indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[must_use]
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

// ---------------------------------------------------------------------------
// Content JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StarField {
    #[serde(rename = "*")]
    star: String,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    #[serde(default)]
    text: Option<StarField>,
    #[serde(default)]
    wikitext: Option<StarField>,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: ParseBody,
}

/// Extract the markup from a MediaWiki `action=parse` response.
///
/// Prefers `parse.text["*"]`, falling back to `parse.wikitext["*"]`.
pub fn page_markup(json: &str) -> Result<String, SeaError> {
    let parse_err = |reason: String| SeaError::AssetParse {
        asset: AssetKind::PageContent,
        reason,
    };
    let response: ParseResponse =
        serde_json::from_str(json).map_err(|e| parse_err(e.to_string()))?;
    let ParseBody { text, wikitext } = response.parse;
    text.or(wikitext)
        .map(|field| field.star)
        .ok_or_else(|| parse_err("response has neither parse.text nor parse.wikitext".into()))
}

// ---------------------------------------------------------------------------
// Markup → text
// ---------------------------------------------------------------------------

const SKIPPED_BLOCKS: [&str; 2] = ["style", "script"];

/// Reduce HTML to its text content.
///
/// Style and script blocks and comments are removed, remaining tags are
/// stripped, and common entities are decoded. Malformed markup degrades to
/// keeping the text as-is rather than failing.
#[must_use]
pub fn markup_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        decode_entities_into(&rest[..lt], &mut out);
        rest = &rest[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }

        let Some(gt) = rest.find('>') else {
            // Unterminated tag: treat the remainder as text.
            decode_entities_into(rest, &mut out);
            return out;
        };
        let tag = &rest[1..gt];
        rest = &rest[gt + 1..];

        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if !tag.starts_with('/') && SKIPPED_BLOCKS.contains(&name.as_str()) {
            let close = format!("</{name}");
            rest = find_ignore_ascii_case(rest, &close)
                .and_then(|at| rest[at..].find('>').map(|gt| &rest[at + gt + 1..]))
                .unwrap_or("");
        }
    }
    decode_entities_into(rest, &mut out);
    out
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn decode_entities_into(text: &str, out: &mut String) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
