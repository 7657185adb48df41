//! Translation of the opaque export filter into SQL.
//!
//! Terms are whitespace separated and all must match:
//! `tag:<name>`, `visibility:<V>`, `pinned:<bool>`, `created_after:<secs>`,
//! `created_before:<secs>`; anything else (bare word or double-quoted phrase)
//! is a case-insensitive content substring.

use rusqlite::types::Value;

use crate::error::{MemoportError, Result};
use crate::model::Visibility;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterTerm {
    Tag(String),
    Visibility(Visibility),
    Pinned(bool),
    CreatedAfter(i64),
    CreatedBefore(i64),
    Content(String),
}

impl FilterTerm {
    /// SQL predicate over the `memos` table with one positional parameter.
    pub fn to_sql(&self) -> (&'static str, Value) {
        match self {
            FilterTerm::Tag(tag) => (
                "EXISTS (SELECT 1 FROM json_each(memos.payload, '$.tags') WHERE json_each.value = ?)",
                Value::Text(tag.clone()),
            ),
            FilterTerm::Visibility(v) => ("memos.visibility = ?", Value::Text(v.as_str().into())),
            FilterTerm::Pinned(p) => ("memos.pinned = ?", Value::Integer(i64::from(*p))),
            FilterTerm::CreatedAfter(ts) => ("memos.created_ts > ?", Value::Integer(*ts)),
            FilterTerm::CreatedBefore(ts) => ("memos.created_ts < ?", Value::Integer(*ts)),
            FilterTerm::Content(text) => (
                "memos.content LIKE ? ESCAPE '\\'",
                Value::Text(format!("%{}%", escape_like(text))),
            ),
        }
    }
}

pub fn parse_filter(expr: &str) -> Result<Vec<FilterTerm>> {
    let mut terms = Vec::new();

    for (token, quoted) in tokenize(expr)? {
        let keyed = if quoted { None } else { token.split_once(':') };
        let term = match keyed {
            Some(("tag", value)) => {
                let tag = value.trim_start_matches('#');
                if tag.is_empty() {
                    return Err(invalid("tag requires a value"));
                }
                FilterTerm::Tag(tag.to_string())
            }
            Some(("visibility", value)) => FilterTerm::Visibility(
                value
                    .to_uppercase()
                    .parse()
                    .map_err(|bad| invalid(&format!("unknown visibility {}", bad)))?,
            ),
            Some(("pinned", value)) => match value {
                "true" => FilterTerm::Pinned(true),
                "false" => FilterTerm::Pinned(false),
                other => return Err(invalid(&format!("pinned expects true|false, got {}", other))),
            },
            Some(("created_after", value)) => FilterTerm::CreatedAfter(parse_ts(value)?),
            Some(("created_before", value)) => FilterTerm::CreatedBefore(parse_ts(value)?),
            Some((key, value)) if is_identifier(key) && !value.starts_with("//") => {
                return Err(invalid(&format!("unknown filter key {}", key)));
            }
            _ => FilterTerm::Content(token),
        };
        terms.push(term);
    }

    Ok(terms)
}

fn invalid(message: &str) -> MemoportError {
    MemoportError::InvalidFilter(message.to_string())
}

fn parse_ts(value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| invalid(&format!("expected unix seconds, got {}", value)))
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Split on whitespace, honoring double quotes. The flag is set for tokens
/// that began with a quote so `"a:b"` stays a content phrase.
fn tokenize(expr: &str) -> Result<Vec<(String, bool)>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut quoted_start = false;

    for c in expr.chars() {
        match (c, in_quote) {
            ('"', false) => {
                if current.is_empty() {
                    quoted_start = true;
                }
                in_quote = true;
            }
            ('"', true) => {
                in_quote = false;
            }
            (c, false) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push((std::mem::take(&mut current), quoted_start));
                }
                quoted_start = false;
            }
            _ => current.push(c),
        }
    }

    if in_quote {
        return Err(invalid("unterminated quote"));
    }
    if !current.is_empty() {
        tokens.push((current, quoted_start));
    }

    Ok(tokens)
}
