//! Passage body micro-parser
//!
//!     A passage body is a small, semi-free-form text blob:
//!
//!         money: 10
//!         visited: true
//!         --
//!         You stand at a crossroads. [[Go north->North Road]] or [[Stay]].
//!         {text input for: 'playerName'}
//!
//!     Everything before the first `--` is the head, one `name: value` expression per line.
//!     Everything after it is prose, which carries `[[...]]` links and input prompts. A body
//!     without a divider is all prose.
//!
//!     Every function here is pure. [`ProseCache`] memoizes prose extraction for one
//!     conversion run.

use crate::error::{ConvertError, ConvertResult};
use crate::model::{Expression, Link};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Token separating the expression head from the prose
pub const DIVIDER: &str = "--";

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());
static INPUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{text input for:.*?'(.*?)'\}").unwrap());

/// Split on the first `sep`, trimming both sides.
///
/// The second part is `None` when `sep` does not occur at all.
pub fn split_pair<'a>(text: &'a str, sep: &str) -> (&'a str, Option<&'a str>) {
    match text.split_once(sep) {
        Some((head, tail)) => (head.trim(), Some(tail.trim())),
        None => (text.trim(), None),
    }
}

/// Split a body into its (head, prose) sections
pub fn split_sections(data: &str) -> (&str, &str) {
    match split_pair(data, DIVIDER) {
        (head, Some(prose)) => (head, prose),
        (body, None) => ("", body),
    }
}

/// Extract the head expressions in source order
pub fn expressions(data: &str) -> ConvertResult<Vec<Expression>> {
    let (head, _) = split_sections(data);
    head.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_expression)
        .collect()
}

/// A line with no name reports the whole line, otherwise the name
fn parse_expression(line: &str) -> ConvertResult<Expression> {
    match split_pair(line, ":") {
        ("", _) => Err(ConvertError::UnboundExpression(line.to_string())),
        (name, Some(value)) if !value.is_empty() => Ok(Expression {
            name: name.to_string(),
            value: value.to_string(),
        }),
        (name, _) => Err(ConvertError::UnboundExpression(name.to_string())),
    }
}

/// Trimmed prose of a body
pub fn text(data: &str) -> &str {
    split_sections(data).1
}

/// Bracketed links of a prose block, in order of appearance
pub fn links(prose: &str) -> Vec<Link> {
    LINK_PATTERN
        .captures_iter(prose)
        .map(|caps| match split_pair(&caps[1], "->") {
            (name, Some(target)) => Link::new(name, target),
            (name, None) => Link::new(name, name),
        })
        .collect()
}

/// Input-prompt variable names of a prose block, in order of appearance
pub fn inputs(prose: &str) -> Vec<String> {
    INPUT_PATTERN
        .captures_iter(prose)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Per-run memo of prose extraction, keyed by the exact body text
#[derive(Debug, Default)]
pub struct ProseCache {
    entries: HashMap<String, String>,
}

impl ProseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prose(&mut self, data: &str) -> &str {
        if !self.entries.contains_key(data) {
            self.entries.insert(data.to_string(), text(data).to_string());
        }
        &self.entries[data]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the micro-parser extracts from one passage body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageBody {
    pub expressions: Vec<Expression>,
    pub text: String,
    pub links: Vec<Link>,
    pub input: Vec<String>,
}

impl PassageBody {
    pub fn parse(data: &str, cache: &mut ProseCache) -> ConvertResult<Self> {
        let expressions = expressions(data)?;
        let text = cache.prose(data).to_string();
        let links = links(&text);
        let input = inputs(&text);
        Ok(PassageBody {
            expressions,
            text,
            links,
            input,
        })
    }
}
