//! JSDoc parsing
//!
//! Doc comments are reduced to a description plus a list of tags. The
//! description is what ends up in `documentation` fields of the IR; `@param`
//! tags supply the documentation of function parameters.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `@param {type} [name=default] - description`
    static ref PARAM_REGEX: Regex = Regex::new(
        r"(?s)^(?:\{[^}]*\}\s*)?(\[)?([\w$.]+)(?:=[^\]]*)?\]?\s*(?:-\s*)?(.*)$"
    ).unwrap();

    /// Leading `{type}` annotation on `@returns`
    static ref TYPE_PREFIX_REGEX: Regex = Regex::new(r"^\{[^}]*\}\s*").unwrap();
}

/// A parsed doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Text before the first tag
    pub description: Option<String>,
    /// Tags in source order
    pub tags: Vec<DocTag>,
}

/// A single `@tag`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocTag {
    /// `@param name - doc`
    Param {
        name: String,
        doc: Option<String>,
        optional: bool,
    },
    /// `@returns doc`
    Returns { doc: Option<String> },
    /// `@deprecated doc`
    Deprecated { doc: Option<String> },
    /// `@example`
    Example { doc: String },
    /// Anything else
    Other { tag: String, value: String },
}

impl DocComment {
    /// Parse the raw text of a `/** ... */` comment
    ///
    /// Accepts the comment with or without its delimiters, since SWC hands
    /// out block comment text without the surrounding `/*` and `*/`.
    pub fn parse(comment: &str) -> Self {
        let cleaned = clean_jsdoc_comment(comment);
        Self {
            description: extract_description(&cleaned),
            tags: parse_tags(&cleaned),
        }
    }

    /// Check if this doc is empty
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.tags.is_empty()
    }

    /// Description text, empty when there is none
    pub fn text(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    /// Documentation for the parameter called `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            DocTag::Param { name: n, doc, .. } if n == name => Some(doc.as_deref().unwrap_or("")),
            _ => None,
        })
    }

    /// Documentation of the return value
    pub fn returns(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            DocTag::Returns { doc } => doc.as_deref(),
            _ => None,
        })
    }

    /// Check if marked deprecated
    pub fn is_deprecated(&self) -> bool {
        self.tags
            .iter()
            .any(|t| matches!(t, DocTag::Deprecated { .. }))
    }
}

/// Strip comment delimiters and leading `*` gutters
fn clean_jsdoc_comment(comment: &str) -> String {
    let mut result = String::new();

    for line in comment.lines() {
        let trimmed = line.trim();

        if trimmed == "/**" || trimmed == "*/" || (trimmed == "*" && result.is_empty()) {
            continue;
        }

        let mut content = trimmed;
        if content.starts_with("/**") {
            content = content.trim_start_matches("/**").trim_start();
        }
        if let Some(rest) = content.strip_prefix("* ") {
            content = rest;
        } else if let Some(rest) = content.strip_prefix('*') {
            content = rest;
        }
        if content.ends_with("*/") {
            content = content.trim_end_matches("*/").trim_end();
        }

        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(content);
    }

    result.trim().to_string()
}

/// Extract description text before the first tag
fn extract_description(text: &str) -> Option<String> {
    let first_tag_pos = if text.starts_with('@') {
        Some(0)
    } else {
        text.find("\n@")
    };

    let desc = match first_tag_pos {
        Some(0) => return None,
        Some(pos) => &text[..pos],
        None => text,
    };

    let trimmed = desc.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse all tags, joining continuation lines into the preceding tag
fn parse_tags(text: &str) -> Vec<DocTag> {
    let mut tags = Vec::new();
    let mut current: Option<(String, String)> = None;

    for line in text.lines() {
        let trimmed = line.trim();

        if let Some(after_at) = trimmed.strip_prefix('@') {
            if let Some((name, content)) = current.take() {
                tags.push(parse_single_tag(&name, &content));
            }
            current = Some(match after_at.find(char::is_whitespace) {
                Some(pos) => (
                    after_at[..pos].to_string(),
                    after_at[pos..].trim().to_string(),
                ),
                None => (after_at.to_string(), String::new()),
            });
        } else if let Some((_, ref mut content)) = current {
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(trimmed);
        }
    }

    if let Some((name, content)) = current {
        tags.push(parse_single_tag(&name, &content));
    }

    tags
}

fn parse_single_tag(tag: &str, content: &str) -> DocTag {
    let content = content.trim();
    let non_empty = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    match tag {
        "param" | "arg" | "argument" => match PARAM_REGEX.captures(content) {
            Some(caps) => DocTag::Param {
                name: caps[2].to_string(),
                doc: non_empty(&caps[3]),
                optional: caps.get(1).is_some(),
            },
            None => DocTag::Other {
                tag: tag.to_string(),
                value: content.to_string(),
            },
        },
        "returns" | "return" => {
            let rest = TYPE_PREFIX_REGEX.replace(content, "");
            DocTag::Returns {
                doc: non_empty(rest.trim_start_matches('-')),
            }
        }
        "deprecated" => DocTag::Deprecated {
            doc: non_empty(content),
        },
        "example" => DocTag::Example {
            doc: content.to_string(),
        },
        _ => DocTag::Other {
            tag: tag.to_string(),
            value: content.to_string(),
        },
    }
}
