//! Curly-brace (JavaScript/TypeScript) function extraction
//!
//! Introducers are named `function` declarations and `const`/`let`/`var`
//! bindings assigned a function expression or an arrow function. A
//! function's extent is found by balancing `{`/`}` from the introducer:
//!
//! - braces inside the parameter list are skipped (destructuring, defaults)
//! - the first `{` outside parentheses opens the body
//! - an arrow whose `=>` is not followed by `{` has an expression body,
//!   which ends at the first `;` or newline outside brackets
//! - nothing before the body may reach the next introducer
//! - an unbalanced body runs to end of file
//!
//! TypeScript type parameters (`<T,>`) and annotations on the binding or
//! the return type (`): Promise<User> =>`) are accepted around the
//! parameter list.
//!
//! Braces in strings, template literals and comments are counted like code.

use super::metrics::line_number_at;
use super::FunctionExtractor;
use crate::models::FunctionSpan;
use regex::Regex;
use std::sync::OnceLock;

static INTRODUCER: OnceLock<Regex> = OnceLock::new();

fn introducer() -> &'static Regex {
    INTRODUCER.get_or_init(|| {
        Regex::new(
            r"\bfunction\b\s*\*?\s*(?P<declared>[A-Za-z_$][\w$]*)\s*(?:<[^>]*>\s*)?\(|\b(?:const|let|var)\s+(?P<assigned>[A-Za-z_$][\w$]*)\s*(?::[^=;\n]+)?=\s*(?:async\s+)?(?:function\b|(?:<[^>]*>\s*)?\([^)]*\)\s*(?::[^=;{}\n]+)?=>|[A-Za-z_$][\w$]*\s*=>)",
        )
        .expect("valid regex")
    })
}

/// Heuristic delimiter-balance extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceExtractor;

impl FunctionExtractor for BraceExtractor {
    fn extract_functions(&self, text: &str) -> Vec<FunctionSpan> {
        let starts: Vec<(usize, String)> = introducer()
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps
                    .name("declared")
                    .or_else(|| caps.name("assigned"))?
                    .as_str()
                    .to_string();
                Some((whole.start(), name))
            })
            .collect();

        starts
            .iter()
            .enumerate()
            .map(|(i, (start, name))| {
                let end_offset = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
                FunctionSpan {
                    name: name.clone(),
                    start_line: line_number_at(text, *start),
                    start_offset: *start,
                    end_offset,
                    indentation: indentation_at(text, *start),
                    extent: *start..body_end(text, *start, end_offset),
                }
            })
            .collect()
    }
}

/// Leading whitespace width of the line holding `offset`
fn indentation_at(text: &str, offset: usize) -> usize {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

/// Byte offset just past the function that starts at `from`. `limit` is
/// where the next introducer begins.
fn body_end(text: &str, from: usize, limit: usize) -> usize {
    let bytes = text.as_bytes();
    let mut parens = 0usize;
    let mut i = from;

    while i < limit {
        match bytes[i] {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'{' if parens == 0 => return block_end(bytes, i),
            b';' if parens == 0 => return i + 1,
            b'=' if parens == 0 && bytes.get(i + 1) == Some(&b'>') => {
                let body = skip_whitespace(bytes, i + 2);
                if bytes.get(body) != Some(&b'{') {
                    return expression_end(bytes, body, limit);
                }
                i = body;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    limit
}

/// Offset just past the `}` matching the `{` at `open`, or end of text
fn block_end(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
    }
    bytes.len()
}

/// End of an arrow's expression body starting at `from`
fn expression_end(bytes: &[u8], from: usize, limit: usize) -> usize {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().take(limit).skip(from) {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => return i + 1,
            b'\n' if depth == 0 => return i,
            _ => {}
        }
    }
    limit
}

fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(bytes.len(), |n| from + n)
}
