//! Indentation-sensitive (Python) function extraction
//!
//! An introducer is a line whose first token is `def` (optionally preceded
//! by `async`). A function's extent runs from its introducer to the next
//! introducer at the same or shallower indentation, or end of file, so a
//! nested function is part of its parent's extent.

use super::metrics::line_number_at;
use super::FunctionExtractor;
use crate::models::FunctionSpan;
use regex::Regex;
use std::sync::OnceLock;

static INTRODUCER: OnceLock<Regex> = OnceLock::new();

fn introducer() -> &'static Regex {
    INTRODUCER.get_or_init(|| {
        Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:async[ \t]+)?def[ \t]+(?P<name>\w+)[ \t]*\(")
            .expect("valid regex")
    })
}

/// Heuristic leading-whitespace extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentExtractor;

struct Introducer {
    offset: usize,
    indentation: usize,
    name: String,
}

impl FunctionExtractor for IndentExtractor {
    fn extract_functions(&self, text: &str) -> Vec<FunctionSpan> {
        let found: Vec<Introducer> = introducer()
            .captures_iter(text)
            .filter_map(|caps| {
                Some(Introducer {
                    offset: caps.get(0)?.start(),
                    indentation: caps.name("indent")?.as_str().len(),
                    name: caps.name("name")?.as_str().to_string(),
                })
            })
            .collect();

        found
            .iter()
            .enumerate()
            .map(|(i, func)| {
                let end_offset = found.get(i + 1).map_or(text.len(), |next| next.offset);
                let extent_end = found[i + 1..]
                    .iter()
                    .find(|next| next.indentation <= func.indentation)
                    .map_or(text.len(), |next| next.offset);

                FunctionSpan {
                    name: func.name.clone(),
                    start_line: line_number_at(text, func.offset),
                    start_offset: func.offset,
                    end_offset,
                    indentation: func.indentation,
                    extent: func.offset..extent_end,
                }
            })
            .collect()
    }
}
