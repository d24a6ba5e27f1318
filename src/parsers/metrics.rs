//! Text metrics shared by every extractor

use regex::Regex;

/// Lines that are neither blank nor a line comment
pub fn code_line_count(text: &str, line_comment: &str) -> usize {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(line_comment))
        .count()
}

/// 1 plus one per decision-construct match anywhere in `text`
pub fn complexity(text: &str, decisions: &Regex) -> usize {
    1 + decisions.find_iter(text).count()
}

pub fn has_documentation(text: &str, doc_markers: &[&str]) -> bool {
    doc_markers.iter().any(|marker| text.contains(marker))
}

/// 1-based line containing byte `offset`
pub fn line_number_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
