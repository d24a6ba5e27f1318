//! Heuristic structural analysis of source text
//!
//! This is NOT a parser. Function boundaries come from pattern matching on
//! introducer tokens plus either a delimiter-balance scan (curly-brace
//! languages) or an indentation rule (Python). The scans are not aware of
//! string or comment contents, so braces or keywords inside literals are
//! counted like code. That imprecision is accepted; the output is
//! deterministic for identical input.
//!
//! Extraction sits behind the [`FunctionExtractor`] trait so a real syntax
//! tree can replace a heuristic without touching the rule engine.

mod brace;
mod indent;
mod metrics;

pub use brace::BraceExtractor;
pub use indent::IndentExtractor;
pub use metrics::{code_line_count, complexity, has_documentation, line_number_at};

use crate::models::{FileAnalysis, FileMetrics, FunctionMetrics, FunctionSpan};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Capability that turns file text into ordered function spans
pub trait FunctionExtractor: Send + Sync {
    /// Spans ordered by `start_offset`, partitioning the text from the first
    /// introducer to end of file.
    fn extract_functions(&self, text: &str) -> Vec<FunctionSpan>;
}

/// Languages the analyzer knows how to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Unknown,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" | "pyi" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    pub fn family(&self) -> Option<SyntaxFamily> {
        match self {
            Language::Python => Some(SyntaxFamily::Indentation),
            Language::JavaScript | Language::TypeScript => Some(SyntaxFamily::CurlyBrace),
            Language::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Unknown => "Unknown",
        }
    }
}

/// Get all extensions the analyzer extracts functions from
pub fn supported_extensions() -> &'static [&'static str] {
    &[
        "py", "pyi", // Python
        "js", "jsx", "mjs", "cjs", // JavaScript
        "ts", "tsx", // TypeScript
    ]
}

/// Block-structure family a language belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxFamily {
    CurlyBrace,
    Indentation,
}

/// Lexical markers the metrics need for one family
struct Dialect {
    line_comment: &'static str,
    doc_markers: &'static [&'static str],
    decisions: &'static Regex,
}

static BRACE_DECISIONS: OnceLock<Regex> = OnceLock::new();
static INDENT_DECISIONS: OnceLock<Regex> = OnceLock::new();

impl SyntaxFamily {
    fn dialect(&self) -> Dialect {
        match self {
            SyntaxFamily::CurlyBrace => Dialect {
                line_comment: "//",
                doc_markers: &["/*"],
                decisions: BRACE_DECISIONS.get_or_init(|| {
                    Regex::new(r"\b(?:if|for|while|case|try|catch)\b|&&|\|\|")
                        .expect("valid regex")
                }),
            },
            SyntaxFamily::Indentation => Dialect {
                line_comment: "#",
                doc_markers: &["\"\"\"", "'''"],
                decisions: INDENT_DECISIONS.get_or_init(|| {
                    Regex::new(r"\b(?:if|elif|for|while|try|except|and|or)\b")
                        .expect("valid regex")
                }),
            },
        }
    }
}

/// Per-language function extraction plus metric computation
pub struct StructuralAnalyzer {
    curly_brace: Box<dyn FunctionExtractor>,
    indentation: Box<dyn FunctionExtractor>,
}

impl StructuralAnalyzer {
    /// Analyzer backed by the default heuristic extractors
    pub fn new() -> Self {
        Self {
            curly_brace: Box::new(BraceExtractor),
            indentation: Box::new(IndentExtractor),
        }
    }

    /// Substitute the extractor used for one family
    pub fn with_extractor(
        mut self,
        family: SyntaxFamily,
        extractor: Box<dyn FunctionExtractor>,
    ) -> Self {
        match family {
            SyntaxFamily::CurlyBrace => self.curly_brace = extractor,
            SyntaxFamily::Indentation => self.indentation = extractor,
        }
        self
    }

    /// Ordered spans for `text`; empty for unsupported languages
    pub fn spans(&self, language: Language, text: &str) -> Vec<FunctionSpan> {
        match language.family() {
            Some(SyntaxFamily::CurlyBrace) => self.curly_brace.extract_functions(text),
            Some(SyntaxFamily::Indentation) => self.indentation.extract_functions(text),
            None => Vec::new(),
        }
    }

    /// File metrics plus per-function metrics in source order
    pub fn extract(&self, language: Language, text: &str) -> FileAnalysis {
        let metrics = FileMetrics {
            total_lines: text.lines().count(),
        };

        let Some(family) = language.family() else {
            return FileAnalysis {
                metrics,
                functions: Vec::new(),
            };
        };
        let dialect = family.dialect();

        let functions = self
            .spans(language, text)
            .into_iter()
            .map(|span| {
                let body = &text[span.extent.clone()];
                FunctionMetrics {
                    lines: code_line_count(body, dialect.line_comment),
                    complexity: complexity(body, dialect.decisions),
                    has_documentation: has_documentation(body, dialect.doc_markers),
                    start_line: span.start_line,
                    name: span.name,
                }
            })
            .collect();

        FileAnalysis { metrics, functions }
    }
}

impl Default for StructuralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
