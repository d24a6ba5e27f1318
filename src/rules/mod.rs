//! Violation engine
//!
//! Applies a [`RuleSet`] to analyzer output. The list is rebuilt from
//! scratch on every pass and ordered as:
//!
//! 1. file-level violations (`FILE_TOO_LARGE`)
//! 2. per function in source order, each in category order:
//!    length, complexity, documentation, missing test

mod test_lookup;

pub use test_lookup::{SiblingTestLookup, TestLookup};

use crate::config::{EnforcementLevel, RuleSet};
use crate::models::{FileAnalysis, FunctionMetrics, Severity, Violation, ViolationType};
use std::path::Path;

/// Scores analyzed files against a fixed rule set
#[derive(Debug, Clone)]
pub struct ViolationEngine {
    rules: RuleSet,
    level: EnforcementLevel,
}

impl ViolationEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            level: EnforcementLevel::default(),
        }
    }

    /// Cap every reported severity at the enforcement level
    pub fn with_enforcement(mut self, level: EnforcementLevel) -> Self {
        self.level = level;
        self
    }

    /// Ordered violations for the file at `path`
    pub fn score(&self, path: &Path, analysis: &FileAnalysis, tests: &dyn TestLookup) -> Vec<Violation> {
        let mut violations = Vec::new();

        let total = analysis.metrics.total_lines;
        if total > self.rules.max_file_lines {
            violations.push(self.violation(
                ViolationType::FileTooLarge,
                0,
                format!("File has {} lines (max: {})", total, self.rules.max_file_lines),
                "Split file into smaller modules".to_string(),
                Severity::Error,
                None,
            ));
        }

        let file_base = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let mut functions: Vec<&FunctionMetrics> = analysis.functions.iter().collect();
        // Stable, so functions sharing a start line keep extraction order
        functions.sort_by_key(|f| f.start_line);

        for func in functions {
            self.score_function(func, file_base, extension, tests, &mut violations);
        }

        violations
    }

    fn score_function(
        &self,
        func: &FunctionMetrics,
        file_base: &str,
        extension: &str,
        tests: &dyn TestLookup,
        out: &mut Vec<Violation>,
    ) {
        let name = Some(func.name.clone());

        if func.lines > self.rules.max_function_lines {
            out.push(self.violation(
                ViolationType::FunctionTooLong,
                func.start_line,
                format!(
                    "Function '{}' has {} lines (max: {})",
                    func.name, func.lines, self.rules.max_function_lines
                ),
                "Break function into smaller functions".to_string(),
                Severity::Error,
                name.clone(),
            ));
        }

        if func.complexity > self.rules.max_complexity {
            out.push(self.violation(
                ViolationType::HighComplexity,
                func.start_line,
                format!(
                    "Function '{}' has complexity {} (max: {})",
                    func.name, func.complexity, self.rules.max_complexity
                ),
                "Simplify function logic or break into smaller functions".to_string(),
                Severity::Error,
                name.clone(),
            ));
        }

        if self.rules.require_docstrings && !func.has_documentation {
            out.push(self.violation(
                ViolationType::MissingDocumentation,
                func.start_line,
                format!("Function '{}' lacks documentation", func.name),
                "Add docstring with description, parameters, and return value".to_string(),
                Severity::Warning,
                name.clone(),
            ));
        }

        if self.rules.require_tests && !tests.has_test(file_base, &func.name) {
            out.push(self.violation(
                ViolationType::MissingTest,
                func.start_line,
                format!("Function '{}' has no unit test", func.name),
                format!("Create test_{}() in tests/test_{}.{}", func.name, file_base, extension),
                Severity::Warning,
                name,
            ));
        }
    }

    fn violation(
        &self,
        kind: ViolationType,
        line: usize,
        message: String,
        suggestion: String,
        severity: Severity,
        function_name: Option<String>,
    ) -> Violation {
        Violation {
            kind,
            line,
            message,
            suggestion,
            severity: self.level.cap(severity),
            function_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileMetrics;
    use crate::parsers::{Language, StructuralAnalyzer};

    /// Lookup with a fixed answer
    struct Always(bool);

    impl TestLookup for Always {
        fn has_test(&self, _file_base: &str, _function_name: &str) -> bool {
            self.0
        }
    }

    fn lenient() -> RuleSet {
        RuleSet {
            require_tests: false,
            require_docstrings: false,
            ..RuleSet::default()
        }
    }

    fn function(name: &str, line: usize, lines: usize, complexity: usize) -> FunctionMetrics {
        FunctionMetrics {
            name: name.to_string(),
            start_line: line,
            lines,
            complexity,
            has_documentation: false,
        }
    }

    #[test]
    fn test_small_file_without_functions_is_clean() {
        let analysis = FileAnalysis {
            metrics: FileMetrics { total_lines: 200 },
            functions: vec![],
        };
        let engine = ViolationEngine::new(RuleSet::default());
        assert!(engine.score(Path::new("a.py"), &analysis, &Always(false)).is_empty());
    }

    #[test]
    fn test_large_file_yields_exactly_one_file_violation() {
        let analysis = FileAnalysis {
            metrics: FileMetrics { total_lines: 250 },
            functions: vec![function("a", 1, 10, 1), function("b", 20, 10, 1)],
        };
        let engine = ViolationEngine::new(lenient());
        let violations = engine.score(Path::new("a.py"), &analysis, &Always(true));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationType::FileTooLarge);
        assert_eq!(violations[0].line, 0);
        assert!(violations[0].message.contains("250"));
        assert!(violations[0].message.contains("200"));
    }

    #[test]
    fn test_long_function_without_decisions() {
        let mut src = String::from("def long_one():\n");
        for i in 0..50 {
            src.push_str(&format!("    v{} = {}\n", i, i));
        }
        let analysis = StructuralAnalyzer::new().extract(Language::Python, &src);
        let rules = RuleSet {
            max_function_lines: 50,
            max_complexity: 10,
            ..lenient()
        };
        let violations = ViolationEngine::new(rules).score(Path::new("m.py"), &analysis, &Always(true));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationType::FunctionTooLong);
        assert_eq!(violations[0].function_name.as_deref(), Some("long_one"));
    }

    #[test]
    fn test_complexity_twelve() {
        let mut src = String::from("def busy(a):\n");
        for _ in 0..11 {
            src.push_str("    if a: pass\n");
        }
        let analysis = StructuralAnalyzer::new().extract(Language::Python, &src);
        let violations =
            ViolationEngine::new(lenient()).score(Path::new("m.py"), &analysis, &Always(true));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationType::HighComplexity);
        assert!(violations[0].message.contains("12"));
    }

    #[test]
    fn test_missing_test_names_function() {
        let src = "def parseInput(raw):\n    \"\"\"Parse.\"\"\"\n    return raw\n";
        let analysis = StructuralAnalyzer::new().extract(Language::Python, src);
        let rules = RuleSet {
            require_tests: true,
            ..lenient()
        };
        let violations = ViolationEngine::new(rules).score(Path::new("util.py"), &analysis, &Always(false));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationType::MissingTest);
        assert!(violations[0].message.contains("parseInput"));
        assert_eq!(violations[0].severity, Severity::Warning);
        assert_eq!(violations[0].suggestion, "Create test_parseInput() in tests/test_util.py");
    }

    #[test]
    fn test_ordering_file_then_functions_then_categories() {
        let analysis = FileAnalysis {
            metrics: FileMetrics { total_lines: 500 },
            functions: vec![function("late", 40, 80, 20), function("early", 5, 80, 20)],
        };
        let violations = ViolationEngine::new(RuleSet::default()).score(
            Path::new("x.py"),
            &analysis,
            &Always(false),
        );
        let kinds: Vec<_> = violations.iter().map(|v| (v.line, v.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, ViolationType::FileTooLarge),
                (5, ViolationType::FunctionTooLong),
                (5, ViolationType::HighComplexity),
                (5, ViolationType::MissingDocumentation),
                (5, ViolationType::MissingTest),
                (40, ViolationType::FunctionTooLong),
                (40, ViolationType::HighComplexity),
                (40, ViolationType::MissingDocumentation),
                (40, ViolationType::MissingTest),
            ]
        );
    }

    #[test]
    fn test_rescoring_is_identical() {
        let src = "def a():\n    if x and y:\n        pass\n";
        let analysis = StructuralAnalyzer::new().extract(Language::Python, src);
        let engine = ViolationEngine::new(RuleSet::default());
        let first = engine.score(Path::new("a.py"), &analysis, &Always(false));
        let second = engine.score(Path::new("a.py"), &analysis, &Always(false));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_warning_enforcement_downgrades_errors() {
        let analysis = FileAnalysis {
            metrics: FileMetrics { total_lines: 900 },
            functions: vec![],
        };
        let engine = ViolationEngine::new(lenient()).with_enforcement(EnforcementLevel::Warning);
        let violations = engine.score(Path::new("big.js"), &analysis, &Always(true));
        assert_eq!(violations[0].severity, Severity::Warning);
    }
}
