//! Static bundle verification
//!
//! Generated bundles are validated without executing any of their code and
//! without installing any dependency: the deployment environment cannot be
//! trusted to satisfy a dependency-resolution step, so execution is a hard
//! boundary here, not an option.
//!
//! Three checks run over a bundle:
//! 1. required files present (case-insensitive on the file name component)
//! 2. per-file syntax, by parsing each recognized source file to an AST
//!    (tree-sitter grammars for python/javascript/css/html, serde_json for
//!    JSON files)
//! 3. advisory structural scan for required framework symbols
//!
//! Missing files and syntax failures are blocking issues; absent symbols are
//! warnings only, because naming conventions vary.

use tree_sitter::{Language, Node, Parser};

use crate::domain::bundle::FileBundle;
use crate::domain::report::VerificationReport;

/// Bundles smaller than this (in code lines) get an advisory suggestion.
const MIN_SUBSTANTIAL_CODE_LINES: usize = 50;

/// Statically verify a bundle against a set of required file names and a set
/// of required symbols. Never executes bundle content.
///
/// All files are checked even after a failure; the report accumulates every
/// problem found. Iteration follows the bundle's sorted path order, so
/// verifying the same bundle twice yields identical reports.
pub fn verify(
    bundle: &FileBundle,
    required_files: &[&str],
    required_symbols: &[&str],
) -> VerificationReport {
    let mut report = VerificationReport::passing();

    // Required-file check. Match on the name component so "src/main.py"
    // satisfies a requirement for "main.py".
    let present: Vec<String> = bundle.paths().map(|p| file_name(p).to_ascii_lowercase()).collect();
    for required in required_files {
        if !present.iter().any(|name| name == &required.to_ascii_lowercase()) {
            report.push_issue(format!("Missing: {required}"));
        }
    }

    // Per-file syntax check.
    for (path, content) in bundle.iter() {
        let Some(kind) = SourceKind::from_path(path) else {
            continue;
        };
        match check_syntax(kind, content) {
            Ok(()) => {
                report.per_file_syntax_ok.insert(path.to_string(), true);
            }
            Err(err) => {
                report.per_file_syntax_ok.insert(path.to_string(), false);
                report.push_issue(format!("{path}: {err}"));
            }
        }
    }

    // Structural pattern check: advisory only.
    for symbol in required_symbols {
        let found = bundle.iter().any(|(_, content)| content.contains(symbol));
        if !found {
            report
                .warnings
                .push(format!("required symbol not found anywhere in bundle: {symbol}"));
        }
    }

    // A bundle with almost no code usually means the model produced
    // placeholders.
    let code_lines: usize = bundle
        .iter()
        .filter(|(path, _)| SourceKind::from_path(path).is_some())
        .map(|(_, content)| code_line_count(content))
        .sum();
    if !bundle.is_empty() && code_lines < MIN_SUBSTANTIAL_CODE_LINES {
        report
            .suggestions
            .push("Consider adding more implementation detail or documentation".to_string());
    }

    report
}

/// Source languages the verifier can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Python,
    JavaScript,
    Css,
    Html,
    Json,
}

impl SourceKind {
    fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
        match ext.as_str() {
            "py" => Some(Self::Python),
            "js" | "mjs" => Some(Self::JavaScript),
            "css" => Some(Self::Css),
            "html" | "htm" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn grammar(self) -> Option<Language> {
        match self {
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Self::Css => Some(tree_sitter_css::LANGUAGE.into()),
            Self::Html => Some(tree_sitter_html::LANGUAGE.into()),
            Self::Json => None,
        }
    }
}

/// Parse `content` as `kind`; Err carries a "line <n>: <message>" string.
fn check_syntax(kind: SourceKind, content: &str) -> Result<(), String> {
    // Empty files are treated as syntactically clean; the low-code-line
    // suggestion is the signal for hollow bundles.
    if content.trim().is_empty() {
        return Ok(());
    }

    let Some(language) = kind.grammar() else {
        // JSON goes through serde_json, which reports line/column itself.
        return match serde_json::from_str::<serde_json::Value>(content) {
            Ok(_) => Ok(()),
            Err(e) => Err(format!("line {}: {e}", e.line())),
        };
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| format!("line 1: grammar unavailable: {e}"))?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| "line 1: parser produced no tree".to_string())?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    match first_error_node(root) {
        Some(node) => {
            let line = node.start_position().row + 1;
            let detail = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "invalid syntax".to_string()
            };
            Err(format!("line {line}: {detail}"))
        }
        None => Err("line 1: invalid syntax".to_string()),
    }
}

/// Depth-first search for the first ERROR or missing node.
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_node)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Non-blank lines that are not obviously comments.
fn code_line_count(content: &str) -> usize {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("//"))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui_bundle() -> FileBundle {
        [
            (
                "index.html",
                "<!DOCTYPE html>\n<html>\n<head>\n<link rel=\"stylesheet\" href=\"styles.css\">\n</head>\n<body>\n<div id=\"chat\"></div>\n<script src=\"app.js\"></script>\n</body>\n</html>",
            ),
            (
                "styles.css",
                "body { margin: 0; font-family: sans-serif; }\n#chat { padding: 1rem; }\n.message { color: #222; }\n",
            ),
            (
                "app.js",
                "const chat = document.getElementById('chat');\nfunction addMessage(text) {\n  const el = document.createElement('div');\n  el.className = 'message';\n  el.textContent = text;\n  chat.appendChild(el);\n}\naddMessage('ready');\n",
            ),
        ]
        .into_iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect()
    }

    #[test]
    fn test_missing_file_and_syntax_error_reported() {
        let mut bundle = FileBundle::new();
        bundle.insert("main.py", "def f(:");
        bundle.insert("README.md", "hi");
        let report = verify(
            &bundle,
            &["main.py", "README.md", "requirements.txt"],
            &[],
        );
        assert!(!report.passed);
        assert!(report.issues.iter().any(|i| i == "Missing: requirements.txt"));
        assert!(report.issues.iter().any(|i| i.starts_with("main.py: line ")));
        assert_eq!(report.per_file_syntax_ok.get("main.py"), Some(&false));
        // README.md is not a recognized source file, so it has no syntax entry.
        assert!(!report.per_file_syntax_ok.contains_key("README.md"));
    }

    #[test]
    fn test_clean_bundle_passes_without_warnings() {
        let report = verify(
            &ui_bundle(),
            &["index.html", "styles.css", "app.js"],
            &["<link rel=\"stylesheet\"", "<script src="],
        );
        assert!(report.passed, "issues: {:?}", report.issues);
        assert!(report.warnings.is_empty());
        assert!(report.per_file_syntax_ok.values().all(|ok| *ok));
    }

    #[test]
    fn test_missing_symbol_is_warning_not_issue() {
        let report = verify(&ui_bundle(), &["index.html"], &["Crew("]);
        assert!(report.passed);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Crew("));
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_required_file_match_is_case_insensitive() {
        let mut bundle = FileBundle::new();
        bundle.insert("README.MD", "docs");
        let report = verify(&bundle, &["readme.md"], &[]);
        assert!(report.passed);
    }

    #[test]
    fn test_required_file_matches_name_in_subdirectory() {
        let mut bundle = FileBundle::new();
        bundle.insert("src/agent/main.py", "print('hi')\n");
        let report = verify(&bundle, &["main.py"], &[]);
        assert!(report.passed, "issues: {:?}", report.issues);
    }

    #[test]
    fn test_invalid_json_file_flagged_with_line() {
        let mut bundle = FileBundle::new();
        bundle.insert("config.json", "{\n  \"a\": 1,\n}");
        let report = verify(&bundle, &[], &[]);
        assert!(!report.passed);
        assert!(report.issues[0].starts_with("config.json: line "));
    }

    #[test]
    fn test_broken_javascript_flagged() {
        let mut bundle = FileBundle::new();
        bundle.insert("app.js", "function broken( {\n");
        let report = verify(&bundle, &[], &[]);
        assert_eq!(report.per_file_syntax_ok.get("app.js"), Some(&false));
        assert!(!report.passed);
    }

    #[test]
    fn test_all_files_checked_after_first_failure() {
        let mut bundle = FileBundle::new();
        bundle.insert("a.py", "def broken(:");
        bundle.insert("b.py", "def ok():\n    return 1\n");
        let report = verify(&bundle, &[], &[]);
        assert_eq!(report.per_file_syntax_ok.len(), 2);
        assert_eq!(report.per_file_syntax_ok.get("a.py"), Some(&false));
        assert_eq!(report.per_file_syntax_ok.get("b.py"), Some(&true));
    }

    #[test]
    fn test_verify_is_idempotent() {
        let bundle = ui_bundle();
        let first = verify(&bundle, &["index.html", "missing.txt"], &["nope("]);
        let second = verify(&bundle, &["index.html", "missing.txt"], &["nope("]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_source_file_passes_syntax_check() {
        let mut bundle = FileBundle::new();
        bundle.insert("app.js", "");
        bundle.insert("notes.json", "   \n");
        let report = verify(&bundle, &[], &[]);
        assert!(report.passed, "issues: {:?}", report.issues);
        assert_eq!(report.per_file_syntax_ok.get("app.js"), Some(&true));
        assert_eq!(report.per_file_syntax_ok.get("notes.json"), Some(&true));
        // Hollow content is advisory, not blocking.
        assert_eq!(report.suggestions.len(), 1);
    }

    #[test]
    fn test_tiny_bundle_gets_suggestion() {
        let mut bundle = FileBundle::new();
        bundle.insert("main.py", "pass\n");
        let report = verify(&bundle, &[], &[]);
        assert_eq!(report.suggestions.len(), 1);
        // Advisory only.
        assert!(report.passed);
    }
}
