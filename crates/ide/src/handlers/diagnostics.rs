use syntax::TextRange;

use crate::file_system::FilePath;
use crate::index::Index;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl Severity {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" | "information" => Some(Severity::Information),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(range: TextRange, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            range,
            message: message.into(),
            severity,
        }
    }
}

pub fn exec(index: &Index, file: &FilePath, undefined: Option<Severity>) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<_> = index
        .diagnostics(file)
        .iter()
        .map(|error| Diagnostic::new(error.range, error.message.as_str(), Severity::Error))
        .collect();

    if let Some(severity) = undefined {
        let undefined = index
            .usages_in(file)
            .into_iter()
            .filter(|usage| usage.fallback.is_none() && index.definitions(&usage.name).is_empty())
            .map(|usage| {
                let message = format!("custom property '{}' is not defined", usage.name);
                Diagnostic::new(usage.range, message, severity)
            });
        diagnostics.extend(undefined);
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::Severity;
    use crate::tests;

    fn check(fixture: &str, undefined: Option<Severity>) -> Vec<(String, String, Severity)> {
        let (host, f) = tests::multiple_files(fixture);
        let file = f.root_file();
        super::exec(host.index(), &file, undefined)
            .into_iter()
            .map(|it| {
                let text = f.file_content(&file)[it.range].to_string();
                (text, it.message, it.severity)
            })
            .collect()
    }

    const FIXTURE: &str = r#"
; /a.css
a { color: var(--fg); background: var(--bg); border-color: var(--line, red); }
; /b.css
:root { --fg: black; }
"#;

    #[test]
    fn undefined_variables() {
        assert_eq!(
            check(FIXTURE, Some(Severity::Warning)),
            vec![(
                "var(--bg)".to_string(),
                "custom property '--bg' is not defined".to_string(),
                Severity::Warning
            )]
        );
    }

    #[test]
    fn undefined_check_disabled() {
        assert_eq!(check(FIXTURE, None), vec![]);
    }

    #[test]
    fn syntax_errors() {
        let diagnostics = check("; /a.html\n<div><!-- open", None);
        let messages: Vec<_> = diagnostics.iter().map(|it| it.1.as_str()).collect();
        assert!(messages.contains(&"unterminated comment"), "{messages:?}");
        assert!(diagnostics.iter().all(|it| it.2 == Severity::Error));
    }

    #[test]
    fn severity_names() {
        assert_eq!(Severity::from_name("Info"), Some(Severity::Information));
        assert_eq!(Severity::from_name("hint"), None);
    }
}
