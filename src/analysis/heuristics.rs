//! Text and metadata checks over an author's run history.
//!
//! Each check yields [`Signal`]s; an author with at least one signal on a
//! problem gets a single [`SuspicionFinding`] listing all of them.

use chrono::TimeDelta;
use std::collections::BTreeSet;
use std::fmt;

use crate::language::{Language, LanguageTable};
use crate::models::{AuthorTimeline, Submission, SuspicionFinding};

const REASON_HEADER: &str = "Suspicious activity detected:";
const LANGUAGE_SWITCH_MINUTES: i64 = 15;
const MAX_COMMENT_LINES: usize = 3;
const MAX_EXCEPTION_LINES: usize = 1;
const ACCENTED_VOWELS: [char; 5] = ['á', 'é', 'í', 'ó', 'ú'];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Signal {
    LanguageSwitch { minutes: i64 },
    MultipleLanguages(BTreeSet<Language>),
    Comments(usize),
    Accents(usize),
    Exceptions(usize),
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::LanguageSwitch { minutes } => {
                write!(f, "Used different languages within {} minutes", minutes)
            }
            Signal::MultipleLanguages(languages) => {
                let names: Vec<&str> = languages.iter().map(|l| l.extension()).collect();
                write!(f, "Used more than one language: {}", names.join(", "))
            }
            Signal::Comments(count) => write!(f, "Code has {} comments", count),
            Signal::Accents(count) => write!(f, "Code has {} lines with accents", count),
            Signal::Exceptions(count) => {
                write!(f, "Code has {} lines mentioning exceptions", count)
            }
        }
    }
}

/// Lines of one source that matched a check.
#[derive(Debug, Default)]
struct LineMatches<'a> {
    lines: Vec<&'a str>,
}

impl<'a> LineMatches<'a> {
    fn scan(source: &'a str, mut predicate: impl FnMut(&str) -> bool) -> Self {
        Self {
            lines: source.split('\n').filter(|line| predicate(line)).collect(),
        }
    }

    fn count(&self) -> usize {
        self.lines.len()
    }
}

fn comment_lines(source: &str, language: Language) -> LineMatches<'_> {
    let markers = language.comment_markers();
    LineMatches::scan(source, |line| {
        markers.iter().any(|marker| line.contains(marker))
    })
}

fn accent_lines(source: &str) -> LineMatches<'_> {
    LineMatches::scan(source, |line| {
        line.to_lowercase().contains(ACCENTED_VOWELS)
    })
}

fn exception_lines(source: &str) -> LineMatches<'_> {
    LineMatches::scan(source, |line| {
        line.contains("Exception") || line.contains("Error")
    })
}

/// Run every check over `timeline`; `None` when nothing looks suspicious.
pub fn analyze(timeline: &AuthorTimeline, languages: &LanguageTable) -> Option<SuspicionFinding> {
    let mut signals: Vec<Signal> = Vec::new();
    let mut evidence: BTreeSet<String> = BTreeSet::new();
    let mut used: BTreeSet<Language> = BTreeSet::new();

    let mut previous: Option<(&Submission, Language)> = None;

    for submission in timeline.submissions() {
        let language = languages.normalize(&submission.language);
        used.insert(language);

        if let Some((previous, previous_language)) = previous {
            let gap = submission.submitted_at - previous.submitted_at;
            if language != previous_language && gap < TimeDelta::minutes(LANGUAGE_SWITCH_MINUTES) {
                signals.push(Signal::LanguageSwitch {
                    minutes: ceil_minutes(gap),
                });
            }
        }
        previous = Some((submission, language));

        let Some(source) = submission.source.as_deref() else {
            continue;
        };

        let comments = comment_lines(source, language);
        if comments.count() > MAX_COMMENT_LINES {
            record(&mut signals, &mut evidence, Signal::Comments(comments.count()), comments);
        }

        let accents = accent_lines(source);
        if accents.count() > 0 {
            record(&mut signals, &mut evidence, Signal::Accents(accents.count()), accents);
        }

        let exceptions = exception_lines(source);
        if exceptions.count() > MAX_EXCEPTION_LINES {
            record(&mut signals, &mut evidence, Signal::Exceptions(exceptions.count()), exceptions);
        }
    }

    if used.len() > 1 {
        signals.push(Signal::MultipleLanguages(used));
    }

    if signals.is_empty() {
        return None;
    }

    let lines: BTreeSet<String> = signals.iter().map(ToString::to_string).collect();
    let mut reason = String::from(REASON_HEADER);
    for line in &lines {
        reason.push_str("\n- ");
        reason.push_str(line);
    }

    let details: Vec<String> = evidence.into_iter().collect();

    Some(SuspicionFinding {
        author: timeline.author().clone(),
        problem: timeline.problem().to_string(),
        similarity: None,
        reason,
        details: details.join("\n"),
    })
}

fn record(
    signals: &mut Vec<Signal>,
    evidence: &mut BTreeSet<String>,
    signal: Signal,
    matches: LineMatches<'_>,
) {
    evidence.extend(matches.lines.iter().map(|line| line.trim().to_string()));
    signals.push(signal);
}

fn ceil_minutes(gap: TimeDelta) -> i64 {
    let secs = gap.num_seconds().max(0);
    (secs + 59) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::log_capture::LogBuffer;
    use crate::models::Author;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn submission(language: &str, secs: i64, source: Option<&str>) -> Submission {
        Submission {
            run_id: format!("run-{}", secs),
            author: Author::new("ana", None),
            problem: "sum".to_string(),
            language: language.to_string(),
            verdict: "WA".to_string(),
            score: 0.0,
            submitted_at: at(secs),
            source: source.map(str::to_string),
        }
    }

    fn timeline(submissions: Vec<Submission>) -> AuthorTimeline {
        AuthorTimeline::new(Author::new("ana", None), "sum", submissions).unwrap()
    }

    fn run(submissions: Vec<Submission>) -> Option<SuspicionFinding> {
        analyze(&timeline(submissions), &LanguageTable::default())
    }

    fn python_with_hashes(hashes: usize) -> String {
        (0..10)
            .map(|i| {
                if i < hashes {
                    format!("x = {}  # step", i)
                } else {
                    format!("x = {}", i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_language_switch_within_window() {
        let finding = run(vec![
            submission("py3", 0, Some("print(1)")),
            submission("cpp17-gcc", 600, Some("int main() {}")),
        ])
        .unwrap();
        assert!(finding
            .reason
            .contains("Used different languages within 10 minutes"));
        assert!(finding
            .reason
            .contains("Used more than one language: .cpp, .py"));
    }

    #[test]
    fn test_language_switch_outside_window() {
        let finding = run(vec![
            submission("py3", 0, Some("print(1)")),
            submission("cpp17-gcc", 1200, Some("int main() {}")),
        ])
        .unwrap();
        assert!(!finding.reason.contains("different languages within"));
        assert!(finding.reason.contains("Used more than one language"));
    }

    #[test]
    fn test_switch_minutes_round_up() {
        let finding = run(vec![
            submission("py3", 0, None),
            submission("java", 61, None),
        ])
        .unwrap();
        assert!(finding
            .reason
            .contains("Used different languages within 2 minutes"));
    }

    #[test]
    fn test_same_language_variants_do_not_switch() {
        let finding = run(vec![
            submission("cpp11-gcc", 0, Some("int a;")),
            submission("cpp20-clang", 30, Some("int b;")),
        ]);
        assert_eq!(finding, None);
    }

    #[test]
    fn test_four_python_comments_trigger() {
        let source = python_with_hashes(4);
        let finding = run(vec![submission("py3", 0, Some(&source))]).unwrap();
        assert_eq!(
            finding.reason,
            "Suspicious activity detected:\n- Code has 4 comments"
        );
        assert_eq!(
            finding.details,
            "x = 0  # step\nx = 1  # step\nx = 2  # step\nx = 3  # step"
        );
        assert_eq!(finding.similarity, None);
    }

    #[test]
    fn test_three_python_comments_do_not_trigger() {
        let source = python_with_hashes(3);
        assert_eq!(run(vec![submission("py3", 0, Some(&source))]), None);
    }

    #[test]
    fn test_cpp_comment_markers() {
        let source = "// a\n/* b */\nint x; // c\n// d\n# include";
        let finding = run(vec![submission("cpp17-gcc", 0, Some(source))]).unwrap();
        assert!(finding.reason.contains("Code has 4 comments"));
        assert!(!finding.details.contains("# include"));
    }

    #[test]
    fn test_accented_lines_case_insensitive() {
        let source = "// Número de casos\nint n;\n// ÚLTIMO valor\n";
        let finding = run(vec![submission("cpp17-gcc", 0, Some(source))]).unwrap();
        assert_eq!(
            finding.reason,
            "Suspicious activity detected:\n- Code has 2 lines with accents"
        );
        assert_eq!(finding.details, "// Número de casos\n// ÚLTIMO valor");
    }

    #[test]
    fn test_exceptions_need_two_lines() {
        let one = "try:\n    pass\nexcept ValueError:\n    pass";
        assert_eq!(run(vec![submission("py3", 0, Some(one))]), None);

        let two = "throw new RuntimeException();\ncatch (Exception e) {}\nError and Exception";
        let finding = run(vec![submission("java", 0, Some(two))]).unwrap();
        assert!(finding
            .reason
            .contains("Code has 3 lines mentioning exceptions"));
    }

    #[test]
    fn test_missing_source_only_counts_language() {
        let finding = run(vec![
            submission("py3", 0, None),
            submission("py3", 10, None),
        ]);
        assert_eq!(finding, None);
    }

    #[test]
    fn test_signals_and_details_deduplicated_and_sorted() {
        let source = "  // Número  \n// z\n// y\n// x\n";
        let finding = run(vec![
            submission("cpp17-gcc", 0, Some(source)),
            submission("cpp17-gcc", 10, Some(source)),
        ])
        .unwrap();
        assert_eq!(
            finding.reason,
            "Suspicious activity detected:\n- Code has 1 lines with accents\n- Code has 4 comments"
        );
        assert_eq!(finding.details, "// Número\n// x\n// y\n// z");
    }

    #[test]
    fn test_repeated_switches_collapse_by_text() {
        let finding = run(vec![
            submission("py3", 0, None),
            submission("cpp17-gcc", 300, None),
            submission("py3", 600, None),
        ])
        .unwrap();
        assert_eq!(
            finding.reason,
            "Suspicious activity detected:\n- Used different languages within 5 minutes\n- Used more than one language: .cpp, .py"
        );
    }

    #[test]
    fn test_distinct_switch_gaps_keep_separate_lines() {
        let finding = run(vec![
            submission("py3", 0, None),
            submission("cpp17-gcc", 300, None),
            submission("py3", 840, None),
        ])
        .unwrap();
        assert_eq!(
            finding.reason,
            "Suspicious activity detected:\n- Used different languages within 5 minutes\n- Used different languages within 9 minutes\n- Used more than one language: .cpp, .py"
        );
    }

    #[test]
    fn test_unknown_language_warns_once_per_run() {
        let logs = LogBuffer::default();
        let finding = tracing::subscriber::with_default(logs.subscriber(), || {
            run(vec![
                submission("rb", 0, None),
                submission("rb", 60, None),
                submission("rb", 120, None),
            ])
        });
        assert_eq!(finding, None);
        assert_eq!(logs.count("Extension for language rb not found"), 3);
    }
}
