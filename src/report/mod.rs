//! Final activity report: heuristic and plagiarism findings merged, ranked,
//! and counted per contestant and per school.

pub mod csv;
pub mod html;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{school_of, SuspicionFinding};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestantCount {
    pub name: String,
    pub findings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolCount {
    pub school: String,
    pub contestants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityReport {
    pub findings: Vec<SuspicionFinding>,
    pub by_contestant: Vec<ContestantCount>,
    /// Only schools with more than one flagged contestant.
    pub by_school: Vec<SchoolCount>,
}

/// Merge both kinds of findings into one deterministic report.
pub fn assemble(
    heuristic: Vec<SuspicionFinding>,
    plagiarism: Vec<SuspicionFinding>,
) -> ActivityReport {
    let mut findings = heuristic;
    findings.extend(plagiarism);
    findings.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    let mut per_name: BTreeMap<&str, usize> = BTreeMap::new();
    for finding in &findings {
        *per_name.entry(finding.display_name()).or_default() += 1;
    }

    let mut per_school: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for name in per_name.keys() {
        if let Some(school) = school_of(name) {
            per_school.entry(school).or_default().insert(*name);
        }
    }

    let mut by_contestant: Vec<ContestantCount> = per_name
        .iter()
        .map(|(name, count)| ContestantCount {
            name: name.to_string(),
            findings: *count,
        })
        .collect();
    by_contestant.sort_by(|a, b| b.findings.cmp(&a.findings).then_with(|| a.name.cmp(&b.name)));

    let mut by_school: Vec<SchoolCount> = per_school
        .iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(school, names)| SchoolCount {
            school: school.to_string(),
            contestants: names.len(),
        })
        .collect();
    by_school.sort_by(|a, b| {
        b.contestants
            .cmp(&a.contestants)
            .then_with(|| a.school.cmp(&b.school))
    });

    ActivityReport {
        findings,
        by_contestant,
        by_school,
    }
}

fn sort_key(finding: &SuspicionFinding) -> (Option<&str>, &str, &str, &str) {
    (
        finding.school(),
        finding.display_name(),
        finding.problem.as_str(),
        finding.reason.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use pretty_assertions::assert_eq;

    fn finding(name: Option<&str>, id: &str, problem: &str, reason: &str) -> SuspicionFinding {
        SuspicionFinding {
            author: Author::new(id, name.map(str::to_string)),
            problem: problem.to_string(),
            similarity: None,
            reason: reason.to_string(),
            details: String::new(),
        }
    }

    #[test]
    fn test_school_counts_distinct_contestants() {
        let heuristic = vec![
            finding(Some("Ana-SchoolA"), "ana", "sum", "r1"),
            finding(Some("Ana-SchoolA"), "ana", "mul", "r2"),
            finding(Some("Carl-SchoolB"), "carl", "sum", "r1"),
        ];
        let plagiarism = vec![finding(Some("Beto-SchoolA"), "beto", "sum", "r3")];
        let report = assemble(heuristic, plagiarism);

        assert_eq!(
            report.by_school,
            vec![SchoolCount {
                school: "SchoolA".to_string(),
                contestants: 2,
            }]
        );
        assert_eq!(
            report.by_contestant,
            vec![
                ContestantCount {
                    name: "Ana-SchoolA".to_string(),
                    findings: 2,
                },
                ContestantCount {
                    name: "Beto-SchoolA".to_string(),
                    findings: 1,
                },
                ContestantCount {
                    name: "Carl-SchoolB".to_string(),
                    findings: 1,
                },
            ]
        );
    }

    #[test]
    fn test_sorted_by_school_then_name_problem_reason() {
        let findings = vec![
            finding(Some("Zed-SchoolB"), "zed", "a", "x"),
            finding(Some("Ana-SchoolA"), "ana", "b", "x"),
            finding(None, "yolanda", "a", "x"),
            finding(Some("Ana-SchoolA"), "ana", "a", "y"),
            finding(Some("Ana-SchoolA"), "ana", "a", "x"),
        ];
        let report = assemble(findings, Vec::new());
        let keys: Vec<(&str, &str, &str)> = report
            .findings
            .iter()
            .map(|f| (f.display_name(), f.problem.as_str(), f.reason.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("yolanda", "a", "x"),
                ("Ana-SchoolA", "a", "x"),
                ("Ana-SchoolA", "a", "y"),
                ("Ana-SchoolA", "b", "x"),
                ("Zed-SchoolB", "a", "x"),
            ]
        );
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let make = || {
            vec![
                finding(Some("Ana-SchoolA"), "ana", "a", "x"),
                finding(Some("Ana-SchoolA"), "ana2", "a", "x"),
                finding(None, "bob", "a", "x"),
            ]
        };
        let first = assemble(make(), make());
        let second = assemble(make(), make());
        assert_eq!(first, second);
        assert_eq!(first.findings.len(), 6);
        assert_eq!(first.findings[0].author.id, "bob");
        assert_eq!(first.findings[2].author.id, "ana");
        assert_eq!(first.findings[3].author.id, "ana2");
    }
}
