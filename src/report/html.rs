use chrono::Utc;
use serde::Serialize;
use tera::Context;

use crate::error::ReportError;
use crate::models::{PairwiseMatch, ReportBucket, SuspicionFinding};
use crate::templates::{get_tera, REPORT_TEMPLATE};

use super::ActivityReport;

#[derive(Debug, Serialize)]
struct FindingView<'a> {
    school: &'a str,
    name: &'a str,
    user: &'a str,
    problem: &'a str,
    similarity: String,
    reason: &'a str,
    details: &'a str,
    link: bool,
}

impl<'a> From<&'a SuspicionFinding> for FindingView<'a> {
    fn from(finding: &'a SuspicionFinding) -> Self {
        Self {
            school: finding.school().unwrap_or_default(),
            name: finding.display_name(),
            user: &finding.author.id,
            problem: &finding.problem,
            similarity: finding
                .similarity
                .map(|s| format!("{}%", s))
                .unwrap_or_default(),
            reason: &finding.reason,
            details: &finding.details,
            link: finding.similarity.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchView<'a> {
    first_name: &'a str,
    first_file: &'a str,
    second_name: &'a str,
    second_file: &'a str,
    similarity: u8,
    url: &'a str,
}

impl<'a> From<&'a PairwiseMatch> for MatchView<'a> {
    fn from(m: &'a PairwiseMatch) -> Self {
        Self {
            first_name: m.sides[0].author.display_name(),
            first_file: &m.sides[0].file_name,
            second_name: m.sides[1].author.display_name(),
            second_file: &m.sides[1].file_name,
            similarity: m.similarity,
            url: &m.results_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    title: String,
    matches: Vec<MatchView<'a>>,
}

/// Render the findings plus one match table per Moss report.
pub fn render(
    contest: &str,
    report: &ActivityReport,
    buckets: &[ReportBucket],
    min_similarity: u8,
) -> Result<String, ReportError> {
    let findings: Vec<FindingView<'_>> = report.findings.iter().map(FindingView::from).collect();
    let sections: Vec<SectionView<'_>> = buckets
        .iter()
        .map(|bucket| SectionView {
            title: format!("{} - {}", bucket.language.moss_name(), bucket.problem),
            matches: bucket.matches.iter().map(MatchView::from).collect(),
        })
        .collect();

    let mut ctx = Context::new();
    ctx.insert("contest", contest);
    ctx.insert("generated_at", &Utc::now().format("%Y-%m-%d %H:%M UTC").to_string());
    ctx.insert("min_similarity", &min_similarity);
    ctx.insert("findings", &findings);
    ctx.insert("by_school", &report.by_school);
    ctx.insert("sections", &sections);

    Ok(get_tera().render(REPORT_TEMPLATE, &ctx)?)
}
