use serde::Serialize;

use crate::error::ReportError;
use crate::models::Roster;

use super::ActivityReport;

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "School")]
    school: &'a str,
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "User")]
    user: &'a str,
    #[serde(rename = "Problem")]
    problem: &'a str,
    #[serde(rename = "Problem score")]
    problem_score: Option<f64>,
    #[serde(rename = "Total score")]
    total_score: Option<f64>,
    #[serde(rename = "Similarity")]
    similarity: Option<u8>,
    #[serde(rename = "Reason")]
    reason: &'a str,
    #[serde(rename = "Details")]
    details: &'a str,
}

/// One CSV row per finding, in report order, with scoreboard points.
pub fn render(report: &ActivityReport, roster: &Roster) -> Result<Vec<u8>, ReportError> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    for finding in &report.findings {
        let contestant = roster.get(&finding.author.id);
        writer.serialize(CsvRow {
            school: finding.school().unwrap_or_default(),
            name: finding.display_name(),
            user: &finding.author.id,
            problem: &finding.problem,
            problem_score: contestant
                .and_then(|c| c.problem_points.get(&finding.problem))
                .copied(),
            total_score: contestant.map(|c| c.total_points),
            similarity: finding.similarity,
            reason: &finding.reason,
            details: &finding.details,
        })?;
    }

    writer
        .into_inner()
        .map_err(|err| ReportError::Csv(err.into_error().into()))
}
