use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::error::GroupingError;
use crate::models::{AuthorTimeline, Roster, RunSummary, Submission};

/// Split a problem's runs into one timeline per author.
///
/// Timelines come back ordered by author id; within a timeline runs are sorted
/// by submission time, keeping the listing order for equal times. Any run
/// without a usable time aborts the grouping.
pub fn group_runs(
    problem: &str,
    runs: &[RunSummary],
    roster: &Roster,
) -> Result<Vec<AuthorTimeline>, GroupingError> {
    let mut by_author: BTreeMap<&str, Vec<Submission>> = BTreeMap::new();

    for run in runs {
        let submitted_at = submission_time(run)?;
        by_author
            .entry(run.username.as_str())
            .or_default()
            .push(Submission {
                run_id: run.guid.clone(),
                author: roster.author(&run.username),
                problem: problem.to_string(),
                language: run.language.clone(),
                verdict: run.verdict.clone(),
                score: run.score,
                submitted_at,
                source: None,
            });
    }

    by_author
        .into_iter()
        .map(|(username, mut submissions)| {
            submissions.sort_by_key(|submission| submission.submitted_at);
            AuthorTimeline::new(roster.author(username), problem, submissions)
        })
        .collect()
}

fn submission_time(run: &RunSummary) -> Result<DateTime<Utc>, GroupingError> {
    let secs = run.time.ok_or_else(|| GroupingError::MissingTimestamp {
        run_id: run.guid.clone(),
    })?;
    if secs < 0 {
        return Err(GroupingError::MalformedTimestamp {
            run_id: run.guid.clone(),
            value: secs,
        });
    }
    DateTime::from_timestamp(secs, 0).ok_or_else(|| GroupingError::MalformedTimestamp {
        run_id: run.guid.clone(),
        value: secs,
    })
}
