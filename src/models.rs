use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::GroupingError;
use crate::language::Language;

/// omegaUp verdict for runs the judge itself failed on.
pub const JUDGE_ERROR: &str = "JE";

/// School of a contestant, taken from a display name formatted as `Name-School`.
///
/// Everything after the last hyphen is the school; names without a hyphen
/// have none.
pub fn school_of(display_name: &str) -> Option<&str> {
    display_name
        .rfind('-')
        .map(|idx| &display_name[idx + 1..])
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Author {
    pub id: String,
    pub name: Option<String>,
}

impl Author {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn school(&self) -> Option<&str> {
        school_of(self.display_name())
    }
}

/// A run as listed by omegaUp, before its source is known.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSummary {
    pub guid: String,
    pub username: String,
    pub language: String,
    pub verdict: String,
    #[serde(default)]
    pub score: f64,
    /// Submission time in seconds since the epoch.
    #[serde(default)]
    pub time: Option<i64>,
}

/// One graded run with its source, once downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub run_id: String,
    pub author: Author,
    pub problem: String,
    pub language: String,
    pub verdict: String,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
    pub source: Option<String>,
}

impl Submission {
    pub fn is_judge_error(&self) -> bool {
        self.verdict == JUDGE_ERROR
    }

    /// Score as a whole percentage, rounded down.
    pub fn score_percent(&self) -> i64 {
        (self.score * 100.0).floor() as i64
    }

    pub fn with_source(self, source: Option<String>) -> Self {
        Self { source, ..self }
    }
}

/// Every run of one author on one problem, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorTimeline {
    author: Author,
    problem: String,
    submissions: Vec<Submission>,
}

impl AuthorTimeline {
    /// Fails unless `submissions` is non-decreasing by submission time.
    pub fn new(
        author: Author,
        problem: impl Into<String>,
        submissions: Vec<Submission>,
    ) -> Result<Self, GroupingError> {
        let problem = problem.into();
        let ordered = submissions
            .windows(2)
            .all(|pair| pair[0].submitted_at <= pair[1].submitted_at);
        if !ordered {
            return Err(GroupingError::OutOfOrder {
                author: author.id,
                problem,
            });
        }
        Ok(Self {
            author,
            problem,
            submissions,
        })
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn into_parts(self) -> (Author, String, Vec<Submission>) {
        (self.author, self.problem, self.submissions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspicionFinding {
    pub author: Author,
    pub problem: String,
    pub similarity: Option<u8>,
    pub reason: String,
    pub details: String,
}

impl SuspicionFinding {
    pub fn display_name(&self) -> &str {
        self.author.display_name()
    }

    pub fn school(&self) -> Option<&str> {
        self.author.school()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSide {
    pub author: Author,
    pub file_name: String,
}

/// One row of a Moss report: two files and how similar they are.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseMatch {
    pub sides: [MatchSide; 2],
    pub results_url: String,
    pub problem: String,
    pub language: Language,
    pub status: String,
    pub similarity: u8,
}

impl PairwiseMatch {
    pub fn is_same_author(&self) -> bool {
        self.sides[0].author.id == self.sides[1].author.id
    }
}

/// All matches of one Moss report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBucket {
    pub problem: String,
    pub language: Language,
    pub matches: Vec<PairwiseMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contestant {
    pub username: String,
    pub name: Option<String>,
    pub total_points: f64,
    pub problem_points: BTreeMap<String, f64>,
}

/// Scoreboard entries keyed by username.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    contestants: HashMap<String, Contestant>,
}

impl Roster {
    pub fn get(&self, username: &str) -> Option<&Contestant> {
        self.contestants.get(username)
    }

    /// Author with the display name from the scoreboard, if any.
    pub fn author(&self, username: &str) -> Author {
        let name = self
            .get(username)
            .and_then(|contestant| contestant.name.clone())
            .filter(|name| !name.is_empty());
        Author::new(username, name)
    }

    pub fn len(&self) -> usize {
        self.contestants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contestants.is_empty()
    }
}

impl FromIterator<Contestant> for Roster {
    fn from_iter<I: IntoIterator<Item = Contestant>>(iter: I) -> Self {
        Self {
            contestants: iter
                .into_iter()
                .map(|contestant| (contestant.username.clone(), contestant))
                .collect(),
        }
    }
}
