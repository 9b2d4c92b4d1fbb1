use regex::Regex;
use std::sync::OnceLock;

use crate::error::ParseError;
use crate::language::Language;
use crate::models::{MatchSide, PairwiseMatch, Roster};

use super::filter::{remove_same_author_rows, FilteredReport};

static ANCHOR: OnceLock<Regex> = OnceLock::new();

fn anchor_regex() -> &'static Regex {
    ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("anchor pattern is valid")
    })
}

/// What a report is about, beyond what its markup says.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub language: Language,
    pub roster: &'a Roster,
}

/// Reads a plagiarism service's HTML report.
///
/// Everything that depends on the report markup lives behind this trait.
pub trait ReportParser {
    /// Drop the rows comparing two submissions of the same author.
    fn remove_same_author(&self, html: &str) -> Result<FilteredReport, ParseError>;

    fn parse(&self, html: &str, ctx: &ReportContext<'_>) -> Result<Vec<PairwiseMatch>, ParseError>;
}

/// Parser for the Moss results index page.
#[derive(Debug, Clone, Copy, Default)]
pub struct MossReportParser;

impl ReportParser for MossReportParser {
    fn remove_same_author(&self, html: &str) -> Result<FilteredReport, ParseError> {
        remove_same_author_rows(html)
    }

    fn parse(&self, html: &str, ctx: &ReportContext<'_>) -> Result<Vec<PairwiseMatch>, ParseError> {
        let anchors: Vec<Anchor<'_>> = anchors(html)
            .filter(|anchor| anchor.is_result())
            .collect();

        let mut pairs = anchors.chunks_exact(2);
        let mut matches = Vec::with_capacity(anchors.len() / 2);
        for pair in pairs.by_ref() {
            let first = pair[0].fields()?;
            let second = pair[1].fields()?;
            matches.push(PairwiseMatch {
                sides: [
                    MatchSide {
                        author: ctx.roster.author(first.author),
                        file_name: first.file_name.to_string(),
                    },
                    MatchSide {
                        author: ctx.roster.author(second.author),
                        file_name: second.file_name.to_string(),
                    },
                ],
                results_url: pair[0].href.to_string(),
                problem: first.problem.to_string(),
                language: ctx.language,
                status: first.status.to_string(),
                similarity: first.similarity,
            });
        }

        if let [dangling] = pairs.remainder() {
            return Err(ParseError::DanglingAnchor {
                text: dangling.text.to_string(),
            });
        }

        Ok(matches)
    }
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Anchor<'a> {
    pub href: &'a str,
    pub text: &'a str,
}

impl<'a> Anchor<'a> {
    fn is_result(&self) -> bool {
        self.href.contains("results")
    }

    pub fn fields(&self) -> Result<AnchorFields<'a>, ParseError> {
        parse_anchor_text(self.text)
    }
}

pub(super) fn anchors(html: &str) -> impl Iterator<Item = Anchor<'_>> {
    anchor_regex().captures_iter(html).filter_map(|caps| {
        Some(Anchor {
            href: caps.get(1)?.as_str(),
            text: caps.get(2)?.as_str().trim(),
        })
    })
}

/// One side of a match as written in the anchor text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct AnchorFields<'a> {
    pub problem: &'a str,
    pub author: &'a str,
    pub file_name: &'a str,
    pub status: &'a str,
    pub similarity: u8,
}

/// Split `<dir>/<problem>/<author>/<file> (<percent>%)`.
pub(super) fn parse_anchor_text(text: &str) -> Result<AnchorFields<'_>, ParseError> {
    let malformed = || ParseError::MalformedAnchor {
        text: text.to_string(),
    };

    let parts: Vec<&str> = text.split('/').collect();
    let [_, problem, author, file_and_status] = parts[..] else {
        return Err(malformed());
    };
    let (file_name, status) = file_and_status.rsplit_once(' ').ok_or_else(malformed)?;
    if problem.is_empty() || author.is_empty() || file_name.is_empty() {
        return Err(malformed());
    }

    Ok(AnchorFields {
        problem,
        author,
        file_name,
        status,
        similarity: parse_similarity(status)?,
    })
}

/// `(95%)` becomes 95.
fn parse_similarity(status: &str) -> Result<u8, ParseError> {
    let invalid = || ParseError::InvalidStatus {
        status: status.to_string(),
    };
    let percent: u8 = status
        .replace(['(', ')', '%'], "")
        .parse()
        .map_err(|_| invalid())?;
    if percent > 100 {
        return Err(invalid());
    }
    Ok(percent)
}
