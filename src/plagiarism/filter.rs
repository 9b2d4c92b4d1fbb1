//! Same-author filtering of a Moss results table.
//!
//! Moss compares every file against every other file, including two runs of
//! the same contestant. Each match is three physical lines: the row opening
//! with the first file, the second file, and the alignment cell holding the
//! matched line count. Rows are kept or dropped as a unit.

use crate::error::ParseError;

use super::parser::{anchors, AnchorFields};

const MATCH_ROW_PREFIX: &str = "<tr><td>";
const LINES_PER_MATCH: usize = 3;

/// Report text with same-author rows removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredReport {
    pub html: String,
    pub kept: usize,
    pub dropped: usize,
}

fn is_match_row(line: &str) -> bool {
    line.trim_start()
        .get(..MATCH_ROW_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MATCH_ROW_PREFIX))
}

fn side(line: &str, index: usize) -> Result<AnchorFields<'_>, ParseError> {
    anchors(line)
        .next()
        .ok_or(ParseError::MissingAnchor { line: index + 1 })?
        .fields()
}

pub(super) fn remove_same_author_rows(html: &str) -> Result<FilteredReport, ParseError> {
    let lines: Vec<&str> = html.split_inclusive('\n').collect();
    let mut out = String::with_capacity(html.len());
    let mut kept = 0;
    let mut dropped = 0;

    let mut idx = 0;
    while idx < lines.len() {
        if !is_match_row(lines[idx]) || idx + 1 >= lines.len() {
            out.push_str(lines[idx]);
            idx += 1;
            continue;
        }

        let first = side(lines[idx], idx)?;
        let second = side(lines[idx + 1], idx + 1)?;
        let end = (idx + LINES_PER_MATCH).min(lines.len());

        if first.author == second.author && first.problem == second.problem {
            dropped += 1;
        } else {
            kept += 1;
            lines[idx..end].iter().for_each(|line| out.push_str(line));
        }
        idx = end;
    }

    Ok(FilteredReport {
        html: out,
        kept,
        dropped,
    })
}
