use dialoguer::Select;

use crate::clients::omegaup::{ContestSummary, ProblemSummary};
use crate::error::ConfigError;

/// Problem selector meaning every problem of the contest.
pub const ALL_PROBLEMS: &str = "all";

fn label(alias: &str, title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!("{} ({})", alias, title),
        _ => alias.to_string(),
    }
}

pub fn choose_contest(contests: &[ContestSummary]) -> Result<String, ConfigError> {
    let items: Vec<String> = contests
        .iter()
        .map(|contest| label(&contest.alias, contest.title.as_deref()))
        .collect();
    let picked = Select::new()
        .with_prompt("Please select a contest")
        .items(&items)
        .default(0)
        .interact_opt()?;
    picked
        .and_then(|idx| contests.get(idx))
        .map(|contest| contest.alias.clone())
        .ok_or_else(|| ConfigError::NoSelection {
            what: "contest".to_string(),
        })
}

pub fn choose_problems(problems: &[ProblemSummary]) -> Result<Vec<String>, ConfigError> {
    let mut items = vec![ALL_PROBLEMS.to_string()];
    items.extend(
        problems
            .iter()
            .map(|problem| label(&problem.alias, problem.title.as_deref())),
    );
    let picked = Select::new()
        .with_prompt("Please select a problem")
        .items(&items)
        .default(0)
        .interact_opt()?
        .ok_or_else(|| ConfigError::NoSelection {
            what: "problem".to_string(),
        })?;

    match picked {
        0 => Ok(problems.iter().map(|problem| problem.alias.clone()).collect()),
        idx => problems
            .get(idx - 1)
            .map(|problem| vec![problem.alias.clone()])
            .ok_or_else(|| ConfigError::NoSelection {
                what: "problem".to_string(),
            }),
    }
}

/// Problems named on the command line: one alias or [`ALL_PROBLEMS`].
pub fn resolve_problems(
    selection: &str,
    problems: &[ProblemSummary],
    contest: &str,
) -> Result<Vec<String>, ConfigError> {
    if selection == ALL_PROBLEMS {
        return Ok(problems.iter().map(|problem| problem.alias.clone()).collect());
    }
    if problems.iter().any(|problem| problem.alias == selection) {
        return Ok(vec![selection.to_string()]);
    }
    Err(ConfigError::UnknownProblem {
        alias: selection.to_string(),
        contest: contest.to_string(),
    })
}
