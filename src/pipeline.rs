//! End-to-end audit of one contest.
//!
//! Problems are processed one after another: runs are listed, grouped,
//! downloaded (or read from the cache) and analysed before the next problem
//! starts. Moss is only contacted once every problem has been downloaded.

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::analysis::{analyze, group_runs};
use crate::clients::{MossClient, OmegaUpClient};
use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::FetchError;
use crate::language::{Language, LanguageTable};
use crate::models::{AuthorTimeline, ReportBucket, Roster, SuspicionFinding};
use crate::plagiarism::{
    consolidate_buckets, expand_all, ConsolidationOptions, MossReportParser, ReportContext,
    ReportParser,
};
use crate::report::{self, ActivityReport};
use crate::state::AppState;
use crate::storage::{self, persist_report, SourceCache};
use crate::{prompt, routes};

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub contest: Option<String>,
    pub problem: Option<String>,
    pub check_plagiarism: bool,
    pub consolidation: ConsolidationOptions,
    pub serve: bool,
}

pub async fn run(config: Config, options: AuditOptions) -> anyhow::Result<()> {
    storage::ensure_dirs(&[
        config.generated_folder.as_path(),
        config.submission_folder.as_path(),
        config.results_folder.as_path(),
    ])
    .context("could not create output folders")?;

    let credentials = Credentials::load(&config.credentials_file)?;
    let mut omegaup = OmegaUpClient::new(config.omegaup_url.as_str())?;
    omegaup
        .login(&credentials.username, &credentials.password)
        .await
        .context("omegaUp login failed")?;

    let contest = match options.contest {
        Some(contest) => contest,
        None => prompt::choose_contest(&omegaup.list_contests().await?)?,
    };
    let problems = omegaup.list_problems(&contest).await?;
    let problem_aliases = match options.problem.as_deref() {
        Some(selection) => prompt::resolve_problems(selection, &problems, &contest)?,
        None => prompt::choose_problems(&problems)?,
    };
    let roster: Roster = omegaup.scoreboard(&contest).await?.into_iter().collect();
    if roster.is_empty() {
        warn!("The scoreboard of {} is empty, reports will use usernames", contest);
    } else {
        info!("Loaded {} contestants from the scoreboard", roster.len());
    }

    let languages = LanguageTable::default();
    let cache = SourceCache::new(config.generated_folder.clone());

    info!(
        "Getting the code of all runs for {} problems for contest {}",
        problem_aliases.len(),
        contest
    );
    let mut heuristic = Vec::new();
    for problem in &problem_aliases {
        info!("Getting the runs for problem {}", problem);
        let runs = omegaup.list_runs(&contest, problem).await?;
        let timelines = group_runs(problem, &runs, &roster)
            .with_context(|| format!("could not order the runs of {}", problem))?;

        for timeline in timelines {
            let timeline = attach_sources(&omegaup, &cache, &languages, timeline).await?;
            if let Some(finding) = analyze(&timeline, &languages) {
                log_finding(&finding);
                heuristic.push(finding);
            }
        }
        info!("Source code of {} saved", problem);
    }

    let (buckets, plagiarism) = if options.check_plagiarism {
        let buckets = check_plagiarism(
            &config,
            &credentials,
            &cache,
            &MossReportParser,
            &problem_aliases,
            &roster,
        )
        .await?;
        let consolidated = consolidate_buckets(buckets, options.consolidation);
        let findings = expand_all(&consolidated.ranked);
        (consolidated.buckets, findings)
    } else {
        info!("The plagiarism check has been skipped");
        (Vec::new(), Vec::new())
    };

    let activity = report::assemble(heuristic, plagiarism);
    log_summary(&activity);

    let csv = report::csv::render(&activity, &roster)?;
    let html = report::html::render(
        &contest,
        &activity,
        &buckets,
        options.consolidation.min_similarity,
    )?;
    let csv_path = persist_report(
        &config.results_folder,
        &format!("{}_report.csv", contest),
        &csv,
    )?;
    let html_path = persist_report(
        &config.results_folder,
        &format!("{}_report.html", contest),
        html.as_bytes(),
    )?;
    info!("Report saved to {} and {}", csv_path.display(), html_path.display());

    if options.serve {
        let state = Arc::new(AppState {
            config: Arc::new(config),
            report_html: html.into(),
            report: Arc::new(activity),
        });
        routes::serve(state).await?;
    }

    Ok(())
}

/// Rebuild `timeline` with every run's source, downloading what is not cached.
async fn attach_sources(
    omegaup: &OmegaUpClient,
    cache: &SourceCache,
    languages: &LanguageTable,
    timeline: AuthorTimeline,
) -> anyhow::Result<AuthorTimeline> {
    let (author, problem, submissions) = timeline.into_parts();
    let mut with_sources = Vec::with_capacity(submissions.len());

    for (idx, submission) in submissions.into_iter().enumerate() {
        let language = languages
            .lookup(&submission.language)
            .unwrap_or(Language::Unknown);
        let path = cache.path_for(idx, &submission, language);

        let source = match cache.read(&path)? {
            Some(source) => Some(source),
            None => match omegaup.fetch_source(&submission.run_id).await {
                Ok(source) => {
                    cache.write(&path, &source)?;
                    Some(source)
                }
                Err(err) if submission.is_judge_error() => {
                    warn!("Skipping source of run {}: {}", submission.run_id, err);
                    None
                }
                Err(source) => {
                    return Err(FetchError {
                        run_id: submission.run_id.clone(),
                        verdict: submission.verdict.clone(),
                        source,
                    }
                    .into())
                }
            },
        };
        with_sources.push(submission.with_source(source));
    }

    Ok(AuthorTimeline::new(author, problem, with_sources)?)
}

/// One Moss job per problem and language that has cached files.
async fn check_plagiarism(
    config: &Config,
    credentials: &Credentials,
    cache: &SourceCache,
    parser: &impl ReportParser,
    problems: &[String],
    roster: &Roster,
) -> anyhow::Result<Vec<ReportBucket>> {
    info!("Sending information to Moss. Please be patient...");
    let moss = MossClient::new(
        credentials.moss_user_id.as_str(),
        config.moss_host.as_str(),
        config.moss_port,
    );

    let mut buckets = Vec::new();
    for problem in problems {
        for language in Language::ALL {
            let files = cache.files_for(problem, language)?;
            if files.is_empty() {
                continue;
            }

            let url = moss.submit(language, &files).await?;
            info!("OK: {}", language.moss_name());
            info!("Unfiltered online report (may contain duplicates): {}", url);

            let html = moss.download_report(&url).await?;
            let name = format!("{}_{}", problem, language.moss_name());
            let unfiltered = persist_report(
                &config.submission_folder,
                &format!("{}_unfiltered_report.html", name),
                html.as_bytes(),
            )?;
            info!("The unfiltered report has been saved locally inside: {}", unfiltered.display());

            let filtered = parser
                .remove_same_author(&html)
                .with_context(|| format!("malformed Moss report {}", url))?;
            let filtered_path = persist_report(
                &config.submission_folder,
                &format!("{}_filtered_report.html", name),
                filtered.html.as_bytes(),
            )?;
            info!(
                "Kept {} matches and dropped {} same-author matches, filtered report saved to {}",
                filtered.kept,
                filtered.dropped,
                filtered_path.display()
            );

            let ctx = ReportContext { language, roster };
            let matches = parser
                .parse(&filtered.html, &ctx)
                .with_context(|| format!("malformed Moss report {}", url))?;
            buckets.push(ReportBucket {
                problem: problem.clone(),
                language,
                matches,
            });
        }
    }
    Ok(buckets)
}

fn log_finding(finding: &SuspicionFinding) {
    let who = match finding.author.name {
        Some(ref name) => format!("{} ({})", name, finding.author.id),
        None => finding.author.id.clone(),
    };
    let evidence: Vec<String> = finding
        .details
        .lines()
        .map(|line| format!("    - {}", line))
        .collect();
    warn!(
        "Suspicious code from {} for problem {}:\n{}\n  Suspicious code:\n{}",
        who,
        finding.problem,
        finding.reason,
        evidence.join("\n")
    );
}

fn log_summary(report: &ActivityReport) {
    info!("{} findings in total", report.findings.len());
    for row in &report.by_contestant {
        info!("  {}: {}", row.name, row.findings);
    }
    for row in &report.by_school {
        warn!("School {} has {} flagged contestants", row.school, row.contestants);
    }
}
