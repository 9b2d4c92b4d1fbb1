use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::models::{Contestant, RunSummary};

const RUNS_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestSummary {
    pub alias: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContestListResponse {
    contests: Vec<ContestSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProblemSummary {
    pub alias: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProblemListResponse {
    problems: Vec<ProblemSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunListResponse {
    runs: Vec<RunSummary>,
    #[serde(default)]
    total_runs: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SourceResponse {
    #[serde(default)]
    source: String,
}

#[derive(Debug, Deserialize)]
struct Points {
    #[serde(default)]
    points: f64,
}

#[derive(Debug, Deserialize)]
struct ScoreboardProblem {
    alias: String,
    #[serde(default)]
    points: f64,
}

#[derive(Debug, Deserialize)]
struct RankingEntry {
    username: String,
    #[serde(default)]
    name: Option<String>,
    total: Points,
    #[serde(default)]
    problems: Vec<ScoreboardProblem>,
}

#[derive(Debug, Deserialize)]
struct ScoreboardResponse {
    ranking: Vec<RankingEntry>,
}

/// Client for the omegaUp contest API.
pub struct OmegaUpClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl OmegaUpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/api/{}/", self.base_url, endpoint);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).form(params);
        if let Some(ref token) = self.auth_token {
            request = request.header(reqwest::header::COOKIE, format!("ouat={}", token));
        }

        let request_err = |source| ApiError::Request {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = request.send().await.map_err(request_err)?;
        let text = response.text().await.map_err(request_err)?;

        let decode_err = |source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        };
        let envelope: Envelope = serde_json::from_str(&text).map_err(decode_err)?;
        if envelope.status.as_deref() == Some("error") {
            return Err(ApiError::Api {
                endpoint: endpoint.to_string(),
                message: envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        serde_json::from_str(&text).map_err(decode_err)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let response: LoginResponse = self
            .call(
                "user/login",
                &[("usernameOrEmail", username), ("password", password)],
            )
            .await?;
        self.auth_token = Some(response.auth_token);
        info!("Logged in to omegaUp as {}", username);
        Ok(())
    }

    /// Contests the logged-in user administers.
    pub async fn list_contests(&self) -> Result<Vec<ContestSummary>, ApiError> {
        let response: ContestListResponse = self.call("contest/adminList", &[]).await?;
        Ok(response.contests)
    }

    pub async fn list_problems(&self, contest: &str) -> Result<Vec<ProblemSummary>, ApiError> {
        let response: ProblemListResponse = self
            .call("contest/problems", &[("contest_alias", contest)])
            .await?;
        Ok(response.problems)
    }

    /// All runs of `problem` in `contest`, fetched page by page.
    pub async fn list_runs(&self, contest: &str, problem: &str) -> Result<Vec<RunSummary>, ApiError> {
        let mut runs = Vec::new();
        loop {
            let offset = runs.len().to_string();
            let rowcount = RUNS_PAGE_SIZE.to_string();
            let page: RunListResponse = self
                .call(
                    "contest/runs",
                    &[
                        ("contest_alias", contest),
                        ("problem_alias", problem),
                        ("offset", offset.as_str()),
                        ("rowcount", rowcount.as_str()),
                    ],
                )
                .await?;

            let fetched = page.runs.len();
            runs.extend(page.runs);
            let total = page.total_runs.unwrap_or(runs.len());
            debug!("Fetched {} of {} runs for {}", runs.len(), total, problem);
            if fetched == 0 || runs.len() >= total {
                return Ok(runs);
            }
        }
    }

    pub async fn fetch_source(&self, run_id: &str) -> Result<String, ApiError> {
        let response: SourceResponse = self.call("run/source", &[("run_alias", run_id)]).await?;
        Ok(response.source)
    }

    pub async fn scoreboard(&self, contest: &str) -> Result<Vec<Contestant>, ApiError> {
        let response: ScoreboardResponse = self
            .call("contest/scoreboard", &[("contest_alias", contest)])
            .await?;
        Ok(response
            .ranking
            .into_iter()
            .map(|entry| Contestant {
                username: entry.username,
                name: entry.name,
                total_points: entry.total.points,
                problem_points: entry
                    .problems
                    .into_iter()
                    .map(|problem| (problem.alias, problem.points))
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect())
    }
}
