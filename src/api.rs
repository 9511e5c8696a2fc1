use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::http_client::build_http_client;
use crate::state::{
    FixturesBatch, Fixture, MatchCard, Prediction, ResultsBatch, Score, TeamRating, TeamRef,
};

const ERROR_BODY_SNIPPET: usize = 200;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned http {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("match {0} not found")]
    NotFound(String),

    #[error("invalid {what} json: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The prediction service as seen by the screens. The worker thread owns one
/// implementation; tests substitute their own.
pub trait MatchApi: Send {
    fn fetch_upcoming_fixtures(&self, matchday: Option<u32>) -> ApiResult<FixturesBatch>;
    fn fetch_match(&self, match_id: &str) -> ApiResult<MatchCard>;
    fn fetch_prediction(&self, home_team_id: u64, away_team_id: u64) -> ApiResult<Prediction>;
    fn fetch_team_rating(&self, team_id: u64) -> ApiResult<TeamRating>;
    fn fetch_results(&self, offset: u32, limit: u32) -> ApiResult<ResultsBatch>;
}

#[derive(Debug, Clone)]
pub struct HttpMatchApi {
    client: Client,
    base_url: String,
}

impl HttpMatchApi {
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, req: RequestBuilder, url: &str) -> ApiResult<String> {
        let resp = req.send().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        let body = resp.text().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        Ok(body)
    }

    fn get(&self, url: &str) -> ApiResult<String> {
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url), url)
    }
}

#[derive(Debug, Serialize)]
struct PredictionRequest {
    home_team_id: u64,
    away_team_id: u64,
}

impl MatchApi for HttpMatchApi {
    fn fetch_upcoming_fixtures(&self, matchday: Option<u32>) -> ApiResult<FixturesBatch> {
        let url = fixtures_url(&self.base_url, matchday);
        self.get(&url)
            .and_then(|body| parse_fixtures_json(&body))
            .inspect(|batch| {
                tracing::info!(count = batch.fixtures.len(), matchday = ?batch.matchday, "fixtures fetched")
            })
            .inspect_err(|err| tracing::warn!("fetch upcoming fixtures: {err}"))
    }

    fn fetch_match(&self, match_id: &str) -> ApiResult<MatchCard> {
        let url = match_url(&self.base_url, match_id);
        self.get(&url)
            .map_err(|err| match err {
                ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                    ApiError::NotFound(match_id.to_string())
                }
                other => other,
            })
            .and_then(|body| parse_match_json(&body, match_id))
            .inspect_err(|err| tracing::warn!("fetch match {match_id}: {err}"))
    }

    fn fetch_prediction(&self, home_team_id: u64, away_team_id: u64) -> ApiResult<Prediction> {
        let url = predict_url(&self.base_url);
        tracing::debug!(%url, home_team_id, away_team_id, "POST");
        let req = self.client.post(&url).json(&PredictionRequest {
            home_team_id,
            away_team_id,
        });
        self.send(req, &url)
            .and_then(|body| parse_prediction_json(&body))
            .inspect_err(|err| {
                tracing::warn!("fetch prediction {home_team_id} vs {away_team_id}: {err}")
            })
    }

    fn fetch_team_rating(&self, team_id: u64) -> ApiResult<TeamRating> {
        let url = team_rating_url(&self.base_url, team_id);
        self.get(&url)
            .and_then(|body| parse_team_rating_json(&body))
            .inspect_err(|err| tracing::warn!("fetch rating for team {team_id}: {err}"))
    }

    fn fetch_results(&self, offset: u32, limit: u32) -> ApiResult<ResultsBatch> {
        let url = results_url(&self.base_url, offset, limit);
        self.get(&url)
            .and_then(|body| parse_results_json(&body))
            .inspect(|batch| {
                tracing::info!(offset, count = batch.results.len(), total = batch.total, "results fetched")
            })
            .inspect_err(|err| tracing::warn!("fetch results offset={offset}: {err}"))
    }
}

pub fn fixtures_url(base: &str, matchday: Option<u32>) -> String {
    match matchday {
        Some(day) => format!("{base}/fixtures/upcoming?matchday={day}"),
        None => format!("{base}/fixtures/upcoming"),
    }
}

pub fn match_url(base: &str, match_id: &str) -> String {
    format!("{base}/match/{}", match_id.trim())
}

pub fn predict_url(base: &str) -> String {
    format!("{base}/predict/")
}

pub fn team_rating_url(base: &str, team_id: u64) -> String {
    format!("{base}/teams/{team_id}/elo")
}

pub fn results_url(base: &str, offset: u32, limit: u32) -> String {
    format!("{base}/results?offset={offset}&limit={limit}")
}

#[derive(Debug, Deserialize)]
struct FixturesEnvelope {
    #[serde(default)]
    data: Option<FixturesData>,
}

#[derive(Debug, Deserialize)]
struct FixturesData {
    #[serde(default)]
    fixtures: Vec<Fixture>,
    #[serde(default)]
    matchday: Option<u32>,
}

pub fn parse_fixtures_json(raw: &str) -> ApiResult<FixturesBatch> {
    let trimmed = raw.trim();
    if is_blank_body(trimmed) {
        return Ok(FixturesBatch {
            fixtures: Vec::new(),
            matchday: None,
        });
    }
    let envelope: FixturesEnvelope = serde_json::from_str(trimmed).map_err(|source| {
        ApiError::Decode {
            what: "fixtures",
            source,
        }
    })?;
    let data = envelope.data.unwrap_or(FixturesData {
        fixtures: Vec::new(),
        matchday: None,
    });
    Ok(FixturesBatch {
        fixtures: data.fixtures,
        matchday: data.matchday,
    })
}

#[derive(Debug, Deserialize)]
struct MatchResponse {
    id: u64,
    #[serde(rename = "utcDate", alias = "date")]
    utc_date: String,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    matchday: Option<u32>,
    #[serde(rename = "homeTeam", alias = "home_team")]
    home_team: MatchTeam,
    #[serde(rename = "awayTeam", alias = "away_team")]
    away_team: MatchTeam,
    #[serde(default)]
    score: Option<MatchScore>,
    #[serde(default)]
    competition: Option<MatchCompetition>,
}

#[derive(Debug, Deserialize)]
struct MatchTeam {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    crest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatchScore {
    #[serde(rename = "fullTime", default)]
    full_time: Option<GoalPair>,
}

#[derive(Debug, Deserialize)]
struct GoalPair {
    #[serde(default)]
    home: Option<u32>,
    #[serde(default)]
    away: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct MatchCompetition {
    name: String,
}

/// Reshape `/match/{id}` into a [`MatchCard`]. An empty body means the
/// upstream has no such match.
pub fn parse_match_json(raw: &str, match_id: &str) -> ApiResult<MatchCard> {
    let trimmed = raw.trim();
    if is_blank_body(trimmed) || trimmed == "{}" {
        return Err(ApiError::NotFound(match_id.to_string()));
    }
    let resp: MatchResponse = serde_json::from_str(trimmed).map_err(|source| ApiError::Decode {
        what: "match",
        source,
    })?;

    let score = resp
        .score
        .and_then(|s| s.full_time)
        .and_then(|ft| Some(Score {
            home: ft.home?,
            away: ft.away?,
        }));

    Ok(MatchCard {
        id: resp.id,
        kickoff: resp.utc_date,
        venue: resp.venue.and_then(non_empty),
        status: resp.status.unwrap_or_else(|| "UNKNOWN".to_string()),
        matchday: resp.matchday,
        competition: resp.competition.map(|c| c.name),
        home: team_ref(resp.home_team),
        away: team_ref(resp.away_team),
        score,
    })
}

fn team_ref(team: MatchTeam) -> TeamRef {
    let name = team
        .name
        .and_then(non_empty)
        .or_else(|| team.short_name.and_then(non_empty))
        .unwrap_or_else(|| "Unknown Team".to_string());
    TeamRef {
        id: team.id,
        name,
        crest: team.crest.and_then(non_empty),
    }
}

pub fn parse_prediction_json(raw: &str) -> ApiResult<Prediction> {
    serde_json::from_str(raw.trim()).map_err(|source| ApiError::Decode {
        what: "prediction",
        source,
    })
}

pub fn parse_team_rating_json(raw: &str) -> ApiResult<TeamRating> {
    serde_json::from_str(raw.trim()).map_err(|source| ApiError::Decode {
        what: "team rating",
        source,
    })
}

pub fn parse_results_json(raw: &str) -> ApiResult<ResultsBatch> {
    let trimmed = raw.trim();
    if is_blank_body(trimmed) {
        return Ok(ResultsBatch {
            results: Vec::new(),
            total: 0,
        });
    }
    serde_json::from_str(trimmed).map_err(|source| ApiError::Decode {
        what: "results",
        source,
    })
}

fn is_blank_body(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed == "null"
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_SNIPPET) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_a_short_body() {
        let long = "x".repeat(500);
        let short = snippet(&long);
        assert_eq!(short.len(), ERROR_BODY_SNIPPET + 3);
        assert!(short.ends_with("..."));
        assert_eq!(snippet("  detail  "), "detail");
    }

    #[test]
    fn blank_team_names_fall_back() {
        let team = MatchTeam {
            id: 7,
            name: Some("  ".to_string()),
            short_name: Some("Spurs".to_string()),
            crest: Some(String::new()),
        };
        let team = team_ref(team);
        assert_eq!(team.name, "Spurs");
        assert_eq!(team.crest, None);
    }
}
