use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::grouping::{DateGroup, group_by_day};
use crate::outcome::{self, Accuracy, Outcome};
use crate::route::Route;

const LOG_CAPACITY: usize = 200;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub emblem: Option<String>,
}

/// One row of `/fixtures/upcoming`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: u64,
    pub date: String,
    pub home_team_id: u64,
    pub home_team_name: String,
    #[serde(default)]
    pub home_team_crest: Option<String>,
    pub away_team_id: u64,
    pub away_team_name: String,
    #[serde(default)]
    pub away_team_crest: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub matchday: Option<u32>,
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(default)]
    pub home_goals: Option<u32>,
    #[serde(default)]
    pub away_goals: Option<u32>,
}

impl Fixture {
    /// Both goal counts present means the match has been played.
    pub fn final_score(&self) -> Option<(u32, u32)> {
        Some((self.home_goals?, self.away_goals?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixturesBatch {
    pub fixtures: Vec<Fixture>,
    pub matchday: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: u64,
    pub name: String,
    pub crest: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

/// Flat view of `/match/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCard {
    pub id: u64,
    pub kickoff: String,
    pub venue: Option<String>,
    pub status: String,
    pub matchday: Option<u32>,
    pub competition: Option<String>,
    pub home: TeamRef,
    pub away: TeamRef,
    pub score: Option<Score>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub home_win_probability: f64,
    pub draw_probability: f64,
    pub away_win_probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<serde_json::Value>,
}

impl Prediction {
    pub fn predicted_outcome(&self) -> Outcome {
        outcome::argmax(
            self.home_win_probability,
            self.draw_probability,
            self.away_win_probability,
        )
    }

    pub fn probability(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home_win_probability,
            Outcome::Draw => self.draw_probability,
            Outcome::Away => self.away_win_probability,
        }
    }
}

/// A finished match from `/results`, with the prediction stored before kickoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub match_id: u64,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(default)]
    pub prediction: Option<Prediction>,
}

impl ResultRecord {
    pub fn actual_outcome(&self) -> Outcome {
        outcome::actual_outcome(self.home_goals, self.away_goals)
    }

    pub fn predicted_outcome(&self) -> Option<Outcome> {
        self.prediction.as_ref().map(Prediction::predicted_outcome)
    }

    pub fn accuracy(&self) -> Option<Accuracy> {
        self.predicted_outcome()
            .map(|predicted| outcome::accuracy(predicted, self.actual_outcome()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsBatch {
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    #[serde(default, alias = "id")]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "current_elo_rating", alias = "elo")]
    pub elo_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FixturesView {
    Loading,
    Empty,
    Failed(String),
    Loaded { groups: Vec<DateGroup> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixturesPage {
    pub view: FixturesView,
    pub pending: Option<RequestId>,
    /// Matchday requested from the API; `None` asks for the current one.
    pub matchday_filter: Option<u32>,
    pub reported_matchday: Option<u32>,
    pub selected: usize,
}

impl FixturesPage {
    fn loading(request: RequestId, matchday_filter: Option<u32>) -> Self {
        Self {
            view: FixturesView::Loading,
            pending: Some(request),
            matchday_filter,
            reported_matchday: None,
            selected: 0,
        }
    }

    pub fn fixture_count(&self) -> usize {
        match &self.view {
            FixturesView::Loaded { groups } => groups.iter().map(|g| g.fixtures.len()).sum(),
            _ => 0,
        }
    }

    pub fn selected_fixture(&self) -> Option<&Fixture> {
        let FixturesView::Loaded { groups } = &self.view else {
            return None;
        };
        groups.iter().flat_map(|g| g.fixtures.iter()).nth(self.selected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadMore {
    Idle,
    Loading,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Loading,
    Empty,
    Failed(String),
    Loaded {
        results: Vec<ResultRecord>,
        total: u32,
        more: LoadMore,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPage {
    pub view: ResultsView,
    pub pending: Option<RequestId>,
    pub page_size: u32,
    pub selected: usize,
}

impl ResultsPage {
    fn loading(request: RequestId, page_size: u32) -> Self {
        Self {
            view: ResultsView::Loading,
            pending: Some(request),
            page_size,
            selected: 0,
        }
    }

    pub fn results(&self) -> &[ResultRecord] {
        match &self.view {
            ResultsView::Loaded { results, .. } => results,
            _ => &[],
        }
    }

    /// Whether the "load more" control should be offered.
    pub fn has_more(&self) -> bool {
        match &self.view {
            ResultsView::Loaded { results, total, .. } => results.len() < *total as usize,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionSlot {
    Ready(Prediction),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchView {
    Loading,
    NotFound,
    Failed(String),
    Found {
        card: MatchCard,
        prediction: PredictionSlot,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPage {
    pub match_id: String,
    pub view: MatchView,
    pub pending: Option<RequestId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Fixtures(FixturesPage),
    Results(ResultsPage),
    Match(MatchPage),
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFixtures {
        request: RequestId,
        batch: FixturesBatch,
    },
    SetResults {
        request: RequestId,
        batch: ResultsBatch,
    },
    SetMatch {
        request: RequestId,
        card: MatchCard,
        prediction: PredictionSlot,
    },
    MatchNotFound {
        request: RequestId,
    },
    RequestFailed {
        request: RequestId,
        message: String,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    FetchFixtures {
        request: RequestId,
        matchday: Option<u32>,
    },
    FetchResults {
        request: RequestId,
        offset: u32,
        limit: u32,
    },
    FetchMatch {
        request: RequestId,
        match_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub route: Route,
    pub page: Page,
    /// List route to return to from a match detail screen.
    pub back_route: Route,
    pub results_page_size: u32,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    next_request: RequestId,
}

impl AppState {
    /// Starts on an idle fixtures screen; call [`AppState::navigate`] to mount
    /// the first route and get its fetch command.
    pub fn new(results_page_size: u32) -> Self {
        Self {
            route: Route::Fixtures,
            page: Page::Fixtures(FixturesPage {
                view: FixturesView::Loading,
                pending: None,
                matchday_filter: None,
                reported_matchday: None,
                selected: 0,
            }),
            back_route: Route::Fixtures,
            results_page_size: results_page_size.max(1),
            logs: VecDeque::with_capacity(LOG_CAPACITY),
            help_overlay: false,
            next_request: 1,
        }
    }

    fn issue_request(&mut self) -> RequestId {
        let id = self.next_request;
        self.next_request += 1;
        id
    }

    /// Replace the current screen. Whatever the old screen had in flight is
    /// orphaned and its deltas are dropped on arrival.
    pub fn navigate(&mut self, route: Route) -> ProviderCommand {
        if self.route.is_list() && !route.is_list() {
            self.back_route = self.route.clone();
        }
        let request = self.issue_request();
        let command = match &route {
            Route::Fixtures => {
                self.page = Page::Fixtures(FixturesPage::loading(request, None));
                ProviderCommand::FetchFixtures {
                    request,
                    matchday: None,
                }
            }
            Route::Results => {
                self.page = Page::Results(ResultsPage::loading(request, self.results_page_size));
                ProviderCommand::FetchResults {
                    request,
                    offset: 0,
                    limit: self.results_page_size,
                }
            }
            Route::MatchDetail { match_id } => {
                self.page = Page::Match(MatchPage {
                    match_id: match_id.clone(),
                    view: MatchView::Loading,
                    pending: Some(request),
                });
                ProviderCommand::FetchMatch {
                    request,
                    match_id: match_id.clone(),
                }
            }
        };
        tracing::debug!(route = %route, request, "navigate");
        self.route = route;
        command
    }

    /// Re-run the current screen's fetch. Ignored while a first-page fetch is
    /// still in flight.
    pub fn refresh(&mut self) -> Option<ProviderCommand> {
        let busy = match &self.page {
            Page::Fixtures(page) => page.view == FixturesView::Loading,
            Page::Results(page) => page.view == ResultsView::Loading,
            Page::Match(page) => page.view == MatchView::Loading,
        };
        if busy {
            return None;
        }
        match &self.page {
            Page::Fixtures(page) => {
                let filter = page.matchday_filter;
                Some(self.reload_fixtures(filter))
            }
            Page::Results(_) => {
                let request = self.issue_request();
                let limit = self.results_page_size;
                self.page = Page::Results(ResultsPage::loading(request, limit));
                Some(ProviderCommand::FetchResults {
                    request,
                    offset: 0,
                    limit,
                })
            }
            Page::Match(_) => Some(self.navigate(self.route.clone())),
        }
    }

    fn reload_fixtures(&mut self, matchday: Option<u32>) -> ProviderCommand {
        let request = self.issue_request();
        let reported = match &self.page {
            Page::Fixtures(page) => page.reported_matchday,
            _ => None,
        };
        let mut page = FixturesPage::loading(request, matchday);
        page.reported_matchday = reported;
        self.page = Page::Fixtures(page);
        ProviderCommand::FetchFixtures { request, matchday }
    }

    /// Step the requested matchday; from "current" the step starts at the
    /// matchday the API last reported.
    pub fn step_matchday(&mut self, step: i32) -> Option<ProviderCommand> {
        let Page::Fixtures(page) = &self.page else {
            return None;
        };
        let base = page.matchday_filter.or(page.reported_matchday)?;
        let next = base.saturating_add_signed(step).max(1);
        if page.matchday_filter == Some(next) {
            return None;
        }
        Some(self.reload_fixtures(Some(next)))
    }

    pub fn clear_matchday(&mut self) -> Option<ProviderCommand> {
        let Page::Fixtures(page) = &self.page else {
            return None;
        };
        if page.matchday_filter.is_none() {
            return None;
        }
        Some(self.reload_fixtures(None))
    }

    /// Request the next results page. Only one page fetch at a time, and only
    /// once the first page has landed.
    pub fn load_more(&mut self) -> Option<ProviderCommand> {
        let Page::Results(page) = &self.page else {
            return None;
        };
        if !page.has_more() {
            return None;
        }
        let ResultsView::Loaded { results, more, .. } = &page.view else {
            return None;
        };
        if *more == LoadMore::Loading {
            return None;
        }
        let offset = results.len() as u32;
        let limit = page.page_size;
        let request = self.issue_request();
        if let Page::Results(page) = &mut self.page {
            page.pending = Some(request);
            if let ResultsView::Loaded { more, .. } = &mut page.view {
                *more = LoadMore::Loading;
            }
        }
        Some(ProviderCommand::FetchResults {
            request,
            offset,
            limit,
        })
    }

    pub fn open_selected(&mut self) -> Option<ProviderCommand> {
        let match_id = match &self.page {
            Page::Fixtures(page) => page.selected_fixture().map(|f| f.match_id),
            Page::Results(page) => page.results().get(page.selected).map(|r| r.match_id),
            Page::Match(_) => None,
        }?;
        Some(self.navigate(Route::MatchDetail {
            match_id: match_id.to_string(),
        }))
    }

    pub fn go_back(&mut self) -> Option<ProviderCommand> {
        if self.route.is_list() {
            return None;
        }
        Some(self.navigate(self.back_route.clone()))
    }

    pub fn select_next(&mut self) {
        match &mut self.page {
            Page::Fixtures(page) => {
                let len = page.fixture_count();
                if len > 0 && page.selected + 1 < len {
                    page.selected += 1;
                }
            }
            Page::Results(page) => {
                let len = page.results().len();
                if len > 0 && page.selected + 1 < len {
                    page.selected += 1;
                }
            }
            Page::Match(_) => {}
        }
    }

    pub fn select_prev(&mut self) {
        match &mut self.page {
            Page::Fixtures(page) => page.selected = page.selected.saturating_sub(1),
            Page::Results(page) => page.selected = page.selected.saturating_sub(1),
            Page::Match(_) => {}
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFixtures { request, batch } => {
            let Page::Fixtures(page) = &mut state.page else {
                return drop_stale("fixtures", request);
            };
            if page.pending != Some(request) {
                return drop_stale("fixtures", request);
            }
            page.pending = None;
            page.reported_matchday = batch.matchday.or(page.reported_matchday);
            let groups = group_by_day(batch.fixtures);
            page.view = if groups.is_empty() {
                FixturesView::Empty
            } else {
                FixturesView::Loaded { groups }
            };
            let len = page.fixture_count();
            page.selected = page.selected.min(len.saturating_sub(1));
        }
        Delta::SetResults { request, batch } => {
            let Page::Results(page) = &mut state.page else {
                return drop_stale("results", request);
            };
            if page.pending != Some(request) {
                return drop_stale("results", request);
            }
            page.pending = None;
            let view = std::mem::replace(&mut page.view, ResultsView::Loading);
            page.view = match view {
                ResultsView::Loaded { mut results, .. } => {
                    let before = results.len();
                    append_unique(&mut results, batch.results);
                    let mut total = batch.total;
                    if results.len() == before {
                        // A page with nothing new would leave "load more" up forever.
                        total = results.len() as u32;
                    }
                    ResultsView::Loaded {
                        results,
                        total,
                        more: LoadMore::Idle,
                    }
                }
                _ => {
                    let mut results = Vec::with_capacity(batch.results.len());
                    append_unique(&mut results, batch.results);
                    if results.is_empty() {
                        ResultsView::Empty
                    } else {
                        ResultsView::Loaded {
                            results,
                            total: batch.total,
                            more: LoadMore::Idle,
                        }
                    }
                }
            };
            let len = page.results().len();
            page.selected = page.selected.min(len.saturating_sub(1));
        }
        Delta::SetMatch {
            request,
            card,
            prediction,
        } => {
            let Page::Match(page) = &mut state.page else {
                return drop_stale("match", request);
            };
            if page.pending != Some(request) {
                return drop_stale("match", request);
            }
            page.pending = None;
            page.view = MatchView::Found { card, prediction };
        }
        Delta::MatchNotFound { request } => {
            let Page::Match(page) = &mut state.page else {
                return drop_stale("match", request);
            };
            if page.pending != Some(request) {
                return drop_stale("match", request);
            }
            page.pending = None;
            page.view = MatchView::NotFound;
        }
        Delta::RequestFailed { request, message } => apply_failure(state, request, message),
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn apply_failure(state: &mut AppState, request: RequestId, message: String) {
    let pending = match &state.page {
        Page::Fixtures(page) => page.pending,
        Page::Results(page) => page.pending,
        Page::Match(page) => page.pending,
    };
    if pending != Some(request) {
        return drop_stale("failure", request);
    }
    match &mut state.page {
        Page::Fixtures(page) => {
            page.pending = None;
            page.view = FixturesView::Failed(message);
        }
        Page::Results(page) => {
            page.pending = None;
            match &mut page.view {
                // A failed "load more" keeps what is already on screen.
                ResultsView::Loaded { more, .. } => *more = LoadMore::Failed(message),
                view => *view = ResultsView::Failed(message),
            }
        }
        Page::Match(page) => {
            page.pending = None;
            page.view = MatchView::Failed(message);
        }
    }
}

fn append_unique(results: &mut Vec<ResultRecord>, incoming: Vec<ResultRecord>) {
    let mut seen: HashSet<u64> = results.iter().map(|r| r.match_id).collect();
    for record in incoming {
        if seen.insert(record.match_id) {
            results.push(record);
        }
    }
}

fn drop_stale(kind: &str, request: RequestId) {
    tracing::debug!(kind, request, "dropping stale response");
}
