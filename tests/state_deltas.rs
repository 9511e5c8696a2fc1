use match_predictor::route::Route;
use match_predictor::state::{
    AppState, Delta, Fixture, FixturesBatch, FixturesView, LoadMore, MatchCard, MatchView, Page,
    Prediction, PredictionSlot, ProviderCommand, RequestId, ResultRecord, ResultsBatch,
    ResultsView, Score, TeamRef, apply_delta,
};

fn fixture(id: u64, date: &str) -> Fixture {
    Fixture {
        match_id: id,
        date: date.to_string(),
        home_team_id: 1,
        home_team_name: "Home".to_string(),
        home_team_crest: None,
        away_team_id: 2,
        away_team_name: "Away".to_string(),
        away_team_crest: None,
        status: None,
        venue: None,
        matchday: Some(3),
        competition: None,
        home_goals: None,
        away_goals: None,
    }
}

fn record(id: u64) -> ResultRecord {
    ResultRecord {
        match_id: id,
        date: "2024-08-10 16:30:00".to_string(),
        home_team: format!("H{id}"),
        away_team: format!("A{id}"),
        home_goals: 1,
        away_goals: 0,
        prediction: None,
    }
}

fn records(ids: std::ops::Range<u64>) -> Vec<ResultRecord> {
    ids.map(record).collect()
}

fn card() -> MatchCard {
    MatchCard {
        id: 77,
        kickoff: "2024-08-17T11:30:00Z".to_string(),
        venue: Some("Emirates Stadium".to_string()),
        status: "TIMED".to_string(),
        matchday: Some(3),
        competition: None,
        home: TeamRef {
            id: 57,
            name: "Arsenal".to_string(),
            crest: None,
        },
        away: TeamRef {
            id: 61,
            name: "Chelsea".to_string(),
            crest: None,
        },
        score: Some(Score { home: 2, away: 1 }),
    }
}

fn request_of(cmd: &ProviderCommand) -> RequestId {
    match cmd {
        ProviderCommand::FetchFixtures { request, .. }
        | ProviderCommand::FetchResults { request, .. }
        | ProviderCommand::FetchMatch { request, .. } => *request,
    }
}

fn fixtures_page(state: &AppState) -> &match_predictor::state::FixturesPage {
    match &state.page {
        Page::Fixtures(page) => page,
        other => panic!("expected fixtures page, got {other:?}"),
    }
}

fn results_page(state: &AppState) -> &match_predictor::state::ResultsPage {
    match &state.page {
        Page::Results(page) => page,
        other => panic!("expected results page, got {other:?}"),
    }
}

fn match_view(state: &AppState) -> &MatchView {
    match &state.page {
        Page::Match(page) => &page.view,
        other => panic!("expected match page, got {other:?}"),
    }
}

#[test]
fn fixtures_load_into_date_groups() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Fixtures);
    assert_eq!(
        cmd,
        ProviderCommand::FetchFixtures {
            request: request_of(&cmd),
            matchday: None
        }
    );

    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&cmd),
            batch: FixturesBatch {
                fixtures: vec![
                    fixture(1, "2024-08-17T11:30:00Z"),
                    fixture(2, "2024-08-18T11:30:00Z"),
                    fixture(3, "2024-08-17T14:00:00Z"),
                ],
                matchday: Some(3),
            },
        },
    );

    let page = fixtures_page(&state);
    assert_eq!(page.pending, None);
    assert_eq!(page.reported_matchday, Some(3));
    assert_eq!(page.fixture_count(), 3);
    let FixturesView::Loaded { groups } = &page.view else {
        panic!("expected loaded view");
    };
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].fixtures.len(), 2);
}

#[test]
fn empty_fixture_list_is_its_own_state() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Fixtures);
    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&cmd),
            batch: FixturesBatch {
                fixtures: Vec::new(),
                matchday: Some(38),
            },
        },
    );
    assert_eq!(fixtures_page(&state).view, FixturesView::Empty);
}

#[test]
fn refresh_is_ignored_while_a_fetch_is_in_flight() {
    let mut state = AppState::new(20);
    let first = state.navigate(Route::Fixtures);
    assert!(state.refresh().is_none());

    apply_delta(
        &mut state,
        Delta::RequestFailed {
            request: request_of(&first),
            message: "Failed to load fixtures.".to_string(),
        },
    );
    assert_eq!(
        fixtures_page(&state).view,
        FixturesView::Failed("Failed to load fixtures.".to_string())
    );

    let second = state.refresh().expect("refresh after failure");
    assert_ne!(request_of(&first), request_of(&second));
    assert_eq!(fixtures_page(&state).view, FixturesView::Loading);
    assert!(state.refresh().is_none());
}

#[test]
fn stale_responses_are_dropped() {
    let mut state = AppState::new(20);
    let old = state.navigate(Route::Fixtures);
    let results = state.navigate(Route::Results);

    // The fixtures screen is gone; its late answer must not touch results.
    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&old),
            batch: FixturesBatch {
                fixtures: vec![fixture(1, "2024-08-17T11:30:00Z")],
                matchday: None,
            },
        },
    );
    apply_delta(
        &mut state,
        Delta::RequestFailed {
            request: request_of(&old),
            message: "late".to_string(),
        },
    );
    let page = results_page(&state);
    assert_eq!(page.view, ResultsView::Loading);
    assert_eq!(page.pending, Some(request_of(&results)));

    // Same screen kind, older request.
    let fresh = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&results),
            batch: ResultsBatch {
                results: records(0..3),
                total: 3,
            },
        },
    );
    assert_eq!(results_page(&state).view, ResultsView::Loading);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&fresh),
            batch: ResultsBatch {
                results: records(0..3),
                total: 3,
            },
        },
    );
    assert_eq!(results_page(&state).results().len(), 3);
}

#[test]
fn pagination_accumulates_without_duplicates_until_total() {
    let mut state = AppState::new(20);
    let first = state.navigate(Route::Results);
    assert_eq!(
        first,
        ProviderCommand::FetchResults {
            request: request_of(&first),
            offset: 0,
            limit: 20
        }
    );
    assert!(state.load_more().is_none(), "no paging before the first page");

    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&first),
            batch: ResultsBatch {
                results: records(0..20),
                total: 40,
            },
        },
    );
    assert!(results_page(&state).has_more());

    let more = state.load_more().expect("second page");
    assert_eq!(
        more,
        ProviderCommand::FetchResults {
            request: request_of(&more),
            offset: 20,
            limit: 20
        }
    );
    assert!(state.load_more().is_none(), "one page at a time");
    let ResultsView::Loaded { more: status, .. } = &results_page(&state).view else {
        panic!("expected loaded view");
    };
    assert_eq!(*status, LoadMore::Loading);

    // Overlap with the first page (e.g. a new result shifted offsets).
    let mut page_two = records(19..39);
    page_two.push(record(39));
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&more),
            batch: ResultsBatch {
                results: page_two,
                total: 40,
            },
        },
    );

    let page = results_page(&state);
    let ids: Vec<u64> = page.results().iter().map(|r| r.match_id).collect();
    assert_eq!(ids.len(), 40);
    assert_eq!(ids, (0..40).collect::<Vec<u64>>());
    assert!(!page.has_more());
    assert!(state.load_more().is_none());
}

#[test]
fn refresh_supersedes_an_in_flight_page() {
    let mut state = AppState::new(10);
    let first = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&first),
            batch: ResultsBatch {
                results: records(0..10),
                total: 30,
            },
        },
    );
    let more = state.load_more().expect("page two");
    let refresh = state.refresh().expect("refresh while paging");
    assert_eq!(
        refresh,
        ProviderCommand::FetchResults {
            request: request_of(&refresh),
            offset: 0,
            limit: 10
        }
    );

    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&more),
            batch: ResultsBatch {
                results: records(10..20),
                total: 30,
            },
        },
    );
    assert_eq!(results_page(&state).view, ResultsView::Loading);

    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&refresh),
            batch: ResultsBatch {
                results: records(100..110),
                total: 31,
            },
        },
    );
    let page = results_page(&state);
    assert_eq!(page.results().first().map(|r| r.match_id), Some(100));
    assert_eq!(page.results().len(), 10);
}

#[test]
fn failed_load_more_keeps_the_list_and_can_retry() {
    let mut state = AppState::new(5);
    let first = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&first),
            batch: ResultsBatch {
                results: records(0..5),
                total: 12,
            },
        },
    );
    let more = state.load_more().expect("page two");
    apply_delta(
        &mut state,
        Delta::RequestFailed {
            request: request_of(&more),
            message: "Failed to load results.".to_string(),
        },
    );
    let page = results_page(&state);
    assert_eq!(page.results().len(), 5);
    let ResultsView::Loaded { more: status, .. } = &page.view else {
        panic!("expected loaded view");
    };
    assert_eq!(*status, LoadMore::Failed("Failed to load results.".to_string()));

    let retry = state.load_more().expect("retry");
    assert_eq!(
        retry,
        ProviderCommand::FetchResults {
            request: request_of(&retry),
            offset: 5,
            limit: 5
        }
    );
}

#[test]
fn a_page_with_nothing_new_ends_paging() {
    let mut state = AppState::new(5);
    let first = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&first),
            batch: ResultsBatch {
                results: records(0..5),
                total: 10,
            },
        },
    );
    let more = state.load_more().expect("page two");
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&more),
            batch: ResultsBatch {
                results: Vec::new(),
                total: 10,
            },
        },
    );
    assert!(!results_page(&state).has_more());
}

#[test]
fn empty_results_and_failed_results_are_distinct() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&cmd),
            batch: ResultsBatch {
                results: Vec::new(),
                total: 0,
            },
        },
    );
    assert_eq!(results_page(&state).view, ResultsView::Empty);

    let cmd = state.refresh().expect("refresh");
    apply_delta(
        &mut state,
        Delta::RequestFailed {
            request: request_of(&cmd),
            message: "boom".to_string(),
        },
    );
    assert_eq!(
        results_page(&state).view,
        ResultsView::Failed("boom".to_string())
    );
}

#[test]
fn not_found_is_distinct_from_failure() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::MatchDetail {
        match_id: "404".to_string(),
    });
    apply_delta(
        &mut state,
        Delta::MatchNotFound {
            request: request_of(&cmd),
        },
    );
    assert_eq!(*match_view(&state), MatchView::NotFound);

    let cmd = state.refresh().expect("reload");
    apply_delta(
        &mut state,
        Delta::RequestFailed {
            request: request_of(&cmd),
            message: "Failed to load match details.".to_string(),
        },
    );
    assert_eq!(
        *match_view(&state),
        MatchView::Failed("Failed to load match details.".to_string())
    );
}

#[test]
fn failed_prediction_still_shows_the_match() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::MatchDetail {
        match_id: "77".to_string(),
    });
    apply_delta(
        &mut state,
        Delta::SetMatch {
            request: request_of(&cmd),
            card: card(),
            prediction: PredictionSlot::Failed("Failed to load prediction.".to_string()),
        },
    );
    match match_view(&state) {
        MatchView::Found {
            card: shown,
            prediction: PredictionSlot::Failed(msg),
        } => {
            assert_eq!(shown.home.name, "Arsenal");
            assert_eq!(msg, "Failed to load prediction.");
        }
        other => panic!("expected match with failed prediction, got {other:?}"),
    }
}

#[test]
fn match_and_prediction_arrive_together() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::MatchDetail {
        match_id: "77".to_string(),
    });
    assert_eq!(*match_view(&state), MatchView::Loading);
    let prediction = Prediction {
        home_win_probability: 0.5,
        draw_probability: 0.3,
        away_win_probability: 0.2,
        features: None,
    };
    apply_delta(
        &mut state,
        Delta::SetMatch {
            request: request_of(&cmd),
            card: card(),
            prediction: PredictionSlot::Ready(prediction.clone()),
        },
    );
    assert_eq!(
        *match_view(&state),
        MatchView::Found {
            card: card(),
            prediction: PredictionSlot::Ready(prediction)
        }
    );
}

#[test]
fn selecting_a_fixture_opens_its_match_and_back_returns() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Fixtures);
    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&cmd),
            batch: FixturesBatch {
                fixtures: vec![
                    fixture(11, "2024-08-17T11:30:00Z"),
                    fixture(12, "2024-08-18T11:30:00Z"),
                ],
                matchday: Some(3),
            },
        },
    );
    state.select_next();
    state.select_next();
    assert_eq!(fixtures_page(&state).selected, 1);

    let open = state.open_selected().expect("open match");
    assert_eq!(
        open,
        ProviderCommand::FetchMatch {
            request: request_of(&open),
            match_id: "12".to_string()
        }
    );
    assert_eq!(
        state.route,
        Route::MatchDetail {
            match_id: "12".to_string()
        }
    );
    assert!(state.open_selected().is_none());

    let back = state.go_back().expect("back to fixtures");
    assert!(matches!(back, ProviderCommand::FetchFixtures { .. }));
    assert_eq!(state.route, Route::Fixtures);
    assert!(state.go_back().is_none());
}

#[test]
fn back_from_a_result_returns_to_results() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Results);
    apply_delta(
        &mut state,
        Delta::SetResults {
            request: request_of(&cmd),
            batch: ResultsBatch {
                results: records(5..8),
                total: 3,
            },
        },
    );
    state.select_next();
    let open = state.open_selected().expect("open result");
    assert!(matches!(
        open,
        ProviderCommand::FetchMatch { ref match_id, .. } if match_id == "6"
    ));
    let back = state.go_back().expect("back");
    assert!(matches!(back, ProviderCommand::FetchResults { offset: 0, .. }));
    assert_eq!(state.route, Route::Results);
}

#[test]
fn matchday_stepping_starts_from_the_reported_matchday() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Fixtures);
    assert!(state.step_matchday(1).is_none(), "nothing reported yet");

    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&cmd),
            batch: FixturesBatch {
                fixtures: vec![fixture(1, "2024-08-17T11:30:00Z")],
                matchday: Some(3),
            },
        },
    );

    let next = state.step_matchday(1).expect("next matchday");
    assert!(matches!(
        next,
        ProviderCommand::FetchFixtures {
            matchday: Some(4),
            ..
        }
    ));
    assert_eq!(fixtures_page(&state).matchday_filter, Some(4));
    assert_eq!(fixtures_page(&state).reported_matchday, Some(3));

    let prev = state.step_matchday(-10).expect("clamped matchday");
    assert!(matches!(
        prev,
        ProviderCommand::FetchFixtures {
            matchday: Some(1),
            ..
        }
    ));
    assert!(state.step_matchday(-1).is_none(), "already at matchday 1");

    let current = state.clear_matchday().expect("back to current");
    assert!(matches!(
        current,
        ProviderCommand::FetchFixtures { matchday: None, .. }
    ));
    assert!(state.clear_matchday().is_none());
}

#[test]
fn matchday_step_saturates_at_the_top() {
    let mut state = AppState::new(20);
    let cmd = state.navigate(Route::Fixtures);
    apply_delta(
        &mut state,
        Delta::SetFixtures {
            request: request_of(&cmd),
            batch: FixturesBatch {
                fixtures: vec![fixture(1, "2024-08-17T11:30:00Z")],
                matchday: Some(u32::MAX),
            },
        },
    );

    let next = state.step_matchday(1).expect("filter set to the reported matchday");
    assert!(matches!(
        next,
        ProviderCommand::FetchFixtures {
            matchday: Some(u32::MAX),
            ..
        }
    ));
    assert!(state.step_matchday(1).is_none(), "no matchday past the last");
}

#[test]
fn console_log_is_bounded() {
    let mut state = AppState::new(20);
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] 249"));
}
